use std::sync::Arc;

use auth::Authenticator;
use expense_service::config::Config;
use expense_service::domain::expense::service::ExpenseService;
use expense_service::domain::user::service::AuthService;
use expense_service::inbound::http::rate_limit::FixedWindowRateLimiter;
use expense_service::inbound::http::router::create_router;
use expense_service::inbound::http::router::AppState;
use expense_service::outbound::repositories::expense::PostgresExpenseStore;
use expense_service::outbound::repositories::team::PostgresTeamMembership;
use expense_service::outbound::repositories::user::PostgresUserDirectory;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "expense-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_hours = config.jwt.expiration_hours,
        rate_limit_max_requests = config.rate_limit.max_requests,
        rate_limit_window_seconds = config.rate_limit.window_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_ttl(),
    )?);

    let user_directory = Arc::new(PostgresUserDirectory::new(pg_pool.clone()));
    let expense_store = Arc::new(PostgresExpenseStore::new(pg_pool.clone()));
    let team_membership = Arc::new(PostgresTeamMembership::new(pg_pool));

    let state = AppState {
        auth_service: Arc::new(AuthService::new(user_directory, Arc::clone(&authenticator))),
        expense_service: Arc::new(ExpenseService::new(expense_store, team_membership)),
        authenticator,
        rate_limiter: Arc::new(FixedWindowRateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window(),
        )),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    if let Err(e) = axum::serve(http_listener, create_router(state)).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

use std::sync::Arc;

use auth::Authenticator;
use auth::JwtError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::UserId;

/// Verified caller identity, inserted into request extensions by
/// [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
    }
}

/// Middleware that validates bearer tokens and adds the caller to request
/// extensions. Rejected requests never reach the handler.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::warn!("Token validation failed: {}", e);
        match e {
            JwtError::Expired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!("Token subject is not a user ID: {}", e);
        ApiError::Unauthorized("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Authorization header required".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

    // Auth schemes are case-insensitive (RFC 7235).
    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthorized(
            "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Router;
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(SECRET, Duration::hours(1)).unwrap())
    }

    async fn whoami(caller: AuthenticatedUser) -> String {
        caller.user_id.to_string()
    }

    fn app(authenticator: Arc<Authenticator>) -> Router {
        Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(authenticator, authenticate))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut request = HttpRequest::builder().uri("/protected");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let authenticator = authenticator();
        let user_id = UserId::new();
        let token = authenticator
            .issue_token(user_id, "alice@example.com")
            .unwrap();

        let (status, body) = call(app(authenticator), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), user_id.to_string());
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let authenticator = authenticator();
        let user_id = UserId::new();
        let token = authenticator
            .issue_token(user_id, "alice@example.com")
            .unwrap();

        for scheme in ["bearer", "BEARER", "BeArEr"] {
            let header = format!("{} {}", scheme, token);
            let (status, body) = call(app(authenticator.clone()), Some(&header)).await;

            assert_eq!(status, StatusCode::OK, "scheme: {}", scheme);
            assert_eq!(String::from_utf8(body).unwrap(), user_id.to_string());
        }
    }

    #[tokio::test]
    async fn test_missing_header_rejected_with_envelope() {
        let (status, body) = call(app(authenticator()), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_wrong_scheme_rejected() {
        let (status, _) = call(app(authenticator()), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(authenticator()), Some("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (status, body) = call(app(authenticator()), Some("Bearer not.a.jwt")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_rejected() {
        let foreign = Authenticator::new(b"some-other-secret-entirely-32-bytes!", Duration::hours(1))
            .unwrap();
        let token = foreign.issue_token(UserId::new(), "mallory@example.com").unwrap();

        let (status, _) = call(app(authenticator()), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let expired = Authenticator::new(SECRET, Duration::seconds(-10)).unwrap();
        let token = expired.issue_token(UserId::new(), "alice@example.com").unwrap();

        let (status, body) = call(app(authenticator()), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Token has expired");
    }

    #[tokio::test]
    async fn test_non_uuid_subject_rejected() {
        let authenticator = authenticator();
        let token = authenticator.issue_token("user123", "alice@example.com").unwrap();

        let (status, _) = call(app(authenticator), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

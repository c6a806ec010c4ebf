#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use expense_service::domain::expense::errors::ExpenseError;
use expense_service::domain::expense::models::Expense;
use expense_service::domain::expense::models::ExpenseId;
use expense_service::domain::expense::models::Pagination;
use expense_service::domain::expense::models::TeamId;
use expense_service::domain::expense::ports::ExpenseStore;
use expense_service::domain::expense::ports::TeamMembership;
use expense_service::domain::expense::service::ExpenseService;
use expense_service::domain::user::errors::UserError;
use expense_service::domain::user::models::EmailAddress;
use expense_service::domain::user::models::User;
use expense_service::domain::user::models::UserId;
use expense_service::domain::user::ports::UserDirectory;
use expense_service::domain::user::service::AuthService;
use expense_service::inbound::http::rate_limit::FixedWindowRateLimiter;
use expense_service::inbound::http::router::create_router;
use expense_service::inbound::http::router::AppState;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub teams: Arc<InMemoryTeamMembership>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_rate_limit(10_000, Duration::from_secs(60)).await
    }

    pub async fn spawn_with_rate_limit(max_requests: u32, window: Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, chrono::Duration::hours(24))
                .expect("Failed to create authenticator"),
        );
        let teams = Arc::new(InMemoryTeamMembership::default());

        let state = AppState {
            auth_service: Arc::new(AuthService::new(
                Arc::new(InMemoryUserDirectory::default()),
                Arc::clone(&authenticator),
            )),
            expense_service: Arc::new(ExpenseService::new(
                Arc::new(InMemoryExpenseStore::default()),
                Arc::clone(&teams),
            )),
            authenticator: Arc::clone(&authenticator),
            rate_limiter: Arc::new(FixedWindowRateLimiter::new(max_requests, window)),
        };

        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
            teams,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return `(token, user_id)`.
    pub async fn register(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": password,
                "first_name": "Test",
                "last_name": "User"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create an expense and return its id.
    pub async fn create_expense(&self, token: &str, body: Value) -> String {
        let response = self
            .post_authenticated("/api/expenses", token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn expense_body(amount: f64, expense_date: &str) -> Value {
    json!({
        "amount": amount,
        "currency": "USD",
        "description": "Lunch",
        "category": "Food",
        "expense_date": expense_date
    })
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, User>>,
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

#[derive(Default)]
pub struct InMemoryExpenseStore {
    expenses: Mutex<HashMap<ExpenseId, Expense>>,
}

impl InMemoryExpenseStore {
    fn page(&self, pagination: Pagination, keep: impl Fn(&Expense) -> bool) -> Vec<Expense> {
        let mut matching: Vec<Expense> = self
            .expenses
            .lock()
            .unwrap()
            .values()
            .filter(|e| keep(*e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.expense_date
                .cmp(&a.expense_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError> {
        self.expenses
            .lock()
            .unwrap()
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_by_id(&self, id: &ExpenseId) -> Result<Option<Expense>, ExpenseError> {
        Ok(self.expenses.lock().unwrap().get(id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.page(pagination, |e| e.owner_id == *owner_id))
    }

    async fn list_by_team(
        &self,
        team_id: &TeamId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.page(pagination, |e| e.team_id == Some(*team_id)))
    }

    async fn update(&self, expense: Expense) -> Result<Option<Expense>, ExpenseError> {
        let mut expenses = self.expenses.lock().unwrap();
        match expenses.get_mut(&expense.id) {
            Some(existing) if existing.owner_id == expense.owner_id => {
                *existing = expense.clone();
                Ok(Some(expense))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: &ExpenseId, owner_id: &UserId) -> Result<bool, ExpenseError> {
        let mut expenses = self.expenses.lock().unwrap();
        match expenses.get(id) {
            Some(existing) if existing.owner_id == *owner_id => {
                expenses.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryTeamMembership {
    members: Mutex<HashSet<(TeamId, UserId)>>,
}

impl InMemoryTeamMembership {
    pub fn add_member(&self, team_id: TeamId, user_id: UserId) {
        self.members.lock().unwrap().insert((team_id, user_id));
    }
}

#[async_trait]
impl TeamMembership for InMemoryTeamMembership {
    async fn is_member(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool, ExpenseError> {
        Ok(self.members.lock().unwrap().contains(&(*team_id, *user_id)))
    }
}

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;

/// Process-wide fixed-window admission counter.
///
/// At most `max_requests` are admitted per window; the window restarts
/// lazily on the first request after it elapses.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Window>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    admitted: u32,
}

/// Rejection carrying the time left in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

impl FixedWindowRateLimiter {
    pub const DEFAULT_MAX_REQUESTS: u32 = 60;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                admitted: 0,
            }),
        }
    }

    pub fn check(&self) -> Result<(), RateLimited> {
        self.check_at(Instant::now())
    }

    fn check_at(&self, now: Instant) -> Result<(), RateLimited> {
        // The counter stays consistent even if a holder panicked.
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let elapsed = now.saturating_duration_since(state.started);
        if elapsed >= self.window {
            state.started = now;
            state.admitted = 0;
        }

        if state.admitted >= self.max_requests {
            return Err(RateLimited {
                retry_after: self.window.saturating_sub(now.saturating_duration_since(state.started)),
            });
        }

        state.admitted += 1;
        Ok(())
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_REQUESTS, Self::DEFAULT_WINDOW)
    }
}

/// Middleware that rejects requests over the limit with 429.
pub async fn rate_limit(
    State(limiter): State<Arc<FixedWindowRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(req).await,
        Err(limited) => {
            tracing::warn!(
                retry_after_secs = limited.retry_after.as_secs(),
                "Rate limit exceeded"
            );
            let mut response =
                ApiError::TooManyRequests("Too many requests".to_string()).into_response();
            let seconds = limited.retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

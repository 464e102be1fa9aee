//! Session-based authentication.
//!
//! Admin credentials come from configuration; comparison is constant-time
//! to mitigate timing attacks. Successful logins are issued bearer tokens
//! held in memory, and the guard on `/api/admin/*` checks them at request
//! time. The guard is the trusted boundary, not a client-side redirect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::errors::AppError;

/// Failed login attempts allowed per email before lockout.
const MAX_LOGIN_FAILURES: u32 = 5;

/// Lockout window after too many failures.
const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Lifetime of an issued session token.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// An issued admin session.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    issued_at: Instant,
}

struct Attempts {
    failures: u32,
    window_start: Instant,
}

/// In-memory session registry and login rate limiter.
pub struct Sessions {
    admin_email: Option<String>,
    admin_password: Option<String>,
    session_ttl: Duration,
    tokens: Mutex<HashMap<String, Session>>,
    attempts: Mutex<HashMap<String, Attempts>>,
}

impl Sessions {
    pub fn new(admin_email: Option<String>, admin_password: Option<String>) -> Self {
        Self::with_session_ttl(admin_email, admin_password, SESSION_TTL)
    }

    fn with_session_ttl(
        admin_email: Option<String>,
        admin_password: Option<String>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            admin_email,
            admin_password,
            session_ttl,
            tokens: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Check credentials and issue a bearer token.
    pub fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let (Some(expected_email), Some(expected_password)) =
            (self.admin_email.as_deref(), self.admin_password.as_deref())
        else {
            return Err(AppError::Auth(
                "Authentication service is not available".to_string(),
            ));
        };

        // Keep both maps bounded in a long-lived process.
        self.sweep();

        if self.is_locked_out(email) {
            return Err(AppError::RateLimited);
        }

        // Non-short-circuiting so both comparisons always run.
        let ok = constant_time_compare(email, expected_email)
            & constant_time_compare(password, expected_password);

        if !ok {
            self.record_failure(email);
            return Err(AppError::InvalidCredentials);
        }

        self.attempts.lock().unwrap().remove(email);

        let token = Uuid::new_v4().to_string();
        self.tokens.lock().unwrap().insert(
            token.clone(),
            Session {
                email: email.to_string(),
                issued_at: Instant::now(),
            },
        );
        tracing::info!("Admin session opened for {}", email);
        Ok(token)
    }

    /// Whether `token` belongs to a live, unexpired session.
    pub fn verify(&self, token: &str) -> bool {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get(token) {
            Some(session) if session.issued_at.elapsed() >= self.session_ttl => {
                tokens.remove(token);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Revoke a session. Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) {
        if let Some(session) = self.tokens.lock().unwrap().remove(token) {
            tracing::info!("Admin session closed for {}", session.email);
        }
    }

    fn is_locked_out(&self, email: &str) -> bool {
        let mut attempts = self.attempts.lock().unwrap();
        match attempts.get(email) {
            Some(entry) if entry.window_start.elapsed() >= LOCKOUT_WINDOW => {
                attempts.remove(email);
                false
            }
            Some(entry) => entry.failures >= MAX_LOGIN_FAILURES,
            None => false,
        }
    }

    /// Drop expired sessions and stale lockout windows.
    fn sweep(&self) {
        self.tokens
            .lock()
            .unwrap()
            .retain(|_, session| session.issued_at.elapsed() < self.session_ttl);
        self.attempts
            .lock()
            .unwrap()
            .retain(|_, entry| entry.window_start.elapsed() < LOCKOUT_WINDOW);
    }

    fn record_failure(&self, email: &str) {
        let mut attempts = self.attempts.lock().unwrap();
        let entry = attempts.entry(email.to_string()).or_insert(Attempts {
            failures: 0,
            window_start: Instant::now(),
        });
        entry.failures += 1;
    }
}

/// Session guard for admin routes: rejects requests without a live bearer
/// token before any handler runs.
pub async fn session_auth_layer(sessions: Arc<Sessions>, request: Request, next: Next) -> Response {
    match bearer_token(&request) {
        Some(token) if sessions.verify(&token) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid or expired session"),
        None => unauthorized_response("Missing session token"),
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Sessions {
        Sessions::new(
            Some("admin@lordsmp.com".to_string()),
            Some("hunter2hunter2".to_string()),
        )
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn login_issues_and_revokes_tokens() {
        let sessions = sessions();
        let token = sessions
            .login("admin@lordsmp.com", "hunter2hunter2")
            .unwrap();
        assert!(sessions.verify(&token));

        sessions.revoke(&token);
        assert!(!sessions.verify(&token));

        // revoking again is a no-op
        sessions.revoke(&token);
    }

    #[test]
    fn wrong_credentials_are_rejected() {
        let sessions = sessions();
        let err = sessions
            .login("admin@lordsmp.com", "wrong-password")
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[test]
    fn repeated_failures_lock_the_account() {
        let sessions = sessions();
        for _ in 0..MAX_LOGIN_FAILURES {
            let _ = sessions.login("admin@lordsmp.com", "wrong-password");
        }

        // even the correct password is refused while locked out
        let err = sessions
            .login("admin@lordsmp.com", "hunter2hunter2")
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
    }

    #[test]
    fn expired_sessions_are_rejected_and_swept() {
        let sessions = Sessions::with_session_ttl(
            Some("admin@lordsmp.com".to_string()),
            Some("hunter2hunter2".to_string()),
            Duration::ZERO,
        );

        let token = sessions
            .login("admin@lordsmp.com", "hunter2hunter2")
            .unwrap();
        assert!(!sessions.verify(&token));

        // the next login sweeps expired entries out of the registry
        let _ = sessions
            .login("admin@lordsmp.com", "hunter2hunter2")
            .unwrap();
        assert_eq!(sessions.tokens.lock().unwrap().len(), 1);
    }

    #[test]
    fn unconfigured_credentials_disable_login() {
        let sessions = Sessions::new(None, None);
        let err = sessions.login("admin@lordsmp.com", "anything").unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}

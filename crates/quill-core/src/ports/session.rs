//! Identity seam.
//!
//! Login and credential handling belong to the external identity
//! provider; the platform only issues-for-tests and validates signed
//! session claims carried in a cookie.

/// Claims carried by a session token.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
    pub exp: i64,
}

/// Session token service.
pub trait SessionService: Send + Sync {
    /// Sign a session token for a user.
    fn issue(&self, user_id: i64, username: &str) -> Result<String, SessionError>;

    /// Validate and decode a session token.
    fn validate(&self, token: &str) -> Result<SessionClaims, SessionError>;
}

/// Session validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session expired")]
    Expired,

    #[error("Invalid session token: {0}")]
    Invalid(String),

    #[error("No session token present")]
    Missing,
}

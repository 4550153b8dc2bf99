use thiserror::Error;

/// Failures of token issuance and the access gate.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized access")]
    Unauthenticated,
    #[error("forbidden access: {0}")]
    Unauthorized(String),
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Unauthenticated => 1001,
            AuthError::Unauthorized(_) => 1002,
            AuthError::InvalidClaims(_) => 1003,
            AuthError::TokenError(_) => 1102,
        }
    }
}

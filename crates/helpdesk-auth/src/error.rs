//! Authentication error types.

use helpdesk_core::error::HelpdeskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is deactivated")]
    AccountDeactivated,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for HelpdeskError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountDeactivated
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => HelpdeskError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => HelpdeskError::Crypto(msg),
        }
    }
}

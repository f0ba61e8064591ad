//! Authentication service — login, token refresh, and token
//! validation orchestration.

use helpdesk_core::error::{HelpdeskError, HelpdeskResult};
use helpdesk_core::models::user::User;
use helpdesk_core::repository::UserRepository;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login (or refresh) result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// The authenticated user record.
    pub user: User,
}

/// Result of a token validation check. Never an error: any failed
/// check is reported as `valid: false`.
#[derive(Debug)]
pub struct TokenValidation {
    pub valid: bool,
    /// The subject email, when the token decoded far enough to name
    /// one.
    pub email: Option<String>,
}

/// Authentication service.
///
/// Generic over the credential store so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Authenticate a user with email + password and issue a token.
    ///
    /// A deactivated account is rejected with a distinct outcome from
    /// bad credentials; the check runs after password verification.
    pub async fn login(&self, input: LoginInput) -> HelpdeskResult<LoginOutput> {
        // 1. Look up user by email.
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(HelpdeskError::NotFound { .. }) => {
                warn!(email = %input.email, "Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| HelpdeskError::Crypto(e.to_string()))?;

        if !valid {
            warn!(email = %input.email, "Login attempt with bad password");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Reject deactivated accounts regardless of credentials.
        if !user.is_active {
            warn!(email = %input.email, "Login attempt for deactivated account");
            return Err(AuthError::AccountDeactivated.into());
        }

        // 4. Stamp last login and issue the token.
        self.user_repo.touch_last_login(user.id).await?;
        let token = token::issue_token(&user, &self.config)?;

        info!(user_id = %user.id, "Successful login");

        Ok(LoginOutput {
            token,
            expires_in: self.config.token_lifetime_secs,
            user,
        })
    }

    /// Exchange a still-valid token for a fresh one.
    ///
    /// Re-derives the subject, confirms the token validates against
    /// that user, and re-checks the activation flag. An expired or
    /// tampered token is never extended.
    pub async fn refresh(&self, existing: &str) -> HelpdeskResult<LoginOutput> {
        // 1. Re-derive the subject (enforces signature + expiry).
        let email = token::extract_subject(existing, &self.config)?;

        // 2. Look the subject up.
        let user = match self.user_repo.get_by_email(&email).await {
            Ok(user) => user,
            Err(HelpdeskError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        };

        // 3. Full validation against the resolved user.
        if !token::is_token_valid(existing, &user, &self.config) {
            return Err(AuthError::TokenInvalid("subject mismatch".into()).into());
        }

        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }

        // 4. Issue the replacement token.
        let token = token::issue_token(&user, &self.config)?;

        info!(user_id = %user.id, "Token refreshed");

        Ok(LoginOutput {
            token,
            expires_in: self.config.token_lifetime_secs,
            user,
        })
    }

    /// Check a token end to end: signature, expiry, subject lookup,
    /// subject match.
    ///
    /// Fails closed — an absent user or any failed check yields
    /// `valid: false` rather than an error out of the boundary.
    pub async fn validate_token(&self, candidate: &str) -> TokenValidation {
        let email = match token::extract_subject(candidate, &self.config) {
            Ok(email) => email,
            Err(_) => {
                return TokenValidation {
                    valid: false,
                    email: None,
                };
            }
        };

        let valid = match self.user_repo.get_by_email(&email).await {
            Ok(user) => token::is_token_valid(candidate, &user, &self.config),
            Err(_) => false,
        };

        TokenValidation {
            valid,
            email: Some(email),
        }
    }
}

//! Server configuration, populated from the environment.

use clap::Parser;
use helpdesk_auth::AuthConfig;
use helpdesk_db::DbConfig;

#[derive(Debug, Parser)]
#[command(name = "helpdesk-server", about = "Helpdesk backend server")]
pub struct ServerConfig {
    /// SurrealDB WebSocket endpoint.
    #[arg(long, env = "HELPDESK_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "HELPDESK_DB_NAMESPACE", default_value = "helpdesk")]
    pub db_namespace: String,

    #[arg(long, env = "HELPDESK_DB_DATABASE", default_value = "main")]
    pub db_database: String,

    #[arg(long, env = "HELPDESK_DB_USERNAME", default_value = "root")]
    pub db_username: String,

    #[arg(long, env = "HELPDESK_DB_PASSWORD", default_value = "root")]
    pub db_password: String,

    /// Path to the PEM-encoded Ed25519 private key for JWT signing.
    #[arg(long, env = "HELPDESK_JWT_PRIVATE_KEY_FILE")]
    pub jwt_private_key_file: String,

    /// Path to the PEM-encoded Ed25519 public key for JWT
    /// verification.
    #[arg(long, env = "HELPDESK_JWT_PUBLIC_KEY_FILE")]
    pub jwt_public_key_file: String,

    /// Token lifetime in seconds.
    #[arg(long, env = "HELPDESK_TOKEN_LIFETIME_SECS", default_value_t = 86_400)]
    pub token_lifetime_secs: u64,

    #[arg(long, env = "HELPDESK_JWT_ISSUER", default_value = "helpdesk")]
    pub jwt_issuer: String,

    /// Optional server-side pepper for password hashing.
    #[arg(long, env = "HELPDESK_PASSWORD_PEPPER")]
    pub password_pepper: Option<String>,

    /// Minimum accepted password length.
    #[arg(long, env = "HELPDESK_MIN_PASSWORD_LENGTH", default_value_t = 8)]
    pub min_password_length: usize,
}

impl ServerConfig {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }

    /// Build the auth configuration, reading the key pair from disk.
    pub fn auth_config(&self) -> std::io::Result<AuthConfig> {
        Ok(AuthConfig {
            jwt_private_key_pem: std::fs::read_to_string(&self.jwt_private_key_file)?,
            jwt_public_key_pem: std::fs::read_to_string(&self.jwt_public_key_file)?,
            token_lifetime_secs: self.token_lifetime_secs,
            jwt_issuer: self.jwt_issuer.clone(),
            pepper: self.password_pepper.clone(),
            min_password_length: self.min_password_length,
        })
    }
}

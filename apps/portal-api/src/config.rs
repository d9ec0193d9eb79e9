//! Portal API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

/// Portal API configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Order notification mail settings; None disables notification
    pub mail: Option<MailConfig>,
}

/// SMTP settings for the order notification mail.
///
/// All fields must be present for notification to be enabled; a partially
/// configured relay is treated as absent.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: String,

    /// SMTP password
    pub smtp_password: String,

    /// From address on outgoing mail
    pub from_address: String,

    /// Administrator address that receives order summaries
    pub admin_email: String,
}

impl PortalConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = PortalConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/mercato.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback only
                // In production, this MUST be set via environment variable
                "mercato-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            mail: MailConfig::load()?,
        };

        Ok(config)
    }
}

impl MailConfig {
    /// Load mail settings; returns None when the relay is not configured.
    ///
    /// Order submission works without a relay: notification is
    /// best-effort by contract, so absence is not an error.
    fn load() -> Result<Option<Self>, ConfigError> {
        let host = env::var("SMTP_HOST").ok();
        let from = env::var("MAIL_FROM").ok();
        let admin = env::var("ADMIN_EMAIL").ok();

        let (Some(smtp_host), Some(from_address), Some(admin_email)) = (host, from, admin) else {
            return Ok(None);
        };

        Ok(Some(MailConfig {
            smtp_host,
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address,
            admin_email,
        }))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

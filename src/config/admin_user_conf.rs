use std::env;
use tracing::{error, info};

use crate::config::ConfigError;

/// Bootstrap administrator account, created on first startup when no
/// matching user exists yet.
#[derive(Debug, Clone)]
pub struct AdminUserConfig {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl AdminUserConfig {
    /// Expected environment variables:
    /// - ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PHONE, ADMIN_PASSWORD
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading admin user configuration from environment variables");

        let username = env::var("ADMIN_USERNAME")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_USERNAME".to_string()))?;
        let email = env::var("ADMIN_EMAIL")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string()))?;
        let phone = env::var("ADMIN_PHONE")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PHONE".to_string()))?;
        let password = env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?;

        if password.len() < 6 {
            error!("ADMIN_PASSWORD is too short (minimum 6 characters)");
            return Err(ConfigError::InvalidValue(
                "ADMIN_PASSWORD must be at least 6 characters long".to_string(),
            ));
        }

        Ok(AdminUserConfig { username, email, phone, password })
    }
}

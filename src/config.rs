//! Server configuration loaded from environment variables.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Identity provider base URL, without the `/auth/v1` suffix
    pub identity_url: String,
    /// Provider public (anon) API key
    pub identity_anon_key: String,
    /// Public site URL, used for links the provider emails out
    pub base_url: String,
    /// Marks session cookies `Secure`
    pub production: bool,
}

impl Config {
    /// Load configuration from the environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            identity_url: env::var("IDENTITY_URL")
                .map_err(|_| ConfigError::Missing("IDENTITY_URL"))?,
            identity_anon_key: env::var("IDENTITY_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_ANON_KEY"))?,
            base_url: env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            production: env::var("PRODUCTION").is_ok(),
        })
    }

    /// Where the provider should send users back to after a resend.
    pub fn confirm_redirect(&self) -> String {
        format!("{}/auth/confirm", self.base_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_env() {
        env::set_var("IDENTITY_URL", "https://auth.nexar.test");
        env::set_var("IDENTITY_ANON_KEY", " anon ");
        env::set_var("BASE_URL", "https://nexar.test/");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.identity_anon_key, "anon");
        assert_eq!(config.confirm_redirect(), "https://nexar.test/auth/confirm");
    }
}

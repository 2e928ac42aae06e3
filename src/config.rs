use anyhow::{anyhow, Context, Result};
use std::env;

use crate::callback::ReconcilerPolicy;
use crate::payments::providers::BackendVerifierConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub verifier: BackendVerifierConfig,
    pub callback: CallbackConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    pub trust_gateway_status: bool,
    pub accept_unverified_success: bool,
}

impl CallbackConfig {
    pub fn policy(&self) -> ReconcilerPolicy {
        ReconcilerPolicy {
            trust_gateway_status: self.trust_gateway_status,
            accept_unverified_success: self.accept_unverified_success,
        }
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        let policy = ReconcilerPolicy::default();
        Self {
            trust_gateway_status: policy.trust_gateway_status,
            accept_unverified_success: policy.accept_unverified_success,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .context("PORT not set")?
                .parse()
                .context("PORT must be a valid number")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        let verifier = BackendVerifierConfig::from_env()?;

        let callback = CallbackConfig {
            trust_gateway_status: bool_var("CALLBACK_TRUST_GATEWAY_STATUS", true)?,
            accept_unverified_success: bool_var("CALLBACK_ACCEPT_UNVERIFIED_SUCCESS", true)?,
        };

        let config = Config {
            server,
            verifier,
            callback,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        let base_url = self.verifier.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow!("API_BASE_URL cannot be empty"));
        }

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!(
                "API_BASE_URL must be an http(s) URL, got {}",
                base_url
            ));
        }

        if !self.verifier.verify_path.starts_with('/') {
            return Err(anyhow!(
                "PAYMENT_VERIFY_PATH must start with '/', got {}",
                self.verifier.verify_path
            ));
        }

        if self.verifier.timeout_secs == 0 {
            return Err(anyhow!("PAYMENT_VERIFY_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(())
    }
}

fn bool_var(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("{} must be a boolean, got {}", name, other)),
        },
        Err(_) => Ok(default),
    }
}

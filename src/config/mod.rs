//! Application configuration management

use std::env;

use anyhow::{Context, Result};
use base64::Engine;

use crate::services::auth::{AuthConfig, DEFAULT_BCRYPT_COST};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite connection URL
    pub database_url: String,

    /// Pool size for file-backed databases
    pub database_max_connections: u32,

    /// JWT signing secret, one per process
    pub jwt_secret: String,

    /// bcrypt cost factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                // Tokens signed with this secret die with the process
                tracing::warn!("JWT_SECRET not set, using a random development secret");
                generate_jwt_secret()
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/blog.db?mode=rwc".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            jwt_secret,

            bcrypt_cost: env::var("BCRYPT_COST")
                .map(|v| v.parse().context("Invalid BCRYPT_COST"))
                .unwrap_or(Ok(DEFAULT_BCRYPT_COST))?,
        })
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}

fn generate_jwt_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

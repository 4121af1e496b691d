use std::net::SocketAddr;

use anyhow::Context;
use cookie::Key;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub database_url: String,
    pub secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let omdb_api_key = std::env::var("OMDB_API_KEY").unwrap_or_else(|_| "".to_string());
        let omdb_base_url = std::env::var("OMDB_BASE_URL")
            .unwrap_or_else(|_| "https://www.omdbapi.com".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://filmshelf.db?mode=rwc".to_string());

        let secret_key = std::env::var("SECRET_KEY").ok().filter(|s| !s.is_empty());
        if let Some(secret) = &secret_key {
            if secret.len() < 32 {
                anyhow::bail!("SECRET_KEY must be at least 32 bytes");
            }
        }

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            omdb_api_key,
            omdb_base_url,
            database_url,
            secret_key,
        })
    }

    /// Key used to sign flash cookies. A generated key means flashes do not
    /// survive a restart, which is fine for local use.
    pub fn signing_key(&self) -> Key {
        match &self.secret_key {
            Some(secret) => Key::derive_from(secret.as_bytes()),
            None => {
                tracing::warn!("no SECRET_KEY provided, generating an ephemeral cookie key");
                Key::generate()
            },
        }
    }
}

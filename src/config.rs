use anyhow::{Context, Result};

/// Runtime configuration read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Config {
    database_url: Option<String>,
    pub max_connections: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok(),
            max_connections: std::env::var("PLACEMENT_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .context("PLACEMENT_DB_MAX_CONNECTIONS must be a positive integer")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Only commands that touch the store need a database; `rank` runs without one.
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a Postgres instance for this command")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_reported_on_use() {
        let config = Config {
            database_url: None,
            max_connections: 5,
            rust_log: "info".to_string(),
        };
        let err = config.database_url().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn database_url_is_returned_when_set() {
        let config = Config {
            database_url: Some("postgres://localhost/placement".to_string()),
            max_connections: 5,
            rust_log: "info".to_string(),
        };
        assert_eq!(
            config.database_url().unwrap(),
            "postgres://localhost/placement"
        );
    }
}

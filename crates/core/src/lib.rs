pub mod auth;
pub mod domain;
pub mod error;
pub mod finance;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub bcrypt_cost: Option<u32>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                bcrypt_cost: std::env::var("BCRYPT_COST")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn bcrypt_cost(&self) -> u32 {
            self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST)
        }
    }
}

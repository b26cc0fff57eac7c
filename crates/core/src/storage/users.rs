use crate::domain::user::UserRecord;
use crate::storage::UserStore;
use anyhow::{Context, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: sqlx::PgPool,
}

impl PgUserStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("select users failed")?;

        Ok(row.map(|(name, email, password_hash)| UserRecord {
            name,
            email,
            password_hash,
        }))
    }

    async fn insert(&self, user: &UserRecord) -> Result<bool> {
        let res = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .context("insert users failed")?;

        Ok(res.rows_affected() == 1)
    }
}

use anyhow::{bail, Result};
use log::{info, warn};
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long to keep retrying while the database server comes up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(1),
        }
    }
}

/// DbConnection owns the PostgreSQL pool shared by all repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<PgPool>,
}

impl DbConnection {
    /// Connect to an existing database, waiting for it to accept queries
    pub async fn connect(url: &str, policy: ConnectPolicy) -> Result<Self> {
        let pool = wait_for_database(url, policy).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Create the database if needed, connect and apply the schema
    pub async fn bootstrap(url: &str, policy: ConnectPolicy) -> Result<Self> {
        create_database_if_missing(url, policy).await?;
        let db = Self::connect(url, policy).await?;
        run_migrations(db.pool()).await?;
        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn retry<T, F, Fut>(policy: ConnectPolicy, what: &str, mut attempt_fn: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 1..=policy.max_attempts {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    "⏳ {} failed (attempt {}/{}): {}",
                    what, attempt, policy.max_attempts, e
                );
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }
    bail!(
        "Database connection timeout: {} did not succeed after {} attempts",
        what,
        policy.max_attempts
    )
}

/// Retry `SELECT 1` until the database answers
pub async fn wait_for_database(url: &str, policy: ConnectPolicy) -> Result<PgPool> {
    let pool = retry(policy, "database connection", move || async move {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(pool)
    })
    .await?;
    info!("✅ Database is ready");
    Ok(pool)
}

pub async fn create_database_if_missing(url: &str, policy: ConnectPolicy) -> Result<()> {
    let exists = retry(policy, "database existence check", move || async move {
        Ok(Postgres::database_exists(url).await?)
    })
    .await?;

    if !exists {
        info!("Creating database");
        Postgres::create_database(url).await?;
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS families (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT,
        family_id TEXT REFERENCES families (id) ON DELETE SET NULL,
        role TEXT NOT NULL DEFAULT 'member',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS family_invitations (
        id TEXT PRIMARY KEY,
        family_id TEXT NOT NULL REFERENCES families (id) ON DELETE CASCADE,
        email TEXT NOT NULL,
        invited_by TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        invitation_code TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        color TEXT NOT NULL,
        icon TEXT NOT NULL,
        budget_limit DOUBLE PRECISION,
        family_id TEXT NOT NULL REFERENCES families (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        balance DOUBLE PRECISION NOT NULL DEFAULT 0,
        currency TEXT NOT NULL DEFAULT 'RUB',
        family_id TEXT NOT NULL REFERENCES families (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        amount DOUBLE PRECISION NOT NULL,
        date DATE NOT NULL,
        description TEXT NOT NULL,
        type TEXT NOT NULL,
        category_id TEXT REFERENCES categories (id) ON DELETE SET NULL,
        account_id TEXT NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
        created_by_id TEXT NOT NULL REFERENCES users (id),
        family_id TEXT NOT NULL REFERENCES families (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recurring_payments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        frequency TEXT NOT NULL,
        start_date DATE NOT NULL,
        type TEXT NOT NULL,
        color TEXT,
        family_id TEXT NOT NULL REFERENCES families (id) ON DELETE CASCADE,
        created_by_id TEXT NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Apply the schema; safe to run repeatedly
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("✅ Database schema is up to date ({} tables)", SCHEMA.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let policy = ConnectPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1),
        };
        let mut calls = 0;
        let result: Result<()> = retry(policy, "ping", || {
            calls += 1;
            async { Err(anyhow::anyhow!("refused")) }
        })
        .await;

        assert_eq!(calls, 3);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("timeout"));
        assert!(message.contains("3 attempts"));
    }

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let policy = ConnectPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(1),
        };
        let mut calls = 0;
        let result = retry(policy, "ping", || {
            calls += 1;
            let current = calls;
            async move {
                if current < 2 {
                    bail!("not yet")
                }
                Ok(current)
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_default_policy() {
        let policy = ConnectPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}

//! # PostgreSQL Storage Module
//!
//! - **connection.rs** - pool setup, wait-for-database and schema bootstrap
//! - **repositories/** - one file per entity, each implementing its storage
//!   trait for [`PgStorage`]
//!
//! Enumerations are stored as their API labels in `TEXT` columns and money
//! as `DOUBLE PRECISION`.

pub mod connection;
pub mod repositories;

pub use connection::{ConnectPolicy, DbConnection};

use anyhow::{Context, Result};
use shared::UnknownVariant;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;

use crate::backend::storage::traits::{Storage, StorageKind};

/// Storage backed by a PostgreSQL database
#[derive(Clone)]
pub struct PgStorage {
    db: DbConnection,
}

impl PgStorage {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) fn pool(&self) -> &sqlx::PgPool {
        self.db.pool()
    }
}

impl Storage for PgStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::PostgreSql
    }
}

/// Read a `TEXT` column holding an enumeration label
pub(crate) fn get_label<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .with_context(|| format!("column {} holds an unknown label", column))
}

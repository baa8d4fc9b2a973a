use anyhow::Result;
use async_trait::async_trait;
use shared::Account;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};

use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::AccountStorage;

const ACCOUNT_COLUMNS: &str = "id, name, type, balance, currency, family_id, created_at, updated_at";

fn row_to_account(row: &PgRow) -> Result<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        account_type: get_label(row, "type")?,
        balance: row.try_get("balance")?,
        currency: row.try_get("currency")?,
        family_id: row.try_get("family_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Add `delta` to an account balance inside an open SQL transaction
pub(crate) async fn apply_balance(
    conn: &mut PgConnection,
    account_id: &str,
    delta: f64,
) -> Result<Option<Account>> {
    let row = sqlx::query(&format!(
        "UPDATE accounts SET balance = balance + $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
        ACCOUNT_COLUMNS
    ))
    .bind(delta)
    .bind(account_id)
    .fetch_optional(conn)
    .await?;
    row.as_ref().map(row_to_account).transpose()
}

#[async_trait]
impl AccountStorage for PgStorage {
    async fn store_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, type, balance, currency, family_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(account.balance)
        .bind(&account.currency)
        .bind(&account.family_id)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS))
            .bind(account_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn list_accounts_by_family(&self, family_id: &str) -> Result<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE family_id = $1 ORDER BY created_at ASC, name ASC",
            ACCOUNT_COLUMNS
        ))
        .bind(family_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_account).collect()
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET name = $1, type = $2, balance = $3, currency = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(account.balance)
        .bind(&account.currency)
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn adjust_account_balance(&self, account_id: &str, delta: f64) -> Result<Option<Account>> {
        let mut conn = self.pool().acquire().await?;
        apply_balance(&mut *conn, account_id, delta).await
    }

    async fn delete_account(&self, account_id: &str) -> Result<bool> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM transactions WHERE account_id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

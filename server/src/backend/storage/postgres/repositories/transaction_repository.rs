use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;
use shared::Transaction;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::storage::postgres::repositories::account_repository::apply_balance;
use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::TransactionStorage;

const TRANSACTION_COLUMNS: &str =
    "id, amount, date, description, type, category_id, account_id, created_by_id, family_id, created_at";

fn row_to_transaction(row: &PgRow) -> Result<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        date: row.try_get("date")?,
        description: row.try_get("description")?,
        transaction_type: get_label(row, "type")?,
        category_id: row.try_get("category_id")?,
        account_id: row.try_get("account_id")?,
        created_by_id: row.try_get("created_by_id")?,
        family_id: row.try_get("family_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl TransactionStorage for PgStorage {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, amount, date, description, type, category_id, account_id, created_by_id, family_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&transaction.id)
        .bind(transaction.amount)
        .bind(transaction.date)
        .bind(&transaction.description)
        .bind(transaction.transaction_type.as_str())
        .bind(&transaction.category_id)
        .bind(&transaction.account_id)
        .bind(&transaction.created_by_id)
        .bind(&transaction.family_id)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        if apply_balance(&mut *tx, &transaction.account_id, transaction.balance_effect())
            .await?
            .is_none()
        {
            bail!("account {} does not exist", transaction.account_id);
        }

        tx.commit().await?;
        debug!("Stored transaction {} and updated account {}", transaction.id, transaction.account_id);
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn list_transactions_by_family(&self, family_id: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE family_id = $1 ORDER BY date DESC, created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .bind(family_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_transactions_by_account(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE account_id = $1 ORDER BY date DESC, created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_transaction).collect()
    }

    async fn replace_transaction(&self, updated: &Transaction) -> Result<Option<Transaction>> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE id = $1 FOR UPDATE",
            TRANSACTION_COLUMNS
        ))
        .bind(&updated.id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let stored = row_to_transaction(&row)?;

        sqlx::query(
            r#"
            UPDATE transactions
            SET amount = $1, date = $2, description = $3, type = $4, category_id = $5, account_id = $6
            WHERE id = $7
            "#,
        )
        .bind(updated.amount)
        .bind(updated.date)
        .bind(&updated.description)
        .bind(updated.transaction_type.as_str())
        .bind(&updated.category_id)
        .bind(&updated.account_id)
        .bind(&updated.id)
        .execute(&mut *tx)
        .await?;

        apply_balance(&mut *tx, &stored.account_id, -stored.balance_effect()).await?;
        if apply_balance(&mut *tx, &updated.account_id, updated.balance_effect())
            .await?
            .is_none()
        {
            bail!("account {} does not exist", updated.account_id);
        }

        tx.commit().await?;
        debug!("Replaced transaction {} (was {:+} on {})", updated.id, stored.balance_effect(), stored.account_id);
        Ok(Some(stored))
    }

    async fn remove_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(&format!(
            "DELETE FROM transactions WHERE id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let removed = row.as_ref().map(row_to_transaction).transpose()?;
        if let Some(ref transaction) = removed {
            apply_balance(&mut *tx, &transaction.account_id, -transaction.balance_effect()).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn remove_transactions_by_creator(&self, user_id: &str) -> Result<u64> {
        let mut tx = self.pool().begin().await?;

        let rows = sqlx::query(&format!(
            "DELETE FROM transactions WHERE created_by_id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        for row in &rows {
            let transaction = row_to_transaction(row)?;
            apply_balance(&mut *tx, &transaction.account_id, -transaction.balance_effect()).await?;
        }

        tx.commit().await?;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::new_id;
    use crate::backend::domain::models::user::User;
    use crate::backend::storage::postgres::test_support::test_storage;
    use crate::backend::storage::traits::{AccountStorage, FamilyStorage, UserStorage};
    use chrono::{NaiveDate, Utc};
    use shared::{Account, AccountType, Family, TransactionType, UserRole};

    #[tokio::test]
    async fn test_ledger_writes_keep_balance_in_step() {
        let Some(storage) = test_storage().await else {
            return;
        };
        let now = Utc::now();
        let family = Family {
            id: new_id(),
            name: "Ledger test".to_string(),
            created_at: now,
            updated_at: now,
        };
        storage.store_family(&family).await.unwrap();

        let user_id = new_id();
        storage
            .store_user(&User {
                id: user_id.clone(),
                username: format!("ledger-{}", &user_id[..8]),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                family_id: Some(family.id.clone()),
                role: UserRole::Admin,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let account = Account {
            id: new_id(),
            name: "Card".to_string(),
            account_type: AccountType::Checking,
            balance: 1000.0,
            currency: "RUB".to_string(),
            family_id: family.id.clone(),
            created_at: now,
            updated_at: now,
        };
        storage.store_account(&account).await.unwrap();

        let transaction = Transaction {
            id: new_id(),
            amount: 300.0,
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            description: "Магазин".to_string(),
            transaction_type: TransactionType::Expense,
            category_id: None,
            account_id: account.id.clone(),
            created_by_id: user_id.clone(),
            family_id: family.id.clone(),
            created_at: now,
        };
        storage.store_transaction(&transaction).await.unwrap();
        let balance = storage.get_account(&account.id).await.unwrap().unwrap().balance;
        assert_eq!(balance, 700.0);

        let mut updated = transaction.clone();
        updated.transaction_type = TransactionType::Income;
        storage.replace_transaction(&updated).await.unwrap();
        let balance = storage.get_account(&account.id).await.unwrap().unwrap().balance;
        assert_eq!(balance, 1300.0);

        // A second edit built from the original copy still reverts the stored income
        let mut stale = transaction.clone();
        stale.amount = 100.0;
        let replaced = storage.replace_transaction(&stale).await.unwrap().unwrap();
        assert_eq!(replaced.transaction_type, TransactionType::Income);
        let balance = storage.get_account(&account.id).await.unwrap().unwrap().balance;
        assert_eq!(balance, 900.0);

        assert!(storage.remove_transaction(&transaction.id).await.unwrap().is_some());
        let balance = storage.get_account(&account.id).await.unwrap().unwrap().balance;
        assert_eq!(balance, 1000.0);

        assert!(storage.delete_account(&account.id).await.unwrap());
        assert!(storage.delete_user(&user_id).await.unwrap());
    }
}

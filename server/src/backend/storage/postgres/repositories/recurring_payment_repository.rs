use anyhow::Result;
use async_trait::async_trait;
use shared::RecurringPayment;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::RecurringPaymentStorage;

const PAYMENT_COLUMNS: &str =
    "id, name, amount, frequency, start_date, type, color, family_id, created_by_id, created_at";

fn row_to_payment(row: &PgRow) -> Result<RecurringPayment> {
    Ok(RecurringPayment {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        amount: row.try_get("amount")?,
        frequency: get_label(row, "frequency")?,
        start_date: row.try_get("start_date")?,
        payment_type: get_label(row, "type")?,
        color: row.try_get("color")?,
        family_id: row.try_get("family_id")?,
        created_by_id: row.try_get("created_by_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl RecurringPaymentStorage for PgStorage {
    async fn store_recurring_payment(&self, payment: &RecurringPayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recurring_payments (id, name, amount, frequency, start_date, type, color, family_id, created_by_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.name)
        .bind(payment.amount)
        .bind(payment.frequency.as_str())
        .bind(payment.start_date)
        .bind(payment.payment_type.as_str())
        .bind(&payment.color)
        .bind(&payment.family_id)
        .bind(&payment.created_by_id)
        .bind(payment.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_recurring_payment(&self, payment_id: &str) -> Result<Option<RecurringPayment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM recurring_payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(row_to_payment).transpose()
    }

    async fn list_recurring_payments_by_family(&self, family_id: &str) -> Result<Vec<RecurringPayment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM recurring_payments WHERE family_id = $1 ORDER BY start_date ASC, created_at ASC",
            PAYMENT_COLUMNS
        ))
        .bind(family_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_payment).collect()
    }

    async fn update_recurring_payment(&self, payment: &RecurringPayment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE recurring_payments
            SET name = $1, amount = $2, frequency = $3, start_date = $4, type = $5, color = $6
            WHERE id = $7
            "#,
        )
        .bind(&payment.name)
        .bind(payment.amount)
        .bind(payment.frequency.as_str())
        .bind(payment.start_date)
        .bind(payment.payment_type.as_str())
        .bind(&payment.color)
        .bind(&payment.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_recurring_payment(&self, payment_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recurring_payments WHERE id = $1")
            .bind(payment_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_recurring_payments_by_creator(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM recurring_payments WHERE created_by_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

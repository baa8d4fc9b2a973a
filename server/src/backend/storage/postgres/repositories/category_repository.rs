use anyhow::Result;
use async_trait::async_trait;
use shared::Category;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::CategoryStorage;

fn row_to_category(row: &PgRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category_type: get_label(row, "type")?,
        color: row.try_get("color")?,
        icon: row.try_get("icon")?,
        budget_limit: row.try_get("budget_limit")?,
        family_id: row.try_get("family_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CategoryStorage for PgStorage {
    async fn store_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, type, color, icon, budget_limit, family_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.category_type.as_str())
        .bind(&category.color)
        .bind(&category.icon)
        .bind(category.budget_limit)
        .bind(&category.family_id)
        .bind(category.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, type, color, icon, budget_limit, family_id, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn list_categories_by_family(&self, family_id: &str) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, type, color, icon, budget_limit, family_id, created_at
            FROM categories
            WHERE family_id = $1
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_category).collect()
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, type = $2, color = $3, icon = $4, budget_limit = $5
            WHERE id = $6
            "#,
        )
        .bind(&category.name)
        .bind(category.category_type.as_str())
        .bind(&category.color)
        .bind(&category.icon)
        .bind(category.budget_limit)
        .bind(&category.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_category(&self, category_id: &str) -> Result<bool> {
        // transactions.category_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

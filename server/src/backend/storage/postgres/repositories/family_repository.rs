use anyhow::Result;
use async_trait::async_trait;
use shared::Family;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::domain::models::user::User;
use crate::backend::storage::postgres::repositories::user_repository::row_to_user;
use crate::backend::storage::postgres::PgStorage;
use crate::backend::storage::traits::FamilyStorage;

fn row_to_family(row: &PgRow) -> Result<Family> {
    Ok(Family {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl FamilyStorage for PgStorage {
    async fn store_family(&self, family: &Family) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO families (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&family.id)
        .bind(&family.name)
        .bind(family.created_at)
        .bind(family.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM families WHERE id = $1")
            .bind(family_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_family).transpose()
    }

    async fn list_family_members(&self, family_id: &str) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password_hash, first_name, last_name, family_id, role, created_at, updated_at
            FROM users
            WHERE family_id = $1
            ORDER BY username ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn list_families_for_user(&self, user_id: &str) -> Result<Vec<Family>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.name, f.created_at, f.updated_at
            FROM families f
            JOIN users u ON u.family_id = f.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_family).collect()
    }
}

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::domain::models::user::User;
use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::UserStorage;

const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, family_id, role, created_at, updated_at";

pub(crate) fn row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        family_id: row.try_get("family_id")?,
        role: get_label(row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserStorage for PgStorage {
    async fn store_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, first_name, last_name, family_id, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.family_id)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $1, password_hash = $2, first_name = $3, last_name = $4,
                family_id = $5, role = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.family_id)
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        // Issued invitations go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

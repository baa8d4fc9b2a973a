use anyhow::Result;
use async_trait::async_trait;
use shared::FamilyInvitation;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::backend::storage::postgres::{get_label, PgStorage};
use crate::backend::storage::traits::InvitationStorage;

const INVITATION_COLUMNS: &str =
    "id, family_id, email, invited_by, invitation_code, status, created_at, updated_at";

fn row_to_invitation(row: &PgRow) -> Result<FamilyInvitation> {
    Ok(FamilyInvitation {
        id: row.try_get("id")?,
        family_id: row.try_get("family_id")?,
        email: row.try_get("email")?,
        invited_by: row.try_get("invited_by")?,
        invitation_code: row.try_get("invitation_code")?,
        status: get_label(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl PgStorage {
    async fn select_invitations(&self, column: &str, value: &str) -> Result<Vec<FamilyInvitation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM family_invitations WHERE {} = $1 ORDER BY created_at DESC",
            INVITATION_COLUMNS, column
        ))
        .bind(value)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_invitation).collect()
    }
}

#[async_trait]
impl InvitationStorage for PgStorage {
    async fn store_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO family_invitations (id, family_id, email, invited_by, invitation_code, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&invitation.id)
        .bind(&invitation.family_id)
        .bind(&invitation.email)
        .bind(&invitation.invited_by)
        .bind(&invitation.invitation_code)
        .bind(invitation.status.as_str())
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<FamilyInvitation>> {
        Ok(self.select_invitations("id", invitation_id).await?.into_iter().next())
    }

    async fn get_invitation_by_code(&self, code: &str) -> Result<Option<FamilyInvitation>> {
        Ok(self
            .select_invitations("invitation_code", code)
            .await?
            .into_iter()
            .next())
    }

    async fn list_invitations_by_family(&self, family_id: &str) -> Result<Vec<FamilyInvitation>> {
        self.select_invitations("family_id", family_id).await
    }

    async fn list_invitations_by_email(&self, email: &str) -> Result<Vec<FamilyInvitation>> {
        self.select_invitations("email", email).await
    }

    async fn update_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE family_invitations
            SET email = $1, status = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&invitation.email)
        .bind(invitation.status.as_str())
        .bind(invitation.updated_at)
        .bind(&invitation.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

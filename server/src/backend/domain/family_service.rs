use chrono::Utc;
use log::{info, warn};
use shared::{
    CreateInvitationRequest, Family, FamilyInvitation, GenerateInvitationRequest,
    InvitationStatus, JoinFamilyRequest, UserRole,
};
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::domain::models::user::{invitation_email_for, User, UserWithFamily};
use crate::backend::storage::{FamilyStorage, InvitationStorage, Storage, UserStorage};

/// Address stored on invitations that are shared as a bare code
pub const CODE_INVITATION_EMAIL: &str = "code-based-invitation@example.com";

const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 20;

/// Six random upper-case alphanumeric characters
pub fn random_invitation_code() -> String {
    uuid::Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(CODE_LENGTH)
        .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
        .collect()
}

/// Service for family membership and invitations
#[derive(Clone)]
pub struct FamilyService {
    storage: Arc<dyn Storage>,
}

impl FamilyService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn require_family(&self, family_id: &str) -> DomainResult<Family> {
        self.storage
            .get_family(family_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Family not found"))
    }

    async fn require_user(&self, user_id: &str) -> DomainResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    /// The family and its members ordered by username
    pub async fn members(&self, family_id: &str) -> DomainResult<(Family, Vec<User>)> {
        let family = self.require_family(family_id).await?;
        let members = self.storage.list_family_members(family_id).await?;
        info!("Family {} has {} members", family.name, members.len());
        Ok((family, members))
    }

    pub async fn invitations(&self, family_id: &str) -> DomainResult<Vec<FamilyInvitation>> {
        self.require_family(family_id).await?;
        Ok(self.storage.list_invitations_by_family(family_id).await?)
    }

    /// Pending invitations addressed to a user by name
    pub async fn pending_invitations_for_user(&self, user_id: &str) -> DomainResult<Vec<FamilyInvitation>> {
        let user = self.require_user(user_id).await?;
        let invitations = self
            .storage
            .list_invitations_by_email(&user.invitation_email())
            .await?;
        Ok(invitations
            .into_iter()
            .filter(|inv| inv.status == InvitationStatus::Pending)
            .collect())
    }

    pub async fn families_of_user(&self, user_id: &str) -> DomainResult<Vec<Family>> {
        self.require_user(user_id).await?;
        Ok(self.storage.list_families_for_user(user_id).await?)
    }

    /// Invite a user by name
    pub async fn invite(
        &self,
        family_id: &str,
        request: CreateInvitationRequest,
    ) -> DomainResult<FamilyInvitation> {
        info!("Inviting {} to family {}", request.username, family_id);
        let username = request.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        self.create_invitation(family_id, &request.invited_by, invitation_email_for(username))
            .await
    }

    /// Create an invitation meant to be shared as a code
    pub async fn generate_invitation(
        &self,
        family_id: &str,
        request: GenerateInvitationRequest,
    ) -> DomainResult<FamilyInvitation> {
        info!("Generating invitation code for family {}", family_id);
        self.create_invitation(family_id, &request.invited_by, CODE_INVITATION_EMAIL.to_string())
            .await
    }

    async fn create_invitation(
        &self,
        family_id: &str,
        invited_by: &str,
        email: String,
    ) -> DomainResult<FamilyInvitation> {
        self.require_family(family_id).await?;

        let inviter = self.storage.get_user(invited_by).await?;
        if inviter.and_then(|u| u.family_id).as_deref() != Some(family_id) {
            warn!("User {} tried to invite into family {}", invited_by, family_id);
            return Err(DomainError::forbidden("Not authorized to invite"));
        }

        let now = Utc::now();
        let invitation = FamilyInvitation {
            id: new_id(),
            family_id: family_id.to_string(),
            email,
            invited_by: invited_by.to_string(),
            invitation_code: self.unused_code().await?,
            status: InvitationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.storage.store_invitation(&invitation).await?;

        info!(
            "Created invitation {} with code {} for family {}",
            invitation.id, invitation.invitation_code, family_id
        );
        Ok(invitation)
    }

    async fn unused_code(&self) -> DomainResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_invitation_code();
            if self.storage.get_invitation_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(DomainError::Storage(anyhow::anyhow!(
            "could not find an unused invitation code"
        )))
    }

    /// Accept a named invitation on behalf of the invited user
    pub async fn accept_invitation(&self, invitation_id: &str, user_id: &str) -> DomainResult<UserWithFamily> {
        info!("User {} accepting invitation {}", user_id, invitation_id);

        let invitation = self
            .storage
            .get_invitation(invitation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;
        if invitation.status != InvitationStatus::Pending {
            return Err(DomainError::validation("Invitation is no longer valid"));
        }

        let user = self.require_user(user_id).await?;
        if invitation.email != user.invitation_email() {
            warn!("Invitation {} is not addressed to {}", invitation_id, user.username);
            return Err(DomainError::forbidden("This invitation is not addressed to you"));
        }

        self.admit(invitation, user).await
    }

    /// Join a family with an invitation code
    pub async fn join(&self, request: JoinFamilyRequest) -> DomainResult<UserWithFamily> {
        let code = request.invitation_code.trim().to_uppercase();
        info!("User {} joining with code {}", request.user_id, code);

        let invitation = self
            .storage
            .get_invitation_by_code(&code)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;
        if invitation.status != InvitationStatus::Pending {
            return Err(DomainError::validation("Invitation is no longer valid"));
        }

        let user = self.require_user(&request.user_id).await?;
        if user.family_id.is_some() {
            return Err(DomainError::validation("User already belongs to a family"));
        }

        self.admit(invitation, user).await
    }

    async fn admit(&self, mut invitation: FamilyInvitation, mut user: User) -> DomainResult<UserWithFamily> {
        let family = self.require_family(&invitation.family_id).await?;
        let now = Utc::now();

        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = now;
        self.storage.update_invitation(&invitation).await?;

        user.family_id = Some(family.id.clone());
        user.role = UserRole::Member;
        user.updated_at = now;
        self.storage.update_user(&user).await?;

        info!("User {} joined family {}", user.username, family.name);
        Ok(UserWithFamily {
            user,
            family: Some(family),
        })
    }
}

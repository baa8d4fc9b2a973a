use chrono::Utc;
use log::{info, warn};
use shared::{Family, InvitationStatus, LoginRequest, RegisterRequest, UserRole};
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::domain::category_service::CategoryService;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::domain::models::user::{User, UserWithFamily, UNKNOWN_USER_NAME};
use crate::backend::domain::password::{hash_password, verify_password};
use crate::backend::storage::{
    FamilyStorage, InvitationStorage, RecurringPaymentStorage, Storage, TransactionStorage,
    UserStorage,
};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Service for registration, login and account removal
#[derive(Clone)]
pub struct UserService {
    storage: Arc<dyn Storage>,
    category_service: CategoryService,
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>, category_service: CategoryService) -> Self {
        Self {
            storage,
            category_service,
        }
    }

    /// Register a new user.
    ///
    /// An invitation code takes priority over a family name: with a code the
    /// user joins the inviting family as a member, with only a family name a
    /// new family is created with the user as its admin.
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<UserWithFamily> {
        info!("Registering user: {}", request.username);

        let username = request.username.trim().to_string();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.storage.get_user_by_username(&username).await?.is_some() {
            warn!("Registration rejected, username taken: {}", username);
            return Err(DomainError::validation("User already exists"));
        }

        // Resolve the invitation before anything is written
        let invitation_code = request
            .invitation_code
            .as_deref()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());
        let invitation = match invitation_code {
            Some(ref code) => {
                let invitation = self
                    .storage
                    .get_invitation_by_code(code)
                    .await?
                    .ok_or_else(|| DomainError::validation("Invalid invitation code"))?;
                if invitation.status != InvitationStatus::Pending {
                    return Err(DomainError::validation("Invitation code has already been used"));
                }
                Some(invitation)
            }
            None => None,
        };

        let now = Utc::now();
        let mut user = User {
            id: new_id(),
            username,
            password_hash: hash_password(&request.password)?,
            first_name: non_blank(request.first_name),
            last_name: non_blank(request.last_name),
            family_id: None,
            role: UserRole::Member,
            created_at: now,
            updated_at: now,
        };

        let family = if let Some(mut invitation) = invitation {
            let family = self.storage.get_family(&invitation.family_id).await?;
            user.family_id = Some(invitation.family_id.clone());
            self.storage.store_user(&user).await?;

            invitation.status = InvitationStatus::Accepted;
            invitation.updated_at = now;
            self.storage.update_invitation(&invitation).await?;
            info!("User {} joined family {} by invitation", user.username, invitation.family_id);
            family
        } else if let Some(family_name) = non_blank(request.family_name) {
            let family = Family {
                id: new_id(),
                name: family_name,
                created_at: now,
                updated_at: now,
            };
            self.storage.store_family(&family).await?;

            user.family_id = Some(family.id.clone());
            user.role = UserRole::Admin;
            self.storage.store_user(&user).await?;
            self.category_service.seed_default_categories(&family.id).await?;
            info!("User {} created family {}", user.username, family.name);
            Some(family)
        } else {
            self.storage.store_user(&user).await?;
            None
        };

        info!("Registered user {} with ID: {}", user.username, user.id);
        Ok(UserWithFamily { user, family })
    }

    pub async fn login(&self, request: LoginRequest) -> DomainResult<UserWithFamily> {
        info!("Login attempt: {}", request.username);

        let user = match self.storage.get_user_by_username(request.username.trim()).await? {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!("Invalid credentials for {}", request.username);
                return Err(DomainError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        let family = match user.family_id {
            Some(ref family_id) => self.storage.get_family(family_id).await?,
            None => None,
        };
        Ok(UserWithFamily { user, family })
    }

    pub async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    /// Change a user's password, storing a fresh hash
    pub async fn change_password(&self, user_id: &str, new_password: &str) -> DomainResult<()> {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let mut user = self.get_user(user_id).await?;
        user.password_hash = hash_password(new_password)?;
        user.updated_at = Utc::now();
        self.storage.update_user(&user).await?;
        info!("Password changed for user {}", user.username);
        Ok(())
    }

    /// Remove a user together with the ledger rows they created
    pub async fn delete_account(&self, user_id: Option<&str>) -> DomainResult<()> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::validation("User ID is required"))?;

        let user = self.get_user(user_id).await?;

        let transactions = self.storage.remove_transactions_by_creator(user_id).await?;
        let payments = self
            .storage
            .delete_recurring_payments_by_creator(user_id)
            .await?;
        self.storage.delete_user(user_id).await?;

        info!(
            "Deleted user {} with {} transactions and {} recurring payments",
            user.username, transactions, payments
        );
        Ok(())
    }
}

/// Display names of the given users; unknown ids map to a placeholder
pub(crate) async fn author_names(storage: &dyn Storage, user_ids: Vec<String>) -> DomainResult<HashMap<String, String>> {
    let mut names = HashMap::new();
    for user_id in user_ids {
        if names.contains_key(&user_id) {
            continue;
        }
        let name = match storage.get_user(&user_id).await? {
            Some(user) => user.display_name(),
            None => UNKNOWN_USER_NAME.to_string(),
        };
        names.insert(user_id, name);
    }
    Ok(names)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

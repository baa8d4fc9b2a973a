//! Domain model for a registered user.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Family, UserRole};

/// Shown instead of a name when a transaction's author no longer exists
pub const UNKNOWN_USER_NAME: &str = "Неизвестный пользователь";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string, never the plain password
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub family_id: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last" when either name is set, otherwise the username
    pub fn display_name(&self) -> String {
        let full_name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = full_name.trim();
        if trimmed.is_empty() {
            self.username.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// Address used to match named family invitations to this user
    pub fn invitation_email(&self) -> String {
        invitation_email_for(&self.username)
    }
}

pub fn invitation_email_for(username: &str) -> String {
    format!("{}@familyfinance.local", username)
}

/// Result of register, login, join and accept-invitation
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithFamily {
    pub user: User,
    pub family: Option<Family>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: "user-1".to_string(),
            username: "anna".to_string(),
            password_hash: "hash".to_string(),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            family_id: None,
            role: UserRole::Member,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user(Some("Anna"), Some("Petrova")).display_name(), "Anna Petrova");
        assert_eq!(user(Some("Anna"), None).display_name(), "Anna");
        assert_eq!(user(None, Some("Petrova")).display_name(), "Petrova");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(user(None, None).display_name(), "anna");
        assert_eq!(user(Some("  "), Some("")).display_name(), "anna");
    }

    #[test]
    fn test_invitation_email() {
        assert_eq!(user(None, None).invitation_email(), "anna@familyfinance.local");
    }
}

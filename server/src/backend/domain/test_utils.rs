//! Fixtures shared by the domain and REST tests.
use chrono::Utc;
use shared::{Account, AccountType, Family, UserRole};
use std::sync::Arc;

use crate::backend::domain::models::new_id;
use crate::backend::domain::models::user::User;
use crate::backend::domain::password::hash_password;
use crate::backend::storage::{AccountStorage, FamilyStorage, MemStorage, Storage, UserStorage};

pub fn test_storage() -> Arc<dyn Storage> {
    Arc::new(MemStorage::new())
}

pub async fn seed_family(storage: &Arc<dyn Storage>) -> Family {
    let now = Utc::now();
    let family = Family {
        id: new_id(),
        name: "Ивановы".to_string(),
        created_at: now,
        updated_at: now,
    };
    storage.store_family(&family).await.unwrap();
    family
}

pub async fn seed_user(
    storage: &Arc<dyn Storage>,
    username: &str,
    family_id: Option<&str>,
    role: UserRole,
) -> User {
    let now = Utc::now();
    let user = User {
        id: new_id(),
        username: username.to_string(),
        password_hash: hash_password("password123").unwrap(),
        first_name: None,
        last_name: None,
        family_id: family_id.map(str::to_string),
        role,
        created_at: now,
        updated_at: now,
    };
    storage.store_user(&user).await.unwrap();
    user
}

pub async fn seed_account(storage: &Arc<dyn Storage>, family_id: &str, balance: f64) -> Account {
    let now = Utc::now();
    let account = Account {
        id: new_id(),
        name: "Основная карта".to_string(),
        account_type: AccountType::Checking,
        balance,
        currency: "RUB".to_string(),
        family_id: family_id.to_string(),
        created_at: now,
        updated_at: now,
    };
    storage.store_account(&account).await.unwrap();
    account
}

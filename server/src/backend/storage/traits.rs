//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use shared::{Account, Category, Family, FamilyInvitation, RecurringPayment, Transaction};
use std::fmt;

use crate::backend::domain::models::user::User;

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Store a new user
    async fn store_user(&self, user: &User) -> Result<()>;

    /// Retrieve a user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Retrieve a user by their unique username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Update an existing user
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Delete a user together with the invitations they issued.
    /// Returns true if the user existed.
    async fn delete_user(&self, user_id: &str) -> Result<bool>;
}

/// Trait defining the interface for family storage operations
#[async_trait]
pub trait FamilyStorage: Send + Sync {
    async fn store_family(&self, family: &Family) -> Result<()>;

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>>;

    /// List all users belonging to a family ordered by username
    async fn list_family_members(&self, family_id: &str) -> Result<Vec<User>>;

    /// Families the user belongs to (at most one today)
    async fn list_families_for_user(&self, user_id: &str) -> Result<Vec<Family>>;
}

/// Trait defining the interface for family invitation storage operations
#[async_trait]
pub trait InvitationStorage: Send + Sync {
    async fn store_invitation(&self, invitation: &FamilyInvitation) -> Result<()>;

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<FamilyInvitation>>;

    /// Look up an invitation by its six character code
    async fn get_invitation_by_code(&self, code: &str) -> Result<Option<FamilyInvitation>>;

    /// List invitations of a family, newest first
    async fn list_invitations_by_family(&self, family_id: &str) -> Result<Vec<FamilyInvitation>>;

    async fn list_invitations_by_email(&self, email: &str) -> Result<Vec<FamilyInvitation>>;

    async fn update_invitation(&self, invitation: &FamilyInvitation) -> Result<()>;
}

/// Trait defining the interface for category storage operations
#[async_trait]
pub trait CategoryStorage: Send + Sync {
    async fn store_category(&self, category: &Category) -> Result<()>;

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>>;

    /// List categories of a family in creation order
    async fn list_categories_by_family(&self, family_id: &str) -> Result<Vec<Category>>;

    async fn update_category(&self, category: &Category) -> Result<()>;

    /// Delete a category; transactions referencing it lose their category.
    /// Returns true if the category existed.
    async fn delete_category(&self, category_id: &str) -> Result<bool>;
}

/// Trait defining the interface for account storage operations
#[async_trait]
pub trait AccountStorage: Send + Sync {
    async fn store_account(&self, account: &Account) -> Result<()>;

    async fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// List accounts of a family in creation order
    async fn list_accounts_by_family(&self, family_id: &str) -> Result<Vec<Account>>;

    async fn update_account(&self, account: &Account) -> Result<()>;

    /// Add a signed delta to an account balance in a single step.
    /// Returns the updated account, or None if it does not exist.
    async fn adjust_account_balance(&self, account_id: &str, delta: f64) -> Result<Option<Account>>;

    /// Delete an account and its transactions.
    /// Returns true if the account existed.
    async fn delete_account(&self, account_id: &str) -> Result<bool>;
}

/// Trait defining the interface for transaction storage operations
///
/// Writes keep account balances in step with the ledger: every write applies
/// or reverts [`Transaction::balance_effect`] on the affected account within
/// the same atomic unit as the row change.
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction and apply its effect to its account
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// List transactions of a family ordered by date descending (most recent first)
    async fn list_transactions_by_family(&self, family_id: &str) -> Result<Vec<Transaction>>;

    /// List transactions booked on one account, most recent first
    async fn list_transactions_by_account(&self, account_id: &str) -> Result<Vec<Transaction>>;

    /// Replace the stored transaction with the same id as `updated`.
    ///
    /// The effect of the row as stored at write time is reverted and the
    /// effect of `updated` applied in the same atomic unit. Returns the
    /// replaced row, or None when no transaction has that id.
    async fn replace_transaction(&self, updated: &Transaction) -> Result<Option<Transaction>>;

    /// Delete a transaction and revert its effect.
    /// Returns the removed transaction if it existed.
    async fn remove_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// Delete every transaction created by a user, reverting their effects.
    /// Returns the number of transactions removed.
    async fn remove_transactions_by_creator(&self, user_id: &str) -> Result<u64>;
}

/// Trait defining the interface for recurring payment storage operations
#[async_trait]
pub trait RecurringPaymentStorage: Send + Sync {
    async fn store_recurring_payment(&self, payment: &RecurringPayment) -> Result<()>;

    async fn get_recurring_payment(&self, payment_id: &str) -> Result<Option<RecurringPayment>>;

    /// List recurring payments of a family ordered by start date
    async fn list_recurring_payments_by_family(&self, family_id: &str) -> Result<Vec<RecurringPayment>>;

    async fn update_recurring_payment(&self, payment: &RecurringPayment) -> Result<()>;

    /// Returns true if the payment existed
    async fn delete_recurring_payment(&self, payment_id: &str) -> Result<bool>;

    /// Returns the number of payments removed
    async fn delete_recurring_payments_by_creator(&self, user_id: &str) -> Result<u64>;
}

/// Which backend a [`Storage`] is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    PostgreSql,
    InMemory,
}

impl StorageKind {
    pub fn is_database(&self) -> bool {
        matches!(self, StorageKind::PostgreSql)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::PostgreSql => f.write_str("PostgreSQL"),
            StorageKind::InMemory => f.write_str("In-memory"),
        }
    }
}

/// Everything the domain layer needs from a storage backend
///
/// The backend is picked at startup (PostgreSQL when a database URL is
/// configured, in-memory otherwise), so services hold it as
/// `Arc<dyn Storage>`.
pub trait Storage:
    UserStorage
    + FamilyStorage
    + InvitationStorage
    + CategoryStorage
    + AccountStorage
    + TransactionStorage
    + RecurringPaymentStorage
{
    fn kind(&self) -> StorageKind;
}

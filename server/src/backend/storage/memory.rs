//! In-memory storage backend.
//!
//! Used when no database URL is configured and by the test suite. All tables
//! live behind one lock so that ledger writes touching a transaction and its
//! account are applied together.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use shared::{Account, Category, Family, FamilyInvitation, RecurringPayment, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::domain::models::user::User;
use crate::backend::storage::traits::{
    AccountStorage, CategoryStorage, FamilyStorage, InvitationStorage, RecurringPaymentStorage,
    Storage, StorageKind, TransactionStorage, UserStorage,
};

#[derive(Default)]
struct MemState {
    users: HashMap<String, User>,
    families: HashMap<String, Family>,
    invitations: HashMap<String, FamilyInvitation>,
    categories: HashMap<String, Category>,
    accounts: HashMap<String, Account>,
    transactions: HashMap<String, Transaction>,
    recurring_payments: HashMap<String, RecurringPayment>,
}

impl MemState {
    fn apply_balance(&mut self, account_id: &str, delta: f64) {
        if delta == 0.0 {
            return;
        }
        if let Some(account) = self.accounts.get_mut(account_id) {
            account.balance += delta;
            account.updated_at = chrono::Utc::now();
        }
    }
}

/// Storage backed by process memory; contents are lost on restart
#[derive(Clone, Default)]
pub struct MemStorage {
    state: Arc<RwLock<MemState>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl UserStorage for MemStorage {
    async fn store_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            anyhow::bail!("username {} is already taken", user.username);
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.users.get_mut(&user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let existed = state.users.remove(user_id).is_some();
        if existed {
            state.invitations.retain(|_, inv| inv.invited_by != user_id);
        }
        Ok(existed)
    }
}

#[async_trait]
impl FamilyStorage for MemStorage {
    async fn store_family(&self, family: &Family) -> Result<()> {
        let mut state = self.state.write().await;
        state.families.insert(family.id.clone(), family.clone());
        Ok(())
    }

    async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        Ok(self.state.read().await.families.get(family_id).cloned())
    }

    async fn list_family_members(&self, family_id: &str) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let mut members: Vec<User> = state
            .users
            .values()
            .filter(|u| u.family_id.as_deref() == Some(family_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(members)
    }

    async fn list_families_for_user(&self, user_id: &str) -> Result<Vec<Family>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(user_id)
            .and_then(|u| u.family_id.as_ref())
            .and_then(|family_id| state.families.get(family_id))
            .cloned()
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl InvitationStorage for MemStorage {
    async fn store_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        let mut state = self.state.write().await;
        if state
            .invitations
            .values()
            .any(|inv| inv.invitation_code == invitation.invitation_code)
        {
            anyhow::bail!("invitation code {} already exists", invitation.invitation_code);
        }
        state.invitations.insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<FamilyInvitation>> {
        Ok(self.state.read().await.invitations.get(invitation_id).cloned())
    }

    async fn get_invitation_by_code(&self, code: &str) -> Result<Option<FamilyInvitation>> {
        let state = self.state.read().await;
        Ok(state
            .invitations
            .values()
            .find(|inv| inv.invitation_code == code)
            .cloned())
    }

    async fn list_invitations_by_family(&self, family_id: &str) -> Result<Vec<FamilyInvitation>> {
        let state = self.state.read().await;
        let mut invitations: Vec<FamilyInvitation> = state
            .invitations
            .values()
            .filter(|inv| inv.family_id == family_id)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn list_invitations_by_email(&self, email: &str) -> Result<Vec<FamilyInvitation>> {
        let state = self.state.read().await;
        let mut invitations: Vec<FamilyInvitation> = state
            .invitations
            .values()
            .filter(|inv| inv.email == email)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn update_invitation(&self, invitation: &FamilyInvitation) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.invitations.get_mut(&invitation.id) {
            *existing = invitation.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStorage for MemStorage {
    async fn store_category(&self, category: &Category) -> Result<()> {
        let mut state = self.state.write().await;
        state.categories.insert(category.id.clone(), category.clone());
        Ok(())
    }

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(category_id).cloned())
    }

    async fn list_categories_by_family(&self, family_id: &str) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.family_id == family_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.categories.get_mut(&category.id) {
            *existing = category.clone();
        }
        Ok(())
    }

    async fn delete_category(&self, category_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let existed = state.categories.remove(category_id).is_some();
        if existed {
            for transaction in state.transactions.values_mut() {
                if transaction.category_id.as_deref() == Some(category_id) {
                    transaction.category_id = None;
                }
            }
        }
        Ok(existed)
    }
}

#[async_trait]
impl AccountStorage for MemStorage {
    async fn store_account(&self, account: &Account) -> Result<()> {
        let mut state = self.state.write().await;
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        Ok(self.state.read().await.accounts.get(account_id).cloned())
    }

    async fn list_accounts_by_family(&self, family_id: &str) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.family_id == family_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(accounts)
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.accounts.get_mut(&account.id) {
            *existing = account.clone();
        }
        Ok(())
    }

    async fn adjust_account_balance(&self, account_id: &str, delta: f64) -> Result<Option<Account>> {
        let mut state = self.state.write().await;
        state.apply_balance(account_id, delta);
        Ok(state.accounts.get(account_id).cloned())
    }

    async fn delete_account(&self, account_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let existed = state.accounts.remove(account_id).is_some();
        if existed {
            state.transactions.retain(|_, t| t.account_id != account_id);
        }
        Ok(existed)
    }
}

#[async_trait]
impl TransactionStorage for MemStorage {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&transaction.account_id) {
            anyhow::bail!("account {} does not exist", transaction.account_id);
        }
        state
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        state.apply_balance(&transaction.account_id, transaction.balance_effect());
        debug!("Stored transaction {} in memory", transaction.id);
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        Ok(self.state.read().await.transactions.get(transaction_id).cloned())
    }

    async fn list_transactions_by_family(&self, family_id: &str) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect();
        sort_transactions(&mut transactions);
        Ok(transactions)
    }

    async fn list_transactions_by_account(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        sort_transactions(&mut transactions);
        Ok(transactions)
    }

    async fn replace_transaction(&self, updated: &Transaction) -> Result<Option<Transaction>> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&updated.account_id) {
            anyhow::bail!("account {} does not exist", updated.account_id);
        }
        let Some(stored) = state.transactions.get(&updated.id).cloned() else {
            return Ok(None);
        };
        state.apply_balance(&stored.account_id, -stored.balance_effect());
        state.apply_balance(&updated.account_id, updated.balance_effect());
        state.transactions.insert(updated.id.clone(), updated.clone());
        Ok(Some(stored))
    }

    async fn remove_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let mut state = self.state.write().await;
        let removed = state.transactions.remove(transaction_id);
        if let Some(ref transaction) = removed {
            state.apply_balance(&transaction.account_id, -transaction.balance_effect());
        }
        Ok(removed)
    }

    async fn remove_transactions_by_creator(&self, user_id: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let ids: Vec<String> = state
            .transactions
            .values()
            .filter(|t| t.created_by_id == user_id)
            .map(|t| t.id.clone())
            .collect();
        for id in &ids {
            if let Some(transaction) = state.transactions.remove(id) {
                state.apply_balance(&transaction.account_id, -transaction.balance_effect());
            }
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl RecurringPaymentStorage for MemStorage {
    async fn store_recurring_payment(&self, payment: &RecurringPayment) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .recurring_payments
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn get_recurring_payment(&self, payment_id: &str) -> Result<Option<RecurringPayment>> {
        Ok(self.state.read().await.recurring_payments.get(payment_id).cloned())
    }

    async fn list_recurring_payments_by_family(&self, family_id: &str) -> Result<Vec<RecurringPayment>> {
        let state = self.state.read().await;
        let mut payments: Vec<RecurringPayment> = state
            .recurring_payments
            .values()
            .filter(|p| p.family_id == family_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(payments)
    }

    async fn update_recurring_payment(&self, payment: &RecurringPayment) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.recurring_payments.get_mut(&payment.id) {
            *existing = payment.clone();
        }
        Ok(())
    }

    async fn delete_recurring_payment(&self, payment_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.recurring_payments.remove(payment_id).is_some())
    }

    async fn delete_recurring_payments_by_creator(&self, user_id: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.recurring_payments.len();
        state
            .recurring_payments
            .retain(|_, p| p.created_by_id != user_id);
        Ok((before - state.recurring_payments.len()) as u64)
    }
}

impl Storage for MemStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::InMemory
    }
}

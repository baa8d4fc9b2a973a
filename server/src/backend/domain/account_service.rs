use chrono::Utc;
use log::{info, warn};
use shared::{Account, CreateAccountRequest, Transaction, UpdateAccountRequest};
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::storage::{AccountStorage, FamilyStorage, Storage, TransactionStorage};

/// Service for a family's money accounts
#[derive(Clone)]
pub struct AccountService {
    storage: Arc<dyn Storage>,
}

impl AccountService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_account(&self, request: CreateAccountRequest) -> DomainResult<Account> {
        info!(
            "Creating {} account '{}' for family {}",
            request.account_type, request.name, request.family_id
        );

        let name = request.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Account name cannot be empty"));
        }
        if !request.balance.is_finite() {
            return Err(DomainError::validation("Balance must be a number"));
        }
        let currency = normalize_currency(&request.currency)?;
        if self.storage.get_family(&request.family_id).await?.is_none() {
            return Err(DomainError::not_found("Family not found"));
        }

        let now = Utc::now();
        let account = Account {
            id: new_id(),
            name: name.to_string(),
            account_type: request.account_type,
            balance: request.balance,
            currency,
            family_id: request.family_id,
            created_at: now,
            updated_at: now,
        };
        self.storage.store_account(&account).await?;

        info!("Created account {} with ID: {}", account.name, account.id);
        Ok(account)
    }

    pub async fn list_accounts(&self, family_id: &str) -> DomainResult<Vec<Account>> {
        Ok(self.storage.list_accounts_by_family(family_id).await?)
    }

    pub async fn get_account(&self, account_id: &str) -> DomainResult<Account> {
        self.storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account not found"))
    }

    /// Partial update; an explicit balance overrides the running total
    pub async fn update_account(
        &self,
        account_id: &str,
        request: UpdateAccountRequest,
    ) -> DomainResult<Account> {
        info!("Updating account: {}", account_id);
        let mut account = self.get_account(account_id).await?;

        if let Some(name) = request.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("Account name cannot be empty"));
            }
            account.name = name.to_string();
        }
        if let Some(account_type) = request.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = request.balance {
            if !balance.is_finite() {
                return Err(DomainError::validation("Balance must be a number"));
            }
            account.balance = balance;
        }
        if let Some(currency) = request.currency {
            account.currency = normalize_currency(&currency)?;
        }
        account.updated_at = Utc::now();

        self.storage.update_account(&account).await?;
        Ok(account)
    }

    /// Delete an account together with its transactions
    pub async fn delete_account(&self, account_id: &str) -> DomainResult<()> {
        info!("Deleting account: {}", account_id);
        if !self.storage.delete_account(account_id).await? {
            warn!("Account not found: {}", account_id);
            return Err(DomainError::not_found("Account not found"));
        }
        Ok(())
    }

    pub async fn account_transactions(&self, account_id: &str) -> DomainResult<Vec<Transaction>> {
        self.get_account(account_id).await?;
        Ok(self.storage.list_transactions_by_account(account_id).await?)
    }
}

fn normalize_currency(code: &str) -> DomainResult<String> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation("Currency must be a three letter code"));
    }
    Ok(code)
}

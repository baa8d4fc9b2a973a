//! Transaction ledger operations.
//!
//! Every write keeps the owning account's balance in step: creating applies
//! the signed effect (expense subtracts, income adds, transfer leaves it
//! alone), updating reverts the old effect and applies the new one, deleting
//! reverts. The storage layer applies each of these in one atomic step.

use chrono::Utc;
use log::{info, warn};
use shared::{
    Account, CreateTransactionRequest, Transaction, TransactionFilter, TransactionView,
    UpdateTransactionRequest,
};
use std::sync::Arc;

use crate::backend::domain::categorization::categorize;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::domain::user_service::author_names;
use crate::backend::storage::{
    AccountStorage, CategoryStorage, FamilyStorage, Storage, TransactionStorage, UserStorage,
};

#[derive(Clone)]
pub struct TransactionService {
    storage: Arc<dyn Storage>,
}

impl TransactionService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_transaction(&self, request: CreateTransactionRequest) -> DomainResult<Transaction> {
        info!(
            "Creating {} transaction: amount={}, description='{}', account={}",
            request.transaction_type, request.amount, request.description, request.account_id
        );

        let description = validate_description(&request.description)?;
        validate_amount(request.amount)?;

        if self.storage.get_family(&request.family_id).await?.is_none() {
            return Err(DomainError::not_found("Family not found"));
        }
        if self.storage.get_user(&request.created_by_id).await?.is_none() {
            return Err(DomainError::not_found("User not found"));
        }
        self.family_account(&request.account_id, &request.family_id).await?;

        let category_id = match non_empty(request.category_id) {
            Some(category_id) => {
                self.check_category(&category_id, &request.family_id).await?;
                Some(category_id)
            }
            None => {
                let categories = self.storage.list_categories_by_family(&request.family_id).await?;
                let picked = categorize(&categories, &description, request.transaction_type);
                info!("Smart categorisation picked {:?} for '{}'", picked, description);
                picked
            }
        };

        let transaction = Transaction {
            id: new_id(),
            amount: request.amount,
            date: request.date,
            description,
            transaction_type: request.transaction_type,
            category_id,
            account_id: request.account_id,
            created_by_id: request.created_by_id,
            family_id: request.family_id,
            created_at: Utc::now(),
        };
        self.storage.store_transaction(&transaction).await?;

        info!(
            "Created transaction {} (balance effect {:+})",
            transaction.id,
            transaction.balance_effect()
        );
        Ok(transaction)
    }

    /// A family's transactions, newest first, with optional filters
    pub async fn list_transactions(
        &self,
        family_id: &str,
        filter: &TransactionFilter,
    ) -> DomainResult<Vec<TransactionView>> {
        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let category_id = filter.category_id.as_deref().filter(|c| !c.is_empty() && *c != "all");

        let transactions: Vec<Transaction> = self
            .storage
            .list_transactions_by_family(family_id)
            .await?
            .into_iter()
            .filter(|t| match search {
                Some(ref needle) => t.description.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .filter(|t| match category_id {
                Some(wanted) => t.category_id.as_deref() == Some(wanted),
                None => true,
            })
            .collect();

        let author_ids = transactions.iter().map(|t| t.created_by_id.clone()).collect();
        let names = author_names(self.storage.as_ref(), author_ids).await?;

        info!("Found {} transactions for family {}", transactions.len(), family_id);
        Ok(transactions
            .into_iter()
            .map(|transaction| {
                let created_by_name = names
                    .get(&transaction.created_by_id)
                    .cloned()
                    .unwrap_or_default();
                TransactionView {
                    transaction,
                    created_by_name,
                }
            })
            .collect())
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> DomainResult<Transaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Transaction not found"))
    }

    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        request: UpdateTransactionRequest,
    ) -> DomainResult<Transaction> {
        info!("Updating transaction: {}", transaction_id);
        let previous = self.get_transaction(transaction_id).await?;
        let mut updated = previous.clone();

        if let Some(amount) = request.amount {
            validate_amount(amount)?;
            updated.amount = amount;
        }
        if let Some(date) = request.date {
            updated.date = date;
        }
        if let Some(ref description) = request.description {
            updated.description = validate_description(description)?;
        }
        if let Some(transaction_type) = request.transaction_type {
            updated.transaction_type = transaction_type;
        }
        if let Some(category_id) = request.category_id {
            updated.category_id = non_empty(Some(category_id));
            if let Some(ref category_id) = updated.category_id {
                self.check_category(category_id, &updated.family_id).await?;
            }
        }
        if let Some(account_id) = request.account_id {
            self.family_account(&account_id, &updated.family_id).await?;
            updated.account_id = account_id;
        }

        let replaced = self
            .storage
            .replace_transaction(&updated)
            .await?
            .ok_or_else(|| DomainError::not_found("Transaction not found"))?;
        info!(
            "Updated transaction {}: effect {:+} on {} replaced by {:+} on {}",
            updated.id,
            replaced.balance_effect(),
            replaced.account_id,
            updated.balance_effect(),
            updated.account_id
        );
        Ok(updated)
    }

    pub async fn delete_transaction(&self, transaction_id: &str) -> DomainResult<Transaction> {
        info!("Deleting transaction: {}", transaction_id);
        match self.storage.remove_transaction(transaction_id).await? {
            Some(removed) => {
                info!(
                    "Deleted transaction {}, reverted {:+} on account {}",
                    removed.id,
                    removed.balance_effect(),
                    removed.account_id
                );
                Ok(removed)
            }
            None => {
                warn!("Transaction not found: {}", transaction_id);
                Err(DomainError::not_found("Transaction not found"))
            }
        }
    }

    async fn family_account(&self, account_id: &str, family_id: &str) -> DomainResult<Account> {
        let account = self
            .storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account not found"))?;
        if account.family_id != family_id {
            return Err(DomainError::validation("Account does not belong to this family"));
        }
        Ok(account)
    }

    async fn check_category(&self, category_id: &str, family_id: &str) -> DomainResult<()> {
        match self.storage.get_category(category_id).await? {
            Some(category) if category.family_id == family_id => Ok(()),
            Some(_) => Err(DomainError::validation("Category does not belong to this family")),
            None => Err(DomainError::not_found("Category not found")),
        }
    }
}

fn validate_amount(amount: f64) -> DomainResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::validation("Amount must be a positive number"));
    }
    Ok(())
}

fn validate_description(description: &str) -> DomainResult<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Description cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

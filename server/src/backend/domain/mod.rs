//! # Domain Module
//!
//! Contains all business logic of the family budget backend.
//!
//! Services receive their storage as `Arc<dyn Storage>` and know nothing about
//! HTTP or SQL. They validate input, enforce family ownership of ledger rows
//! and return [`errors::DomainError`] on failure.
//!
//! ## Module Organization
//!
//! - **user_service**: registration, login, password changes and account removal
//! - **family_service**: members, invitations and joining a family
//! - **category_service** / **account_service**: ledger reference data
//! - **transaction_service**: the ledger itself, keeping balances in step
//! - **recurring_payment_service**: periodic obligations shown on the calendar
//! - **calendar**: month grids and recurring payment date matching
//! - **summary_service**: dashboard, budget progress and statistics
//! - **categorization**: default categories and keyword categorisation
//! - **password**: Argon2id hashing
//!
//! ## Business Rules
//!
//! - Transaction amounts are positive; the type gives the direction
//! - Expenses subtract from the account balance, income adds, transfers leave it
//! - A transaction's account must belong to the transaction's family
//! - Only members of a family may invite others into it

pub mod account_service;
pub mod calendar;
pub mod categorization;
pub mod category_service;
pub mod errors;
pub mod family_service;
pub mod models;
pub mod password;
pub mod recurring_payment_service;
pub mod summary_service;
pub mod transaction_service;
pub mod user_service;

#[cfg(test)]
pub mod test_utils;

pub use account_service::AccountService;
pub use calendar::CalendarService;
pub use category_service::CategoryService;
pub use errors::{DomainError, DomainResult};
pub use family_service::FamilyService;
pub use recurring_payment_service::RecurringPaymentService;
pub use summary_service::SummaryService;
pub use transaction_service::TransactionService;
pub use user_service::UserService;

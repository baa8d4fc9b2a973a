//! # Storage Module
//!
//! Handles all data persistence for the family budget backend.
//!
//! The domain layer only sees the traits in [`traits`]; the concrete backend
//! is chosen at startup:
//!
//! - **PostgreSQL** ([`PgStorage`]) when a database URL is configured
//! - **In-memory** ([`MemStorage`]) otherwise, and in tests
//!
//! Both backends keep account balances consistent with the transaction
//! ledger: every transaction write applies or reverts its balance effect in
//! the same atomic unit as the row change.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemStorage;
pub use postgres::{ConnectPolicy, DbConnection, PgStorage};
pub use traits::{
    AccountStorage, CategoryStorage, FamilyStorage, InvitationStorage, RecurringPaymentStorage,
    Storage, StorageKind, TransactionStorage, UserStorage,
};

// Each repository implements one storage trait for PgStorage
pub mod account_repository;
pub mod category_repository;
pub mod family_repository;
pub mod invitation_repository;
pub mod recurring_payment_repository;
pub mod transaction_repository;
pub mod user_repository;

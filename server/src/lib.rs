//! Family budget server: a REST backend for shared household finances.
//!
//! Families keep accounts, categories, a transaction ledger and recurring
//! payments. The binary in `main.rs` wires [`config::Config`] to
//! [`backend::initialize_backend`] and serves [`backend::create_router`].

pub mod backend;
pub mod config;

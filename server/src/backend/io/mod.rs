//! # IO Module
//!
//! Interface layer between HTTP clients and the domain services.
//!
//! Handlers deserialize requests into the DTOs from the `shared` crate, call a
//! single domain operation and translate the outcome back into JSON. Domain
//! failures become status codes in one place, [`rest::error_response`].
//!
//! ## Routes
//!
//! Everything lives under `/api`. Ledger resources (categories, accounts,
//! transactions, recurring payments) are created with `POST /api/<resource>`
//! and listed with `GET /api/<resource>/:familyId`. The same path with a
//! resource id accepts `PUT` and `DELETE`.
//!
//! Anything outside `/api` is served from the prebuilt client bundle, see
//! [`rest::static_files`].

pub mod rest;

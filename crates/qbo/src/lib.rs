//! Accounting-system client.
//!
//! Read-only queries against the accounting REST API (items, tax codes,
//! company info) plus the OAuth2 token lifecycle (authorization-code
//! exchange and refresh) used by the callback and diagnostics handlers.

pub mod auth;
pub mod client;
pub mod config;

pub use auth::{QboOauthClient, TokenSet};
pub use client::{CompanyInfo, Item, QboClient, QboError, TaxCode};
pub use config::{OauthConfig, QboConfig};

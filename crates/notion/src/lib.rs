//! Workspace-database client.
//!
//! All durable state for the renewal flow lives in the workspace database:
//! organization pages keyed by an opaque correlation token, and a submissions
//! database for vendor profiles. This crate wraps the page/database REST
//! endpoints plus the JSON property builders and extractors the handlers use.

pub mod client;
pub mod config;
pub mod props;

pub use client::{NotionClient, NotionError};
pub use config::NotionConfig;

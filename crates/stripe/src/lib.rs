//! Payment-processor client.
//!
//! Wraps the processor's REST API (checkout session creation, payment-intent
//! retrieval) and implements webhook signature verification over the raw
//! request body. The API is form-encoded; webhook payloads are JSON.

pub mod client;
pub mod config;
pub mod webhook;

pub use client::{CheckoutSession, CheckoutSessionParams, PaymentIntent, StripeClient, StripeError};
pub use config::StripeConfig;
pub use webhook::{SignatureError, WebhookEvent};

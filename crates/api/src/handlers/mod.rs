//! Request handlers, one module per integration surface.
//!
//! Each handler is a stateless transform: validate input, make a bounded
//! sequence of outbound API calls, map the result to JSON or HTML. Handlers
//! pull their integration clients from [`crate::state::AppState`] and map
//! errors via [`crate::error::AppError`].

pub mod checkout;
pub mod health;
pub mod notifications;
pub mod qbo_admin;
pub mod qbo_oauth;
pub mod qbo_status;
pub mod stripe_webhook;
pub mod vendor_profile;

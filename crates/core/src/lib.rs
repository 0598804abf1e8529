//! Domain logic for the membership-renewal backend.
//!
//! This crate has no I/O: it defines the request-scoped invoice shapes the
//! renewal form submits, the provincial tax table, the billing-display
//! line-item derivation, and the bookkeeping coding breakdown. Everything
//! here is consumed by the API layer and the integration client crates.

pub mod coding;
pub mod invoice;
pub mod line_items;
pub mod tax;

pub use invoice::{
    Attendee, AttendeeCategory, BillingDisplay, InstitutionSize, InvoiceData, OrgAddress,
    OrganizationData, PrimaryContact,
};
pub use line_items::{LineItem, ProductCatalog, TaxTreatment};

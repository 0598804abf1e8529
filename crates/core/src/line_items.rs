//! Line-item derivation for checkout sessions.
//!
//! Converts the invoice figures plus the billing-display preference into the
//! priced line items sent to the payment processor. Amounts leave this module
//! in cents, rounded per line.

use crate::invoice::{BillingDisplay, InstitutionSize, InvoiceData};
use crate::tax;

/// Payment-processor product identifiers, one per membership size band plus
/// the conference and combined products.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    pub membership_xsmall: String,
    pub membership_small: String,
    pub membership_medium: String,
    pub membership_large: String,
    pub membership_xlarge: String,
    pub conference: String,
    pub combined: String,
}

impl ProductCatalog {
    /// Membership product for a size band. Unknown bands fall back to the
    /// combined product so checkout still references a real product.
    pub fn membership_product(&self, size: Option<InstitutionSize>) -> &str {
        match size {
            Some(InstitutionSize::XSmall) => &self.membership_xsmall,
            Some(InstitutionSize::Small) => &self.membership_small,
            Some(InstitutionSize::Medium) => &self.membership_medium,
            Some(InstitutionSize::Large) => &self.membership_large,
            Some(InstitutionSize::XLarge) => &self.membership_xlarge,
            None => &self.combined,
        }
    }
}

/// Whether line amounts carry tax themselves or leave it to the processor.
///
/// The production form historically shipped both variants; the treatment is
/// now an explicit policy. `Exclusive` sends pre-tax amounts and enables the
/// processor's automatic tax. `Inclusive` embeds the provincial rate
/// (conference portion always at the Ontario rate) and disables automatic
/// tax at the checkout level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxTreatment {
    #[default]
    Exclusive,
    Inclusive,
}

impl TaxTreatment {
    /// Whether the checkout session should ask the processor to compute tax.
    pub fn automatic_tax(&self) -> bool {
        matches!(self, Self::Exclusive)
    }

    /// Parse the `CHECKOUT_TAX_MODE` setting. Unknown values get the default.
    pub fn from_mode(mode: &str) -> Self {
        match mode {
            "inclusive" => Self::Inclusive,
            _ => Self::Exclusive,
        }
    }
}

/// One priced checkout line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Payment-processor product identifier.
    pub product: String,
    /// Per-unit amount in cents.
    pub unit_amount_cents: i64,
    pub quantity: u32,
    /// Shown on the checkout page (attendee name for itemized lines).
    pub description: Option<String>,
}

fn cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Build the checkout line items for an invoice.
///
/// `province` is the organization's province, used only under
/// [`TaxTreatment::Inclusive`] to gross up the membership portion.
pub fn build_line_items(
    invoice: &InvoiceData,
    display: BillingDisplay,
    province: &str,
    catalog: &ProductCatalog,
    treatment: TaxTreatment,
) -> Vec<LineItem> {
    let membership_rate = tax::provincial_rate(province);
    let conference_rate = tax::conference_rate();

    // Gross-up factors; 1.0 when the processor computes tax itself.
    let (membership_factor, conference_factor) = match treatment {
        TaxTreatment::Exclusive => (1.0, 1.0),
        TaxTreatment::Inclusive => (1.0 + membership_rate.rate, 1.0 + conference_rate.rate),
    };

    let size = InstitutionSize::from_name(&invoice.institution_size);
    let mut items = Vec::new();

    match display {
        BillingDisplay::SingleItem => {
            let total = invoice.membership_fee * membership_factor
                + invoice.conference_total * conference_factor;
            items.push(LineItem {
                product: catalog.combined.clone(),
                unit_amount_cents: cents(total),
                quantity: 1,
                description: None,
            });
        }

        BillingDisplay::MembershipConference => {
            items.push(LineItem {
                product: catalog.membership_product(size).to_string(),
                unit_amount_cents: cents(invoice.membership_fee * membership_factor),
                quantity: 1,
                description: None,
            });

            if invoice.conference_total > 0.0 && invoice.paid_attendees > 0 {
                let per_attendee = invoice.conference_total / invoice.paid_attendees as f64;
                items.push(LineItem {
                    product: catalog.conference.clone(),
                    unit_amount_cents: cents(per_attendee * conference_factor),
                    quantity: invoice.paid_attendees,
                    description: None,
                });
            }
        }

        BillingDisplay::IndividualLineItems => {
            items.push(LineItem {
                product: catalog.membership_product(size).to_string(),
                unit_amount_cents: cents(invoice.membership_fee * membership_factor),
                quantity: 1,
                description: None,
            });

            let paid: Vec<_> = invoice.paid_breakdown().collect();
            // Even split across paid attendees; the declared count wins,
            // falling back to the breakdown when the count is missing.
            let divisor = if invoice.paid_attendees > 0 {
                invoice.paid_attendees as usize
            } else {
                paid.len()
            };
            if divisor > 0 {
                let per_attendee = invoice.conference_total / divisor as f64;
                for attendee in paid {
                    items.push(LineItem {
                        product: catalog.conference.clone(),
                        unit_amount_cents: cents(per_attendee * conference_factor),
                        quantity: 1,
                        description: Some(attendee.name.clone()),
                    });
                }
            }
        }
    }

    items
}

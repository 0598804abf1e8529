//! Bookkeeping coding breakdown for paid invoices.
//!
//! When a payment lands, the bookkeeper gets a plain-text email describing
//! how the revenue and tax should be recorded in the accounting system.
//! Single-item invoices need manual allocation (the charge went through as
//! one line), itemized invoices are informational only.

use crate::invoice::{Attendee, BillingDisplay, InstitutionSize, OrgAddress};
use crate::tax;

/// Combined membership revenue account, used when the size band is unknown
/// and as the debit side of the single-item journal entry.
pub const COMBINED_REVENUE_ACCOUNT: &str = "4110";

/// Conference delegate-registration revenue account.
pub const CONFERENCE_REVENUE_ACCOUNT: &str = "4210";

impl InstitutionSize {
    /// Membership revenue account for this size band.
    pub fn revenue_account(&self) -> &'static str {
        match self {
            Self::XSmall => "4114",
            Self::Small => "4118",
            Self::Medium => "4119",
            Self::Large => "4120",
            Self::XLarge => "4121",
        }
    }
}

/// Membership revenue account for a size-band name, falling back to the
/// combined account for unknown bands.
pub fn revenue_account(institution_size: &str) -> &'static str {
    InstitutionSize::from_name(institution_size)
        .map(|s| s.revenue_account())
        .unwrap_or(COMBINED_REVENUE_ACCOUNT)
}

/// Everything the bookkeeper needs to code one paid invoice.
#[derive(Debug, Clone)]
pub struct InvoiceCoding {
    pub organization_name: String,
    pub invoice_id: String,
    pub invoice_number: String,
    pub invoice_url: String,
    pub billing_display: BillingDisplay,
    pub institution_size: String,
    pub membership_fee: f64,
    pub conference_total: f64,
    /// Conference tax already charged by the accounting system (itemized
    /// invoices only; zero when the processor computed tax).
    pub conference_hst: f64,
    pub paid_attendees: u32,
    pub free_attendees: u32,
    pub attendee_breakdown: Vec<Attendee>,
    pub total_amount: f64,
    pub customer_address: Option<OrgAddress>,
}

impl InvoiceCoding {
    /// Email subject line; flags invoices that need manual allocation.
    pub fn subject(&self) -> String {
        let flag = if self.billing_display == BillingDisplay::SingleItem {
            "CODING REQUIRED"
        } else {
            "Info Only"
        };
        format!(
            "QB Invoice {} - {} - {}",
            self.invoice_number, flag, self.organization_name
        )
    }

    /// Plain-text notification body.
    pub fn compose_body(&self) -> String {
        let membership_account = revenue_account(&self.institution_size);

        let mut body = String::new();
        body.push_str("QUICKBOOKS INVOICE CODING NOTIFICATION\n");
        body.push_str("========================================\n\n");

        body.push_str(&format!("Organization: {}\n", self.organization_name));
        body.push_str(&format!("Invoice Number: {}\n", self.invoice_number));
        body.push_str(&format!("QB Invoice ID: {}\n", self.invoice_id));
        body.push_str(&format!("Invoice Total: ${:.2}\n\n", self.total_amount));

        if let Some(addr) = &self.customer_address {
            body.push_str("Billing Address:\n");
            body.push_str(&format!("{}\n", addr.street_address));
            body.push_str(&format!(
                "{}, {} {}\n\n",
                addr.city, addr.province, addr.postal_code
            ));
        }

        body.push_str(&format!("View Invoice: {}\n\n", self.invoice_url));

        let billing_label = if self.billing_display == BillingDisplay::SingleItem {
            "SINGLE LINE ITEM (Combined Payment)"
        } else {
            "INDIVIDUAL LINE ITEMS"
        };
        body.push_str(&format!("BILLING TYPE: {billing_label}\n"));
        body.push_str("========================================\n\n");

        if self.billing_display == BillingDisplay::SingleItem {
            self.compose_single_item_section(&mut body, membership_account);
        } else {
            self.compose_itemized_section(&mut body, membership_account);
        }

        body.push_str("ACCOUNT REFERENCE:\n");
        body.push_str("-------------------\n");
        body.push_str("4110: Membership Revenue (Combined - default)\n");
        body.push_str("4114: Membership Revenue - XSmall\n");
        body.push_str("4118: Membership Revenue - Small\n");
        body.push_str("4119: Membership Revenue - Medium\n");
        body.push_str("4120: Membership Revenue - Large\n");
        body.push_str("4121: Membership Revenue - XLarge\n");
        body.push_str("4210: Conference - Delegate Reg\n\n");

        body.push_str("---\n");
        body.push_str("This notification was generated automatically when the invoice was paid.\n");
        body.push_str(&format!("Timestamp: {}\n", chrono::Utc::now().to_rfc3339()));

        body
    }

    fn compose_single_item_section(&self, body: &mut String, membership_account: &str) {
        let province = self
            .customer_address
            .as_ref()
            .map(|a| a.province.as_str())
            .unwrap_or("");
        let membership_rate = tax::provincial_rate(province);
        let membership_tax = membership_rate.tax_on(self.membership_fee);
        let conference_rate = tax::conference_rate();
        let conference_tax = conference_rate.tax_on(self.conference_total);

        body.push_str("CODING REQUIRED - SINGLE LINE ITEM INVOICE (TAX EXEMPT)\n");
        body.push_str("This invoice was billed as a single TAX-EXEMPT line in QuickBooks.\n");
        body.push_str("Revenue AND taxes must be split manually using the breakdown below.\n\n");

        body.push_str("REVENUE ALLOCATION:\n");
        body.push_str("-------------------\n");
        body.push_str(&format!(
            "Account {membership_account}: Membership {}\n",
            self.institution_size
        ));
        body.push_str(&format!("  Pre-tax Amount: ${:.2}\n", self.membership_fee));
        body.push_str(&format!(
            "  {} ({}%): ${membership_tax:.2}\n",
            membership_rate.label,
            membership_rate.percent()
        ));
        body.push_str(&format!(
            "  Total with tax: ${:.2}\n\n",
            self.membership_fee + membership_tax
        ));

        body.push_str(&format!("Account {CONFERENCE_REVENUE_ACCOUNT}: Conference - Delegate Reg\n"));
        body.push_str(&format!("  Pre-tax Amount: ${:.2}\n", self.conference_total));
        body.push_str(&format!(
            "  HST ({}%): ${conference_tax:.2}\n",
            conference_rate.percent()
        ));
        body.push_str(&format!(
            "  Total with tax: ${:.2}\n",
            self.conference_total + conference_tax
        ));
        body.push_str(&format!(
            "  Attendees: {} paid, {} complimentary\n\n",
            self.paid_attendees, self.free_attendees
        ));

        self.compose_attendee_detail(body);

        let grand_total =
            self.membership_fee + membership_tax + self.conference_total + conference_tax;
        body.push_str(&format!("TOTAL INVOICE AMOUNT: ${grand_total:.2}\n"));
        body.push_str("  (Marked as tax-exempt in QuickBooks - taxes included in line total)\n\n");

        body.push_str("JOURNAL ENTRY NEEDED:\n");
        body.push_str("-------------------\n");
        body.push_str(&format!(
            "Dr. Account {COMBINED_REVENUE_ACCOUNT} (Combined Revenue): ${grand_total:.2}\n"
        ));
        body.push_str(&format!(
            "Cr. Account {membership_account} (Membership): ${:.2}\n",
            self.membership_fee
        ));
        body.push_str(&format!(
            "Cr. Account {CONFERENCE_REVENUE_ACCOUNT} (Conference): ${:.2}\n",
            self.conference_total
        ));
        body.push_str(&format!(
            "Cr. GST/HST Payable (Membership {}): ${membership_tax:.2}\n",
            membership_rate.label
        ));
        body.push_str(&format!("Cr. GST/HST Payable (Conference HST): ${conference_tax:.2}\n\n"));
    }

    fn compose_itemized_section(&self, body: &mut String, membership_account: &str) {
        body.push_str("NO CODING REQUIRED - LINE ITEMS SEPARATED\n");
        body.push_str("This invoice has individual line items already coded in QuickBooks.\n\n");

        body.push_str("LINE ITEM BREAKDOWN:\n");
        body.push_str("-------------------\n");
        body.push_str(&format!("Line 1: Membership {}\n", self.institution_size));
        body.push_str(&format!("  Account: {membership_account}\n"));
        body.push_str(&format!("  Amount: ${:.2}\n\n", self.membership_fee));

        if self.conference_total > 0.0 {
            body.push_str("Line 2: Conference - Delegate Reg\n");
            body.push_str(&format!("  Account: {CONFERENCE_REVENUE_ACCOUNT}\n"));
            body.push_str(&format!("  Amount: ${:.2}\n", self.conference_total));
            body.push_str(&format!(
                "  Attendees: {} paid, {} complimentary\n\n",
                self.paid_attendees, self.free_attendees
            ));

            self.compose_attendee_detail(body);
        }

        body.push_str(&format!("Tax: HST - ${:.2}\n", self.conference_hst));
        body.push_str("  (Automatically applied by QuickBooks)\n\n");
    }

    fn compose_attendee_detail(&self, body: &mut String) {
        if self.attendee_breakdown.is_empty() {
            return;
        }
        body.push_str("Conference Attendees Detail:\n");
        for attendee in &self.attendee_breakdown {
            let marker = if attendee.is_paid() { "[paid]" } else { "[comp]" };
            body.push_str(&format!("  {marker} {} - {}\n", attendee.name, attendee.reason));
        }
        body.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::AttendeeCategory;

    fn coding(display: BillingDisplay) -> InvoiceCoding {
        InvoiceCoding {
            organization_name: "Example Campus Store".into(),
            invoice_id: "1042".into(),
            invoice_number: "INV-1042".into(),
            invoice_url: "https://dashboard.example.test/payments/pi_123".into(),
            billing_display: display,
            institution_size: "Medium".into(),
            membership_fee: 1000.0,
            conference_total: 500.0,
            conference_hst: 65.0,
            paid_attendees: 2,
            free_attendees: 1,
            attendee_breakdown: vec![
                Attendee {
                    name: "Ada".into(),
                    category: AttendeeCategory::Paid,
                    reason: "Delegate".into(),
                },
                Attendee {
                    name: "Linus".into(),
                    category: AttendeeCategory::Complimentary,
                    reason: "Speaker".into(),
                },
            ],
            total_amount: 1695.0,
            customer_address: Some(OrgAddress {
                street_address: "1 College St".into(),
                city: "Toronto".into(),
                province: "Ontario".into(),
                postal_code: "M5S 1A1".into(),
            }),
        }
    }

    #[test]
    fn revenue_account_maps_size_bands() {
        assert_eq!(revenue_account("XSmall"), "4114");
        assert_eq!(revenue_account("Small"), "4118");
        assert_eq!(revenue_account("Medium"), "4119");
        assert_eq!(revenue_account("Large"), "4120");
        assert_eq!(revenue_account("XLarge"), "4121");
        assert_eq!(revenue_account("nonsense"), "4110");
    }

    #[test]
    fn single_item_subject_flags_coding_required() {
        assert!(coding(BillingDisplay::SingleItem).subject().contains("CODING REQUIRED"));
        assert!(coding(BillingDisplay::IndividualLineItems).subject().contains("Info Only"));
    }

    #[test]
    fn single_item_body_allocates_revenue_and_tax() {
        let body = coding(BillingDisplay::SingleItem).compose_body();
        // Membership at Ontario 13%: 130.00 tax; conference at 13%: 65.00.
        assert!(body.contains("Account 4119: Membership Medium"));
        assert!(body.contains("HST (13%): $130.00"));
        assert!(body.contains("HST (13%): $65.00"));
        assert!(body.contains("TOTAL INVOICE AMOUNT: $1695.00"));
        assert!(body.contains("Dr. Account 4110 (Combined Revenue): $1695.00"));
        assert!(body.contains("Cr. Account 4119 (Membership): $1000.00"));
        assert!(body.contains("Cr. Account 4210 (Conference): $500.00"));
    }

    #[test]
    fn single_item_body_uses_gst_outside_hst_provinces() {
        let mut c = coding(BillingDisplay::SingleItem);
        c.customer_address.as_mut().unwrap().province = "Alberta".into();
        let body = c.compose_body();
        assert!(body.contains("GST (5%): $50.00"));
        // Conference stays at the Ontario rate.
        assert!(body.contains("HST (13%): $65.00"));
    }

    #[test]
    fn itemized_body_lists_lines_without_journal_entry() {
        let body = coding(BillingDisplay::IndividualLineItems).compose_body();
        assert!(body.contains("NO CODING REQUIRED"));
        assert!(body.contains("Line 1: Membership Medium"));
        assert!(body.contains("Account: 4119"));
        assert!(body.contains("Line 2: Conference - Delegate Reg"));
        assert!(body.contains("Tax: HST - $65.00"));
        assert!(!body.contains("JOURNAL ENTRY NEEDED"));
    }

    #[test]
    fn attendee_detail_marks_paid_and_complimentary() {
        let body = coding(BillingDisplay::SingleItem).compose_body();
        assert!(body.contains("[paid] Ada - Delegate"));
        assert!(body.contains("[comp] Linus - Speaker"));
    }
}

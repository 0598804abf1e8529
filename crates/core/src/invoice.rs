//! Request-scoped invoice and organization shapes.
//!
//! These mirror the JSON the renewal form submits. None of them outlive a
//! single request; durable state lives in the external workspace database.

use serde::{Deserialize, Serialize};

/// How an invoice's charges are grouped into payable line items.
///
/// Any unrecognized value falls back to [`BillingDisplay::IndividualLineItems`],
/// which is the most granular rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum BillingDisplay {
    /// One combined line for membership plus conference.
    SingleItem,
    /// A membership line and a single aggregated conference line.
    MembershipConference,
    /// A membership line plus one conference line per paid attendee.
    IndividualLineItems,
}

impl From<String> for BillingDisplay {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl BillingDisplay {
    /// Parse a billing-display mode; anything unrecognized is itemized.
    pub fn from_name(name: &str) -> Self {
        match name {
            "single-item" => Self::SingleItem,
            "membership-conference" => Self::MembershipConference,
            _ => Self::IndividualLineItems,
        }
    }

    /// Canonical name as carried in form payloads and session metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SingleItem => "single-item",
            Self::MembershipConference => "membership-conference",
            Self::IndividualLineItems => "individual-line-items",
        }
    }
}

/// Institution size band; selects the membership product and revenue account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstitutionSize {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
}

impl InstitutionSize {
    /// Parse the size band from the string carried in form payloads and
    /// checkout metadata. Returns `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "XSmall" => Some(Self::XSmall),
            "Small" => Some(Self::Small),
            "Medium" => Some(Self::Medium),
            "Large" => Some(Self::Large),
            "XLarge" => Some(Self::XLarge),
            _ => None,
        }
    }

    /// Canonical name as used in payloads and product configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::XSmall => "XSmall",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::XLarge => "XLarge",
        }
    }
}

/// Whether a conference attendee is charged or complimentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AttendeeCategory {
    Paid,
    /// Anything other than `paid` is treated as complimentary.
    Complimentary,
}

impl From<String> for AttendeeCategory {
    fn from(value: String) -> Self {
        if value == "paid" {
            Self::Paid
        } else {
            Self::Complimentary
        }
    }
}

/// A single conference attendee in the invoice breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub category: AttendeeCategory,
    /// Free-text reason shown in the bookkeeping breakdown (e.g. why an
    /// attendee is complimentary).
    #[serde(default)]
    pub reason: String,
}

impl Attendee {
    pub fn is_paid(&self) -> bool {
        self.category == AttendeeCategory::Paid
    }
}

/// The invoice figures computed by the renewal form. Amounts are dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub membership_fee: f64,
    #[serde(default)]
    pub conference_total: f64,
    pub institution_size: String,
    #[serde(default)]
    pub paid_attendees: u32,
    #[serde(default)]
    pub free_attendees: u32,
    #[serde(default)]
    pub attendee_breakdown: Vec<Attendee>,
}

impl InvoiceData {
    /// Attendees marked `paid` in the breakdown.
    pub fn paid_breakdown(&self) -> impl Iterator<Item = &Attendee> {
        self.attendee_breakdown.iter().filter(|a| a.is_paid())
    }
}

/// Postal address of the organization, used for provincial tax lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgAddress {
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Primary contact on the renewal form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryContact {
    #[serde(default)]
    pub work_email: Option<String>,
}

/// Organization identity as submitted by the renewal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationData {
    pub name: String,
    #[serde(default)]
    pub address: Option<OrgAddress>,
    #[serde(default)]
    pub primary_contact: Option<PrimaryContact>,
}

impl OrganizationData {
    /// Province string for tax lookup; empty when no address was supplied.
    pub fn province(&self) -> &str {
        self.address.as_ref().map(|a| a.province.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_display_parses_known_modes() {
        let d: BillingDisplay = serde_json::from_str("\"single-item\"").unwrap();
        assert_eq!(d, BillingDisplay::SingleItem);
        let d: BillingDisplay = serde_json::from_str("\"membership-conference\"").unwrap();
        assert_eq!(d, BillingDisplay::MembershipConference);
        let d: BillingDisplay = serde_json::from_str("\"individual-line-items\"").unwrap();
        assert_eq!(d, BillingDisplay::IndividualLineItems);
    }

    #[test]
    fn billing_display_unknown_falls_back_to_itemized() {
        let d: BillingDisplay = serde_json::from_str("\"something-new\"").unwrap();
        assert_eq!(d, BillingDisplay::IndividualLineItems);
    }

    #[test]
    fn attendee_category_non_paid_is_complimentary() {
        let a: AttendeeCategory = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(a, AttendeeCategory::Complimentary);
        let a: AttendeeCategory = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(a, AttendeeCategory::Paid);
    }

    #[test]
    fn invoice_data_parses_form_payload() {
        let json = serde_json::json!({
            "membershipFee": 1000.0,
            "conferenceTotal": 500.0,
            "institutionSize": "Medium",
            "paidAttendees": 2,
            "freeAttendees": 1,
            "attendeeBreakdown": [
                { "name": "Ada", "category": "paid", "reason": "Delegate" },
                { "name": "Grace", "category": "comp", "reason": "Board member" }
            ]
        });
        let invoice: InvoiceData = serde_json::from_value(json).unwrap();
        assert_eq!(invoice.paid_attendees, 2);
        assert_eq!(invoice.paid_breakdown().count(), 1);
        assert_eq!(InstitutionSize::from_name(&invoice.institution_size), Some(InstitutionSize::Medium));
    }
}

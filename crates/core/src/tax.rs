//! Canadian provincial sales-tax table.
//!
//! Membership is taxed at the rate of the organization's province; the
//! conference is hosted in Ontario, so conference charges always use the
//! Ontario HST rate no matter where the member is located.

/// Federal GST applied when the province is not an HST province.
pub const GST_RATE: f64 = 0.05;

/// Ontario HST, also the fixed conference rate.
pub const ONTARIO_HST_RATE: f64 = 0.13;

/// A resolved sales-tax rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxRate {
    pub rate: f64,
    /// `"HST"` for harmonized provinces, `"GST"` otherwise.
    pub label: &'static str,
}

impl TaxRate {
    /// Whole-number percentage for display, e.g. `13` for Ontario.
    pub fn percent(&self) -> u32 {
        (self.rate * 100.0).round() as u32
    }

    /// Tax amount in dollars on a pre-tax amount.
    pub fn tax_on(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

/// Look up the sales-tax rate for a province name as it appears on the
/// renewal form. Unknown or empty provinces get federal GST only.
pub fn provincial_rate(province: &str) -> TaxRate {
    match province {
        "Ontario" => TaxRate { rate: 0.13, label: "HST" },
        "Nova Scotia" => TaxRate { rate: 0.14, label: "HST" },
        "New Brunswick" | "Newfoundland" | "Newfoundland and Labrador"
        | "Prince Edward Island" => TaxRate { rate: 0.15, label: "HST" },
        _ => TaxRate { rate: GST_RATE, label: "GST" },
    }
}

/// The conference tax rate: always Ontario HST.
pub fn conference_rate() -> TaxRate {
    TaxRate { rate: ONTARIO_HST_RATE, label: "HST" }
}

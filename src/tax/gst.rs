//! GST (Goods and Services Tax) calculation for invoice amounts

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Currency marker used on every displayed amount
pub const RUPEE_SYMBOL: &str = "₹";

/// GST rate split for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total GST rate percentage (e.g., 18 for 18%)
    pub total_rate: BigDecimal,
    /// CGST rate percentage (Central GST)
    pub cgst_rate: BigDecimal,
    /// SGST rate percentage (State GST)
    pub sgst_rate: BigDecimal,
    /// IGST rate percentage (Integrated GST)
    pub igst_rate: BigDecimal,
    /// Whether the supply crosses state lines
    #[serde(default)]
    pub inter_state: bool,
}

impl GstRate {
    /// Intra-state split: CGST and SGST each carry half the rate
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::from(0),
            inter_state: false,
        }
    }

    /// Inter-state split: IGST carries the full rate
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            total_rate: total_rate.clone(),
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate,
            inter_state: true,
        }
    }

    /// Pick the split for the given tax mode
    pub fn for_mode(total_rate: BigDecimal, is_igst: bool) -> Self {
        if is_igst {
            Self::inter_state(total_rate)
        } else {
            Self::intra_state(total_rate)
        }
    }

    pub fn is_inter_state(&self) -> bool {
        self.inter_state
    }
}

/// Tax lines of one invoice. Always derived, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLineAmounts {
    /// Base amount the tax was computed on
    pub base_amount: BigDecimal,
    pub gst_rate: GstRate,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    /// IGST, or CGST + SGST
    pub total_tax: BigDecimal,
    pub adjustment: BigDecimal,
    /// Base + total tax + adjustment, rounded to paise
    pub total_with_tax: BigDecimal,
}

impl TaxLineAmounts {
    pub fn is_igst(&self) -> bool {
        self.gst_rate.is_inter_state()
    }
}

/// Compute the tax lines for a base amount
///
/// A negative base amount is treated as zero. `adjustment` defaults to zero.
/// Every monetary field is rounded half-up to two decimals.
pub fn compute_tax(
    base_amount: &BigDecimal,
    tax_rate_percent: &BigDecimal,
    is_igst: bool,
    adjustment: Option<&BigDecimal>,
) -> TaxLineAmounts {
    let zero = BigDecimal::from(0);
    let base_amount = if *base_amount < zero {
        zero.clone()
    } else {
        base_amount.clone()
    };
    let gst_rate = GstRate::for_mode(tax_rate_percent.clone(), is_igst);
    let hundred = BigDecimal::from(100);

    let cgst_amount = round2(&(&base_amount * &gst_rate.cgst_rate / &hundred));
    let sgst_amount = round2(&(&base_amount * &gst_rate.sgst_rate / &hundred));
    let igst_amount = round2(&(&base_amount * &gst_rate.igst_rate / &hundred));

    let total_tax = if is_igst {
        igst_amount.clone()
    } else {
        &cgst_amount + &sgst_amount
    };
    let adjustment = adjustment.cloned().unwrap_or(zero);
    let total_with_tax = round2(&(&base_amount + &total_tax + &adjustment));

    TaxLineAmounts {
        base_amount,
        gst_rate,
        cgst_amount,
        sgst_amount,
        igst_amount,
        total_tax,
        adjustment,
        total_with_tax,
    }
}

/// Round half-up to two decimal places
pub fn round2(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Drop everything except digits, `.` and `-` (currency symbols, spaces, commas)
pub fn strip_currency(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parse a possibly currency-formatted amount, defaulting to zero
pub fn parse_amount(value: &str) -> BigDecimal {
    try_parse_amount(value).unwrap_or_else(|| BigDecimal::from(0))
}

/// Parse a possibly currency-formatted amount
pub fn try_parse_amount(value: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(&strip_currency(value)).ok()
}

/// Render an amount for display, e.g. `₹ 1180.00`
pub fn format_inr(amount: &BigDecimal) -> String {
    format!("{} {}", RUPEE_SYMBOL, round2(amount))
}

/// Render a rate percentage with one decimal, e.g. `9.0%`
pub fn format_rate(rate: &BigDecimal) -> String {
    format!("{}%", rate.with_scale_round(1, RoundingMode::HalfUp))
}

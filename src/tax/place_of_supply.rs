//! Place of supply resolution from GSTIN state prefixes

use serde::{Deserialize, Serialize};

/// State code assumed when a GSTIN is missing or too short
pub const DEFAULT_STATE_CODE: &str = "29";
/// State name for [`DEFAULT_STATE_CODE`]
pub const DEFAULT_STATE_NAME: &str = "Karnataka";
/// Name reported for a well-formed but unassigned state code
pub const UNKNOWN_STATE_NAME: &str = "Unknown";

/// GST state codes. Code 25 (Daman and Diu) was merged into 26.
const STATE_CODES: [(&str, &str); 37] = [
    ("01", "Jammu and Kashmir"),
    ("02", "Himachal Pradesh"),
    ("03", "Punjab"),
    ("04", "Chandigarh"),
    ("05", "Uttarakhand"),
    ("06", "Haryana"),
    ("07", "Delhi"),
    ("08", "Rajasthan"),
    ("09", "Uttar Pradesh"),
    ("10", "Bihar"),
    ("11", "Sikkim"),
    ("12", "Arunachal Pradesh"),
    ("13", "Nagaland"),
    ("14", "Manipur"),
    ("15", "Mizoram"),
    ("16", "Tripura"),
    ("17", "Meghalaya"),
    ("18", "Assam"),
    ("19", "West Bengal"),
    ("20", "Jharkhand"),
    ("21", "Odisha"),
    ("22", "Chhattisgarh"),
    ("23", "Madhya Pradesh"),
    ("24", "Gujarat"),
    ("26", "Dadra and Nagar Haveli and Daman and Diu"),
    ("27", "Maharashtra"),
    ("28", "Andhra Pradesh"),
    ("29", "Karnataka"),
    ("30", "Goa"),
    ("31", "Lakshadweep"),
    ("32", "Kerala"),
    ("33", "Tamil Nadu"),
    ("34", "Puducherry"),
    ("35", "Andaman and Nicobar Islands"),
    ("36", "Telangana"),
    ("37", "Ladakh"),
    ("38", "Other Territory"),
];

/// Tax mode of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxMode {
    /// True for inter-state supply (IGST), false for intra-state (CGST + SGST)
    pub is_igst: bool,
    /// Vendor's state name; empty when the vendor code is missing or unknown
    pub vendor_state: String,
}

/// The two-character state prefix of a GSTIN, if it has one
pub fn state_code(gstin: &str) -> Option<String> {
    let code: String = gstin.chars().take(2).collect();
    if code.chars().count() < 2 {
        None
    } else {
        Some(code)
    }
}

/// Look up a two-digit state code
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// State name for a GSTIN
///
/// Missing or short input resolves to the default state; unassigned codes
/// resolve to `"Unknown"`.
pub fn resolve_state(gstin: &str) -> &'static str {
    match state_code(gstin) {
        Some(code) => state_name(&code).unwrap_or(UNKNOWN_STATE_NAME),
        None => DEFAULT_STATE_NAME,
    }
}

/// Place-of-supply label printed on the invoice, e.g. `Karnataka(29)`
pub fn place_of_supply(gstin: &str) -> String {
    match state_code(gstin) {
        Some(code) => {
            let name = state_name(&code).unwrap_or(UNKNOWN_STATE_NAME);
            format!("{}({})", name, code)
        }
        None => format!("{}({})", DEFAULT_STATE_NAME, DEFAULT_STATE_CODE),
    }
}

/// Decide between IGST and CGST + SGST
///
/// The business prefix defaults to `29` when absent. A vendor without a
/// usable prefix is treated as intra-state.
pub fn determine_tax_mode(vendor_gstin: &str, business_gstin: &str) -> TaxMode {
    let business_code =
        state_code(business_gstin).unwrap_or_else(|| DEFAULT_STATE_CODE.to_string());

    match state_code(vendor_gstin) {
        Some(vendor_code) => TaxMode {
            is_igst: vendor_code != business_code,
            vendor_state: state_name(&vendor_code).unwrap_or_default().to_string(),
        },
        None => TaxMode {
            is_igst: false,
            vendor_state: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_state() {
        assert_eq!(resolve_state("29ABCDE1234F1Z5"), "Karnataka");
        assert_eq!(resolve_state("27ABCDE1234F1Z5"), "Maharashtra");
        assert_eq!(resolve_state("37AAAAA0000A1Z5"), "Ladakh");
        assert_eq!(resolve_state("38AAAAA0000A1Z5"), "Other Territory");
    }

    #[test]
    fn test_resolve_state_fallbacks() {
        assert_eq!(resolve_state(""), DEFAULT_STATE_NAME);
        assert_eq!(resolve_state("2"), DEFAULT_STATE_NAME);
        assert_eq!(resolve_state("25AAAAA0000A1Z5"), "Unknown");
        assert_eq!(resolve_state("99"), "Unknown");
        assert_eq!(resolve_state("XY"), "Unknown");
    }

    #[test]
    fn test_place_of_supply_label() {
        assert_eq!(place_of_supply("33ABCDE1234F1Z5"), "Tamil Nadu(33)");
        assert_eq!(place_of_supply(""), "Karnataka(29)");
        assert_eq!(place_of_supply("99X"), "Unknown(99)");
    }

    #[test]
    fn test_tax_mode() {
        let mode = determine_tax_mode("27ABCDE1234F1Z5", "29ABICS0071M1ZY");
        assert!(mode.is_igst);
        assert_eq!(mode.vendor_state, "Maharashtra");

        let mode = determine_tax_mode("29ABCDE1234F1Z5", "29ABICS0071M1ZY");
        assert!(!mode.is_igst);
        assert_eq!(mode.vendor_state, "Karnataka");
    }

    #[test]
    fn test_tax_mode_defaults_business_state() {
        assert!(!determine_tax_mode("29ABCDE1234F1Z5", "").is_igst);
        assert!(determine_tax_mode("07ABCDE1234F1Z5", "2").is_igst);

        let mode = determine_tax_mode("", "29ABICS0071M1ZY");
        assert!(!mode.is_igst);
        assert_eq!(mode.vendor_state, "");

        let mode = determine_tax_mode("99ABCDE1234F1Z5", "29ABICS0071M1ZY");
        assert!(mode.is_igst);
        assert_eq!(mode.vendor_state, "");
    }
}

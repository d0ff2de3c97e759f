//! Reference numbers derived from partner and service period

use std::fmt::Display;

const MONTH_CODES: [(&str, &str); 12] = [
    ("January", "01"),
    ("February", "02"),
    ("March", "03"),
    ("April", "04"),
    ("May", "05"),
    ("June", "06"),
    ("July", "07"),
    ("August", "08"),
    ("September", "09"),
    ("October", "10"),
    ("November", "11"),
    ("December", "12"),
];

/// Two-digit code for an English month name; unknown names map to `01`
pub fn month_code(month_name: &str) -> &'static str {
    MONTH_CODES
        .iter()
        .find(|(name, _)| *name == month_name)
        .map(|(_, code)| *code)
        .unwrap_or("01")
}

/// Build `{partner}-{MM}-{YY}`, e.g. `p123-03-25`
///
/// Returns an empty string when any part is missing. `YY` is the last two
/// characters of the year as written.
pub fn format_reference(partner_id: &str, service_month: &str, service_year: impl Display) -> String {
    let year = service_year.to_string();
    if partner_id.is_empty() || service_month.is_empty() || year.is_empty() {
        return String::new();
    }

    let yy: String = year.chars().skip(year.chars().count().saturating_sub(2)).collect();
    format!("{}-{}-{}", partner_id, month_code(service_month), yy)
}

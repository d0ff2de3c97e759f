//! Validation and masking utilities for invoice fields

use bigdecimal::BigDecimal;
use regex::Regex;
use std::sync::LazyLock;

use crate::tax::try_parse_amount;
use crate::types::*;

static GSTIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}[A-Za-z0-9]{13}$").expect("valid GSTIN regex"));

static INVOICE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-/]{1,16}$").expect("valid invoice number regex"));

/// Validate the shape of a GSTIN (two-digit state code, then 13 alphanumerics)
///
/// This is a format check only; the checksum character is not verified.
pub fn validate_gstin(gstin: &str) -> Result<(), ValidationError> {
    if GSTIN_PATTERN.is_match(gstin) {
        Ok(())
    } else {
        Err(ValidationError::InvalidGstin(gstin.to_string()))
    }
}

/// Validate a hand-entered invoice number
pub fn validate_invoice_number(invoice_number: &str) -> Result<(), ValidationError> {
    if INVOICE_NUMBER_PATTERN.is_match(invoice_number) {
        Ok(())
    } else {
        Err(ValidationError::InvalidInvoiceNumber(invoice_number.to_string()))
    }
}

/// Validate that a (possibly currency-formatted) amount is positive
pub fn validate_positive_amount(amount: &str) -> Result<(), ValidationError> {
    match try_parse_amount(amount) {
        Some(value) if value > BigDecimal::from(0) => Ok(()),
        _ => Err(ValidationError::InvalidAmount(amount.to_string())),
    }
}

/// Check the fields an invoice cannot be generated without
///
/// The invoice number is optional and only format-checked when set.
pub fn validate_invoice_fields(data: &InvoiceData) -> Result<(), ValidationError> {
    let required = [
        ("Vendor_name", &data.vendor_name),
        ("STATE", &data.state),
        ("GSTN", &data.gstn),
        ("INVOICE_DATE", &data.invoice_date),
        ("BASE_AMOUNT", &data.base_amount),
        ("SERVICE_DESCRIPTION", &data.service_description),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(name.to_string()));
        }
    }

    validate_gstin(data.gstn.trim())?;
    validate_positive_amount(&data.base_amount)?;
    if !data.invoice_no.trim().is_empty() {
        validate_invoice_number(data.invoice_no.trim())?;
    }
    Ok(())
}

/// Mask all but the last `visible` digits, e.g. `XXXXXXXX1234`
///
/// Non-digits are dropped first. Values no longer than `visible` are returned
/// unmasked.
pub fn mask_account_number(value: &str, visible: usize) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= visible {
        return digits.into_iter().collect();
    }
    let hidden = digits.len() - visible;
    "X".repeat(hidden) + &digits[hidden..].iter().collect::<String>()
}

/// Mask an IFSC code, keeping the bank code and the last branch character,
/// e.g. `HDFC0001234` becomes `HDFCXXXX4`
pub fn mask_ifsc(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return value.to_string();
    }
    let bank_code: String = chars[..4].iter().collect();
    format!("{}XXXX{}", bank_code, chars[chars.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("29ABICS0071M1ZY").is_ok());
        assert!(validate_gstin("27abcde1234f1z5").is_ok());
        assert!(validate_gstin("2ABICS0071M1ZY").is_err());
        assert!(validate_gstin("AB29CS0071M1ZY1").is_err());
        assert!(validate_gstin("29ABICS0071M1Z").is_err());
        assert!(validate_gstin("").is_err());
    }

    #[test]
    fn test_validate_invoice_number() {
        assert!(validate_invoice_number("INV-202503001").is_ok());
        assert!(validate_invoice_number("ST/24-25/001").is_ok());
        assert!(validate_invoice_number("INV 001").is_err());
        assert!(validate_invoice_number("INV-2025030010001").is_err());
        assert!(validate_invoice_number("").is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("₹ 1,000.00").is_ok());
        assert!(validate_positive_amount("0").is_err());
        assert!(validate_positive_amount("-5").is_err());
        assert!(validate_positive_amount("abc").is_err());
    }

    #[test]
    fn test_validate_invoice_fields() {
        let mut data = InvoiceData {
            vendor_name: "Acme Traders".to_string(),
            state: "Maharashtra".to_string(),
            gstn: "27ABCDE1234F1Z5".to_string(),
            invoice_date: "2025-03-15".to_string(),
            base_amount: "1000".to_string(),
            ..InvoiceData::default()
        };
        assert_eq!(
            validate_invoice_fields(&data),
            Err(ValidationError::MissingField("SERVICE_DESCRIPTION".to_string()))
        );

        data.service_description = "Consulting-March-2025".to_string();
        assert_eq!(validate_invoice_fields(&data), Ok(()));

        data.invoice_no = "INV 1".to_string();
        assert!(matches!(
            validate_invoice_fields(&data),
            Err(ValidationError::InvalidInvoiceNumber(_))
        ));

        data.invoice_no.clear();
        data.vendor_name = "  ".to_string();
        assert_eq!(
            validate_invoice_fields(&data),
            Err(ValidationError::MissingField("Vendor_name".to_string()))
        );
    }

    #[test]
    fn test_masking() {
        assert_eq!(mask_account_number("1234 5678 9012", 4), "XXXXXXXX9012");
        assert_eq!(mask_account_number("123", 4), "123");
        assert_eq!(mask_account_number("", 4), "");
        assert_eq!(mask_ifsc("HDFC0001234"), "HDFCXXXX4");
        assert_eq!(mask_ifsc("HDF"), "HDF");
    }
}

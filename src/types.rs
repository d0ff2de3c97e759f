//! Core types and data structures for the invoice engine

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Invoice number pattern used when the settings carry none
pub const DEFAULT_INVOICE_FORMAT: &str = "INV-{YYYY}{MM}{SEQ}";
/// Prefix used when the settings carry none
pub const DEFAULT_INVOICE_PREFIX: &str = "INV-";
/// Zero-padding width for `{SEQ}`
pub const DEFAULT_SEQUENCE_PADDING: usize = 3;
/// First sequence value of a fresh counter
pub const DEFAULT_STARTING_SEQUENCE: u64 = 1;
/// Default HSN/SAC code (financial intermediation services)
pub const DEFAULT_HSN_SAC: &str = "998719";

/// How often the invoice sequence counter starts over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetPeriod {
    /// A new counter every calendar month (`YYYY-MM`)
    Monthly,
    /// A new counter every calendar or financial year (`YYYY` / `YYYY-YY`)
    Yearly,
    /// A single counter for the lifetime of the business (`global`)
    Never,
}

/// Business configuration persisted under `businessSettings`
///
/// Every field has a default so a partial or hand-edited record still loads.
/// Numeric fields accept either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessSettings {
    pub company_name: String,
    /// The business's own GSTIN; its two-digit prefix is the home state
    pub gstn: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    #[serde(rename = "hsnSacCode", alias = "hsnSac")]
    pub hsn_sac: String,
    /// Default tax rate percentage (e.g. 18 for 18%)
    #[serde(deserialize_with = "lenient_rate")]
    pub tax_rate: BigDecimal,
    pub invoice_number_format: String,
    pub invoice_number_prefix: String,
    pub invoice_number_suffix: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub invoice_number_sequence: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub sequence_padding: u64,
    pub use_financial_year: bool,
    pub reset_sequence_monthly: bool,
    pub reset_sequence_yearly: bool,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            company_name: "Salter Technologies Private Limited".to_string(),
            gstn: "29ABICS0071M1ZY".to_string(),
            address_line1: "T-9 Shirping Chirping Woods, Villament103, Tower-9, Haralur Road,"
                .to_string(),
            address_line2: "Shubh Enclave, Ambalipura, Bengaluru,".to_string(),
            address_line3: "Bengaluru Urban, Karnataka, 560102".to_string(),
            hsn_sac: DEFAULT_HSN_SAC.to_string(),
            tax_rate: BigDecimal::from(18),
            invoice_number_format: DEFAULT_INVOICE_FORMAT.to_string(),
            invoice_number_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            invoice_number_suffix: String::new(),
            invoice_number_sequence: DEFAULT_STARTING_SEQUENCE,
            sequence_padding: DEFAULT_SEQUENCE_PADDING as u64,
            use_financial_year: false,
            reset_sequence_monthly: true,
            reset_sequence_yearly: false,
        }
    }
}

impl BusinessSettings {
    /// The effective reset period. Monthly wins if both flags are set.
    pub fn reset_period(&self) -> ResetPeriod {
        if self.reset_sequence_monthly {
            ResetPeriod::Monthly
        } else if self.reset_sequence_yearly {
            ResetPeriod::Yearly
        } else {
            ResetPeriod::Never
        }
    }

    /// Set the reset period, keeping the monthly and yearly flags exclusive
    pub fn set_reset_period(&mut self, period: ResetPeriod) {
        self.reset_sequence_monthly = period == ResetPeriod::Monthly;
        self.reset_sequence_yearly = period == ResetPeriod::Yearly;
    }

    /// Builder form of [`set_reset_period`](Self::set_reset_period)
    pub fn with_reset_period(mut self, period: ResetPeriod) -> Self {
        self.set_reset_period(period);
        self
    }

    /// Repair a record where both reset flags are enabled
    pub fn normalized(mut self) -> Self {
        let period = self.reset_period();
        self.set_reset_period(period);
        self
    }

    /// Format pattern, falling back to the default when blank
    pub fn format_pattern(&self) -> &str {
        if self.invoice_number_format.trim().is_empty() {
            DEFAULT_INVOICE_FORMAT
        } else {
            &self.invoice_number_format
        }
    }

    /// Starting sequence for a fresh counter; zero means unset
    pub fn starting_sequence(&self) -> u64 {
        if self.invoice_number_sequence == 0 {
            DEFAULT_STARTING_SEQUENCE
        } else {
            self.invoice_number_sequence
        }
    }

    /// Zero-padding width for `{SEQ}`; zero means unset
    pub fn padding(&self) -> usize {
        match usize::try_from(self.sequence_padding) {
            Ok(0) | Err(_) => DEFAULT_SEQUENCE_PADDING,
            Ok(width) => width,
        }
    }
}

/// Payment state of a generated invoice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Label printed on the invoice
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Partial => "PARTIALLY PAID",
            PaymentStatus::Paid => "PAID",
        }
    }

    /// CSS class used by the invoice template
    pub fn css_class(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "payment-status-unpaid",
            PaymentStatus::Partial => "payment-status-partial",
            PaymentStatus::Paid => "payment-status-paid",
        }
    }
}

/// Details recorded alongside a payment status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub payment_date: String,
    pub payment_reference: String,
    /// `bank_transfer`, `cash`, `cheque`, `upi`, `online` or `other`
    pub payment_type: String,
    pub notes: String,
}

/// Input to a payment status update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    #[serde(flatten)]
    pub details: PaymentDetails,
}

impl PaymentInfo {
    pub fn new(status: PaymentStatus, details: PaymentDetails) -> Self {
        Self { status, details }
    }
}

/// Summary record persisted under `generatedInvoices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Internal identifier, stable across regenerations of the same invoice number
    pub id: String,
    pub invoice_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_gst: String,
    /// Base amount as a plain numeric string
    #[serde(default)]
    pub amount: String,
    /// Tax-inclusive total as a plain numeric string
    #[serde(default)]
    pub total_amount: String,
    #[serde(default)]
    pub reference_number: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_details: PaymentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Serialized [`InvoiceData`] the record was generated from
    #[serde(default)]
    pub full_data: String,
}

/// Complete field set of one invoice as handed to the renderer
///
/// Field names follow the template placeholders. Fields this crate does not
/// interpret are kept in `extra` and survive a save/load cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    #[serde(rename = "INVOICE_NO", default, deserialize_with = "lenient_string")]
    pub invoice_no: String,
    #[serde(rename = "INVOICE_DATE", default, deserialize_with = "lenient_string")]
    pub invoice_date: String,
    #[serde(rename = "Vendor_name", default, deserialize_with = "lenient_string")]
    pub vendor_name: String,
    #[serde(rename = "GSTN", default, deserialize_with = "lenient_string")]
    pub gstn: String,
    #[serde(rename = "STATE", default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(rename = "PLACE_OF_SUPPLY", default, deserialize_with = "lenient_string")]
    pub place_of_supply: String,
    #[serde(default)]
    pub is_igst: bool,

    #[serde(rename = "BASE_AMOUNT", default, deserialize_with = "lenient_string")]
    pub base_amount: String,
    #[serde(
        rename = "original_BASE_AMOUNT",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_base_amount: Option<String>,
    #[serde(
        rename = "TAX_RATE",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_rate: Option<String>,
    #[serde(
        rename = "ADJUSTMENT",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjustment: Option<String>,
    #[serde(rename = "CGST_AMT", default, deserialize_with = "lenient_string")]
    pub cgst_amt: String,
    #[serde(rename = "SGST_AMT", default, deserialize_with = "lenient_string")]
    pub sgst_amt: String,
    #[serde(rename = "IGST_AMT", default, deserialize_with = "lenient_string")]
    pub igst_amt: String,
    #[serde(rename = "TOTAL_TAX", default, deserialize_with = "lenient_string")]
    pub total_tax: String,
    #[serde(rename = "TOTAL_WITH_TAX", default, deserialize_with = "lenient_string")]
    pub total_with_tax: String,
    #[serde(rename = "CGST_RATE", default, skip_serializing_if = "Option::is_none")]
    pub cgst_rate: Option<String>,
    #[serde(rename = "SGST_RATE", default, skip_serializing_if = "Option::is_none")]
    pub sgst_rate: Option<String>,
    #[serde(rename = "IGST_RATE", default, skip_serializing_if = "Option::is_none")]
    pub igst_rate: Option<String>,
    #[serde(rename = "TAX_NOTE", default, deserialize_with = "lenient_string")]
    pub tax_note: String,
    #[serde(rename = "AMOUNT_IN_WORDS", default, deserialize_with = "lenient_string")]
    pub amount_in_words: String,

    #[serde(rename = "REFERENCE_NO", default, deserialize_with = "lenient_string")]
    pub reference_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub partner_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_month: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_year: String,
    #[serde(rename = "SERVICE_DESCRIPTION", default, deserialize_with = "lenient_string")]
    pub service_description: String,
    #[serde(rename = "HSN_SAC", default, deserialize_with = "lenient_string")]
    pub hsn_sac: String,

    #[serde(rename = "Bank_name", default, deserialize_with = "lenient_string")]
    pub bank_ifsc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub partner_bank_account: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub masked_account_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub masked_ifsc: String,

    #[serde(rename = "CLIENT_NAME", default, deserialize_with = "lenient_string")]
    pub client_name: String,
    #[serde(rename = "CLIENT_GSTN", default, deserialize_with = "lenient_string")]
    pub client_gstn: String,
    #[serde(rename = "CLIENT_ADDRESS_LINE1", default, deserialize_with = "lenient_string")]
    pub client_address_line1: String,
    #[serde(rename = "CLIENT_ADDRESS_LINE2", default, deserialize_with = "lenient_string")]
    pub client_address_line2: String,
    #[serde(rename = "CLIENT_ADDRESS_LINE3", default, deserialize_with = "lenient_string")]
    pub client_address_line3: String,

    #[serde(rename = "PAYMENT_STATUS_TEXT", default, deserialize_with = "lenient_string")]
    pub payment_status_text: String,
    #[serde(rename = "PAYMENT_STATUS_CLASS", default, deserialize_with = "lenient_string")]
    pub payment_status_class: String,
    #[serde(rename = "PAYMENT_DETAILS_TEXT", default, deserialize_with = "lenient_string")]
    pub payment_details_text: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Storage-layer errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt data under key '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by the invoice field validators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required: {0}")]
    MissingField(String),
    #[error("Please enter a valid GSTIN: {0}")]
    InvalidGstin(String),
    #[error("Please enter a valid Invoice Number: {0}")]
    InvalidInvoiceNumber(String),
    #[error("Amount must be a positive number: {0}")]
    InvalidAmount(String),
    #[error("Invoice number already issued: {0}")]
    DuplicateInvoiceNumber(String),
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

// Unparseable values become 0, which the accessors treat as "unset".
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0))
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value)
        .and_then(|s| BigDecimal::from_str(s.trim()).ok())
        .unwrap_or_else(|| BigDecimal::from(18)))
}

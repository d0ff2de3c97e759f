//! # GST Invoice Core
//!
//! Invoice numbering, GST calculation and invoice record keeping for Indian
//! service invoices.
//!
//! ## Features
//!
//! - **Invoice numbering**: Placeholder patterns with monthly, yearly, financial-year or no sequence reset, and collision avoidance against issued numbers
//! - **GST calculations**: CGST/SGST for intrastate supply, IGST for interstate supply, decided from GSTIN state codes
//! - **Reference numbers**: Deterministic `{partner}-{MM}-{YY}` codes from the service period
//! - **Invoice records**: Summaries of generated invoices that keep their payment state across regeneration
//! - **Storage abstraction**: Works over any key-value store holding JSON documents
//!
//! ## Quick Start
//!
//! ```rust
//! use gst_invoice_core::{InvoiceData, InvoiceEngine, MemoryStore};
//! use chrono::NaiveDate;
//!
//! let mut engine = InvoiceEngine::new(MemoryStore::new());
//! let draft = InvoiceData {
//!     vendor_name: "Acme Traders".to_string(),
//!     gstn: "27ABCDE1234F1Z5".to_string(),
//!     base_amount: "1000".to_string(),
//!     ..InvoiceData::default()
//! };
//!
//! let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
//! let generated = engine.generate(draft, today);
//! assert_eq!(generated.data.invoice_no, "INV-202503001");
//! assert_eq!(generated.data.igst_amt, "₹ 180.00");
//! assert!(generated.saved);
//! ```

pub mod engine;
pub mod invoice;
pub mod numbering;
pub mod records;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use engine::*;
pub use invoice::*;
pub use numbering::*;
pub use records::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::*;

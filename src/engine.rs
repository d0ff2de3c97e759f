//! Invoice engine that coordinates settings, numbering, tax and records

use chrono::NaiveDate;
use tracing::{debug, error};

use crate::invoice::prepare_invoice_data;
use crate::numbering::*;
use crate::records::InvoiceRecordStore;
use crate::tax::*;
use crate::traits::*;
use crate::types::*;
use crate::utils::{validate_invoice_number, SequenceCounterMap};

/// A prepared invoice and whether its record was stored
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInvoice {
    pub data: InvoiceData,
    pub saved: bool,
}

/// Main invoice system over one key-value store
///
/// Settings and counters are loaded from the store at the start of every
/// operation, so changes saved elsewhere are picked up on the next call.
pub struct InvoiceEngine<S: KeyValueStore> {
    storage: S,
    records: InvoiceRecordStore<S>,
}

impl<S: KeyValueStore + Clone> InvoiceEngine<S> {
    /// Create a new engine with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            records: InvoiceRecordStore::new(storage.clone()),
            storage,
        }
    }

    /// Record store backing this engine
    pub fn records(&self) -> &InvoiceRecordStore<S> {
        &self.records
    }

    // Settings
    /// Current business settings, or the defaults if none are stored
    pub fn settings(&self) -> BusinessSettings {
        self.storage
            .read_json_or_default::<BusinessSettings>(BUSINESS_SETTINGS_KEY)
            .normalized()
    }

    /// Persist business settings, returning what was stored
    pub fn save_settings(&mut self, settings: BusinessSettings) -> StoreResult<BusinessSettings> {
        let settings = settings.normalized();
        self.storage.write_json(BUSINESS_SETTINGS_KEY, &settings)?;
        debug!(format = %settings.format_pattern(), "saved business settings");
        Ok(settings)
    }

    /// Persisted sequence counters
    pub fn sequences(&self) -> SequenceCounterMap {
        self.storage.read_json_or_default(INVOICE_SEQUENCES_KEY)
    }

    // Numbering
    /// Allocate the next invoice number for `today` and persist the counter
    pub fn next_invoice_number(&mut self, today: NaiveDate) -> String {
        let settings = self.settings();
        self.allocate_with(&settings, today)
    }

    /// Preview the next invoice number without consuming it
    pub fn peek_invoice_number(&self, today: NaiveDate) -> String {
        let settings = self.settings();
        InvoiceNumberAllocator::new(&settings).peek(
            today,
            &self.sequences(),
            &self.records.identity_set(),
        )
    }

    fn allocate_with(&mut self, settings: &BusinessSettings, today: NaiveDate) -> String {
        let mut counters = self.sequences();
        let issued = self.records.identity_set();
        let invoice_number =
            InvoiceNumberAllocator::new(settings).allocate(today, &mut counters, &issued);

        if let Err(error) = self.storage.write_json(INVOICE_SEQUENCES_KEY, &counters) {
            error!(%invoice_number, %error, "error saving invoice sequence counters");
        }
        invoice_number
    }

    /// Check a hand-entered invoice number for format and reuse
    pub fn check_manual_invoice_number(&self, invoice_number: &str) -> Result<(), ValidationError> {
        validate_invoice_number(invoice_number)?;
        if self.records.identity_set().contains(invoice_number) {
            return Err(ValidationError::DuplicateInvoiceNumber(
                invoice_number.to_string(),
            ));
        }
        Ok(())
    }

    // Preparation
    /// Fill every derived field of a draft invoice
    ///
    /// The tax mode, state and place of supply are replaced from the vendor
    /// GSTIN when it carries a state code. An empty invoice number is allocated
    /// from the counters. The reference number is rebuilt whenever partner,
    /// month and year are all present, otherwise the draft's value is kept.
    pub fn prepare(&mut self, draft: InvoiceData, today: NaiveDate) -> InvoiceData {
        let settings = self.settings();
        let mut data = draft;

        if state_code(&data.gstn).is_some() {
            let mode = determine_tax_mode(&data.gstn, &settings.gstn);
            data.is_igst = mode.is_igst;
            data.state = mode.vendor_state;
            data.place_of_supply = place_of_supply(&data.gstn);
        }
        if data.hsn_sac.is_empty() {
            data.hsn_sac = settings.hsn_sac.clone();
        }
        if data.invoice_no.trim().is_empty() {
            data.invoice_no = self.allocate_with(&settings, today);
        }

        let reference = format_reference(&data.partner_id, &data.service_month, &data.service_year);
        if !reference.is_empty() {
            data.reference_no = reference;
        }

        let existing = self.records.find_by_number(&data.invoice_no);
        prepare_invoice_data(data, &settings, existing.as_ref())
    }

    /// Prepare a draft and store its record
    pub fn generate(&mut self, draft: InvoiceData, today: NaiveDate) -> GeneratedInvoice {
        let data = self.prepare(draft, today);
        let saved = self.records.save_generated_invoice(&data);
        GeneratedInvoice { data, saved }
    }

    // Records
    /// Save or update the summary of a generated invoice
    pub fn save_generated_invoice(&mut self, data: &InvoiceData) -> bool {
        self.records.save_generated_invoice(data)
    }

    /// Replace the payment state of the record with internal `id`
    pub fn update_invoice_payment_status(&mut self, id: &str, payment: &PaymentInfo) -> bool {
        self.records.update_invoice_payment_status(id, payment)
    }

    /// All generated invoice records
    pub fn list_invoices(&self) -> Vec<InvoiceRecord> {
        self.records.list()
    }

    /// Find a record by invoice number
    pub fn find_invoice(&self, invoice_number: &str) -> Option<InvoiceRecord> {
        self.records.find_by_number(invoice_number)
    }

    /// Delete records by internal id
    pub fn delete_invoices(&mut self, ids: &[&str]) -> StoreResult<usize> {
        self.records.delete_invoices(ids)
    }

    /// Repair records saved without a base amount
    pub fn migrate_base_amounts(&mut self) -> StoreResult<usize> {
        self.records.migrate_base_amounts()
    }
}

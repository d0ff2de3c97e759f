//! Persistence of generated invoice summaries and their payment state

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::numbering::InvoiceIdentitySet;
use crate::tax::{strip_currency, try_parse_amount, RUPEE_SYMBOL};
use crate::traits::*;
use crate::types::*;

/// Whether an upsert created a record or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Invoice records in persisted order, indexed by invoice number
#[derive(Debug, Clone, Default)]
pub struct InvoiceIndex {
    records: Vec<InvoiceRecord>,
    by_number: HashMap<String, usize>,
}

impl InvoiceIndex {
    /// Index existing records. When a number occurs twice the first record wins.
    pub fn new(records: Vec<InvoiceRecord>) -> Self {
        let mut by_number = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_number
                .entry(record.invoice_number.clone())
                .or_insert(position);
        }
        Self { records, by_number }
    }

    pub fn get(&self, invoice_number: &str) -> Option<&InvoiceRecord> {
        self.by_number
            .get(invoice_number)
            .and_then(|position| self.records.get(*position))
    }

    /// Insert `record`, or merge it over the record with the same invoice number
    pub fn upsert(&mut self, record: InvoiceRecord, now: DateTime<Utc>) -> Upsert {
        match self.by_number.get(&record.invoice_number) {
            Some(&position) => {
                let merged = merge_regenerated(&self.records[position], record, now);
                self.records[position] = merged;
                Upsert::Updated
            }
            None => {
                self.by_number
                    .insert(record.invoice_number.clone(), self.records.len());
                self.records.push(record);
                Upsert::Inserted
            }
        }
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<InvoiceRecord> {
        self.records
    }
}

/// Merge a regenerated record over the stored one
///
/// The stored `id`, `status` and `payment_details` survive; everything else
/// comes from `incoming`, and `updated_at` is set to `now`.
pub fn merge_regenerated(
    existing: &InvoiceRecord,
    incoming: InvoiceRecord,
    now: DateTime<Utc>,
) -> InvoiceRecord {
    InvoiceRecord {
        id: existing.id.clone(),
        status: existing.status,
        payment_details: existing.payment_details.clone(),
        updated_at: now,
        ..incoming
    }
}

/// Plain numeric string for a possibly currency-formatted amount, `"0"` if it
/// does not parse
pub fn normalize_amount(value: &str) -> String {
    let stripped = strip_currency(value);
    if try_parse_amount(&stripped).is_some() {
        stripped
    } else {
        "0".to_string()
    }
}

/// Build the summary record for freshly generated invoice data
///
/// The full data is serialized into `full_data`. If the displayed base amount
/// carries a currency marker, its numeric value is stamped into
/// `original_BASE_AMOUNT` first so later edits can recover it.
pub fn summarize_invoice(data: &InvoiceData, now: DateTime<Utc>) -> StoreResult<InvoiceRecord> {
    let amount = if !data.base_amount.is_empty() {
        normalize_amount(&data.base_amount)
    } else if let Some(original) = &data.original_base_amount {
        original.clone()
    } else {
        "0".to_string()
    };
    let total_amount = if data.total_with_tax.is_empty() {
        "0".to_string()
    } else {
        normalize_amount(&data.total_with_tax)
    };

    let mut stored = data.clone();
    if stored.base_amount.contains(RUPEE_SYMBOL) {
        stored.original_base_amount = Some(strip_currency(&stored.base_amount));
    }

    Ok(InvoiceRecord {
        id: Uuid::now_v7().to_string(),
        invoice_number: data.invoice_no.clone(),
        date: data.invoice_date.clone(),
        vendor_name: data.vendor_name.clone(),
        vendor_gst: data.gstn.clone(),
        amount,
        total_amount,
        reference_number: data.reference_no.clone(),
        status: PaymentStatus::Unpaid,
        payment_details: PaymentDetails::default(),
        created_at: now,
        updated_at: now,
        full_data: serde_json::to_string(&stored)?,
    })
}

/// Store for generated invoice records, persisted under `generatedInvoices`
pub struct InvoiceRecordStore<S: KeyValueStore> {
    pub(crate) storage: S,
}

impl<S: KeyValueStore> InvoiceRecordStore<S> {
    /// Create a new record store over the given storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All records in persisted order; unreadable storage reads as empty
    pub fn list(&self) -> Vec<InvoiceRecord> {
        self.storage.read_json_or_default(GENERATED_INVOICES_KEY)
    }

    /// Invoice numbers issued so far
    pub fn identity_set(&self) -> InvoiceIdentitySet {
        InvoiceIdentitySet::from_records(&self.list())
    }

    pub fn find_by_number(&self, invoice_number: &str) -> Option<InvoiceRecord> {
        InvoiceIndex::new(self.list()).get(invoice_number).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<InvoiceRecord> {
        self.list().into_iter().find(|record| record.id == id)
    }

    /// Save or update the summary of a generated invoice
    ///
    /// Regenerating an existing invoice number keeps its id and payment
    /// state. Returns false, after logging the cause, if the record could not
    /// be stored.
    pub fn save_generated_invoice(&mut self, data: &InvoiceData) -> bool {
        if data.invoice_no.trim().is_empty() {
            warn!("refusing to save an invoice without an invoice number");
            return false;
        }

        match self.try_save_generated_invoice(data) {
            Ok(outcome) => {
                debug!(invoice_number = %data.invoice_no, ?outcome, "saved generated invoice");
                true
            }
            Err(error) => {
                error!(invoice_number = %data.invoice_no, %error, "error saving generated invoice");
                false
            }
        }
    }

    fn try_save_generated_invoice(&mut self, data: &InvoiceData) -> StoreResult<Upsert> {
        let now = Utc::now();
        let records: Vec<InvoiceRecord> = self
            .storage
            .read_json(GENERATED_INVOICES_KEY)?
            .unwrap_or_default();

        let mut index = InvoiceIndex::new(records);
        let outcome = index.upsert(summarize_invoice(data, now)?, now);
        self.storage
            .write_json(GENERATED_INVOICES_KEY, index.records())?;
        Ok(outcome)
    }

    /// Replace the payment status and details of the record with internal `id`
    ///
    /// Details are overwritten as a whole, not merged. Returns false if there
    /// is no such record or nothing has been stored yet.
    pub fn update_invoice_payment_status(&mut self, id: &str, payment: &PaymentInfo) -> bool {
        if id.is_empty() {
            return false;
        }

        match self.try_update_payment_status(id, payment) {
            Ok(found) => found,
            Err(error) => {
                error!(id, %error, "error updating invoice payment status");
                false
            }
        }
    }

    fn try_update_payment_status(&mut self, id: &str, payment: &PaymentInfo) -> StoreResult<bool> {
        let Some(mut records) = self
            .storage
            .read_json::<Vec<InvoiceRecord>>(GENERATED_INVOICES_KEY)?
        else {
            return Ok(false);
        };
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            return Ok(false);
        };

        record.status = payment.status;
        record.payment_details = payment.details.clone();
        record.updated_at = Utc::now();

        self.storage.write_json(GENERATED_INVOICES_KEY, &records)?;
        Ok(true)
    }

    /// Delete the records with the given internal ids, returning how many
    /// were removed
    pub fn delete_invoices(&mut self, ids: &[&str]) -> StoreResult<usize> {
        let Some(records) = self
            .storage
            .read_json::<Vec<InvoiceRecord>>(GENERATED_INVOICES_KEY)?
        else {
            return Ok(0);
        };

        let before = records.len();
        let kept: Vec<InvoiceRecord> = records
            .into_iter()
            .filter(|record| !ids.contains(&record.id.as_str()))
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.storage.write_json(GENERATED_INVOICES_KEY, &kept)?;
        }
        Ok(removed)
    }

    /// Repair records saved without a base amount
    ///
    /// For every record whose `amount` is empty or `"0"`, the base amount is
    /// recovered from its full data and `original_BASE_AMOUNT` is stamped
    /// back. Returns the number of records changed.
    pub fn migrate_base_amounts(&mut self) -> StoreResult<usize> {
        let Some(mut records) = self
            .storage
            .read_json::<Vec<InvoiceRecord>>(GENERATED_INVOICES_KEY)?
        else {
            return Ok(0);
        };

        let mut updated = 0;
        for record in records.iter_mut() {
            if record.full_data.is_empty() || !(record.amount.is_empty() || record.amount == "0") {
                continue;
            }
            let mut data: InvoiceData = match serde_json::from_str(&record.full_data) {
                Ok(data) => data,
                Err(error) => {
                    warn!(invoice_number = %record.invoice_number, %error, "skipping record with unreadable full data");
                    continue;
                }
            };

            let base_amount = if let Some(original) = data.original_base_amount.clone() {
                original
            } else if !data.base_amount.is_empty() {
                let base_amount = normalize_amount(&data.base_amount);
                data.original_base_amount = Some(base_amount.clone());
                record.full_data = serde_json::to_string(&data)?;
                base_amount
            } else {
                continue;
            };

            if record.total_amount.is_empty() {
                record.total_amount = base_amount.clone();
            }
            record.amount = base_amount;
            updated += 1;
        }

        if updated > 0 {
            self.storage.write_json(GENERATED_INVOICES_KEY, &records)?;
            debug!(updated, "updated invoice amounts to use base amount");
        }
        Ok(updated)
    }
}

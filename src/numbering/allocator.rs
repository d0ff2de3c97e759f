//! Invoice number allocation with configurable reset periods

use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, error, warn};

use crate::traits::SequenceStore;
use crate::types::*;

/// Attempts made before giving up on the sequence and issuing a timestamp
/// based number
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 100;

/// Sequence key used when the counter never resets
pub const GLOBAL_SEQUENCE_KEY: &str = "global";

/// Invoice numbers already issued, used for collision detection only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceIdentitySet {
    numbers: HashSet<String>,
}

impl InvoiceIdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the invoice numbers of persisted records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InvoiceRecord>) -> Self {
        records
            .into_iter()
            .map(|record| record.invoice_number.clone())
            .collect()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.numbers.contains(number)
    }

    /// Record a number as issued. Returns false if it was already present.
    pub fn insert(&mut self, number: impl Into<String>) -> bool {
        self.numbers.insert(number.into())
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl FromIterator<String> for InvoiceIdentitySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            numbers: iter.into_iter().collect(),
        }
    }
}

/// Date components substituted into the number pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    /// Four-digit year
    pub yyyy: String,
    /// Last two digits of the year
    pub yy: String,
    /// Financial year label (`2024-25`) when enabled, else the four-digit year
    pub fy: String,
    pub mm: String,
    pub dd: String,
}

impl DateParts {
    pub fn new(date: NaiveDate, use_financial_year: bool) -> Self {
        let yyyy = format!("{:04}", date.year());
        let yy = yyyy.chars().skip(yyyy.chars().count().saturating_sub(2)).collect();
        let fy = if use_financial_year {
            financial_year_label(date)
        } else {
            yyyy.clone()
        };
        Self {
            yyyy,
            yy,
            fy,
            mm: format!("{:02}", date.month()),
            dd: format!("{:02}", date.day()),
        }
    }
}

/// Indian financial year label (April to March), e.g. `2024-25`
///
/// January to March belong to the financial year that began the previous
/// April.
pub fn financial_year_label(date: NaiveDate) -> String {
    let start_year = if date.month() < 4 {
        date.year() - 1
    } else {
        date.year()
    };
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}

/// Sequence key the counter for `date` lives under
pub fn sequence_key(settings: &BusinessSettings, date: NaiveDate) -> String {
    match settings.reset_period() {
        ResetPeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
        ResetPeriod::Yearly if settings.use_financial_year => financial_year_label(date),
        ResetPeriod::Yearly => format!("{:04}", date.year()),
        ResetPeriod::Never => GLOBAL_SEQUENCE_KEY.to_string(),
    }
}

/// Substitute the pattern placeholders for one sequence value
///
/// Supported placeholders: `{YYYY} {YY} {FY} {MM} {DD} {SEQ} {PREFIX}
/// {SUFFIX}`. A configured prefix or suffix that the pattern neither places
/// with a placeholder nor already contains is added to the outside.
pub fn render_invoice_number(settings: &BusinessSettings, parts: &DateParts, sequence: u64) -> String {
    let pattern = settings.format_pattern();
    let prefix = settings.invoice_number_prefix.as_str();
    let suffix = settings.invoice_number_suffix.as_str();
    let padded = format!("{:0>width$}", sequence, width = settings.padding());

    let mut number = pattern
        .replace("{YYYY}", &parts.yyyy)
        .replace("{YY}", &parts.yy)
        .replace("{FY}", &parts.fy)
        .replace("{MM}", &parts.mm)
        .replace("{DD}", &parts.dd)
        .replace("{SEQ}", &padded)
        .replace("{PREFIX}", prefix)
        .replace("{SUFFIX}", suffix);

    if !prefix.is_empty() && !number.contains(prefix) && !pattern.contains("{PREFIX}") {
        number.insert_str(0, prefix);
    }
    if !suffix.is_empty() && !number.contains(suffix) && !pattern.contains("{SUFFIX}") {
        number.push_str(suffix);
    }

    number
}

/// Outcome of one allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub invoice_number: String,
    pub sequence_key: String,
    /// Sequence value embedded in the number; `None` for the timestamp fallback
    pub sequence: Option<u64>,
    /// Numbers skipped because they were already issued
    pub collisions: u32,
}

/// Generates formatted, collision-free invoice numbers
///
/// The pattern decides what a number looks like, the counter decides the
/// allocation order and the identity set guards against numbers that were
/// issued before (imported, edited by hand, or produced by a pattern too
/// narrow for the counter).
#[derive(Debug, Clone)]
pub struct InvoiceNumberAllocator<'a> {
    settings: &'a BusinessSettings,
}

impl<'a> InvoiceNumberAllocator<'a> {
    pub fn new(settings: &'a BusinessSettings) -> Self {
        Self { settings }
    }

    /// Allocate the next number for `date` and advance the counter
    pub fn allocate<Q: SequenceStore + ?Sized>(
        &self,
        date: NaiveDate,
        counters: &mut Q,
        issued: &InvoiceIdentitySet,
    ) -> String {
        self.allocate_detailed(date, counters, issued).invoice_number
    }

    /// Like [`allocate`](Self::allocate) but reports how the number was found
    ///
    /// The counter is persisted as the last value tried plus one, whether or
    /// not the loop found a free number.
    pub fn allocate_detailed<Q: SequenceStore + ?Sized>(
        &self,
        date: NaiveDate,
        counters: &mut Q,
        issued: &InvoiceIdentitySet,
    ) -> Allocation {
        let key = sequence_key(self.settings, date);
        let (allocation, last_tried) = self.search(date, &key, &*counters, issued);
        counters.set(&key, last_tried.saturating_add(1));

        debug!(
            invoice_number = %allocation.invoice_number,
            sequence_key = %key,
            collisions = allocation.collisions,
            "allocated invoice number"
        );
        allocation
    }

    /// The number the next allocation would return, without advancing the
    /// counter
    pub fn peek<Q: SequenceStore + ?Sized>(
        &self,
        date: NaiveDate,
        counters: &Q,
        issued: &InvoiceIdentitySet,
    ) -> String {
        let key = sequence_key(self.settings, date);
        self.search(date, &key, counters, issued).0.invoice_number
    }

    fn search<Q: SequenceStore + ?Sized>(
        &self,
        date: NaiveDate,
        key: &str,
        counters: &Q,
        issued: &InvoiceIdentitySet,
    ) -> (Allocation, u64) {
        let parts = DateParts::new(date, self.settings.use_financial_year);
        let mut current = counters
            .get(key)
            .filter(|value| *value > 0)
            .unwrap_or_else(|| self.settings.starting_sequence());

        for attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let candidate = render_invoice_number(self.settings, &parts, current);
            if !issued.contains(&candidate) {
                let allocation = Allocation {
                    invoice_number: candidate,
                    sequence_key: key.to_string(),
                    sequence: Some(current),
                    collisions: attempt,
                };
                return (allocation, current);
            }
            warn!(
                invoice_number = %candidate,
                "invoice number already exists, trying next sequence"
            );
            current = current.saturating_add(1);
        }

        error!(
            attempts = MAX_ALLOCATION_ATTEMPTS,
            sequence_key = %key,
            "failed to generate a unique invoice number, using timestamp fallback"
        );
        let allocation = Allocation {
            invoice_number: fallback_invoice_number(),
            sequence_key: key.to_string(),
            sequence: None,
            collisions: MAX_ALLOCATION_ATTEMPTS,
        };
        (allocation, current)
    }
}

fn fallback_invoice_number() -> String {
    format!("{}{}", DEFAULT_INVOICE_PREFIX, Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SequenceCounterMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_sequential_numbering() {
        let settings = BusinessSettings::default();
        let allocator = InvoiceNumberAllocator::new(&settings);
        let mut counters = SequenceCounterMap::new();
        let issued = InvoiceIdentitySet::new();
        let today = date(2025, 3, 15);

        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503001");
        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503002");
        assert_eq!(counters.get("2025-03"), Some(3));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let settings = BusinessSettings::default();
        let allocator = InvoiceNumberAllocator::new(&settings);
        let mut counters = SequenceCounterMap::new();
        let issued = InvoiceIdentitySet::new();
        let today = date(2025, 3, 15);

        assert_eq!(allocator.peek(today, &counters, &issued), "INV-202503001");
        assert_eq!(allocator.peek(today, &counters, &issued), "INV-202503001");
        assert!(counters.is_empty());
        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503001");
        assert_eq!(allocator.peek(today, &counters, &issued), "INV-202503002");
    }

    #[test]
    fn test_monthly_rollover_starts_new_counter() {
        let settings = BusinessSettings::default();
        let allocator = InvoiceNumberAllocator::new(&settings);
        let mut counters = SequenceCounterMap::new();
        let issued = InvoiceIdentitySet::new();

        allocator.allocate(date(2025, 3, 30), &mut counters, &issued);
        allocator.allocate(date(2025, 3, 31), &mut counters, &issued);
        assert_eq!(
            allocator.allocate(date(2025, 4, 1), &mut counters, &issued),
            "INV-202504001"
        );
        assert_eq!(counters.get("2025-03"), Some(3));
        assert_eq!(counters.get("2025-04"), Some(2));
    }

    #[test]
    fn test_sequence_keys() {
        let mut settings = BusinessSettings::default();
        let feb = date(2025, 2, 10);
        assert_eq!(sequence_key(&settings, feb), "2025-02");

        settings.set_reset_period(ResetPeriod::Yearly);
        assert_eq!(sequence_key(&settings, feb), "2025");

        settings.use_financial_year = true;
        assert_eq!(sequence_key(&settings, feb), "2024-25");
        assert_eq!(sequence_key(&settings, date(2025, 4, 1)), "2025-26");

        settings.set_reset_period(ResetPeriod::Never);
        assert_eq!(sequence_key(&settings, feb), "global");
    }

    #[test]
    fn test_financial_year_label() {
        assert_eq!(financial_year_label(date(2025, 3, 31)), "2024-25");
        assert_eq!(financial_year_label(date(2025, 4, 1)), "2025-26");
        assert_eq!(financial_year_label(date(1999, 12, 1)), "1999-00");
    }

    #[test]
    fn test_all_placeholders() {
        let settings = BusinessSettings {
            invoice_number_format: "{PREFIX}{FY}/{YY}{MM}{DD}/{SEQ}{SUFFIX}".to_string(),
            invoice_number_prefix: "ST/".to_string(),
            invoice_number_suffix: "/K".to_string(),
            sequence_padding: 4,
            use_financial_year: true,
            ..BusinessSettings::default()
        };
        let parts = DateParts::new(date(2025, 2, 7), true);
        assert_eq!(
            render_invoice_number(&settings, &parts, 12),
            "ST/2024-25/250207/0012/K"
        );
    }

    #[test]
    fn test_prefix_and_suffix_added_when_pattern_omits_them() {
        let settings = BusinessSettings {
            invoice_number_format: "{YYYY}-{SEQ}".to_string(),
            invoice_number_prefix: "ACME-".to_string(),
            invoice_number_suffix: "-B".to_string(),
            ..BusinessSettings::default()
        };
        let parts = DateParts::new(date(2025, 3, 15), false);
        assert_eq!(render_invoice_number(&settings, &parts, 7), "ACME-2025-007-B");

        // Already present in the literal text: not added twice
        let settings = BusinessSettings {
            invoice_number_format: "ACME-{SEQ}".to_string(),
            invoice_number_prefix: "ACME-".to_string(),
            ..BusinessSettings::default()
        };
        assert_eq!(render_invoice_number(&settings, &parts, 7), "ACME-007");
    }

    #[test]
    fn test_blank_pattern_uses_default() {
        let settings = BusinessSettings {
            invoice_number_format: "  ".to_string(),
            ..BusinessSettings::default()
        };
        let parts = DateParts::new(date(2025, 3, 15), false);
        assert_eq!(render_invoice_number(&settings, &parts, 1), "INV-202503001");
    }

    #[test]
    fn test_collisions_are_skipped() {
        let settings = BusinessSettings::default();
        let allocator = InvoiceNumberAllocator::new(&settings);
        let mut counters = SequenceCounterMap::new();
        let issued: InvoiceIdentitySet = ["INV-202503001", "INV-202503002"]
            .into_iter()
            .map(String::from)
            .collect();

        let allocation = allocator.allocate_detailed(date(2025, 3, 15), &mut counters, &issued);
        assert_eq!(allocation.invoice_number, "INV-202503003");
        assert_eq!(allocation.sequence, Some(3));
        assert_eq!(allocation.collisions, 2);
        assert_eq!(counters.get("2025-03"), Some(4));
    }

    #[test]
    fn test_narrow_pattern_collapse_is_detected() {
        // Without {SEQ} every counter value renders the same string
        let settings = BusinessSettings {
            invoice_number_format: "INV-{YYYY}".to_string(),
            ..BusinessSettings::default()
        };
        let allocator = InvoiceNumberAllocator::new(&settings);
        let mut counters = SequenceCounterMap::new();
        let mut issued = InvoiceIdentitySet::new();
        let today = date(2025, 3, 15);

        let first = allocator.allocate(today, &mut counters, &issued);
        assert_eq!(first, "INV-2025");
        issued.insert(first);

        let allocation = allocator.allocate_detailed(today, &mut counters, &issued);
        assert_eq!(allocation.sequence, None);
        assert_eq!(allocation.collisions, MAX_ALLOCATION_ATTEMPTS);
        assert!(allocation.invoice_number.starts_with("INV-"));
        assert_ne!(allocation.invoice_number, "INV-2025");
        // Counter moves once per collision (2 -> 102), then persists + 1
        assert_eq!(counters.get("2025-03"), Some(103));
    }

    #[test]
    fn test_existing_counter_and_starting_sequence() {
        let settings = BusinessSettings {
            invoice_number_sequence: 500,
            ..BusinessSettings::default()
        };
        let allocator = InvoiceNumberAllocator::new(&settings);
        let issued = InvoiceIdentitySet::new();
        let today = date(2025, 3, 15);

        let mut counters = SequenceCounterMap::new();
        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503500");

        let mut counters = SequenceCounterMap::new();
        counters.set("2025-03", 41);
        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503041");

        // A zero counter is treated as unset
        counters.set("2025-03", 0);
        assert_eq!(allocator.allocate(today, &mut counters, &issued), "INV-202503500");
    }
}

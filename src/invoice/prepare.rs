//! Fill the derived display fields of an invoice before rendering

use chrono::NaiveDate;

use crate::tax::*;
use crate::types::*;
use crate::utils::{mask_account_number, mask_ifsc};

const INTER_STATE_NOTE: &str =
    "IGST is applicable as the place of supply is outside the state of the supplier.";
const INTRA_STATE_NOTE: &str =
    "CGST and SGST are applicable as the place of supply is within the state of the supplier.";

/// Compute tax lines, labels and company details for an invoice
///
/// Amounts already formatted with a currency symbol are re-parsed, so running
/// this twice on the same data gives the same result. The tax rate falls
/// back to the business default when the invoice carries none. `existing` is
/// the stored record with the same invoice number, if any, and supplies the
/// payment status shown on the invoice.
pub fn prepare_invoice_data(
    mut data: InvoiceData,
    settings: &BusinessSettings,
    existing: Option<&InvoiceRecord>,
) -> InvoiceData {
    data.masked_account_number = mask_account_number(&data.partner_bank_account, 4);
    data.masked_ifsc = mask_ifsc(&data.bank_ifsc);

    let tax_rate = data
        .tax_rate
        .as_deref()
        .and_then(try_parse_amount)
        .unwrap_or_else(|| settings.tax_rate.clone());
    let base_amount = parse_amount(&data.base_amount);
    let adjustment = data
        .adjustment
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(parse_amount);
    let tax = compute_tax(&base_amount, &tax_rate, data.is_igst, adjustment.as_ref());

    data.base_amount = format_inr(&tax.base_amount);
    data.cgst_amt = format_inr(&tax.cgst_amount);
    data.sgst_amt = format_inr(&tax.sgst_amount);
    data.igst_amt = format_inr(&tax.igst_amount);
    data.total_tax = format_inr(&tax.total_tax);
    data.total_with_tax = format_inr(&tax.total_with_tax);
    if let Some(adjustment) = &adjustment {
        data.adjustment = Some(format_inr(adjustment));
    }

    if data.is_igst {
        data.igst_rate = Some(format_rate(&tax.gst_rate.igst_rate));
        data.cgst_rate = None;
        data.sgst_rate = None;
    } else {
        data.cgst_rate = Some(format_rate(&tax.gst_rate.cgst_rate));
        data.sgst_rate = Some(format_rate(&tax.gst_rate.sgst_rate));
        data.igst_rate = None;
    }

    if data.tax_note.is_empty() {
        data.tax_note = if data.is_igst {
            INTER_STATE_NOTE
        } else {
            INTRA_STATE_NOTE
        }
        .to_string();
    }
    if data.amount_in_words.is_empty() {
        data.amount_in_words = amount_in_words(&tax.total_with_tax);
    }

    data.client_name = settings.company_name.clone();
    data.client_gstn = settings.gstn.clone();
    data.client_address_line1 = settings.address_line1.clone();
    data.client_address_line2 = settings.address_line2.clone();
    data.client_address_line3 = settings.address_line3.clone();

    let (status, details) = match existing {
        Some(record) => (record.status, record.payment_details.clone()),
        None => (PaymentStatus::Unpaid, PaymentDetails::default()),
    };
    data.payment_status_text = status.label().to_string();
    data.payment_status_class = status.css_class().to_string();
    data.payment_details_text = payment_details_text(status, &details);

    data
}

/// Human-readable payment method
pub fn payment_type_label(payment_type: &str) -> &str {
    match payment_type {
        "bank_transfer" => "Bank Transfer",
        "cash" => "Cash",
        "cheque" => "Cheque",
        "upi" => "UPI",
        "online" => "Online Payment",
        "other" => "Other",
        other => other,
    }
}

/// Payment summary lines for the invoice template, one `<br>` per line
pub fn payment_details_text(status: PaymentStatus, details: &PaymentDetails) -> String {
    if status == PaymentStatus::Unpaid {
        return "No payment recorded yet.".to_string();
    }

    let mut text = String::new();
    if !details.payment_date.is_empty() {
        let date = NaiveDate::parse_from_str(&details.payment_date, "%Y-%m-%d")
            .map(|date| date.format("%-d %b %Y").to_string())
            .unwrap_or_else(|_| details.payment_date.clone());
        text.push_str(&format!("Payment Date: {}<br>", date));
    }
    if !details.payment_reference.is_empty() {
        text.push_str(&format!(
            "Reference Number: {}<br>",
            details.payment_reference
        ));
    }
    if !details.payment_type.is_empty() {
        text.push_str(&format!(
            "Payment Method: {}<br>",
            payment_type_label(&details.payment_type)
        ));
    }
    if !details.notes.is_empty() {
        text.push_str(&format!("Notes: {}<br>", details.notes));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(base: &str, is_igst: bool) -> InvoiceData {
        InvoiceData {
            invoice_no: "INV-202503001".to_string(),
            base_amount: base.to_string(),
            is_igst,
            partner_bank_account: "123456789012".to_string(),
            bank_ifsc: "HDFC0001234".to_string(),
            ..InvoiceData::default()
        }
    }

    #[test]
    fn test_intra_state_fields() {
        let data = prepare_invoice_data(draft("1000", false), &BusinessSettings::default(), None);
        assert_eq!(data.base_amount, "₹ 1000.00");
        assert_eq!(data.cgst_amt, "₹ 90.00");
        assert_eq!(data.sgst_amt, "₹ 90.00");
        assert_eq!(data.igst_amt, "₹ 0.00");
        assert_eq!(data.total_tax, "₹ 180.00");
        assert_eq!(data.total_with_tax, "₹ 1180.00");
        assert_eq!(data.cgst_rate.as_deref(), Some("9.0%"));
        assert_eq!(data.sgst_rate.as_deref(), Some("9.0%"));
        assert_eq!(data.igst_rate, None);
        assert_eq!(data.tax_note, INTRA_STATE_NOTE);
        assert_eq!(
            data.amount_in_words,
            "One Thousand One Hundred and Eighty Rupees"
        );
        assert_eq!(data.masked_account_number, "XXXXXXXX9012");
        assert_eq!(data.masked_ifsc, "HDFCXXXX4");
        assert_eq!(data.client_gstn, "29ABICS0071M1ZY");
        assert_eq!(data.payment_status_text, "UNPAID");
        assert_eq!(data.payment_details_text, "No payment recorded yet.");
    }

    #[test]
    fn test_inter_state_fields_with_rate_and_adjustment() {
        let mut input = draft("₹ 2000.00", true);
        input.tax_rate = Some("12".to_string());
        input.adjustment = Some("-0.50".to_string());

        let data = prepare_invoice_data(input, &BusinessSettings::default(), None);
        assert_eq!(data.igst_amt, "₹ 240.00");
        assert_eq!(data.cgst_amt, "₹ 0.00");
        assert_eq!(data.igst_rate.as_deref(), Some("12.0%"));
        assert_eq!(data.cgst_rate, None);
        assert_eq!(data.adjustment.as_deref(), Some("₹ -0.50"));
        assert_eq!(data.total_with_tax, "₹ 2239.50");
        assert_eq!(data.tax_note, INTER_STATE_NOTE);
    }

    #[test]
    fn test_preparing_twice_is_stable() {
        let mut input = draft("1000", false);
        input.adjustment = Some("5".to_string());
        let settings = BusinessSettings::default();

        let once = prepare_invoice_data(input, &settings, None);
        let twice = prepare_invoice_data(once.clone(), &settings, None);
        assert_eq!(once, twice);
        assert_eq!(twice.total_with_tax, "₹ 1185.00");
    }

    #[test]
    fn test_payment_state_from_existing_record() {
        let now = Utc::now();
        let record = InvoiceRecord {
            id: "1".to_string(),
            invoice_number: "INV-202503001".to_string(),
            date: String::new(),
            vendor_name: String::new(),
            vendor_gst: String::new(),
            amount: "1000".to_string(),
            total_amount: "1180".to_string(),
            reference_number: String::new(),
            status: PaymentStatus::Paid,
            payment_details: PaymentDetails {
                payment_date: "2025-03-20".to_string(),
                payment_reference: "UTR123".to_string(),
                payment_type: "bank_transfer".to_string(),
                notes: String::new(),
            },
            created_at: now,
            updated_at: now,
            full_data: String::new(),
        };

        let data = prepare_invoice_data(draft("1000", false), &BusinessSettings::default(), Some(&record));
        assert_eq!(data.payment_status_text, "PAID");
        assert_eq!(data.payment_status_class, "payment-status-paid");
        assert_eq!(
            data.payment_details_text,
            "Payment Date: 20 Mar 2025<br>Reference Number: UTR123<br>Payment Method: Bank Transfer<br>"
        );
    }
}

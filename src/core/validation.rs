use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::*;

/// Upper bound on the invoice gross amount. Keeps every computed total
/// representable with two fractional digits.
pub const AMOUNT_LIMIT: Decimal = dec!(1000000000000000);

/// Validate an invoice against the data-model invariants.
/// Returns all validation errors found (not just the first).
///
/// This is the intake check; XML generation assumes it passed.
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // BR-02: An Invoice shall have an Invoice number
    if invoice.invoice_number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "invoice_number",
            "invoice number must not be empty",
            "BR-02",
        ));
    }

    // BR-05: An Invoice shall have an Invoice currency code
    if invoice.currency.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "currency",
            "currency code must not be empty",
            "BR-05",
        ));
    } else if invoice.currency.chars().count() != 3 {
        errors.push(ValidationError::with_rule(
            "currency",
            format!(
                "currency code must be 3 characters (ISO 4217), got '{}'",
                invoice.currency
            ),
            "BR-05",
        ));
    }

    check_date(invoice.issue_date, "issue_date", &mut errors);
    if let Some(due) = invoice.due_date {
        check_date(due, "due_date", &mut errors);
    }

    validate_party(&invoice.seller, "seller", "BR-06", "BR-09", &mut errors);
    validate_party(&invoice.buyer, "buyer", "BR-07", "BR-11", &mut errors);

    // BR-16: An Invoice shall have at least one Invoice line
    if invoice.line_items.is_empty() {
        errors.push(ValidationError::with_rule(
            "line_items",
            "at least one line item is required",
            "BR-16",
        ));
    }
    for (i, line) in invoice.line_items.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }
    if !gross_amount(&invoice.line_items).is_some_and(|gross| gross < AMOUNT_LIMIT) {
        errors.push(ValidationError::new(
            "line_items",
            format!("invoice amounts must stay below {AMOUNT_LIMIT}"),
        ));
    }

    check_xml_chars(invoice, &mut errors);

    errors
}

fn validate_party(
    party: &Party,
    prefix: &str,
    name_rule: &str,
    country_rule: &str,
    errors: &mut Vec<ValidationError>,
) {
    if party.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.name"),
            format!("{prefix} name must not be empty"),
            name_rule,
        ));
    }
    validate_address(&party.address, prefix, country_rule, errors);
}

fn validate_address(
    address: &Address,
    prefix: &str,
    country_rule: &str,
    errors: &mut Vec<ValidationError>,
) {
    for (field, value) in [
        ("street", &address.street),
        ("postal_code", &address.postal_code),
        ("city", &address.city),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{prefix}.address.{field}"),
                format!("{field} must not be empty"),
            ));
        }
    }

    if address.country_code.chars().count() != 2 {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.address.country_code"),
            format!(
                "country code must be 2 characters (ISO 3166-1 alpha-2), got '{}'",
                address.country_code
            ),
            country_rule,
        ));
    }
}

fn validate_line(line: &LineItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("line_items[{index}]");

    // BR-25: Each Invoice line shall contain the Item name
    if line.description.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.description"),
            "item description must not be empty",
            "BR-25",
        ));
    }

    if line.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            format!("quantity must be positive, got {}", line.quantity),
        ));
    }

    // BR-27: The Item net price shall NOT be negative
    if line.unit_price < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.unit_price"),
            format!("unit price must not be negative, got {}", line.unit_price),
            "BR-27",
        ));
    }

    if line.vat_rate < Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.vat_rate"),
            format!("VAT rate must not be negative, got {}", line.vat_rate),
        ));
    }
}

/// Dates are written as `CCYYMMDD`, which needs a four-digit year.
fn check_date(date: NaiveDate, field: &str, errors: &mut Vec<ValidationError>) {
    if !(0..=9999).contains(&date.year()) {
        errors.push(ValidationError::new(
            field,
            format!("year must be between 0 and 9999, got {}", date.year()),
        ));
    }
}

/// Sum of absolute line amounts and their VAT, or `None` on overflow.
fn gross_amount(lines: &[LineItem]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        let total = line.unit_price.checked_mul(line.quantity)?.abs();
        let tax = total.checked_mul(line.vat_rate.abs())? / dec!(100);
        acc.checked_add(total)?.checked_add(tax)
    })
}

/// XML 1.0 `Char`: tab, newline, carriage return, and everything from
/// U+0020 up except U+FFFE and U+FFFF.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Every text field is written to the XML verbatim (after escaping), so
/// characters XML cannot represent are rejected here.
fn check_xml_chars(invoice: &Invoice, errors: &mut Vec<ValidationError>) {
    let mut fields: Vec<(String, Option<&str>)> = vec![
        ("invoice_number".into(), Some(invoice.invoice_number.as_str())),
        ("currency".into(), Some(invoice.currency.as_str())),
    ];
    for (prefix, party) in [("seller", &invoice.seller), ("buyer", &invoice.buyer)] {
        let address = &party.address;
        fields.extend([
            (format!("{prefix}.name"), Some(party.name.as_str())),
            (format!("{prefix}.address.street"), Some(address.street.as_str())),
            (format!("{prefix}.address.postal_code"), Some(address.postal_code.as_str())),
            (format!("{prefix}.address.city"), Some(address.city.as_str())),
            (format!("{prefix}.address.country_code"), Some(address.country_code.as_str())),
            (format!("{prefix}.vat_identifier"), party.vat_identifier.as_deref()),
            (format!("{prefix}.tax_registration_id"), party.tax_registration_id.as_deref()),
            (format!("{prefix}.email"), party.email.as_deref()),
        ]);
    }
    for (i, line) in invoice.line_items.iter().enumerate() {
        fields.push((
            format!("line_items[{i}].description"),
            Some(line.description.as_str()),
        ));
    }
    fields.push(("payment_reference".into(), invoice.payment_reference.as_deref()));
    fields.push(("seller_bank_iban".into(), invoice.seller_bank_iban.as_deref()));

    for (field, value) in fields {
        let Some(value) = value else { continue };
        if let Some(c) = value.chars().find(|c| !is_xml_char(*c)) {
            errors.push(ValidationError::new(
                field,
                format!("contains U+{:04X}, which XML does not allow", c as u32),
            ));
        }
    }
}

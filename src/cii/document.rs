use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::element::{Element, Namespace};
use super::writer::to_document_bytes;
use super::{FACTURX_GUIDELINE_ID, codes};
use crate::core::*;

/// Generate Factur-X EN 16931 CII XML for a validated invoice.
///
/// The output is deterministic: the same invoice always yields the same bytes.
#[tracing::instrument(
    name = "facturx_xml",
    skip_all,
    fields(invoice = %invoice.invoice_number, lines = invoice.line_items.len())
)]
pub fn to_facturx_xml(invoice: &Invoice) -> Result<Vec<u8>, FacturxError> {
    let root = build_document(invoice);
    let xml = to_document_bytes(&root)?;
    tracing::debug!(bytes = xml.len(), "generated Factur-X XML");
    Ok(xml)
}

/// Build the element tree for `invoice` without serializing it.
pub fn build_document(invoice: &Invoice) -> Element {
    let summary = invoice.tax_summary();

    let mut root = Element::new(Namespace::Rsm, "CrossIndustryInvoice");
    for ns in Namespace::ALL {
        root = root.with_attr(ns.declaration(), ns.uri());
    }

    root.with_child(document_context())
        .with_child(exchanged_document(invoice))
        .with_child(trade_transaction(invoice, &summary))
}

fn document_context() -> Element {
    Element::new(Namespace::Rsm, "ExchangedDocumentContext").with_child(
        Element::ram("GuidelineSpecifiedDocumentContextParameter").with_child(
            Element::ram("ID")
                .with_attr("schemeID", FACTURX_GUIDELINE_ID)
                .with_text(FACTURX_GUIDELINE_ID),
        ),
    )
}

fn exchanged_document(invoice: &Invoice) -> Element {
    Element::new(Namespace::Rsm, "ExchangedDocument")
        .with_child(Element::ram("ID").with_text(&invoice.invoice_number))
        .with_child(Element::ram("TypeCode").with_text(codes::COMMERCIAL_INVOICE))
        .with_child(date_time("IssueDateTime", &invoice.issue_date))
}

fn trade_transaction(invoice: &Invoice, summary: &TaxSummary) -> Element {
    let currency = invoice.currency.as_str();
    let mut transaction = Element::new(Namespace::Rsm, "SupplyChainTradeTransaction");

    // Line IDs are positional; input order is document order.
    for (index, (line, totals)) in invoice.line_items.iter().zip(&summary.lines).enumerate() {
        transaction.push(trade_line_item(index + 1, line, totals, currency));
    }

    transaction
        .with_child(
            Element::ram("ApplicableHeaderTradeAgreement")
                .with_child(trade_party("SellerTradeParty", &invoice.seller))
                .with_child(trade_party("BuyerTradeParty", &invoice.buyer)),
        )
        .with_child(
            // No separate delivery date exists; the issue date stands in.
            Element::ram("ApplicableHeaderTradeDelivery").with_child(
                Element::ram("ActualDeliverySupplyChainEvent")
                    .with_child(date_time("OccurrenceDateTime", &invoice.issue_date)),
            ),
        )
        .with_child(header_settlement(invoice, summary))
}

fn trade_line_item(line_id: usize, line: &LineItem, totals: &LineTotals, currency: &str) -> Element {
    Element::ram("IncludedSupplyChainTradeLineItem")
        .with_child(
            Element::ram("AssociatedDocumentLineDocument")
                .with_child(Element::ram("LineID").with_text(line_id.to_string())),
        )
        .with_child(
            Element::ram("SpecifiedTradeProduct")
                .with_child(Element::ram("Name").with_text(&line.description)),
        )
        .with_child(
            // Gross and net price are identical: there is no discount model.
            Element::ram("SpecifiedLineTradeAgreement")
                .with_child(
                    Element::ram("GrossPriceProductTradePrice")
                        .with_child(amount("ChargeAmount", line.unit_price, currency)),
                )
                .with_child(
                    Element::ram("NetPriceProductTradePrice")
                        .with_child(amount("ChargeAmount", line.unit_price, currency)),
                ),
        )
        .with_child(
            Element::ram("SpecifiedLineTradeDelivery").with_child(
                Element::ram("BilledQuantity")
                    .with_attr("unitCode", codes::UNIT_GENERIC)
                    .with_text(format_decimal(line.quantity, Precision::QUANTITY)),
            ),
        )
        .with_child(
            Element::ram("SpecifiedLineTradeSettlement")
                .with_child(trade_tax(
                    totals.line_tax,
                    totals.line_total,
                    line.vat_rate,
                    currency,
                ))
                .with_child(
                    Element::ram("SpecifiedTradeSettlementLineMonetarySummation")
                        .with_child(amount("LineTotalAmount", totals.line_total, currency)),
                ),
        )
}

fn trade_party(element: &'static str, party: &Party) -> Element {
    // CII schema requires strict element order within TradeParty:
    // Name → SpecifiedLegalOrganization → PostalTradeAddress →
    // URIUniversalCommunication → SpecifiedTaxRegistration
    let legal_organization = present(&party.tax_registration_id).map(|id| {
        Element::ram("SpecifiedLegalOrganization").with_child(Element::ram("ID").with_text(id))
    });
    let communication = present(&party.email).map(|email| {
        Element::ram("URIUniversalCommunication").with_child(Element::ram("URIID").with_text(email))
    });
    let tax_registration = present(&party.vat_identifier).map(|vat_id| {
        Element::ram("SpecifiedTaxRegistration").with_child(
            Element::ram("ID")
                .with_attr("schemeID", codes::VAT_SCHEME)
                .with_text(vat_id),
        )
    });

    Element::ram(element)
        .with_child(Element::ram("Name").with_text(&party.name))
        .with_optional_child(legal_organization)
        .with_child(postal_address(&party.address))
        .with_optional_child(communication)
        .with_optional_child(tax_registration)
}

fn postal_address(address: &Address) -> Element {
    Element::ram("PostalTradeAddress")
        .with_child(Element::ram("PostcodeCode").with_text(&address.postal_code))
        .with_child(Element::ram("LineOne").with_text(&address.street))
        .with_child(Element::ram("CityName").with_text(&address.city))
        .with_child(Element::ram("CountryID").with_text(&address.country_code))
}

fn header_settlement(invoice: &Invoice, summary: &TaxSummary) -> Element {
    let currency = invoice.currency.as_str();

    let payment_reference = present(&invoice.payment_reference)
        .map(|reference| Element::ram("PaymentReference").with_text(reference));
    let creditor_account = present(&invoice.seller_bank_iban).map(|iban| {
        Element::ram("PayeePartyCreditorFinancialAccount")
            .with_child(Element::ram("IBANID").with_text(iban))
    });

    let mut settlement = Element::ram("ApplicableHeaderTradeSettlement")
        .with_optional_child(payment_reference)
        .with_child(Element::ram("InvoiceCurrencyCode").with_text(currency))
        .with_child(
            Element::ram("SpecifiedTradeSettlementPaymentMeans")
                .with_child(
                    Element::ram("TypeCode").with_text(invoice.payment_means_code.to_string()),
                )
                .with_optional_child(creditor_account),
        );

    // VAT breakdown, in order of first appearance
    for group in &summary.vat_groups {
        settlement.push(trade_tax(group.tax, group.basis, group.rate, currency));
    }

    let payment_terms = invoice.due_date.as_ref().map(|due| {
        Element::ram("SpecifiedTradePaymentTerms").with_child(date_time("DueDateDateTime", due))
    });

    // TaxBasisTotal duplicates LineTotal and DuePayable duplicates GrandTotal:
    // there are no allowances, charges or prepayments to separate them.
    settlement
        .with_optional_child(payment_terms)
        .with_child(
            Element::ram("SpecifiedTradeSettlementHeaderMonetarySummation")
                .with_child(amount("LineTotalAmount", summary.taxable_total, currency))
                .with_child(amount("TaxBasisTotalAmount", summary.taxable_total, currency))
                .with_child(amount("TaxTotalAmount", summary.tax_total, currency))
                .with_child(amount("GrandTotalAmount", summary.grand_total, currency))
                .with_child(amount("DuePayableAmount", summary.grand_total, currency)),
        )
}

fn trade_tax(tax: Decimal, basis: Decimal, rate: Decimal, currency: &str) -> Element {
    Element::ram("ApplicableTradeTax")
        .with_child(amount("CalculatedAmount", tax, currency))
        .with_child(Element::ram("TypeCode").with_text(codes::TAX_TYPE_VAT))
        .with_child(amount("BasisAmount", basis, currency))
        .with_child(Element::ram("CategoryCode").with_text(codes::TAX_CATEGORY_STANDARD))
        .with_child(
            Element::ram("RateApplicablePercent").with_text(format_decimal(rate, Precision::MONEY)),
        )
}

/// An optional text field, with blank values treated as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn amount(name: &'static str, value: Decimal, currency: &str) -> Element {
    Element::ram(name)
        .with_attr("currencyID", currency)
        .with_text(format_decimal(value, Precision::MONEY))
}

fn date_time(name: &'static str, date: &NaiveDate) -> Element {
    Element::ram(name).with_child(
        Element::new(Namespace::Udt, "DateTimeString")
            .with_attr("format", codes::DATE_FORMAT_YYYYMMDD)
            .with_text(date.format("%Y%m%d").to_string()),
    )
}

//! Conformance checking of generated XML.
//!
//! Full XSD validation belongs to whoever embeds the XML into a document;
//! [`SchemaValidator`] is the seam where such a validator plugs in.
//! [`StructuralValidator`] is a dependency-free check that re-reads the
//! output and verifies the parts this crate is responsible for.

use std::collections::HashSet;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;

use super::document::to_facturx_xml;
use super::element::Namespace;
use super::{FACTURX_GUIDELINE_ID, codes};
use crate::core::{FacturxError, Invoice, SchemaViolation, is_xml_char};

/// Validates generated CII XML.
pub trait SchemaValidator {
    /// Returns every violation found, or `Ok(())` if the document is accepted.
    fn validate(&self, xml: &[u8]) -> Result<(), Vec<SchemaViolation>>;
}

impl<F> SchemaValidator for F
where
    F: Fn(&[u8]) -> Result<(), Vec<SchemaViolation>>,
{
    fn validate(&self, xml: &[u8]) -> Result<(), Vec<SchemaViolation>> {
        self(xml)
    }
}

/// Generate XML and run it through `validator`.
///
/// A rejection is reported as [`FacturxError::Schema`]: it means the
/// generator produced non-conformant output, not that the input was bad.
pub fn to_validated_xml(
    invoice: &Invoice,
    validator: &impl SchemaValidator,
) -> Result<Vec<u8>, FacturxError> {
    let xml = to_facturx_xml(invoice)?;
    if let Err(violations) = validator.validate(&xml) {
        tracing::warn!(
            invoice = %invoice.invoice_number,
            violations = violations.len(),
            "generated XML rejected by schema validator"
        );
        return Err(FacturxError::Schema(violations));
    }
    Ok(xml)
}

const ROOT: &str = "rsm:CrossIndustryInvoice";
const SETTLEMENT: &str = "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement";
const SUMMATION: &str = "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement/ram:SpecifiedTradeSettlementHeaderMonetarySummation";

const REQUIRED_PATHS: &[&str] = &[
    "rsm:CrossIndustryInvoice/rsm:ExchangedDocumentContext/ram:GuidelineSpecifiedDocumentContextParameter/ram:ID",
    "rsm:CrossIndustryInvoice/rsm:ExchangedDocument/ram:ID",
    "rsm:CrossIndustryInvoice/rsm:ExchangedDocument/ram:TypeCode",
    "rsm:CrossIndustryInvoice/rsm:ExchangedDocument/ram:IssueDateTime/udt:DateTimeString",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:IncludedSupplyChainTradeLineItem",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeAgreement/ram:SellerTradeParty/ram:Name",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeAgreement/ram:BuyerTradeParty/ram:Name",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeDelivery",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement/ram:InvoiceCurrencyCode",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement/ram:SpecifiedTradeSettlementPaymentMeans/ram:TypeCode",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement/ram:ApplicableTradeTax",
    "rsm:CrossIndustryInvoice/rsm:SupplyChainTradeTransaction/ram:ApplicableHeaderTradeSettlement/ram:SpecifiedTradeSettlementHeaderMonetarySummation",
];

/// Structural and arithmetic checks over generated CII XML.
///
/// Checks the root element and its namespace declarations, the guideline
/// identifier, presence of mandatory elements, absence of empty elements,
/// `currencyID` on every amount, `format="102"` 8-digit dates, and that the
/// header VAT breakdown and monetary summation reconcile.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate(&self, xml: &[u8]) -> Result<(), Vec<SchemaViolation>> {
        let text = std::str::from_utf8(xml)
            .map_err(|e| vec![SchemaViolation::new(format!("document is not UTF-8: {e}"))])?;

        let mut state = CheckState::default();
        state.read(text);
        state.finish();

        if state.violations.is_empty() {
            Ok(())
        } else {
            Err(state.violations)
        }
    }
}

struct OpenElement {
    name: String,
    has_content: bool,
}

#[derive(Default)]
struct CheckState {
    stack: Vec<OpenElement>,
    seen: HashSet<String>,
    violations: Vec<SchemaViolation>,
    root_seen: bool,
    guideline: Option<String>,
    header_tax_basis: Vec<Decimal>,
    header_tax_amount: Vec<Decimal>,
    summation: Vec<(String, Decimal)>,
}

impl CheckState {
    fn path(&self) -> String {
        self.stack
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn read(&mut self, xml: &str) {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => self.open(e),
                Ok(Event::Empty(ref e)) => {
                    self.open(e);
                    self.close();
                }
                Ok(Event::Text(ref e)) => match e.unescape() {
                    Ok(text) if !text.is_empty() => self.text(&text),
                    Ok(_) => {}
                    Err(err) => self.violation(format!("invalid text: {err}")),
                },
                Ok(Event::End(_)) => self.close(),
                Ok(Event::Eof) => break,
                Err(e) => {
                    self.violations
                        .push(SchemaViolation::new(format!("XML parse error: {e}")));
                    break;
                }
                _ => {}
            }
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        if let Some(parent) = self.stack.last_mut() {
            parent.has_content = true;
        }
        self.stack.push(OpenElement {
            name: name.clone(),
            has_content: false,
        });
        let path = self.path();

        let mut attrs = Vec::new();
        for attr in e.attributes() {
            match attr {
                Ok(attr) => attrs.push((
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                )),
                Err(err) => self.violation(format!("malformed attribute: {err}")),
            }
        }
        for (key, value) in &attrs {
            if let Some(c) = value.chars().find(|c| !is_xml_char(*c)) {
                self.violation(format!("attribute {key} contains U+{:04X}", c as u32));
            }
        }
        let attr = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        if self.stack.len() == 1 {
            self.root_seen = true;
            if name != ROOT {
                self.violation(format!("root element must be {ROOT}"));
            }
            for ns in Namespace::ALL {
                if attr(ns.declaration()) != Some(ns.uri()) {
                    self.violation(format!(
                        "missing or wrong namespace declaration {}",
                        ns.declaration()
                    ));
                }
            }
        }

        if name.ends_with("Amount") && attr("currencyID").is_none_or(|c| c.is_empty()) {
            self.violation("amount element without currencyID".to_string());
        }
        if name == "udt:DateTimeString" && attr("format") != Some(codes::DATE_FORMAT_YYYYMMDD) {
            self.violation("date must use format 102".to_string());
        }
        if path.ends_with("GuidelineSpecifiedDocumentContextParameter/ram:ID")
            && attr("schemeID") != Some(FACTURX_GUIDELINE_ID)
        {
            self.violation("guideline ID must carry the Factur-X schemeID".to_string());
        }

        self.seen.insert(path);
    }

    fn text(&mut self, text: &str) {
        if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
            self.violation(format!("text contains U+{:04X}, which XML does not allow", c as u32));
        }
        let path = self.path();
        let Some(current) = self.stack.last_mut() else {
            self.violations
                .push(SchemaViolation::new("text outside of the root element"));
            return;
        };
        current.has_content = true;
        let name = current.name.clone();

        if path.ends_with("GuidelineSpecifiedDocumentContextParameter/ram:ID") {
            self.guideline = Some(text.to_string());
        }
        if name == "udt:DateTimeString"
            && !(text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()))
        {
            self.violation(format!("date '{text}' is not YYYYMMDD"));
        }

        let amount_parent = path.rsplit_once('/').map(|(parent, _)| parent);
        if name.ends_with("Amount") || name == "ram:RateApplicablePercent" {
            let Ok(value) = Decimal::from_str(text) else {
                self.violation(format!("'{text}' is not a decimal"));
                return;
            };
            match amount_parent {
                Some(SUMMATION) => self.summation.push((name, value)),
                Some(parent) if parent == format!("{SETTLEMENT}/ram:ApplicableTradeTax") => {
                    match name.as_str() {
                        "ram:BasisAmount" => self.header_tax_basis.push(value),
                        "ram:CalculatedAmount" => self.header_tax_amount.push(value),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn close(&mut self) {
        let path = self.path();
        if let Some(el) = self.stack.pop() {
            if !el.has_content {
                self.violations
                    .push(SchemaViolation::at(path, "element must not be empty"));
            }
        }
    }

    fn violation(&mut self, message: String) {
        let path = self.path();
        self.violations.push(SchemaViolation::at(path, message));
    }

    fn finish(&mut self) {
        if !self.root_seen {
            self.violations
                .push(SchemaViolation::new("document has no root element"));
            return;
        }

        for required in REQUIRED_PATHS {
            if !self.seen.contains(*required) {
                self.violations
                    .push(SchemaViolation::at(*required, "required element missing"));
            }
        }

        if self.guideline.as_deref() != Some(FACTURX_GUIDELINE_ID) {
            self.violations.push(SchemaViolation::new(format!(
                "guideline ID must be {FACTURX_GUIDELINE_ID}"
            )));
        }

        self.check_totals();
    }

    fn check_totals(&mut self) {
        let total = |name: &str| {
            self.summation
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
        };
        let (Some(line_total), Some(basis_total), Some(tax_total), Some(grand), Some(due)) = (
            total("ram:LineTotalAmount"),
            total("ram:TaxBasisTotalAmount"),
            total("ram:TaxTotalAmount"),
            total("ram:GrandTotalAmount"),
            total("ram:DuePayableAmount"),
        ) else {
            self.violations.push(SchemaViolation::at(
                SUMMATION,
                "monetary summation is incomplete",
            ));
            return;
        };

        let mut mismatch = |message: String| {
            self.violations.push(SchemaViolation::at(SUMMATION, message));
        };
        if line_total != basis_total {
            mismatch(format!(
                "TaxBasisTotalAmount {basis_total} differs from LineTotalAmount {line_total}"
            ));
        }
        if basis_total + tax_total != grand {
            mismatch(format!(
                "TaxBasisTotalAmount {basis_total} + TaxTotalAmount {tax_total} != GrandTotalAmount {grand}"
            ));
        }
        if due != grand {
            mismatch(format!(
                "DuePayableAmount {due} differs from GrandTotalAmount {grand}"
            ));
        }

        let breakdown_basis: Decimal = self.header_tax_basis.iter().copied().sum();
        let breakdown_tax: Decimal = self.header_tax_amount.iter().copied().sum();
        if breakdown_basis != basis_total {
            mismatch(format!(
                "VAT breakdown basis {breakdown_basis} differs from TaxBasisTotalAmount {basis_total}"
            ));
        }
        if breakdown_tax != tax_total {
            mismatch(format!(
                "VAT breakdown tax {breakdown_tax} differs from TaxTotalAmount {tax_total}"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        let address = || AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build();
        InvoiceBuilder::new("INV-1", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .seller(PartyBuilder::new("ACME Corp", address()).vat_identifier("FR1").build())
            .buyer(PartyBuilder::new("Client SAS", address()).build())
            .add_line(LineItemBuilder::new("A", dec!(2), dec!(150)).vat_rate(dec!(20)).build())
            .add_line(LineItemBuilder::new("B", dec!(1), dec!(33.33)).vat_rate(dec!(7)).build())
            .build()
            .unwrap()
    }

    fn violations(xml: &str) -> Vec<SchemaViolation> {
        StructuralValidator
            .validate(xml.as_bytes())
            .expect_err("document should be rejected")
    }

    #[test]
    fn generated_xml_passes() {
        let xml = to_facturx_xml(&invoice()).unwrap();
        assert_eq!(StructuralValidator.validate(&xml), Ok(()));
    }

    #[test]
    fn detects_tampered_totals() {
        let xml = String::from_utf8(to_facturx_xml(&invoice()).unwrap()).unwrap();
        let tampered = xml.replace(
            "<ram:DuePayableAmount currencyID=\"EUR\">395.66</ram:DuePayableAmount>",
            "<ram:DuePayableAmount currencyID=\"EUR\">395.67</ram:DuePayableAmount>",
        );
        assert_ne!(xml, tampered);
        let v = violations(&tampered);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("DuePayableAmount"));
    }

    #[test]
    fn detects_missing_namespace_and_empty_elements() {
        let xml = String::from_utf8(to_facturx_xml(&invoice()).unwrap()).unwrap();
        let tampered = xml
            .replace(" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"", "")
            .replace("<ram:CityName>Paris</ram:CityName>", "<ram:CityName></ram:CityName>");
        let v = violations(&tampered);
        assert!(v.iter().any(|v| v.message.contains("xmlns:xsi")));
        assert!(v.iter().any(|v| {
            v.message == "element must not be empty"
                && v.path.as_deref().is_some_and(|p| p.ends_with("ram:CityName"))
        }));
    }

    #[test]
    fn detects_control_characters() {
        let xml = String::from_utf8(to_facturx_xml(&invoice()).unwrap()).unwrap();
        let tampered = xml.replace(
            "<ram:Name>ACME Corp</ram:Name>",
            "<ram:Name>ACME\u{1}Corp</ram:Name>",
        );
        assert_ne!(xml, tampered);
        let v = violations(&tampered);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("U+0001"));
        assert!(v[0].path.as_deref().is_some_and(|p| p.ends_with("SellerTradeParty/ram:Name")));
    }

    #[test]
    fn detects_wrong_root() {
        let v = violations("<?xml version=\"1.0\"?><Invoice>1</Invoice>");
        assert!(v.iter().any(|v| v.message.contains("root element")));
        assert!(v.iter().any(|v| v.message == "required element missing"));
    }

    #[test]
    fn rejects_non_utf8() {
        let v = StructuralValidator.validate(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(v[0].message.contains("UTF-8"));
    }

    #[test]
    fn rejection_is_a_schema_error() {
        let reject = |_: &[u8]| -> Result<(), Vec<SchemaViolation>> {
            Err(vec![SchemaViolation::new("xsd says no")])
        };
        let err = to_validated_xml(&invoice(), &reject).unwrap_err();
        assert!(matches!(err, FacturxError::Schema(ref v) if v.len() == 1));

        let xml = to_validated_xml(&invoice(), &StructuralValidator).unwrap();
        assert!(xml.starts_with(b"<?xml"));
    }
}

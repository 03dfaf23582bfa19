//! Factur-X EN 16931 Cross Industry Invoice (CII) XML generation.
//!
//! The pipeline is: [`Invoice`](crate::core::Invoice) →
//! [`aggregate`](crate::core::aggregate) → [`build_document`] →
//! [`to_facturx_xml`]. The element tree is built first and serialized in
//! one pass, so the builder never deals with writer state.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use facturx::cii;
//! use facturx::core::*;
//! use rust_decimal_macros::dec;
//!
//! let address = || AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build();
//! let invoice = InvoiceBuilder::new("INV-2024-0001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
//!     .seller(PartyBuilder::new("ACME Corp", address()).build())
//!     .buyer(PartyBuilder::new("Client SAS", address()).build())
//!     .add_line(LineItemBuilder::new("Consulting services", dec!(2), dec!(150)).vat_rate(dec!(20)).build())
//!     .build()
//!     .unwrap();
//!
//! let xml = cii::to_validated_xml(&invoice, &cii::StructuralValidator).unwrap();
//! assert!(xml.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
//! ```

mod check;
mod document;
mod element;
mod writer;

pub use check::{SchemaValidator, StructuralValidator, to_validated_xml};
pub use document::{build_document, to_facturx_xml};
pub use element::{Element, Namespace};
pub use writer::{XmlWriter, to_document_bytes};

/// Factur-X EN 16931 guideline identifier (BT-24), used as both the
/// element text and its `schemeID`.
pub const FACTURX_GUIDELINE_ID: &str = "urn:factur-x.eu:1p0:en16931:ver1.0";

/// File name under which the XML is attached to a PDF/A-3 document.
pub const FACTURX_FILENAME: &str = "factur-x.xml";

/// CII namespace URIs.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const QDT: &str = "urn:un:unece:uncefact:data:standard:QualifiedDataType:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// Fixed code values written by the document builder.
pub mod codes {
    /// UNTDID 1001: commercial invoice.
    pub const COMMERCIAL_INVOICE: &str = "380";
    /// UNTDID 5153: value added tax.
    pub const TAX_TYPE_VAT: &str = "VAT";
    /// UNTDID 5305: standard rate.
    pub const TAX_CATEGORY_STANDARD: &str = "S";
    /// UNECE Rec 20: one (generic unit).
    pub const UNIT_GENERIC: &str = "C62";
    /// UNTDID 2379: CCYYMMDD.
    pub const DATE_FORMAT_YYYYMMDD: &str = "102";
    /// Scheme of a party's VAT registration.
    pub const VAT_SCHEME: &str = "VAT";
}

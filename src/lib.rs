//! # facturx
//!
//! Factur-X / ZUGFeRD EN 16931 invoice XML generation.
//!
//! Takes a structured invoice (seller, buyer, line items, payment details),
//! computes line totals and a per-rate VAT breakdown, and serializes the
//! result as a UN/CEFACT Cross Industry Invoice (CII) document conforming
//! to the Factur-X EN 16931 profile.
//!
//! All monetary values use [`rust_decimal::Decimal`]. Every amount is
//! rounded half-up to two decimals at well-defined points, so the written
//! totals reconcile exactly.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use facturx::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("INV-2024-0001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
//!     .seller(PartyBuilder::new("ACME Corp", AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build())
//!         .vat_identifier("FR12345678901").build())
//!     .buyer(PartyBuilder::new("Client SAS", AddressBuilder::new("10 Rue de la Paix", "75002", "Paris", "FR").build()).build())
//!     .add_line(LineItemBuilder::new("Consulting services", dec!(2), dec!(150)).vat_rate(dec!(20)).build())
//!     .add_line(LineItemBuilder::new("Development", dec!(1), dec!(300)).vat_rate(dec!(20)).build())
//!     .build()
//!     .unwrap();
//!
//! let summary = invoice.tax_summary();
//! assert_eq!(summary.taxable_total, dec!(600.00));
//! assert_eq!(summary.tax_total, dec!(120.00));
//! assert_eq!(summary.grand_total, dec!(720.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, intake validation, rounding, VAT aggregation |
//! | `cii` (default) | Factur-X CII XML generation and structural check |
//! | `json` | JSON intake (`Invoice::from_json` / `to_json`) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "cii")]
pub mod cii;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

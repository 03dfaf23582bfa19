//! Core invoice types, intake validation, rounding and tax aggregation.
//!
//! This module provides the data model the XML generator consumes, based on
//! the EN 16931 semantic model, and the VAT aggregation engine that turns
//! line items into a reconciled tax breakdown.

mod builder;
mod decimal;
mod error;
#[cfg(feature = "json")]
mod intake;
mod tax;
mod types;
mod validation;

pub use builder::*;
pub use decimal::*;
pub use error::*;
pub use tax::*;
pub use types::*;
pub use validation::*;

//! Canonical decimal rounding and fixed-point formatting.
//!
//! Every amount, rate and quantity written to the XML passes through
//! [`format_decimal`]. Values are [`Decimal`] end to end; nothing here ever
//! touches binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::FacturxError;

/// A rounding step expressed as a number of fractional digits.
///
/// Only powers of ten not greater than one are representable, so a
/// `Precision` of 0.01 is two decimal places and 0.001 is three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precision {
    dp: u32,
}

impl Precision {
    /// 0.01: currency amounts and percentage rates.
    pub const MONEY: Precision = Precision { dp: 2 };
    /// 0.001: billed quantities.
    pub const QUANTITY: Precision = Precision { dp: 3 };

    /// Precision with the given number of fractional digits.
    pub const fn decimal_places(dp: u32) -> Self {
        Self { dp }
    }

    /// Parse a rounding step such as `0.01`.
    ///
    /// Anything other than a positive power of ten ≤ 1 is a programming
    /// error and is reported as [`FacturxError::Builder`].
    pub fn from_step(step: Decimal) -> Result<Self, FacturxError> {
        let normalized = step.normalize();
        if normalized.is_sign_negative() || normalized.mantissa() != 1 {
            return Err(FacturxError::Builder(format!(
                "rounding step must be a power of ten no greater than 1, got {step}"
            )));
        }
        Ok(Self {
            dp: normalized.scale(),
        })
    }

    /// Number of fractional digits.
    pub fn dp(&self) -> u32 {
        self.dp
    }

    /// The step as a decimal value (e.g. `0.01`).
    pub fn step(&self) -> Decimal {
        Decimal::new(1, self.dp)
    }
}

/// Round half-up (ties away from zero) to the given precision.
///
/// `2.005` becomes `2.01`, not the banker's `2.00`.
pub fn round_half_up(value: Decimal, precision: Precision) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(precision.dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Round and render as a fixed-point string with exactly `precision.dp()`
/// fractional digits.
pub fn format_decimal(value: Decimal, precision: Precision) -> String {
    let mut rounded = round_half_up(value, precision);
    rounded.rescale(precision.dp);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_not_to_even() {
        assert_eq!(format_decimal(dec!(2.005), Precision::MONEY), "2.01");
        assert_eq!(format_decimal(dec!(2.015), Precision::MONEY), "2.02");
        assert_eq!(format_decimal(dec!(2.025), Precision::MONEY), "2.03");
        assert_eq!(format_decimal(dec!(2.0049), Precision::MONEY), "2.00");
        assert_eq!(format_decimal(dec!(0.0005), Precision::QUANTITY), "0.001");
    }

    #[test]
    fn pads_to_fixed_point() {
        assert_eq!(format_decimal(dec!(100), Precision::MONEY), "100.00");
        assert_eq!(format_decimal(dec!(1500.0), Precision::MONEY), "1500.00");
        assert_eq!(format_decimal(dec!(49.9), Precision::MONEY), "49.90");
        assert_eq!(format_decimal(dec!(2), Precision::QUANTITY), "2.000");
        assert_eq!(format_decimal(dec!(1.23456), Precision::QUANTITY), "1.235");
    }

    #[test]
    fn large_and_tiny_values_stay_fixed_point() {
        assert_eq!(
            format_decimal(dec!(12345678901234.5), Precision::MONEY),
            "12345678901234.50"
        );
        assert_eq!(format_decimal(dec!(0.0000001), Precision::MONEY), "0.00");
        assert_eq!(format_decimal(dec!(-0.001), Precision::MONEY), "0.00");
    }

    #[test]
    fn negative_ties_round_away_from_zero() {
        assert_eq!(format_decimal(dec!(-2.005), Precision::MONEY), "-2.01");
    }

    #[test]
    fn precision_from_step() {
        assert_eq!(Precision::from_step(dec!(0.01)).unwrap(), Precision::MONEY);
        assert_eq!(Precision::from_step(dec!(0.0010)).unwrap(), Precision::QUANTITY);
        assert_eq!(Precision::from_step(dec!(1)).unwrap().dp(), 0);
        assert_eq!(Precision::MONEY.step(), dec!(0.01));

        for bad in [dec!(0), dec!(0.05), dec!(10), dec!(-0.01), dec!(0.25)] {
            assert!(
                matches!(Precision::from_step(bad), Err(FacturxError::Builder(_))),
                "step {bad} should be rejected"
            );
        }
    }
}

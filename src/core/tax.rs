//! VAT aggregation: per-line rounding, grouping by rate, document totals.
//!
//! Rounding happens per line, before grouping: each line total and each line
//! tax is rounded to the cent first, and groups and document totals are sums
//! of those rounded values. As a consequence `taxable_total + tax_total`
//! always equals `grand_total` to the cent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::decimal::{Precision, round_half_up};
use super::types::LineItem;

/// Rounded amounts for one invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// `unit_price × quantity`, rounded to the cent.
    pub line_total: Decimal,
    /// `line_total × vat_rate / 100`, rounded to the cent.
    pub line_tax: Decimal,
}

/// Accumulated basis and tax for all lines sharing one VAT rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatGroup {
    /// BT-119: rate as first seen on the invoice.
    pub rate: Decimal,
    /// BT-116: sum of rounded line totals.
    pub basis: Decimal,
    /// BT-117: sum of rounded line taxes.
    pub tax: Decimal,
}

/// VAT groups keyed by rate, iterated in order of first appearance.
///
/// Rates are compared by exact decimal value, so `20` and `20.00` share a
/// group. Output order is part of the XML contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VatGroups {
    groups: Vec<VatGroup>,
}

impl VatGroups {
    /// An empty set of groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rounded line to the group for `rate`, creating it at the end if new.
    pub fn add(&mut self, rate: Decimal, basis: Decimal, tax: Decimal) {
        match self.groups.iter_mut().find(|g| g.rate == rate) {
            Some(group) => {
                group.basis += basis;
                group.tax += tax;
            }
            None => self.groups.push(VatGroup { rate, basis, tax }),
        }
    }

    /// The group for `rate`, if any line used it.
    pub fn get(&self, rate: Decimal) -> Option<&VatGroup> {
        self.groups.iter().find(|g| g.rate == rate)
    }

    /// Groups in order of first appearance.
    pub fn iter(&self) -> std::slice::Iter<'_, VatGroup> {
        self.groups.iter()
    }

    /// Number of distinct rates.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when no line has been added.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> IntoIterator for &'a VatGroups {
    type Item = &'a VatGroup;
    type IntoIter = std::slice::Iter<'a, VatGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxSummary {
    /// One entry per input line, in input order.
    pub lines: Vec<LineTotals>,
    /// BG-23: VAT breakdown.
    pub vat_groups: VatGroups,
    /// BT-106 / BT-109: sum of group bases.
    pub taxable_total: Decimal,
    /// BT-110: sum of group taxes.
    pub tax_total: Decimal,
    /// BT-112 / BT-115: `taxable_total + tax_total`.
    pub grand_total: Decimal,
}

/// Rounded total and tax for a single line.
pub fn line_totals(line: &LineItem) -> LineTotals {
    let line_total = round_half_up(line.unit_price * line.quantity, Precision::MONEY);
    let line_tax = round_half_up(line_total * line.vat_rate / dec!(100), Precision::MONEY);
    LineTotals {
        line_total,
        line_tax,
    }
}

/// Compute per-line totals, VAT groups and document totals.
pub fn aggregate(lines: &[LineItem]) -> TaxSummary {
    let mut vat_groups = VatGroups::new();
    let mut totals = Vec::with_capacity(lines.len());

    for line in lines {
        let lt = line_totals(line);
        vat_groups.add(line.vat_rate, lt.line_total, lt.line_tax);
        totals.push(lt);
    }

    let taxable_total: Decimal = vat_groups.iter().map(|g| g.basis).sum();
    let tax_total: Decimal = vat_groups.iter().map(|g| g.tax).sum();
    let grand_total = taxable_total + tax_total;

    for group in &vat_groups {
        tracing::trace!(rate = %group.rate, basis = %group.basis, tax = %group.tax, "vat group");
    }
    tracing::debug!(
        lines = lines.len(),
        groups = vat_groups.len(),
        %grand_total,
        "aggregated invoice taxes"
    );

    TaxSummary {
        lines: totals,
        vat_groups,
        taxable_total,
        tax_total,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: Decimal, price: Decimal, rate: Decimal) -> LineItem {
        LineItem {
            description: "Item".into(),
            quantity: qty,
            unit_price: price,
            vat_rate: rate,
        }
    }

    #[test]
    fn two_lines_same_rate_merge() {
        let summary = aggregate(&[
            line(dec!(2), dec!(150), dec!(20)),
            line(dec!(1), dec!(300), dec!(20)),
        ]);
        assert_eq!(summary.lines[0].line_total, dec!(300.00));
        assert_eq!(summary.lines[1].line_total, dec!(300.00));
        assert_eq!(summary.vat_groups.len(), 1);
        let group = summary.vat_groups.get(dec!(20)).unwrap();
        assert_eq!(group.basis, dec!(600.00));
        assert_eq!(group.tax, dec!(120.00));
        assert_eq!(summary.taxable_total, dec!(600.00));
        assert_eq!(summary.tax_total, dec!(120.00));
        assert_eq!(summary.grand_total, dec!(720.00));
    }

    #[test]
    fn groups_follow_first_appearance() {
        let summary = aggregate(&[
            line(dec!(1), dec!(100), dec!(10)),
            line(dec!(1), dec!(50), dec!(20)),
            line(dec!(1), dec!(10), dec!(10.0)),
            line(dec!(1), dec!(5), dec!(5.5)),
        ]);
        let rates: Vec<Decimal> = summary.vat_groups.iter().map(|g| g.rate).collect();
        assert_eq!(rates, vec![dec!(10), dec!(20), dec!(5.5)]);
        assert_eq!(summary.vat_groups.get(dec!(10)).unwrap().basis, dec!(110.00));
    }

    #[test]
    fn rounds_per_line_before_summing() {
        // 3 × 0.335 = 1.005 → 1.01 per line; summed unrounded it would be 2.01.
        let summary = aggregate(&[
            line(dec!(3), dec!(0.335), dec!(0)),
            line(dec!(3), dec!(0.335), dec!(0)),
        ]);
        assert_eq!(summary.taxable_total, dec!(2.02));

        // 0.05 × 10% = 0.005 → 0.01 per line; aggregate-first would give 0.02 on 0.15.
        let summary = aggregate(&[
            line(dec!(1), dec!(0.05), dec!(10)),
            line(dec!(1), dec!(0.05), dec!(10)),
            line(dec!(1), dec!(0.05), dec!(10)),
        ]);
        assert_eq!(summary.tax_total, dec!(0.03));
        assert_eq!(summary.grand_total, dec!(0.18));
    }

    #[test]
    fn zero_rate_lines_form_their_own_group() {
        let summary = aggregate(&[
            line(dec!(1), dec!(100), dec!(0)),
            line(dec!(1), dec!(100), dec!(20)),
        ]);
        assert_eq!(summary.vat_groups.len(), 2);
        assert_eq!(summary.vat_groups.get(dec!(0)).unwrap().tax, dec!(0.00));
        assert_eq!(summary.grand_total, dec!(220.00));
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let summary = aggregate(&[]);
        assert!(summary.vat_groups.is_empty());
        assert_eq!(summary.grand_total, Decimal::ZERO);
    }
}

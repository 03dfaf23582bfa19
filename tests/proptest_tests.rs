//! Property-based tests for aggregation and XML generation.
//!
//! Run with: `cargo test --features all --test proptest_tests`

#![cfg(feature = "cii")]

use chrono::NaiveDate;
use facturx::cii::{self, SchemaValidator, StructuralValidator};
use facturx::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn invoice(lines: Vec<LineItem>) -> Invoice {
    let address = || AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build();
    let mut builder = InvoiceBuilder::new("PROP-1", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .seller(PartyBuilder::new("ACME Corp", address()).build())
        .buyer(PartyBuilder::new("Client SAS", address()).build());
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build().unwrap()
}

/// Quantities 0.001..=999.999, prices 0.00..=9999.9999, rates from a small
/// set so groups actually merge.
fn arb_line() -> impl Strategy<Value = LineItem> {
    (
        1i64..=999_999,
        0i64..=99_999_999,
        prop::sample::select(vec!["0", "2.1", "5.5", "7", "10", "19", "20", "21"]),
    )
        .prop_map(|(qty, price, rate)| {
            LineItemBuilder::new("Item", Decimal::new(qty, 3), Decimal::new(price, 4))
                .vat_rate(rate.parse().unwrap())
                .build()
        })
}

fn arb_lines() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(arb_line(), 1..20)
}

proptest! {
    #[test]
    fn totals_reconcile(lines in arb_lines()) {
        let summary = aggregate(&lines);

        let line_sum: Decimal = summary.lines.iter().map(|l| l.line_total).sum();
        let line_tax_sum: Decimal = summary.lines.iter().map(|l| l.line_tax).sum();
        prop_assert_eq!(summary.taxable_total, line_sum);
        prop_assert_eq!(summary.tax_total, line_tax_sum);
        prop_assert_eq!(summary.grand_total, summary.taxable_total + summary.tax_total);

        for group in &summary.vat_groups {
            let basis: Decimal = lines
                .iter()
                .zip(&summary.lines)
                .filter(|(l, _)| l.vat_rate == group.rate)
                .map(|(_, t)| t.line_total)
                .sum();
            prop_assert_eq!(group.basis, basis);
        }
    }

    #[test]
    fn every_amount_has_two_decimals(lines in arb_lines()) {
        let summary = aggregate(&lines);
        for totals in &summary.lines {
            prop_assert_eq!(round_half_up(totals.line_total, Precision::MONEY), totals.line_total);
            prop_assert_eq!(round_half_up(totals.line_tax, Precision::MONEY), totals.line_tax);
        }
    }

    #[test]
    fn one_group_per_distinct_rate(lines in arb_lines()) {
        let summary = aggregate(&lines);
        let mut distinct: Vec<Decimal> = Vec::new();
        for line in &lines {
            if !distinct.contains(&line.vat_rate) {
                distinct.push(line.vat_rate);
            }
        }
        let rates: Vec<Decimal> = summary.vat_groups.iter().map(|g| g.rate).collect();
        prop_assert_eq!(rates, distinct);
    }

    #[test]
    fn generated_xml_is_deterministic_and_conformant(lines in arb_lines()) {
        let inv = invoice(lines);
        let xml = cii::to_facturx_xml(&inv).unwrap();
        prop_assert_eq!(&xml, &cii::to_facturx_xml(&inv).unwrap());
        prop_assert!(StructuralValidator.validate(&xml).is_ok());
    }

    #[test]
    fn format_decimal_pads_to_precision(mantissa in -10_000_000i64..10_000_000, scale in 0u32..6) {
        let formatted = format_decimal(Decimal::new(mantissa, scale), Precision::MONEY);
        let (_, fraction) = formatted.split_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);
        prop_assert!(!formatted.starts_with("-0.00"));
    }
}

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use facturx::cii::{self, SchemaValidator, StructuralValidator};
use facturx::core::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn build_invoice(lines: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new(format!("BENCH-{lines}"), test_date())
        .seller(
            PartyBuilder::new(
                "Benchmark SARL",
                AddressBuilder::new("1 Rue du Test", "75001", "Paris", "FR").build(),
            )
            .vat_identifier("FR12345678901")
            .build(),
        )
        .buyer(
            PartyBuilder::new(
                "Client SAS",
                AddressBuilder::new("10 Rue de la Paix", "75002", "Paris", "FR").build(),
            )
            .build(),
        )
        .seller_bank_iban("FR7630004000031234567890143");

    let rates = [dec!(20), dec!(10), dec!(5.5)];
    for i in 0..lines {
        builder = builder.add_line(
            LineItemBuilder::new(format!("Item {i}"), dec!(3), dec!(9.99))
                .vat_rate(rates[i % rates.len()])
                .build(),
        );
    }

    builder.build().unwrap()
}

fn bench_aggregate(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("aggregate_10_lines", |b| {
        b.iter(|| black_box(aggregate(black_box(&invoice.line_items))));
    });
}

fn bench_xml_10_lines(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("facturx_xml_10_lines", |b| {
        b.iter(|| black_box(cii::to_facturx_xml(black_box(&invoice))));
    });
}

fn bench_xml_1000_lines(c: &mut Criterion) {
    let invoice = build_invoice(1000);
    c.bench_function("facturx_xml_1000_lines", |b| {
        b.iter(|| black_box(cii::to_facturx_xml(black_box(&invoice))));
    });
}

fn bench_structural_check_1000_lines(c: &mut Criterion) {
    let xml = cii::to_facturx_xml(&build_invoice(1000)).unwrap();
    c.bench_function("structural_check_1000_lines", |b| {
        b.iter(|| black_box(StructuralValidator.validate(black_box(&xml))));
    });
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_xml_10_lines,
    bench_xml_1000_lines,
    bench_structural_check_1000_lines,
);
criterion_main!(benches);

//! Read an invoice as JSON and print its Factur-X XML.
//!
//! ```text
//! RUST_LOG=facturx=debug cargo run --example facturx_xml --features all -- invoice.json
//! ```
//!
//! Without an argument the bundled `demos/invoice.json` is used.

use facturx::Invoice;
use facturx::cii::{self, StructuralValidator};
use tracing_subscriber::EnvFilter;

const BUNDLED: &str = include_str!("invoice.json");

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {path}: {e}")),
        None => BUNDLED.to_string(),
    };

    let invoice = match Invoice::from_json(&json) {
        Ok(invoice) => invoice,
        Err(e) => {
            eprintln!("{e}");
            for v in e.validation_errors() {
                eprintln!("  {v}");
            }
            std::process::exit(1);
        }
    };

    let summary = invoice.tax_summary();
    eprintln!(
        "{}: {} lines, net {} + VAT {} = {} {}",
        invoice.invoice_number,
        invoice.line_items.len(),
        summary.taxable_total,
        summary.tax_total,
        summary.grand_total,
        invoice.currency
    );

    let xml = cii::to_validated_xml(&invoice, &StructuralValidator).expect("generated XML is conformant");
    println!("{}", String::from_utf8_lossy(&xml).trim_end());
    eprintln!("write as {} when embedding into PDF/A-3", cii::FACTURX_FILENAME);
}

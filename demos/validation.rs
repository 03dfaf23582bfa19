use chrono::NaiveDate;
use facturx::cii::{self, SchemaValidator, StructuralValidator};
use facturx::core::*;
use rust_decimal_macros::dec;

fn main() {
    let address = AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build();

    // An invoice that breaks several intake rules at once
    let result = InvoiceBuilder::new("", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .currency("EURO")
        .seller(PartyBuilder::new("ACME Corp", address.clone()).build())
        .buyer(
            PartyBuilder::new(
                "Client SAS",
                AddressBuilder::new("10 Rue de la Paix", "75002", "Paris", "FRA").build(),
            )
            .build(),
        )
        .add_line(LineItemBuilder::new("Consulting", dec!(0), dec!(150)).vat_rate(dec!(20)).build())
        .add_line(LineItemBuilder::new("Discount", dec!(1), dec!(-10)).build())
        .build();

    match result {
        Ok(_) => println!("unexpectedly valid"),
        Err(e) => {
            println!("Intake validation: {} errors", e.validation_errors().len());
            for v in e.validation_errors() {
                println!("  {v}");
            }
        }
    }

    // A valid invoice, checked structurally after generation
    let invoice = InvoiceBuilder::new("INV-2024-0001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .seller(PartyBuilder::new("ACME Corp", address.clone()).vat_identifier("FR12345678901").build())
        .buyer(PartyBuilder::new("Client SAS", address).build())
        .add_line(LineItemBuilder::new("Consulting", dec!(2), dec!(150)).vat_rate(dec!(20)).build())
        .add_line(LineItemBuilder::new("Books", dec!(3), dec!(12.50)).vat_rate(dec!(5.5)).build())
        .build()
        .expect("invoice should be valid");

    let xml = cii::to_facturx_xml(&invoice).expect("XML generation");
    match StructuralValidator.validate(&xml) {
        Ok(()) => println!("\nStructural check: OK ({} bytes)", xml.len()),
        Err(violations) => {
            println!("\nStructural check: {} violations", violations.len());
            for v in &violations {
                println!("  {v}");
            }
        }
    }

    // Tampering with a total is caught
    let tampered = String::from_utf8_lossy(&xml).replace(
        "<ram:GrandTotalAmount currencyID=\"EUR\">",
        "<ram:GrandTotalAmount currencyID=\"EUR\">1",
    );
    if let Err(violations) = StructuralValidator.validate(tampered.as_bytes()) {
        println!("Tampered document: {} violations", violations.len());
        for v in &violations {
            println!("  {v}");
        }
    }
}

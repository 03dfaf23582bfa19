#![no_main]

use facturx::cii::{SchemaValidator, StructuralValidator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Any invoice that passes intake must produce conformant XML.
        if let Ok(invoice) = facturx::Invoice::from_json(s) {
            let xml = facturx::cii::to_facturx_xml(&invoice).unwrap();
            assert!(StructuralValidator.validate(&xml).is_ok());
        }
    }
});

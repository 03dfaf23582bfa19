use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::FacturxError;
use super::types::*;
use super::validation;

/// Builder for constructing valid invoices.
///
/// ```
/// use facturx::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-2024-0001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .seller(PartyBuilder::new("ACME Corp", AddressBuilder::new("1 Infinite Loop", "75001", "Paris", "FR").build())
///         .vat_identifier("FR12345678901")
///         .build())
///     .buyer(PartyBuilder::new("Client SAS", AddressBuilder::new("10 Rue de la Paix", "75002", "Paris", "FR").build())
///         .build())
///     .add_line(LineItemBuilder::new("Consulting services", dec!(2), dec!(150)).vat_rate(dec!(20)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.tax_summary().grand_total, dec!(360.00));
/// ```
pub struct InvoiceBuilder {
    invoice_number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    seller: Option<Party>,
    buyer: Option<Party>,
    currency: String,
    line_items: Vec<LineItem>,
    payment_reference: Option<String>,
    payment_means_code: PaymentMeansCode,
    seller_bank_iban: Option<String>,
}

impl InvoiceBuilder {
    pub fn new(invoice_number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            issue_date,
            due_date: None,
            seller: None,
            buyer: None,
            currency: DEFAULT_CURRENCY.to_string(),
            line_items: Vec::new(),
            payment_reference: None,
            payment_means_code: PaymentMeansCode::default(),
            seller_bank_iban: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Remittance information; blank values are treated as absent.
    pub fn payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_reference = non_blank(Some(reference.into()));
        self
    }

    pub fn payment_means(mut self, code: PaymentMeansCode) -> Self {
        self.payment_means_code = code;
        self
    }

    /// Seller IBAN; whitespace is stripped.
    pub fn seller_bank_iban(mut self, iban: impl AsRef<str>) -> Self {
        self.seller_bank_iban = non_blank(Some(normalize_iban(iban.as_ref())));
        self
    }

    /// Build the invoice and run intake validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, FacturxError> {
        let invoice = self.build_unchecked()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            return Err(FacturxError::Validation(errors));
        }

        Ok(invoice)
    }

    /// Build without validation, for tests or importing external data.
    pub fn build_unchecked(self) -> Result<Invoice, FacturxError> {
        let seller = self
            .seller
            .ok_or_else(|| FacturxError::Builder("seller is required".into()))?;
        let buyer = self
            .buyer
            .ok_or_else(|| FacturxError::Builder("buyer is required".into()))?;

        Ok(Invoice {
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            seller,
            buyer,
            currency: self.currency,
            line_items: self.line_items,
            payment_reference: self.payment_reference,
            payment_means_code: self.payment_means_code,
            seller_bank_iban: self.seller_bank_iban,
        })
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    address: Address,
    vat_identifier: Option<String>,
    tax_registration_id: Option<String>,
    email: Option<String>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            vat_identifier: None,
            tax_registration_id: None,
            email: None,
        }
    }

    pub fn vat_identifier(mut self, id: impl Into<String>) -> Self {
        self.vat_identifier = non_blank(Some(id.into()));
        self
    }

    pub fn tax_registration_id(mut self, id: impl Into<String>) -> Self {
        self.tax_registration_id = non_blank(Some(id.into()));
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = non_blank(Some(email.into()));
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            address: self.address,
            vat_identifier: self.vat_identifier,
            tax_registration_id: self.tax_registration_id,
            email: self.email,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: String,
    postal_code: String,
    city: String,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        street: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            postal_code: postal_code.into(),
            city: city.into(),
            country_code: country_code.into(),
        }
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            postal_code: self.postal_code,
            city: self.city,
            country_code: self.country_code,
        }
    }
}

/// Builder for LineItem. The VAT rate defaults to 0%.
pub struct LineItemBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Decimal,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            vat_rate: Decimal::ZERO,
        }
    }

    pub fn vat_rate(mut self, rate: Decimal) -> Self {
        self.vat_rate = rate;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_rate: self.vat_rate,
        }
    }
}

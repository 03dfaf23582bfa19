use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::tax::{self, TaxSummary};

/// Default invoice currency (ISO 4217).
pub const DEFAULT_CURRENCY: &str = "EUR";

/// BG-0: Invoice: the top-level document.
///
/// Instances are expected to satisfy the invariants checked by
/// [`validate_invoice`](super::validate_invoice). The XML generator trusts
/// them and performs no business validation of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-1: Invoice number.
    pub invoice_number: String,
    /// BT-2: Invoice issue date.
    pub issue_date: NaiveDate,
    /// BT-9: Payment due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BT-5: Invoice currency code (ISO 4217, e.g. "EUR").
    #[serde(default = "default_currency")]
    pub currency: String,
    /// BG-25: Invoice lines, in document order.
    pub line_items: Vec<LineItem>,
    /// BT-83: Remittance information.
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub payment_reference: Option<String>,
    /// BT-81: Payment means type code.
    #[serde(default)]
    pub payment_means_code: PaymentMeansCode,
    /// BT-84: Seller IBAN, without whitespace.
    #[serde(default, deserialize_with = "deserialize_iban")]
    pub seller_bank_iban: Option<String>,
}

impl Invoice {
    /// Per-line totals, VAT groups and document totals for this invoice.
    pub fn tax_summary(&self) -> TaxSummary {
        tax::aggregate(&self.line_items)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn deserialize_iban<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(raw.map(|iban| normalize_iban(&iban))))
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(Option::<String>::deserialize(deserializer)?))
}

/// Treat an empty or all-whitespace optional value as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Strip all whitespace from an IBAN ("FR76 3000 ..." → "FR763000...").
pub fn normalize_iban(iban: &str) -> String {
    iban.chars().filter(|c| !c.is_whitespace()).collect()
}

/// BG-4 / BG-7: Party (seller or buyer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Name.
    pub name: String,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BT-31 / BT-48: VAT identifier (e.g. "FR12345678901").
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub vat_identifier: Option<String>,
    /// BT-30 / BT-47: Legal registration identifier (SIREN, HRB, ...).
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub tax_registration_id: Option<String>,
    /// BT-34 / BT-49: Electronic address.
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub email: Option<String>,
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50: Street + house number.
    pub street: String,
    /// BT-38 / BT-53: Postal code.
    pub postal_code: String,
    /// BT-37 / BT-52: City.
    pub city: String,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
}

/// BG-25: Invoice line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// BT-153: Item name.
    pub description: String,
    /// BT-129: Invoiced quantity.
    pub quantity: Decimal,
    /// BT-146: Item net price (per unit).
    pub unit_price: Decimal,
    /// BT-152: VAT rate percentage.
    pub vat_rate: Decimal,
}

/// UNTDID 4461: payment means codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentMeansCode {
    /// 10: Cash.
    Cash,
    /// 30: Credit transfer.
    #[default]
    CreditTransfer,
    /// 42: Payment to bank account.
    PaymentToBankAccount,
    /// 48: Bank card.
    BankCard,
    /// 49: Direct debit.
    DirectDebit,
    /// 57: Standing agreement.
    StandingAgreement,
    /// 58: SEPA credit transfer.
    SepaCreditTransfer,
    /// 59: SEPA direct debit.
    SepaDirectDebit,
    /// Other code value.
    Other(u16),
}

impl PaymentMeansCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::Cash => 10,
            Self::CreditTransfer => 30,
            Self::PaymentToBankAccount => 42,
            Self::BankCard => 48,
            Self::DirectDebit => 49,
            Self::StandingAgreement => 57,
            Self::SepaCreditTransfer => 58,
            Self::SepaDirectDebit => 59,
            Self::Other(c) => *c,
        }
    }

    /// Parse from UNTDID 4461 numeric code.
    pub fn from_code(code: u16) -> Self {
        match code {
            10 => Self::Cash,
            30 => Self::CreditTransfer,
            42 => Self::PaymentToBankAccount,
            48 => Self::BankCard,
            49 => Self::DirectDebit,
            57 => Self::StandingAgreement,
            58 => Self::SepaCreditTransfer,
            59 => Self::SepaDirectDebit,
            c => Self::Other(c),
        }
    }
}

impl std::fmt::Display for PaymentMeansCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for PaymentMeansCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaymentMeansCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Text(String),
        }

        let code = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.trim().parse::<u16>().map_err(|_| {
                serde::de::Error::custom(format!("invalid payment means code: {s:?}"))
            })?,
        };
        Ok(Self::from_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_means_code_roundtrips_known_and_other() {
        assert_eq!(PaymentMeansCode::default().code(), 30);
        assert_eq!(PaymentMeansCode::from_code(58), PaymentMeansCode::SepaCreditTransfer);
        assert_eq!(PaymentMeansCode::from_code(97), PaymentMeansCode::Other(97));
        assert_eq!(PaymentMeansCode::Other(97).to_string(), "97");
    }

    #[test]
    fn payment_means_code_is_normalized_to_its_number() {
        let code: PaymentMeansCode = serde_json::from_str("\"030\"").unwrap();
        assert_eq!(code, PaymentMeansCode::CreditTransfer);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"30\"");
        assert!(serde_json::from_str::<PaymentMeansCode>("\"ZZZ\"").is_err());
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some(" \t".into())), None);
        assert_eq!(non_blank(Some("x".into())), Some("x".into()));
    }

    #[test]
    fn iban_whitespace_is_stripped() {
        assert_eq!(
            normalize_iban("FR76 3000 4000 0312 3456 7890 143"),
            "FR7630004000031234567890143"
        );
        assert_eq!(normalize_iban("DE89\t3704 0044\n0532 0130 00"), "DE89370400440532013000");
    }
}

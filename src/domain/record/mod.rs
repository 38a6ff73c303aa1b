use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::error::Error;

pub type RecordId = u32;

#[derive(Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Income,
    Expense,
}

impl OperationType {
    /// Parses loose user input: `income`/`expense` in any case, or the menu
    /// shortcuts `1` and `2`.
    pub fn from_input(input: &str) -> Result<Self, Error> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "income" => Ok(Self::Income),
            "2" | "expense" => Ok(Self::Expense),
            _ => Err(Error::InvalidInput(input.to_owned())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

/// Exact, case-sensitive match on the persisted names.
impl FromStr for OperationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(Error::InvalidInput(s.to_owned())),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("INCOME"),
            Self::Expense => f.write_str("EXPENSE"),
        }
    }
}

/// A single income or expense entry.
///
/// Field order here is the column order of the persisted file.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Record {
    id: RecordId,
    #[serde(rename = "type")]
    kind: OperationType,
    category: String,
    #[serde(
        serialize_with = "serialize_amount",
        deserialize_with = "deserialize_amount"
    )]
    amount: Decimal,
    date: NaiveDate,
}

impl Record {
    /// Builds a record as-is. Amount and category are not checked here, see
    /// [`crate::domain::ledger::Ledger::add`] for the validated path.
    pub fn new(
        id: RecordId,
        kind: OperationType,
        category: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            kind,
            category: category.into(),
            amount,
            date,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn kind(&self) -> OperationType {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_kind(&mut self, kind: OperationType) {
        self.kind = kind;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Amount with its sign applied: positive for income, negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            OperationType::Income => self.amount,
            OperationType::Expense => -self.amount,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | {} | Category: {:<10} | Amount: {:>10} | Date: {}",
            self.id,
            self.kind.label(),
            self.category,
            format!("{:.2}", round_cents(self.amount)),
            self.date
        )
    }
}

pub(crate) fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn serialize_amount<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", round_cents(*amount)))
}

fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Decimal::from_str(&raw.replace(',', ".")).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn persisted_names_are_case_sensitive() {
        assert_eq!("INCOME".parse::<OperationType>(), Ok(OperationType::Income));
        assert_eq!("EXPENSE".parse::<OperationType>(), Ok(OperationType::Expense));
        assert!("income".parse::<OperationType>().is_err());
        assert!("Expense".parse::<OperationType>().is_err());
    }

    #[test]
    fn user_input_accepts_names_and_shortcuts() {
        assert_eq!(OperationType::from_input("1"), Ok(OperationType::Income));
        assert_eq!(OperationType::from_input(" Expense "), Ok(OperationType::Expense));
        assert_eq!(OperationType::from_input("2"), Ok(OperationType::Expense));
        assert_eq!(
            OperationType::from_input("3"),
            Err(Error::InvalidInput("3".to_owned()))
        );
    }

    #[test]
    fn setters_replace_fields_but_keep_id() {
        let mut record = Record::new(7, OperationType::Income, "Salary", dec!(10), day(1));
        record.set_kind(OperationType::Expense);
        record.set_category("Food");
        record.set_amount(dec!(3.5));
        record.set_date(day(2));

        assert_eq!(record.id(), 7);
        assert_eq!(record.kind(), OperationType::Expense);
        assert_eq!(record.category(), "Food");
        assert_eq!(record.amount(), dec!(3.5));
        assert_eq!(record.date(), day(2));
        assert_eq!(record.signed_amount(), dec!(-3.5));
    }

    #[test]
    fn display_renders_two_decimals() {
        let record = Record::new(1, OperationType::Expense, "Food", dec!(150), day(10));
        let line = record.to_string();

        assert!(line.starts_with("ID: 1 | Expense | Category: Food"));
        assert!(line.contains("150.00"));
        assert!(line.ends_with("Date: 2024-01-10"));
    }
}

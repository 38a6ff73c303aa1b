use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    error::{Error, Result},
    record::{OperationType, Record, RecordId},
};
use crate::csv::{self, Import};

const DEFAULT_CATEGORIES: [(&str, OperationType); 14] = [
    ("Salary", OperationType::Income),
    ("Prize", OperationType::Income),
    ("Investment", OperationType::Income),
    ("Gift", OperationType::Income),
    ("Refund", OperationType::Income),
    ("Freelance", OperationType::Income),
    ("Food", OperationType::Expense),
    ("Transport", OperationType::Expense),
    ("Housing", OperationType::Expense),
    ("Entertainments", OperationType::Expense),
    ("Clothes", OperationType::Expense),
    ("Health", OperationType::Expense),
    ("Education", OperationType::Expense),
    ("Communal services", OperationType::Expense),
];

/// In-memory store of records plus the category registry.
///
/// Records keep insertion order. Each category is bound to one
/// [`OperationType`]; only [`Ledger::add`] enforces that binding.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: Vec<Record>,
    categories: HashMap<String, OperationType>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|&(name, kind)| (name.to_owned(), kind))
                .collect(),
        }
    }

    /// Appends a record without any validation, registering its category
    /// under the record's type when the category is unknown.
    pub fn add_record(&mut self, record: Record) {
        self.categories
            .entry(record.category().to_owned())
            .or_insert(record.kind());
        self.records.push(record);
    }

    /// Creates a record, checking that the category agrees with its
    /// registered type, and returns the assigned id.
    pub fn add(
        &mut self,
        kind: OperationType,
        category: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<RecordId> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidCategory);
        }
        if let Some(&expected) = self.categories.get(category) {
            if expected != kind {
                return Err(Error::CategoryTypeMismatch {
                    category: category.to_owned(),
                    expected,
                });
            }
        }
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(amount));
        }

        // Derived from the record count, so a removal lets a later add reuse
        // an id that a surviving record still carries.
        let id = next_id(self.records.len());
        debug!(id, %kind, category, %amount, %date, "adding record");
        self.add_record(Record::new(id, kind, category, amount, date));
        Ok(id)
    }

    /// Removes the first record carrying `id`.
    pub fn remove(&mut self, id: RecordId) -> bool {
        match self.records.iter().position(|record| record.id() == id) {
            Some(index) => {
                debug!(id, "removing record");
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    /// Overwrites every mutable field of the record carrying `id`. Unlike
    /// [`Ledger::add`] there is no category/type check here.
    pub fn update(
        &mut self,
        id: RecordId,
        kind: OperationType,
        category: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            return false;
        };

        debug!(id, %kind, category, %amount, %date, "updating record");
        record.set_kind(kind);
        record.set_category(category);
        record.set_amount(amount);
        record.set_date(date);
        true
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Newest first; records sharing a date keep their insertion order.
    pub fn records_sorted_by_date(&self) -> Vec<Record> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.date().cmp(&a.date()));
        records
    }

    pub fn total_balance(&self) -> Decimal {
        self.records.iter().map(Record::signed_amount).sum()
    }

    pub fn total_income(&self) -> Decimal {
        self.total_of(OperationType::Income)
    }

    pub fn total_expenses(&self) -> Decimal {
        self.total_of(OperationType::Expense)
    }

    fn total_of(&self, kind: OperationType) -> Decimal {
        self.records
            .iter()
            .filter(|record| record.kind() == kind)
            .map(Record::amount)
            .sum()
    }

    /// Records dated within `start..=end`.
    pub fn records_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Record>> {
        Ok(self.in_range(start, end)?.cloned().collect())
    }

    /// Sum of amounts per category within `start..=end`. Income and expense
    /// amounts filed under the same category are added together.
    pub fn statistics_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        Ok(self
            .in_range(start, end)?
            .map(|record| (record.category().to_owned(), record.amount()))
            .into_grouping_map()
            .sum())
    }

    pub fn statistics_by_type(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<OperationType, Decimal>> {
        Ok(self
            .in_range(start, end)?
            .map(|record| (record.kind(), record.amount()))
            .into_grouping_map()
            .sum())
    }

    fn in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<impl Iterator<Item = &Record> + '_> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }

        Ok(self
            .records
            .iter()
            .filter(move |record| (start..=end).contains(&record.date())))
    }

    /// Case-insensitive match on the category name.
    pub fn records_by_category(&self, category: &str) -> Vec<Record> {
        let wanted = category.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.category().to_lowercase() == wanted)
            .cloned()
            .collect()
    }

    pub fn records_by_type(&self, kind: OperationType) -> Vec<Record> {
        self.records
            .iter()
            .filter(|record| record.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn categories_by_type(&self, kind: OperationType) -> HashSet<String> {
        self.categories
            .iter()
            .filter(|&(_, &bound)| bound == kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Registers `name` under `kind`, replacing any previous binding.
    pub fn add_category(&mut self, name: &str, kind: OperationType) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidCategory);
        }

        debug!(name, %kind, "registering category");
        self.categories.insert(name.to_owned(), kind);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn categories(&self) -> HashMap<String, OperationType> {
        self.categories.clone()
    }

    /// Writes every record to `path`, overwriting the file.
    pub fn save(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        csv::save(path, &self.records)
    }

    /// Merges the records stored at `path` into this ledger.
    pub fn load(&mut self, path: impl AsRef<Path>) -> crate::error::Result<Import> {
        let import = csv::load(path)?;
        self.records.reserve(import.records.len());
        for record in import.records.iter().cloned() {
            self.add_record(record);
        }
        Ok(import)
    }

    /// Like [`Ledger::load`], but drops the current records first. The
    /// category registry is kept.
    pub fn load_replace(&mut self, path: impl AsRef<Path>) -> crate::error::Result<Import> {
        let import = csv::load(path)?;
        self.records.clear();
        for record in import.records.iter().cloned() {
            self.add_record(record);
        }
        Ok(import)
    }
}

/// Id for a new record given how many are stored. Saturates at
/// `RecordId::MAX` instead of wrapping.
fn next_id(count: usize) -> RecordId {
    RecordId::try_from(count).map_or(RecordId::MAX, |count| count.saturating_add(1))
}

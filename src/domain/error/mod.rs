use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::record::OperationType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("the category '{category}' must be of type {expected}")]
    CategoryTypeMismatch {
        category: String,
        expected: OperationType,
    },
    #[error("the category name cannot be empty")]
    InvalidCategory,
    #[error("the start date {start} cannot be after the end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("invalid operation type '{0}', expected income or expense")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

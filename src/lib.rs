//! Personal finance ledger: income and expense records, category
//! bookkeeping, period statistics and a flat comma-separated file format.

pub mod cli;
pub mod csv;
pub mod domain;
pub mod error;

pub use domain::{
    ledger::Ledger,
    record::{OperationType, Record, RecordId},
};

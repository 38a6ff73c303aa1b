//! Command-line front end.
//!
//! Every command reads the ledger file, runs one ledger operation and, when
//! the ledger changed, writes the whole file back.

use std::{path::PathBuf, str::FromStr};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::{
    domain::{
        ledger::Ledger,
        record::{round_cents, OperationType, Record, RecordId},
    },
    error::Result,
};

#[derive(Debug, Parser)]
#[command(name = "finledger", version, about = "Personal income and expense ledger")]
pub struct Cli {
    /// Ledger file to read and write
    #[arg(
        short,
        long,
        env = "FINLEDGER_FILE",
        default_value = "ledger.csv",
        global = true
    )]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new income or expense
    Add {
        /// income/expense (or 1/2)
        #[arg(value_parser = parse_kind)]
        kind: OperationType,
        category: String,
        /// Amount, e.g. "150.00" or "150,00"
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        /// Date as YYYY-MM-DD, today when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show records
    List {
        /// Newest first
        #[arg(short, long)]
        sorted: bool,
        /// Only this category (case-insensitive)
        #[arg(short, long, conflicts_with_all = ["kind", "from"])]
        category: Option<String>,
        /// Only this operation type
        #[arg(short = 't', long = "type", value_parser = parse_kind, conflicts_with = "from")]
        kind: Option<OperationType>,
        /// First day of the period (inclusive)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day of the period (inclusive)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Show total income, expenses and balance
    Balance,

    /// Sum amounts over a period
    Stats {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, value_enum, default_value_t = StatsBy::Category)]
        by: StatsBy,
    },

    /// Delete a record
    Remove { id: RecordId },

    /// Replace every field of a record
    Update {
        id: RecordId,
        #[arg(value_parser = parse_kind)]
        kind: OperationType,
        category: String,
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        date: NaiveDate,
    },

    /// List known categories
    Categories {
        #[arg(short = 't', long = "type", value_parser = parse_kind)]
        kind: Option<OperationType>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatsBy {
    Category,
    Type,
}

fn parse_kind(input: &str) -> std::result::Result<OperationType, crate::domain::error::Error> {
    OperationType::from_input(input)
}

fn parse_amount(input: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(&input.trim().replace(',', "."))
}

pub fn run(cli: Cli) -> Result<()> {
    let Cli { file, command } = cli;
    debug!(file = %file.display(), ?command, "running command");

    match command {
        Command::Add {
            kind,
            category,
            amount,
            date,
        } => {
            let mut ledger = open(&file, true)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let id = ledger.add(kind, &category, amount, date)?;
            ledger.save(&file)?;
            println!("Record {id} added.");
        }
        Command::List {
            sorted,
            category,
            kind,
            from,
            to,
        } => {
            let ledger = open(&file, false)?;
            let records = select(&ledger, sorted, category, kind, from.zip(to))?;
            print_records(&records);
        }
        Command::Balance => {
            let ledger = open(&file, false)?;
            let balance = ledger.total_balance();
            println!("Total income:    {:.2}", round_cents(ledger.total_income()));
            println!("Total expenses:  {:.2}", round_cents(ledger.total_expenses()));
            println!("Current balance: {:.2}", round_cents(balance));
            match balance.cmp(&Decimal::ZERO) {
                std::cmp::Ordering::Greater => println!("Your balance is positive."),
                std::cmp::Ordering::Less => println!("Your balance is negative."),
                std::cmp::Ordering::Equal => println!("Your balance is zero."),
            }
        }
        Command::Stats { from, to, by } => {
            let ledger = open(&file, false)?;
            let rows: Vec<(String, Decimal)> = match by {
                StatsBy::Category => ledger
                    .statistics_by_category(from, to)?
                    .into_iter()
                    .sorted()
                    .collect(),
                StatsBy::Type => ledger
                    .statistics_by_type(from, to)?
                    .into_iter()
                    .map(|(kind, sum)| (kind.label().to_owned(), sum))
                    .sorted()
                    .collect(),
            };
            if rows.is_empty() {
                println!("There is no data for the specified period.");
            } else {
                println!("Statistics for the period from {from} to {to}:");
                for (name, sum) in rows {
                    println!("{name:<20} {:>10.2}", round_cents(sum));
                }
            }
        }
        Command::Remove { id } => {
            let mut ledger = open(&file, false)?;
            if ledger.remove(id) {
                ledger.save(&file)?;
                println!("Record {id} removed.");
            } else {
                println!("No record with id {id}.");
            }
        }
        Command::Update {
            id,
            kind,
            category,
            amount,
            date,
        } => {
            let mut ledger = open(&file, false)?;
            if ledger.update(id, kind, category.trim(), amount, date) {
                ledger.save(&file)?;
                println!("Record {id} updated.");
            } else {
                println!("No record with id {id}.");
            }
        }
        Command::Categories { kind } => {
            let ledger = open(&file, true)?;
            let names: Vec<(String, OperationType)> = match kind {
                Some(kind) => ledger
                    .categories_by_type(kind)
                    .into_iter()
                    .map(|name| (name, kind))
                    .sorted()
                    .collect(),
                None => ledger.categories().into_iter().sorted().collect(),
            };
            for (name, kind) in names {
                println!("{name:<20} {}", kind.label());
            }
        }
    }

    Ok(())
}

/// Records to show for `list`. At most one filter applies; clap rejects
/// combinations.
fn select(
    ledger: &Ledger,
    sorted: bool,
    category: Option<String>,
    kind: Option<OperationType>,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Record>> {
    let mut records = match (category, kind, range) {
        (Some(category), _, _) => ledger.records_by_category(&category),
        (_, Some(kind), _) => ledger.records_by_type(kind),
        (_, _, Some((start, end))) => ledger.records_in_range(start, end)?,
        _ if sorted => return Ok(ledger.records_sorted_by_date()),
        _ => return Ok(ledger.records()),
    };
    if sorted {
        records.sort_by(|a, b| b.date().cmp(&a.date()));
    }
    Ok(records)
}

/// Loads the ledger stored at `path`. A missing file yields an empty ledger
/// when `allow_missing` is set.
fn open(path: &std::path::Path, allow_missing: bool) -> Result<Ledger> {
    let mut ledger = Ledger::new();
    if allow_missing && !path.exists() {
        info!(path = %path.display(), "ledger file not found, starting empty");
        return Ok(ledger);
    }

    let import = ledger.load_replace(path)?;
    if !import.rejected.is_empty() {
        eprintln!(
            "Skipped {} malformed line(s) in {}.",
            import.rejected.len(),
            path.display()
        );
    }
    Ok(ledger)
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }

    for record in records {
        println!("{record}");
    }
    println!("Total records: {}", records.len());
}

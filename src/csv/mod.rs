use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::{ByteRecord, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use tracing::{info, warn};

use crate::{domain::record::Record, error::Result};

const FIELDS: usize = 5;

/// Outcome of reading a ledger file.
///
/// Malformed lines never fail the whole read: they end up in `rejected`
/// and every other line is still returned.
#[derive(Debug, Default)]
pub struct Import {
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: u64,
    pub reason: String,
}

/// Writes the header followed by one row per record.
///
/// Fields are never quoted, so a category containing a comma produces a row
/// that will not read back.
pub fn write<'a>(records: impl IntoIterator<Item = &'a Record>, writer: impl Write) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut written = 0;
    for record in records {
        writer.serialize(record)?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(["id", "type", "category", "amount", "date"])?;
    }

    writer.flush()?;
    Ok(())
}

/// Parses records from a reader. The first physical line is the header and
/// is skipped whatever it holds; blank lines are skipped too.
///
/// Only I/O failures are returned as errors.
pub fn read(reader: impl Read) -> Result<Import> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut import = Import::default();
    let mut raw = ByteRecord::new();
    let mut last_line = 0;
    loop {
        match reader.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                last_line += 1;
                reject(&mut import, last_line, err.to_string());
                continue;
            }
        }

        let line = raw.position().map_or(last_line + 1, |pos| pos.line());
        last_line = line;
        if line == 1 {
            continue;
        }

        let mut row = match StringRecord::from_byte_record(raw.clone()) {
            Ok(row) => row,
            Err(err) => {
                reject(&mut import, line, err.to_string());
                continue;
            }
        };
        row.trim();
        if row.iter().all(str::is_empty) {
            continue;
        }
        if row.len() != FIELDS {
            reject(
                &mut import,
                line,
                format!("expected {FIELDS} fields, found {}", row.len()),
            );
            continue;
        }

        match row.deserialize::<Record>(None) {
            Ok(record) => import.records.push(record),
            Err(err) => reject(&mut import, line, err.to_string()),
        }
    }

    Ok(import)
}

fn reject(import: &mut Import, line: u64, reason: String) {
    warn!(line, %reason, "skipping malformed ledger line");
    import.rejected.push(RejectedLine { line, reason });
}

/// Overwrites `path` with `records`.
pub fn save<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut count = 0usize;
    write(records.into_iter().inspect(|_| count += 1), BufWriter::new(file))?;
    info!(path = %path.display(), count, "saved ledger");
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Import> {
    let path = path.as_ref();
    let import = read(BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        loaded = import.records.len(),
        rejected = import.rejected.len(),
        "loaded ledger"
    );
    Ok(import)
}

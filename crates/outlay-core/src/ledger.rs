//! Append-only CSV expense ledger
//!
//! The ledger is a plain CSV file with the header `date,category,amount,description`.
//! Reading is lenient:
//! - header cells are matched case-insensitively after trimming whitespace
//! - unknown columns are ignored
//! - a missing or unparsable amount becomes `0.0` instead of failing the load
//! - a missing file is an empty ledger
//!
//! Writing always uses the canonical lowercase header and appends exactly one
//! row per record. There is a single writer, so no locking is done.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{ExpenseRecord, Field};

/// Handle to the ledger file on disk
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Create a handle; the file itself is created lazily on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every record in file order
    pub fn load(&self) -> Result<Vec<ExpenseRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Ledger does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records = read_records(file)?;
        debug!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded ledger"
        );
        Ok(records)
    }

    /// Append one record, writing the header first if the ledger is new
    pub fn append(&self, record: &ExpenseRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut buf = Vec::new();
        if file.metadata()?.len() == 0 {
            buf.extend(header_line()?);
        } else {
            // A torn final row must not swallow the new one
            let tail = scan_tail(&mut file)?;
            if tail.quote_open {
                debug!(path = %self.path.display(), "Closing unterminated quoted field");
                buf.extend_from_slice(b"\"\n");
            } else if !tail.ends_with_newline {
                buf.push(b'\n');
            }
        }
        buf.extend(record_line(record)?);

        // One write per row
        file.write_all(&buf)?;
        file.flush()?;

        info!(
            category = %record.category,
            amount = record.amount,
            "Appended expense to {}",
            self.path.display()
        );
        Ok(())
    }
}

/// Parse ledger CSV from any reader
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = map_columns(rdr.byte_headers()?);
    let mut records = Vec::new();

    for result in rdr.byte_records() {
        let row = result?;
        records.push(row_to_record(&columns, &row));
    }

    Ok(records)
}

/// Map each header position to a known field
fn map_columns(headers: &ByteRecord) -> Vec<Option<Field>> {
    headers
        .iter()
        .map(|raw| {
            let header = String::from_utf8_lossy(raw);
            let header = header.trim_start_matches('\u{feff}');
            let field = Field::from_header(header);
            if field.is_none() {
                debug!(column = %header, "Ignoring unknown ledger column");
            }
            field
        })
        .collect()
}

fn row_to_record(columns: &[Option<Field>], row: &ByteRecord) -> ExpenseRecord {
    let mut date = String::new();
    let mut category = String::new();
    let mut amount: Option<String> = None;
    let mut description = String::new();

    // Later duplicate columns overwrite earlier ones
    for (i, column) in columns.iter().enumerate() {
        let (Some(field), Some(raw)) = (column, row.get(i)) else {
            continue;
        };
        let value = String::from_utf8_lossy(raw).into_owned();
        match field {
            Field::Date => date = value,
            Field::Category => category = value,
            Field::Amount => amount = Some(value),
            Field::Description => description = value,
        }
    }

    ExpenseRecord {
        date,
        category,
        amount: parse_amount(amount.as_deref()),
        description,
    }
}

/// Parse an amount cell; anything unusable becomes `0.0`
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let raw = raw.unwrap_or("0");
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            debug!(amount = %raw, "Unparsable amount, using 0.0");
            0.0
        }
    }
}

fn header_line() -> Result<Vec<u8>> {
    write_line(Field::ALL.iter().map(|f| f.as_str()))
}

fn record_line(record: &ExpenseRecord) -> Result<Vec<u8>> {
    write_line(Field::ALL.iter().map(|f| record.field(*f)))
}

fn write_line(cells: impl IntoIterator<Item = impl AsRef<[u8]>>) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(cells)?;
    wtr.into_inner()
        .map_err(|e| crate::error::Error::Io(e.into_error()))
}

/// How the existing file ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tail {
    ends_with_newline: bool,
    /// An odd number of `"` so far: the last row stopped inside a quoted field
    quote_open: bool,
}

/// Escaped quotes come in pairs, so quote parity over the whole file gives
/// the reader's state at EOF
fn scan_tail(file: &mut File) -> Result<Tail> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(file);
    let mut chunk = [0u8; 8192];
    let mut quotes = 0usize;
    let mut last = None;

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        quotes += chunk[..n].iter().filter(|&&b| b == b'"').count();
        last = Some(chunk[n - 1]);
    }

    Ok(Tail {
        ends_with_newline: last == Some(b'\n'),
        quote_open: quotes % 2 == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LedgerStore {
        LedgerStore::new(dir.path().join("expenses.csv"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = ExpenseRecord::new("2024-06-01", "Food", 12.5, "groceries");
        let second = ExpenseRecord::new("2024-06-02", "Utility", 80.0, "");
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .append(&ExpenseRecord::new("2024-06-01", "Food", 1.0, ""))
            .unwrap();
        store
            .append(&ExpenseRecord::new("2024-06-02", "Food", 2.0, ""))
            .unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,category,amount,description");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            contents.matches("date,category,amount,description").count(),
            1
        );
    }

    #[test]
    fn test_special_characters_preserved() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = ExpenseRecord::new(
            "2024-06-01",
            "Rent & Utilities",
            950.0,
            "June, \"final\" notice",
        );
        store.append(&record).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].category, "Rent & Utilities");
        assert_eq!(loaded[0].description, "June, \"final\" notice");
    }

    #[test]
    fn test_header_case_insensitive() {
        let upper = "DATE,Category,AMOUNT,Description\n2024-01-01,Food,10.5,pizza\n";
        let lower = "date,category,amount,description\n2024-01-01,Food,10.5,pizza\n";
        let padded = " Date , CATEGORY,amount ,description\n2024-01-01,Food,10.5,pizza\n";

        let a = read_records(upper.as_bytes()).unwrap();
        let b = read_records(lower.as_bytes()).unwrap();
        let c = read_records(padded.as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a[0].amount, 10.5);
    }

    #[test]
    fn test_malformed_amount_is_zero() {
        let csv = "date,category,amount,description\n2024-01-01,Food,abc,bad\n2024-01-02,Food,,empty\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 0.0);
        assert_eq!(records[1].amount, 0.0);
        assert_eq!(records[0].description, "bad");
    }

    #[test]
    fn test_missing_amount_column_is_zero() {
        let csv = "date,category,description\n2024-01-01,Food,no amount\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].amount, 0.0);
        assert_eq!(records[0].category, "Food");
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let csv = "date,merchant,category,amount,description,notes\n2024-01-01,ACME,Food,3.25,snack,extra\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(
            records[0],
            ExpenseRecord::new("2024-01-01", "Food", 3.25, "snack")
        );
    }

    #[test]
    fn test_short_rows_accepted() {
        let csv = "date,category,amount,description\n2024-01-01,Food\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].category, "Food");
        assert_eq!(records[0].amount, 0.0);
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_non_finite_amount_is_zero() {
        assert_eq!(parse_amount(Some("inf")), 0.0);
        assert_eq!(parse_amount(Some("NaN")), 0.0);
        assert_eq!(parse_amount(Some(" 4.5 ")), 4.5);
        assert_eq!(parse_amount(None), 0.0);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("nested").join("deep").join("log.csv"));
        store
            .append(&ExpenseRecord::new("2024-01-01", "Food", 1.0, ""))
            .unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_append_to_empty_file_writes_header() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "").unwrap();
        store
            .append(&ExpenseRecord::new("2024-01-01", "Food", 1.0, ""))
            .unwrap();
        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("date,category,amount,description\n"));
    }

    #[test]
    fn test_append_after_torn_row_keeps_prior_rows() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            "date,category,amount,description\n2024-01-01,Food,5,ok\n2024-01-02,Fo",
        )
        .unwrap();

        store
            .append(&ExpenseRecord::new("2024-01-03", "Utility", 7.0, "new"))
            .unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, 5.0);
        assert_eq!(records[2], ExpenseRecord::new("2024-01-03", "Utility", 7.0, "new"));
    }

    #[test]
    fn test_append_after_torn_quoted_field_keeps_new_rows() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            "date,category,amount,description\n2024-01-01,Food,5,ok\n2024-01-02,Food,3,\"lunch, with",
        )
        .unwrap();

        let third = ExpenseRecord::new("2024-01-03", "Utility", 7.0, "new");
        let fourth = ExpenseRecord::new("2024-01-04", "Rent", 900.0, "june, \"late\"");
        store.append(&third).unwrap();
        store.append(&fourth).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1], ExpenseRecord::new("2024-01-02", "Food", 3.0, "lunch, with"));
        assert_eq!(records[2], third);
        assert_eq!(records[3], fourth);
    }

    #[test]
    fn test_append_after_multiline_quoted_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = ExpenseRecord::new("2024-01-01", "Food", 5.0, "line one\nline two");
        store.append(&first).unwrap();
        store
            .append(&ExpenseRecord::new("2024-01-02", "Food", 6.0, "next"))
            .unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], first);
    }
}

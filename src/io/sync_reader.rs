//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over converted records from a CSV file.
//! The reader is generic over the row kind (`TransactionRow` or `ShareRow`)
//! and delegates format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<Row::Record, LedgerError>` for each CSV row:
//!
//! ```no_run
//! use split_settlement_engine::io::csv_format::{InputOptions, TransactionRow};
//! use split_settlement_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader =
//!     SyncReader::<TransactionRow>::new(Path::new("transactions.csv"), InputOptions::default())
//!         .unwrap();
//! for result in reader {
//!     match result {
//!         Ok(transaction) => println!("Loaded transaction: {}", transaction.id),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants carrying the line the
//!   row starts on, so quoted fields spanning several lines do not shift it

use crate::io::csv_format::{CsvRow, InputOptions};
use crate::types::LedgerError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time, so memory use does not grow with the file.
#[derive(Debug)]
pub struct SyncReader<Row> {
    reader: csv::Reader<File>,
    headers: StringRecord,
    options: InputOptions,
    _row: PhantomData<Row>,
}

impl<Row: CsvRow> SyncReader<Row> {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for optional trailing columns)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::FileNotFound` or `LedgerError::IoError` if the
    /// file could not be opened, and a CSV error if its header is unreadable.
    pub fn new(path: &Path, options: InputOptions) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::open_failed(path, e))?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            options,
            _row: PhantomData,
        })
    }
}

impl<Row: CsvRow> Iterator for SyncReader<Row> {
    type Item = Result<Row::Record, LedgerError>;

    /// Read and convert the next row
    ///
    /// Row errors are tagged with the file line the row starts on (the
    /// header is line 1).
    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
            Ok(true) => {
                let line = record.position().map_or(0, |pos| pos.line());
                let converted = record
                    .deserialize::<Row>(Some(&self.headers))
                    .map_err(LedgerError::from)
                    .and_then(|row| row.convert(&self.options));
                Some(converted.map_err(|e| e.at_line(line)))
            }
        }
    }
}

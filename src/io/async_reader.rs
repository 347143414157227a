//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading of converted records from any async byte source.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing into reusable string records
//! - each record's start position, so errors name the file line a row
//!   begins on even after quoted multi-line fields
//! - Batch reading so callers can yield between chunks of a large file
//!
//! # Architecture
//!
//! ```text
//! CSV bytes → AsyncReader<_, Row> → batches of Row::Record
//!                  ↓
//!           csv_format module
//!           (CsvRow::convert)
//! ```

use crate::io::csv_format::{CsvRow, InputOptions};
use crate::types::LedgerError;
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::io::AsyncRead;
use std::marker::PhantomData;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Invalid rows are logged with their line number, kept in `rejected` and
/// skipped.
pub struct AsyncReader<R: AsyncRead + Unpin, Row> {
    csv_reader: csv_async::AsyncReader<R>,
    headers: Option<StringRecord>,
    options: InputOptions,
    rejected: Vec<LedgerError>,
    _row: PhantomData<Row>,
}

impl<R: AsyncRead + Unpin + Send + 'static, Row: CsvRow> AsyncReader<R, Row> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R, options: InputOptions) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_reader(reader);

        Self {
            csv_reader,
            headers: None,
            options,
            rejected: Vec::new(),
            _row: PhantomData,
        }
    }

    /// Read a batch of records
    ///
    /// Reads rows until `batch_size` records converted successfully or the
    /// input ends. Returns an empty vector at the end of the input. An
    /// unreadable header ends the input and is kept as a rejection.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Row::Record> {
        let mut batch = Vec::with_capacity(batch_size);

        let headers = match self.headers.take() {
            Some(headers) => headers,
            None => match self.csv_reader.headers().await {
                Ok(headers) => headers.clone(),
                Err(e) => {
                    self.reject(e.into());
                    return batch;
                }
            },
        };

        let mut record = StringRecord::new();
        while batch.len() < batch_size {
            let converted = match self.csv_reader.read_record(&mut record).await {
                Ok(false) => break,
                Err(e) => Err(LedgerError::from(e)),
                Ok(true) => {
                    let line = record.position().map_or(0, |pos| pos.line());
                    record
                        .deserialize::<Row>(Some(&headers))
                        .map_err(LedgerError::from)
                        .and_then(|row| row.convert(&self.options))
                        .map_err(|e| e.at_line(line))
                }
            };

            match converted {
                Ok(parsed) => batch.push(parsed),
                Err(e) => self.reject(e),
            }
        }

        self.headers = Some(headers);
        batch
    }

    fn reject(&mut self, error: LedgerError) {
        warn!("Skipping record: {}", error);
        self.rejected.push(error);
    }

    /// Rows skipped so far, in file order
    pub fn rejected(&self) -> &[LedgerError] {
        &self.rejected
    }
}

//! I/O module
//!
//! Handles CSV parsing, ledger assembly and report output.
//!
//! # Components
//!
//! - `csv_format` - Row formats, conversion to domain types, report serialization
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface
//! - `assembly` - Attaching shares to their transactions

pub mod assembly;
pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use assembly::{assemble_transactions, AssembledLedger};
pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_share_row, convert_transaction_row, write_settlements_csv,
    write_shared_summaries_csv, write_user_totals_csv, CsvRow, InputOptions, PercentageScale,
    ShareRow, TransactionRow,
};
pub use sync_reader::SyncReader;

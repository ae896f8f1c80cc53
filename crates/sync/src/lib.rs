//! One-way mirror of issues into an external spreadsheet.
//!
//! - [`MirrorClient`] -- the spreadsheet operations the mirror needs
//!   (idempotent initialization, upsert-by-id, delete-by-id).
//! - [`SheetsClient`] -- Google Sheets v4 implementation over `reqwest`.
//! - [`MemoryMirror`] -- in-process implementation.
//! - [`MirrorSync`] -- non-blocking dispatcher that applies jobs in order on
//!   a single background worker. Failures are logged, never propagated.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod row;
pub mod sheets;

pub use client::MirrorClient;
pub use dispatcher::MirrorSync;
pub use error::SyncError;
pub use memory::MemoryMirror;
pub use row::SyncOperation;
pub use sheets::{SheetsClient, SheetsConfig};

//! docport: tenant-to-tenant migration for DocBase memos.
//!
//! The pipeline copies memos with their attachments, comments and tags from
//! one DocBase tenant to another over the REST API:
//!
//! list not-yet-exported memos → download attachments → re-upload to the
//! destination → rewrite in-body attachment URLs → create the memo → fan out
//! its comments → tag the source memo as exported.
//!
//! The API enforces per-minute rate limits; every request goes through a
//! shared executor that sleeps until the server-declared quota reset and
//! retries on HTTP 429. Any other failure aborts the whole run — the
//! exported tags already committed per memo make re-runs idempotent.

pub mod api;
pub mod config;
pub mod error;
pub mod migrate;
pub mod remove;

pub use api::DocbaseClient;
pub use config::MigrationConfig;
pub use error::{MigrationError, Result};
pub use migrate::MigrationDriver;

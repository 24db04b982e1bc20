//! The migration pipeline: attachments → memo → comments → sentinel tags.

pub mod attachments;
pub mod driver;
pub mod rewrite;

pub use attachments::{AttachmentMap, migrate_attachments};
pub use driver::{EXPORTED_TAG, MigrationDriver, MigrationOptions};
pub use rewrite::rewrite_attachment_urls;

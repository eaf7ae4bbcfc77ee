//! File Attachments
//! Mission: Keep uploaded documents on disk with their metadata in SQLite

pub mod models;
pub mod store;

pub use models::{FileKind, StoredFile, MAX_UPLOAD_BYTES};
pub use store::FileStore;

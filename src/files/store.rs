//! File Storage
//! Mission: Write uploads under the upload directory and track them in SQLite
//!
//! Disk writes happen before the row is inserted and outside the connection
//! lock. A failed insert removes the written file again.

use crate::db::Database;
use crate::files::models::{FileKind, StoredFile};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

const FILE_COLUMNS: &str =
    "id, file_name, original_name, file_path, file_size, file_type, uploaded_by, uploaded_at";

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<StoredFile> {
    Ok(StoredFile {
        id: row.get(0)?,
        file_name: row.get(1)?,
        original_name: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get(4)?,
        file_type: row.get(5)?,
        uploaded_by: row.get(6)?,
        uploaded_at: row.get(7)?,
    })
}

pub struct FileStore {
    db: Database,
    upload_dir: PathBuf,
}

impl FileStore {
    pub fn new(db: Database, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Write `bytes` as `<uuid>.<ext>` and record it
    pub async fn save(
        &self,
        original_name: &str,
        kind: FileKind,
        bytes: &[u8],
        uploaded_by: &str,
    ) -> Result<StoredFile> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!("Failed to create upload dir {}", self.upload_dir.display())
            })?;

        let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
        let path = self.upload_dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let record = StoredFile {
            id: 0,
            file_name,
            original_name: original_name.to_string(),
            file_path: path.to_string_lossy().into_owned(),
            file_size: bytes.len() as i64,
            file_type: kind.mime().to_string(),
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: Utc::now().to_rfc3339(),
        };

        match self.insert(record) {
            Ok(stored) => {
                info!(
                    "📎 Stored {} as {} ({} bytes)",
                    stored.original_name, stored.file_name, stored.file_size
                );
                Ok(stored)
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove orphaned upload {}: {}", path.display(), rm);
                }
                Err(e)
            }
        }
    }

    fn insert(&self, mut record: StoredFile) -> Result<StoredFile> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO files (file_name, original_name, file_path, file_size, file_type, uploaded_by, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.file_name,
                record.original_name,
                record.file_path,
                record.file_size,
                record.file_type,
                record.uploaded_by,
                record.uploaded_at,
            ],
        )
        .context("Failed to insert file metadata")?;

        record.id = conn.last_insert_rowid();
        Ok(record)
    }

    /// Newest first
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM files ORDER BY uploaded_at DESC, id DESC",
            FILE_COLUMNS
        ))?;
        let files = stmt
            .query_map([], file_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list files")?;
        Ok(files)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredFile>> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {} FROM files WHERE id = ?1", FILE_COLUMNS),
            params![id],
            file_from_row,
        )
        .optional()
        .context("Failed to fetch file")
    }

    /// Drop the row, then the file on disk. A missing disk file only warns.
    pub async fn delete(&self, id: i64) -> Result<Option<StoredFile>> {
        let Some(record) = self.get(id)? else {
            return Ok(None);
        };

        let removed = {
            let conn = self.db.lock();
            conn.execute("DELETE FROM files WHERE id = ?1", params![id])
                .context("Failed to delete file metadata")?
        };
        if removed == 0 {
            return Ok(None);
        }

        if let Err(e) = tokio::fs::remove_file(&record.file_path).await {
            warn!("⚠️  Failed to remove {} from disk: {}", record.file_path, e);
        }

        info!("🗑️  Deleted file {} ({})", record.file_name, id);
        Ok(Some(record))
    }
}

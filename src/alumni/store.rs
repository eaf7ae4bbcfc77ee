//! Alumni Storage
//! Mission: Persist alumni records in SQLite

use crate::alumni::models::{Alumni, AlumniInput};
use crate::db::{is_constraint_violation, Database};
use crate::pagination::{like_any, ListParams, Sortable};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, types::Value, OptionalExtension, Row};
use std::fmt;
use tracing::info;

pub const ALUMNI_SORTABLE: Sortable = Sortable {
    columns: &[
        "id",
        "nim",
        "name",
        "major",
        "cohort_year",
        "graduation_year",
        "created_at",
    ],
    default: "id",
};

const ALUMNI_COLUMNS: &str = "id, nim, name, major, cohort_year, graduation_year, email, phone, address, created_at, updated_at";

/// NIM or email already used by another record.
#[derive(Debug)]
pub struct DuplicateAlumni;

impl fmt::Display for DuplicateAlumni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nim or email already used by another alumni record")
    }
}

impl std::error::Error for DuplicateAlumni {}

fn alumni_from_row(row: &Row<'_>) -> rusqlite::Result<Alumni> {
    Ok(Alumni {
        id: row.get(0)?,
        nim: row.get(1)?,
        name: row.get(2)?,
        major: row.get(3)?,
        cohort_year: row.get(4)?,
        graduation_year: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        address: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_write_error(e: rusqlite::Error, action: &'static str) -> anyhow::Error {
    if is_constraint_violation(&e) {
        DuplicateAlumni.into()
    } else {
        anyhow::Error::new(e).context(action)
    }
}

pub struct AlumniStore {
    db: Database,
}

impl AlumniStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, input: &AlumniInput) -> Result<Alumni> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();

        conn.execute(
            "INSERT INTO alumni (nim, name, major, cohort_year, graduation_year, email, phone, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                input.nim,
                input.name,
                input.major,
                input.cohort_year,
                input.graduation_year,
                input.email,
                input.phone,
                input.address,
                now,
            ],
        )
        .map_err(|e| map_write_error(e, "Failed to insert alumni"))?;

        let id = conn.last_insert_rowid();
        info!("🎓 Created alumni {} ({})", input.nim, id);

        Ok(Alumni {
            id,
            nim: input.nim.clone(),
            name: input.name.clone(),
            major: input.major.clone(),
            cohort_year: input.cohort_year,
            graduation_year: input.graduation_year,
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Alumni>> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {} FROM alumni WHERE id = ?1", ALUMNI_COLUMNS),
            params![id],
            alumni_from_row,
        )
        .optional()
        .context("Failed to fetch alumni")
    }

    pub fn list(&self, params: &ListParams) -> Result<(Vec<Alumni>, usize)> {
        let pattern = params.search_pattern();
        let where_sql = if pattern.is_some() {
            format!("WHERE {}", like_any(&["nim", "name", "major"], 1))
        } else {
            String::new()
        };
        let mut bound: Vec<Value> = pattern.into_iter().map(Value::Text).collect();

        let conn = self.db.lock();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM alumni {}", where_sql),
                params_from_iter(bound.iter()),
                |row| row.get(0),
            )
            .context("Failed to count alumni")?;

        let sql = format!(
            "SELECT {} FROM alumni {} ORDER BY {} {}",
            ALUMNI_COLUMNS,
            where_sql,
            params.order_by_sql(),
            params.window_sql(bound.len() + 1)
        );
        bound.extend(params.window_values().map(Value::Integer));
        let mut stmt = conn.prepare(&sql)?;
        let alumni = stmt
            .query_map(params_from_iter(bound.iter()), alumni_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list alumni")?;

        Ok((alumni, total as usize))
    }

    pub fn list_by_cohort(&self, cohort_year: i32) -> Result<Vec<Alumni>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM alumni WHERE cohort_year = ?1 ORDER BY name ASC, id ASC",
            ALUMNI_COLUMNS
        ))?;
        let alumni = stmt
            .query_map(params![cohort_year], alumni_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list alumni by cohort")?;
        Ok(alumni)
    }

    /// `None` when no record has this id
    pub fn update(&self, id: i64, input: &AlumniInput) -> Result<Option<Alumni>> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();

        let changed = conn
            .execute(
                "UPDATE alumni
                 SET nim = ?1, name = ?2, major = ?3, cohort_year = ?4, graduation_year = ?5,
                     email = ?6, phone = ?7, address = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    input.nim,
                    input.name,
                    input.major,
                    input.cohort_year,
                    input.graduation_year,
                    input.email,
                    input.phone,
                    input.address,
                    now,
                    id,
                ],
            )
            .map_err(|e| map_write_error(e, "Failed to update alumni"))?;

        if changed == 0 {
            return Ok(None);
        }

        info!("✏️  Updated alumni {}", id);

        conn.query_row(
            &format!("SELECT {} FROM alumni WHERE id = ?1", ALUMNI_COLUMNS),
            params![id],
            alumni_from_row,
        )
        .optional()
        .context("Failed to fetch updated alumni")
    }

    /// Jobs of the record go with it (ON DELETE CASCADE)
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.db.lock();
        let removed = conn
            .execute("DELETE FROM alumni WHERE id = ?1", params![id])
            .context("Failed to delete alumni")?;

        if removed > 0 {
            info!("🗑️  Deleted alumni {}", id);
        }
        Ok(removed > 0)
    }
}

//! Job Storage
//! Mission: Persist employment history with soft delete and restore
//!
//! A trashed job keeps its row with `deleted_at`/`deleted_by` set. Only the
//! trash listing, `get`, `restore` and `hard_delete` see trashed rows.

use crate::db::{is_constraint_violation, Database};
use crate::jobs::models::{EmploymentStatus, Job, JobInput};
use crate::pagination::{like_any, ListParams, Sortable};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    OptionalExtension, Row,
};
use std::fmt;
use tracing::info;

pub const JOB_SORTABLE: Sortable = Sortable {
    columns: &[
        "id",
        "company_name",
        "position",
        "industry",
        "started_on",
        "created_at",
    ],
    default: "id",
};

const JOB_COLUMNS: &str = "id, alumni_id, company_name, position, industry, location, salary_range, started_on, ended_on, employment_status, description, deleted_at, deleted_by, created_at, updated_at";

/// The referenced alumni record does not exist.
#[derive(Debug)]
pub struct UnknownAlumni(pub i64);

impl fmt::Display for UnknownAlumni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alumni {} does not exist", self.0)
    }
}

impl std::error::Error for UnknownAlumni {}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    let status_str: String = row.get(9)?;
    let employment_status = EmploymentStatus::from_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            Type::Text,
            format!("unknown employment status {:?}", status_str).into(),
        )
    })?;

    Ok(Job {
        id: row.get(0)?,
        alumni_id: row.get(1)?,
        company_name: row.get(2)?,
        position: row.get(3)?,
        industry: row.get(4)?,
        location: row.get(5)?,
        salary_range: row.get(6)?,
        started_on: row.get(7)?,
        ended_on: row.get(8)?,
        employment_status,
        description: row.get(10)?,
        deleted_at: row.get(11)?,
        deleted_by: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query_jobs(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Job>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let jobs = stmt
            .query_map(args, job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    pub fn create(&self, input: &JobInput) -> Result<Job> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();

        conn.execute(
            "INSERT INTO jobs (alumni_id, company_name, position, industry, location, salary_range,
                               started_on, ended_on, employment_status, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                input.alumni_id,
                input.company_name,
                input.position,
                input.industry,
                input.location,
                input.salary_range,
                input.started_on,
                input.ended_on,
                input.employment_status.as_str(),
                input.description,
                now,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                UnknownAlumni(input.alumni_id).into()
            } else {
                anyhow::Error::new(e).context("Failed to insert job")
            }
        })?;

        let id = conn.last_insert_rowid();
        info!(
            "💼 Created job {} at {} for alumni {}",
            id, input.company_name, input.alumni_id
        );

        Ok(Job {
            id,
            alumni_id: input.alumni_id,
            company_name: input.company_name.clone(),
            position: input.position.clone(),
            industry: input.industry.clone(),
            location: input.location.clone(),
            salary_range: input.salary_range.clone(),
            started_on: input.started_on.clone(),
            ended_on: input.ended_on.clone(),
            employment_status: input.employment_status,
            description: input.description.clone(),
            deleted_at: None,
            deleted_by: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Includes trashed rows; callers decide whether they are visible
    pub fn get(&self, id: i64) -> Result<Option<Job>> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
            params![id],
            job_from_row,
        )
        .optional()
        .context("Failed to fetch job")
    }

    pub fn list_active(&self, params: &ListParams) -> Result<(Vec<Job>, usize)> {
        let pattern = params.search_pattern();
        let mut where_sql = "WHERE deleted_at IS NULL".to_string();
        if pattern.is_some() {
            where_sql.push_str(" AND ");
            where_sql.push_str(&like_any(&["company_name", "position", "industry"], 1));
        }
        let mut bound: Vec<Value> = pattern.into_iter().map(Value::Text).collect();

        let conn = self.db.lock();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM jobs {}", where_sql),
                params_from_iter(bound.iter()),
                |row| row.get(0),
            )
            .context("Failed to count jobs")?;

        let sql = format!(
            "SELECT {} FROM jobs {} ORDER BY {} {}",
            JOB_COLUMNS,
            where_sql,
            params.order_by_sql(),
            params.window_sql(bound.len() + 1)
        );
        bound.extend(params.window_values().map(Value::Integer));
        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map(params_from_iter(bound.iter()), job_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list jobs")?;

        Ok((jobs, total as usize))
    }

    /// Active jobs of one alumni record, most recent first
    pub fn list_by_alumni(&self, alumni_id: i64) -> Result<Vec<Job>> {
        self.query_jobs(
            &format!(
                "SELECT {} FROM jobs WHERE alumni_id = ?1 AND deleted_at IS NULL
                 ORDER BY started_on DESC, id DESC",
                JOB_COLUMNS
            ),
            params![alumni_id],
        )
        .context("Failed to list jobs by alumni")
    }

    /// Trashed jobs, optionally limited to one alumni record
    pub fn list_trashed(&self, alumni_id: Option<i64>) -> Result<Vec<Job>> {
        let jobs = match alumni_id {
            Some(alumni_id) => self.query_jobs(
                &format!(
                    "SELECT {} FROM jobs WHERE deleted_at IS NOT NULL AND alumni_id = ?1
                     ORDER BY deleted_at DESC, id DESC",
                    JOB_COLUMNS
                ),
                params![alumni_id],
            ),
            None => self.query_jobs(
                &format!(
                    "SELECT {} FROM jobs WHERE deleted_at IS NOT NULL
                     ORDER BY deleted_at DESC, id DESC",
                    JOB_COLUMNS
                ),
                [],
            ),
        };
        jobs.context("Failed to list trashed jobs")
    }

    /// Active jobs only. `None` when missing or trashed.
    pub fn update(&self, id: i64, input: &JobInput) -> Result<Option<Job>> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();

        let changed = conn
            .execute(
                "UPDATE jobs
                 SET alumni_id = ?1, company_name = ?2, position = ?3, industry = ?4, location = ?5,
                     salary_range = ?6, started_on = ?7, ended_on = ?8, employment_status = ?9,
                     description = ?10, updated_at = ?11
                 WHERE id = ?12 AND deleted_at IS NULL",
                params![
                    input.alumni_id,
                    input.company_name,
                    input.position,
                    input.industry,
                    input.location,
                    input.salary_range,
                    input.started_on,
                    input.ended_on,
                    input.employment_status.as_str(),
                    input.description,
                    now,
                    id,
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    UnknownAlumni(input.alumni_id).into()
                } else {
                    anyhow::Error::new(e).context("Failed to update job")
                }
            })?;

        if changed == 0 {
            return Ok(None);
        }

        info!("✏️  Updated job {}", id);

        conn.query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
            params![id],
            job_from_row,
        )
        .optional()
        .context("Failed to fetch updated job")
    }

    /// Move an active job to the trash. False when missing or already trashed.
    pub fn soft_delete(&self, id: i64, deleted_by: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();
        let changed = conn
            .execute(
                "UPDATE jobs SET deleted_at = ?1, deleted_by = ?2, updated_at = ?1
                 WHERE id = ?3 AND deleted_at IS NULL",
                params![now, deleted_by, id],
            )
            .context("Failed to trash job")?;

        if changed > 0 {
            info!("🗑️  Job {} moved to trash by user {}", id, deleted_by);
        }
        Ok(changed > 0)
    }

    /// False when missing or not trashed
    pub fn restore(&self, id: i64) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.db.lock();
        let changed = conn
            .execute(
                "UPDATE jobs SET deleted_at = NULL, deleted_by = NULL, updated_at = ?1
                 WHERE id = ?2 AND deleted_at IS NOT NULL",
                params![now, id],
            )
            .context("Failed to restore job")?;

        if changed > 0 {
            info!("♻️  Job {} restored", id);
        }
        Ok(changed > 0)
    }

    pub fn hard_delete(&self, id: i64) -> Result<bool> {
        let conn = self.db.lock();
        let removed = conn
            .execute("DELETE FROM jobs WHERE id = ?1", params![id])
            .context("Failed to delete job")?;

        if removed > 0 {
            info!("🔥 Job {} permanently deleted", id);
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alumni::{AlumniInput, AlumniStore};
    use crate::pagination::ListQuery;

    fn setup() -> (JobStore, AlumniStore) {
        let db = Database::open_in_memory().unwrap();
        (JobStore::new(db.clone()), AlumniStore::new(db))
    }

    fn alumni(store: &AlumniStore, nim: &str) -> i64 {
        store
            .create(&AlumniInput {
                nim: nim.to_string(),
                name: format!("Alumni {}", nim),
                major: "Informatics".to_string(),
                cohort_year: 2019,
                graduation_year: 2023,
                email: format!("{}@example.com", nim),
                phone: None,
                address: None,
            })
            .unwrap()
            .id
    }

    fn input(alumni_id: i64, company: &str, started_on: &str) -> JobInput {
        JobInput {
            alumni_id,
            company_name: company.to_string(),
            position: "Engineer".to_string(),
            industry: "Software".to_string(),
            location: "Bandung".to_string(),
            salary_range: None,
            started_on: started_on.to_string(),
            ended_on: None,
            employment_status: EmploymentStatus::Active,
            description: None,
        }
    }

    #[test]
    fn test_unknown_alumni_rejected() {
        let (jobs, _) = setup();
        let err = jobs.create(&input(42, "Acme", "2024-01-01")).unwrap_err();
        assert!(err.is::<UnknownAlumni>());
    }

    #[test]
    fn test_soft_delete_restore_cycle() {
        let (jobs, alumni_store) = setup();
        let owner = alumni(&alumni_store, "1001");
        let job = jobs.create(&input(owner, "Acme", "2024-01-01")).unwrap();

        assert!(jobs.soft_delete(job.id, "7").unwrap());
        assert!(!jobs.soft_delete(job.id, "7").unwrap());

        let trashed = jobs.get(job.id).unwrap().unwrap();
        assert!(trashed.is_trashed());
        assert_eq!(trashed.deleted_by.as_deref(), Some("7"));

        assert!(jobs.list_by_alumni(owner).unwrap().is_empty());
        assert_eq!(jobs.list_trashed(None).unwrap().len(), 1);
        assert_eq!(jobs.list_trashed(Some(owner)).unwrap().len(), 1);
        assert!(jobs.list_trashed(Some(owner + 1)).unwrap().is_empty());

        // trashed rows are not editable
        assert!(jobs.update(job.id, &input(owner, "Other", "2024-01-01")).unwrap().is_none());

        assert!(jobs.restore(job.id).unwrap());
        assert!(!jobs.restore(job.id).unwrap());
        let restored = jobs.get(job.id).unwrap().unwrap();
        assert!(!restored.is_trashed());
        assert_eq!(restored.deleted_by, None);

        assert!(jobs.hard_delete(job.id).unwrap());
        assert!(jobs.get(job.id).unwrap().is_none());
    }

    #[test]
    fn test_list_active_excludes_trash() {
        let (jobs, alumni_store) = setup();
        let owner = alumni(&alumni_store, "1001");
        let a = jobs.create(&input(owner, "Acme", "2020-01-01")).unwrap();
        jobs.create(&input(owner, "Binar", "2021-01-01")).unwrap();
        jobs.create(&input(owner, "Acme Labs", "2022-01-01")).unwrap();
        jobs.soft_delete(a.id, "1").unwrap();

        let params = ListParams::from_query(
            &ListQuery {
                search: Some("acme".to_string()),
                ..Default::default()
            },
            &JOB_SORTABLE,
        );
        let (found, total) = jobs.list_active(&params).unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].company_name, "Acme Labs");

        let by_alumni = jobs.list_by_alumni(owner).unwrap();
        let companies: Vec<_> = by_alumni.iter().map(|j| j.company_name.as_str()).collect();
        assert_eq!(companies, vec!["Acme Labs", "Binar"]);
    }

    #[test]
    fn test_alumni_delete_cascades() {
        let (jobs, alumni_store) = setup();
        let owner = alumni(&alumni_store, "1001");
        let job = jobs.create(&input(owner, "Acme", "2020-01-01")).unwrap();

        alumni_store.delete(owner).unwrap();
        assert!(jobs.get(job.id).unwrap().is_none());
    }
}

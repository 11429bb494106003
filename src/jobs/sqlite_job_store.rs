use super::models::{Job, JobId, JobsPage, NewJob};
use super::schema::JOBS_VERSIONED_SCHEMAS;
use super::store::{JobStore, JobStoreError};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const JOB_COLUMNS: &str =
    "id, title, company, location, job_type, experience_level, salary_range, apply_url, source, tags, created_at";

pub struct SqliteJobStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteJobStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let conn = Connection::open(path).context("Failed to open jobs database")?;

        if is_new_db {
            info!("Creating new jobs database at {:?}", path);
            Self::latest_schema()?.create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            let schema = JOBS_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version as i64 == db_version);
            match schema {
                Some(schema) => schema.validate(&conn).with_context(|| {
                    format!(
                        "Jobs database schema validation failed for version {}",
                        db_version
                    )
                })?,
                None => bail!("Unknown jobs database version {}", db_version),
            }
            info!("Opened jobs database at {:?} (version {})", path, db_version);
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// A store that lives only as long as the process, used by tests and
    /// throwaway runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::latest_schema()?.create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn latest_schema() -> Result<&'static crate::sqlite_persistence::VersionedSchema> {
        JOBS_VERSIONED_SCHEMAS
            .last()
            .context("No jobs schema versions defined")
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn row_to_job(row: &Row) -> rusqlite::Result<Job> {
        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

        let tags_str: Option<String> = row.get("tags")?;
        let tags = tags_str
            .map(|s| serde_json::from_str::<Vec<String>>(&s))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

        Ok(Job {
            id: JobId::Int(row.get("id")?),
            title: row.get("title")?,
            company: row.get("company")?,
            location: row.get("location")?,
            job_type: row.get("job_type")?,
            experience_level: row.get("experience_level")?,
            salary_range: row.get("salary_range")?,
            apply_url: row.get("apply_url")?,
            source: row.get("source")?,
            tags,
            created_at,
        })
    }

    fn query_page(conn: &Connection, offset: u64, limit: u64) -> Result<JobsPage, JobStoreError> {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;

        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM jobs ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            JOB_COLUMNS
        ))?;
        let jobs = stmt
            .query_map(
                params![
                    i64::try_from(limit).unwrap_or(i64::MAX),
                    i64::try_from(offset).unwrap_or(i64::MAX)
                ],
                Self::row_to_job,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(JobsPage {
            jobs,
            total: total as u64,
        })
    }

    fn insert_row(conn: &Connection, job: &NewJob) -> Result<Job, JobStoreError> {
        let tags = job
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| JobStoreError::Decode(e.to_string()))?;

        let mut stmt = conn.prepare_cached(&format!(
            "INSERT INTO jobs (title, company, location, job_type, experience_level, salary_range, apply_url, source, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {}",
            JOB_COLUMNS
        ))?;
        let stored = stmt.query_row(
            params![
                job.title,
                job.company,
                job.location,
                job.job_type,
                job.experience_level,
                job.salary_range,
                job.apply_url,
                job.source,
                tags,
                Self::format_datetime(&Utc::now()),
            ],
            Self::row_to_job,
        )?;
        Ok(stored)
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn list_jobs(&self, offset: u64, limit: u64) -> Result<JobsPage, JobStoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| JobStoreError::Poisoned)?;
            Self::query_page(&conn, offset, limit)
        })
        .await?
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job, JobStoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| JobStoreError::Poisoned)?;
            Self::insert_row(&conn, &job)
        })
        .await?
    }
}

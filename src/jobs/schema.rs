//! SQLite schema for the jobs database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema};

pub const JOBS_TABLE_NAME: &str = "jobs";

// =============================================================================
// Version 1 - Jobs
// =============================================================================

/// `created_at` is fixed-width RFC 3339 text in UTC, so ordering the text
/// orders the timestamps. `tags` holds a JSON array.
const JOBS_TABLE_V1: Table = Table {
    name: JOBS_TABLE_NAME,
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", SqlType::Text, non_null = true),
        sqlite_column!("company", SqlType::Text, non_null = true),
        sqlite_column!("location", SqlType::Text),
        sqlite_column!("job_type", SqlType::Text),
        sqlite_column!("experience_level", SqlType::Text),
        sqlite_column!("salary_range", SqlType::Text),
        sqlite_column!("apply_url", SqlType::Text, non_null = true),
        sqlite_column!("source", SqlType::Text),
        sqlite_column!("tags", SqlType::Text),
        sqlite_column!("created_at", SqlType::Text, non_null = true),
    ],
    indices: &[("idx_jobs_created_at", "created_at DESC, id DESC")],
};

pub const JOBS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[JOBS_TABLE_V1],
}];

//! Read-side repository for the analytics engine
//!
//! The engine never talks to the database directly: it consumes a `Snapshot`
//! loaded once per view through the `ProgressStore` trait. The sqlite
//! implementation lives here; tests inject fixture stores instead.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Attempt, Gym, GymGrade, Problem};

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid {column} value: {value}")]
    InvalidColumn { column: &'static str, value: String },
}

fn parse_column<T: FromStr>(column: &'static str, value: String) -> Result<T, StoreError> {
    value
        .parse::<T>()
        .map_err(|_| StoreError::InvalidColumn { column, value })
}

// ---------------------------------------------------------------------------
/// Repository trait + snapshot
// ---------------------------------------------------------------------------

/// Read access to the collections the analytics engine consumes.
///
/// Implementations return complete collections; the engine is only ever
/// invoked with a fully loaded snapshot, never partial data.
#[allow(async_fn_in_trait)]
pub trait ProgressStore {
    async fn list_problems(&self) -> Result<Vec<Problem>, StoreError>;
    async fn list_attempts(&self) -> Result<Vec<Attempt>, StoreError>;
    async fn list_gyms(&self) -> Result<Vec<Gym>, StoreError>;
    async fn list_gym_grades(&self) -> Result<Vec<GymGrade>, StoreError>;
}

/// Everything one progress view needs, fetched once per invocation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub problems: Vec<Problem>,
    pub attempts: Vec<Attempt>,
    pub home_gym: Option<Gym>,
    pub home_grades: Vec<GymGrade>,
}

impl Snapshot {
    pub async fn load<S: ProgressStore>(store: &S) -> Result<Self, StoreError> {
        let problems = store.list_problems().await?;
        let attempts = store.list_attempts().await?;
        let gyms = store.list_gyms().await?;
        let grades = store.list_gym_grades().await?;

        // At most one gym is flagged as home
        let home_gym = gyms.into_iter().find(|g| g.is_home);
        let home_grades = match &home_gym {
            Some(gym) => grades.into_iter().filter(|g| g.gym_id == gym.id).collect(),
            None => Vec::new(),
        };

        Ok(Self {
            problems,
            attempts,
            home_gym,
            home_grades,
        })
    }
}

// ---------------------------------------------------------------------------
/// Sqlite implementation
// ---------------------------------------------------------------------------

/// Sqlite-backed store used by the tauri commands.
pub struct SqliteStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SqliteStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProgressStore for SqliteStore<'_> {
    async fn list_problems(&self) -> Result<Vec<Problem>, StoreError> {
        load_problems(self.pool).await
    }

    async fn list_attempts(&self) -> Result<Vec<Attempt>, StoreError> {
        load_attempts(self.pool).await
    }

    async fn list_gyms(&self) -> Result<Vec<Gym>, StoreError> {
        load_gyms(self.pool).await
    }

    async fn list_gym_grades(&self) -> Result<Vec<GymGrade>, StoreError> {
        load_gym_grades(self.pool).await
    }
}

// ---------------------------------------------------------------------------
// Row loaders (shared with the command layer)
// ---------------------------------------------------------------------------

/// Load all problems, oldest first.
pub async fn load_problems(pool: &SqlitePool) -> Result<Vec<Problem>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, grade, status, gym_id, grade_id, photo_url, boulder_color, created_at
        FROM problems
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut problems = Vec::with_capacity(rows.len());
    for row in rows {
        let status: String = row.try_get("status")?;
        problems.push(Problem {
            id: row.try_get("id")?,
            grade: row.try_get("grade")?,
            status: parse_column("status", status)?,
            gym_id: row.try_get("gym_id")?,
            grade_id: row.try_get("grade_id")?,
            photo_url: row.try_get("photo_url")?,
            boulder_color: row.try_get("boulder_color")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        });
    }

    Ok(problems)
}

/// Load all attempts, oldest first. Insertion order (the id) breaks
/// timestamp ties so downstream tie-breaks stay deterministic.
pub async fn load_attempts(pool: &SqlitePool) -> Result<Vec<Attempt>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, problem_id, outcome, created_at
        FROM attempts
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut attempts = Vec::with_capacity(rows.len());
    for row in rows {
        let outcome: String = row.try_get("outcome")?;
        attempts.push(Attempt {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            problem_id: row.try_get("problem_id")?,
            outcome: parse_column("outcome", outcome)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        });
    }

    Ok(attempts)
}

pub async fn load_gyms(pool: &SqlitePool) -> Result<Vec<Gym>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_home, grading_mode, created_at
        FROM gyms
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut gyms = Vec::with_capacity(rows.len());
    for row in rows {
        let grading_mode: String = row.try_get("grading_mode")?;
        gyms.push(Gym {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            is_home: row.try_get("is_home")?,
            grading_mode: parse_column("grading_mode", grading_mode)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        });
    }

    Ok(gyms)
}

/// Load all gym grades ordered by their ladder position.
pub async fn load_gym_grades(pool: &SqlitePool) -> Result<Vec<GymGrade>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, gym_id, name, color, sort_order, created_at
        FROM gym_grades
        ORDER BY sort_order ASC, created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut grades = Vec::with_capacity(rows.len());
    for row in rows {
        grades.push(GymGrade {
            id: row.try_get("id")?,
            gym_id: row.try_get("gym_id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
            sort_order: row.try_get("sort_order")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        });
    }

    Ok(grades)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

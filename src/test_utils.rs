//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seed helpers for sessions, problems, attempts, and gym grade ladders
//! - Helper assertions

use crate::models::Outcome;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Seed Helpers
/// ---------------------------------------------------------------------------

/// Seed a session on the given date ("YYYY-MM-DD"). Returns its id.
pub async fn seed_session(pool: &SqlitePool, date: &str, energy: Option<&str>) -> i64 {
  let result = sqlx::query("INSERT INTO sessions (date, energy, created_at) VALUES (?1, ?2, ?3)")
    .bind(date)
    .bind(energy)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to seed session");

  result.last_insert_rowid()
}

/// Seed a problem with an optional free-text grade and an optional structured
/// grade reference. Returns its id.
pub async fn seed_problem(
  pool: &SqlitePool,
  grade: Option<&str>,
  gym_id: Option<i64>,
  grade_id: Option<i64>,
) -> i64 {
  let result = sqlx::query(
    r#"
    INSERT INTO problems (grade, status, gym_id, grade_id, created_at)
    VALUES (?1, 'project', ?2, ?3, ?4)
    "#,
  )
  .bind(grade)
  .bind(gym_id)
  .bind(grade_id)
  .bind(Utc::now())
  .execute(pool)
  .await
  .expect("Failed to seed problem");

  result.last_insert_rowid()
}

/// Seed one attempt. `minutes_from_now` offsets the timestamp so a test can
/// lay out an unambiguous order of tries. Returns the attempt id.
pub async fn seed_attempt(
  pool: &SqlitePool,
  session_id: i64,
  problem_id: i64,
  outcome: Outcome,
  minutes_from_now: i64,
) -> i64 {
  let result = sqlx::query(
    r#"
    INSERT INTO attempts (session_id, problem_id, outcome, created_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(session_id)
  .bind(problem_id)
  .bind(outcome.as_str())
  .bind(Utc::now() + Duration::minutes(minutes_from_now))
  .execute(pool)
  .await
  .expect("Failed to seed attempt");

  result.last_insert_rowid()
}

/// Seed a home gym with a four-grade ladder (easiest to hardest).
/// Returns the gym id and the grade ids in ladder order.
pub async fn seed_home_gym_with_grades(pool: &SqlitePool) -> (i64, Vec<i64>) {
  let result = sqlx::query(
    "INSERT INTO gyms (name, is_home, grading_mode, created_at) VALUES ('Home Crag', 1, 'specific', ?1)",
  )
  .bind(Utc::now())
  .execute(pool)
  .await
  .expect("Failed to seed gym");
  let gym_id = result.last_insert_rowid();

  let ladder = [
    ("Green", "#22C55E"),
    ("Yellow", "#EAB308"),
    ("Orange", "#F97316"),
    ("Red", "#EF4444"),
  ];

  let mut grade_ids = Vec::new();
  for (sort_order, (name, color)) in ladder.iter().enumerate() {
    let result = sqlx::query(
      r#"
      INSERT INTO gym_grades (gym_id, name, color, sort_order, created_at)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(gym_id)
    .bind(name)
    .bind(color)
    .bind(sort_order as i64)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to seed gym grade");

    grade_ids.push(result.last_insert_rowid());
  }

  (gym_id, grade_ids)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let left: f64 = $left;
    let right: f64 = $right;
    let diff = (left - right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('sessions', 'problems', 'attempts', 'gyms', 'gym_grades')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 5, "Expected 5 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_helpers_insert_rows() {
    let pool = setup_test_db().await;

    let session_id = seed_session(&pool, "2025-07-01", Some("normal")).await;
    let problem_id = seed_problem(&pool, Some("6a"), None, None).await;
    seed_attempt(&pool, session_id, problem_id, Outcome::Start, 0).await;
    seed_attempt(&pool, session_id, problem_id, Outcome::Sent, 1).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attempts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count attempts");
    assert_eq!(count, 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_home_gym_ladder_is_ordered() {
    let pool = setup_test_db().await;

    let (gym_id, grade_ids) = seed_home_gym_with_grades(&pool).await;
    assert_eq!(grade_ids.len(), 4);

    let rows: Vec<(i64, i64)> = sqlx::query_as(
      "SELECT id, sort_order FROM gym_grades WHERE gym_id = ?1 ORDER BY sort_order ASC",
    )
    .bind(gym_id)
    .fetch_all(&pool)
    .await
    .expect("Failed to fetch grades");

    let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, grade_ids);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_assert_approx_eq_within_tolerance() {
    assert_approx_eq!(0.1 + 0.2, 0.3, 1e-9);
  }
}

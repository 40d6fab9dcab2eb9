pub mod gyms;
pub mod progress;
pub mod sessions;

use crate::db::AppState;
use crate::models::{Attempt, Outcome, Problem, ProblemStatus};
use crate::store;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::State;

/// All problems (projects + sent), oldest first.
#[tauri::command]
pub async fn get_problems(
  state: State<'_, Arc<AppState>>,
) -> Result<Vec<Problem>, String> {
  store::load_problems(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch problems: {}", e))
}

#[tauri::command]
pub async fn create_problem(
  state: State<'_, Arc<AppState>>,
  grade: Option<String>,
  gym_id: Option<i64>,
  grade_id: Option<i64>,
  photo_url: Option<String>,
  boulder_color: Option<String>,
) -> Result<Problem, String> {
  let now = Utc::now();

  let result = sqlx::query(
    r#"
    INSERT INTO problems (grade, status, gym_id, grade_id, photo_url, boulder_color, created_at)
    VALUES (?1, 'project', ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(&grade)
  .bind(gym_id)
  .bind(grade_id)
  .bind(&photo_url)
  .bind(&boulder_color)
  .bind(now)
  .execute(&state.db)
  .await
  .map_err(|e| format!("Failed to create problem: {}", e))?;

  Ok(Problem {
    id: result.last_insert_rowid(),
    grade,
    status: ProblemStatus::Project,
    gym_id,
    grade_id,
    photo_url,
    boulder_color,
    created_at: now,
  })
}

/// Delete a problem row. Its attempts stay behind; readers skip the
/// dangling references.
#[tauri::command]
pub async fn delete_problem(
  state: State<'_, Arc<AppState>>,
  problem_id: i64,
) -> Result<(), String> {
  sqlx::query("DELETE FROM problems WHERE id = ?1")
    .bind(problem_id)
    .execute(&state.db)
    .await
    .map_err(|e| format!("Failed to delete problem: {}", e))?;

  Ok(())
}

/// Log one physical try. When the outcome is a send, the problem's cached
/// status is updated in a second write; the two are not atomic, which is why
/// derived statistics recompute "sent" from the attempt log.
#[tauri::command]
pub async fn log_attempt(
  state: State<'_, Arc<AppState>>,
  session_id: i64,
  problem_id: i64,
  outcome: Outcome,
) -> Result<Attempt, String> {
  let now = Utc::now();

  let result = sqlx::query(
    r#"
    INSERT INTO attempts (session_id, problem_id, outcome, created_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(session_id)
  .bind(problem_id)
  .bind(outcome.as_str())
  .bind(now)
  .execute(&state.db)
  .await
  .map_err(|e| format!("Failed to log attempt: {}", e))?;

  if outcome.is_send() {
    sqlx::query("UPDATE problems SET status = 'sent' WHERE id = ?1")
      .bind(problem_id)
      .execute(&state.db)
      .await
      .map_err(|e| format!("Failed to update problem status: {}", e))?;
  }

  Ok(Attempt {
    id: result.last_insert_rowid(),
    session_id,
    problem_id,
    outcome,
    created_at: now,
  })
}

/// Per-problem attempt count and latest outcome, for the problem list.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemStats {
  pub attempts: usize,
  pub last_outcome: Option<Outcome>,
}

#[tauri::command]
pub async fn get_problem_stats(
  state: State<'_, Arc<AppState>>,
) -> Result<HashMap<i64, ProblemStats>, String> {
  let attempts = store::load_attempts(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch attempts: {}", e))?;

  let mut stats: HashMap<i64, ProblemStats> = HashMap::new();
  // Attempts come back oldest first, so the last row per problem wins
  for attempt in &attempts {
    let entry = stats.entry(attempt.problem_id).or_insert(ProblemStats {
      attempts: 0,
      last_outcome: None,
    });
    entry.attempts += 1;
    entry.last_outcome = Some(attempt.outcome);
  }

  Ok(stats)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

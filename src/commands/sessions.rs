//! Tauri commands for sessions: lazy one-per-day creation and the monthly
//! review with per-session stats and labels.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tauri::State;

use crate::db::AppState;
use crate::grades::GradeResolver;
use crate::models::{Energy, Outcome, Session};
use crate::progress::{
    build_grade_steps, extract_session_sends, rank_sends, Conversion, SessionKind,
};
use crate::store::{Snapshot, SqliteStore};

async fn load_session_by_date(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Option<Session>, String> {
    let row: Option<(i64, NaiveDate, Option<String>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, date, energy, created_at FROM sessions WHERE date = ?1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .map_err(|e| format!("Failed to fetch session: {}", e))?;

    match row {
        Some((id, date, energy, created_at)) => {
            let energy = match energy {
                Some(s) => Some(s.parse::<Energy>()?),
                None => None,
            };
            Ok(Some(Session {
                id,
                date,
                energy,
                created_at,
            }))
        }
        None => Ok(None),
    }
}

/// Fetch today's session, creating it when an energy level is provided.
/// One session per calendar date; the unique index backs this up.
#[tauri::command]
pub async fn get_or_create_today_session(
    state: State<'_, Arc<AppState>>,
    energy: Option<Energy>,
) -> Result<Session, String> {
    let today = Utc::now().date_naive();

    if let Some(existing) = load_session_by_date(&state.db, today).await? {
        return Ok(existing);
    }

    let energy = energy
        .ok_or_else(|| "No session for today and no energy provided to create one".to_string())?;

    let now = Utc::now();
    let result = sqlx::query("INSERT INTO sessions (date, energy, created_at) VALUES (?1, ?2, ?3)")
        .bind(today)
        .bind(energy.as_str())
        .bind(now)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to create session: {}", e))?;

    Ok(Session {
        id: result.last_insert_rowid(),
        date: today,
        energy: Some(energy),
        created_at: now,
    })
}

// ---------------------------------------------------------------------------
/// Monthly review
// ---------------------------------------------------------------------------

/// One session of the monthly review, with derived stats and its label.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub session: Session,
    pub attempts: usize,
    pub sends: usize,
    /// Unique problems attempted but not sent within this session
    pub open_projects: usize,
    pub conversion: Conversion,
    pub kind: SessionKind,
    pub label: &'static str,
    pub blurb: &'static str,
    pub hardest_grade: Option<String>,
    pub hardest_color: Option<String>,
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), String> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| format!("Invalid month: {}-{}", year, month))?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| format!("Invalid month: {}-{}", year, month))?;
    Ok((from, to))
}

/// Sessions of one calendar month, newest first, each with its attempt and
/// send counts, open projects, conversion, label, and hardest send.
#[tauri::command]
pub async fn get_sessions_for_month(
    state: State<'_, Arc<AppState>>,
    year: i32,
    month: u32,
) -> Result<Vec<SessionOverview>, String> {
    let (from, to) = month_bounds(year, month)?;

    let rows: Vec<(i64, NaiveDate, Option<String>, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT id, date, energy, created_at
        FROM sessions
        WHERE date >= ?1 AND date < ?2
        ORDER BY date DESC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch sessions: {}", e))?;

    let store = SqliteStore::new(&state.db);
    let snapshot = Snapshot::load(&store)
        .await
        .map_err(|e| format!("Failed to load attempt data: {}", e))?;
    let resolver = GradeResolver::new(snapshot.home_gym.as_ref(), &snapshot.home_grades);

    let mut overviews = Vec::with_capacity(rows.len());
    for (id, date, energy, created_at) in rows {
        let energy = match energy {
            Some(s) => Some(s.parse::<Energy>()?),
            None => None,
        };
        let session = Session {
            id,
            date,
            energy,
            created_at,
        };

        overviews.push(build_overview(session, &snapshot, &resolver));
    }

    Ok(overviews)
}

fn build_overview(
    session: Session,
    snapshot: &Snapshot,
    resolver: &GradeResolver,
) -> SessionOverview {
    let scoped: Vec<_> = snapshot
        .attempts
        .iter()
        .filter(|a| a.session_id == session.id)
        .collect();

    let attempts = scoped.len();
    let sends = scoped.iter().filter(|a| a.outcome.is_send()).count();

    let unique: HashSet<i64> = scoped.iter().map(|a| a.problem_id).collect();
    let sent: HashSet<i64> = scoped
        .iter()
        .filter(|a| a.outcome == Outcome::Sent)
        .map(|a| a.problem_id)
        .collect();
    let open_projects = unique.len().saturating_sub(sent.len());

    // Hardest send within this session, home-gym ladder aware
    let session_sends = extract_session_sends(&snapshot.problems, &snapshot.attempts, session.id);
    let ranked = rank_sends(&snapshot.problems, &session_sends, resolver);
    let (_, hardest) = build_grade_steps(&ranked);

    let kind = SessionKind::classify(attempts, sends);

    SessionOverview {
        session,
        attempts,
        sends,
        open_projects,
        conversion: Conversion::from_counts(attempts, sends),
        kind,
        label: kind.label(),
        blurb: kind.blurb(),
        hardest_grade: hardest.as_ref().and_then(|h| h.grade.clone()),
        hardest_color: hardest.as_ref().and_then(|h| h.color.clone()),
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use serial_test::serial;
    use tauri::Manager;

    #[tokio::test]
    #[serial]
    async fn test_get_or_create_today_session_requires_energy_once() {
        let pool = setup_test_db().await;
        let state = Arc::new(AppState { db: pool.clone() });
        let app = tauri::test::mock_app();
        app.manage(state);

        // No session yet and no energy: refuses to create
        let result = get_or_create_today_session(app.state(), None).await;
        assert!(result.is_err());

        // With energy: creates
        let created = get_or_create_today_session(app.state(), Some(Energy::High))
            .await
            .expect("Should create session");
        assert_eq!(created.energy, Some(Energy::High));

        // Second call reuses the row even without energy
        let again = get_or_create_today_session(app.state(), None)
            .await
            .expect("Should reuse session");
        assert_eq!(again.id, created.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .expect("Should count sessions");
        assert_eq!(count, 1);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    #[serial]
    async fn test_monthly_overview_stats_and_label() {
        let pool = setup_test_db().await;
        let state = Arc::new(AppState { db: pool.clone() });
        let app = tauri::test::mock_app();
        app.manage(state);

        let session_id = seed_session(&pool, "2025-07-05", Some("normal")).await;
        let p1 = seed_problem(&pool, Some("6a"), None, None).await;
        let p2 = seed_problem(&pool, Some("6b"), None, None).await;

        // p1: three tries then sent; p2: attempted, stays open
        seed_attempt(&pool, session_id, p1, Outcome::Start, 0).await;
        seed_attempt(&pool, session_id, p1, Outcome::Almost, 1).await;
        seed_attempt(&pool, session_id, p1, Outcome::Sent, 2).await;
        seed_attempt(&pool, session_id, p2, Outcome::Crux, 3).await;

        let overviews = get_sessions_for_month(app.state(), 2025, 7)
            .await
            .expect("Should build overview");

        assert_eq!(overviews.len(), 1);
        let overview = &overviews[0];
        assert_eq!(overview.attempts, 4);
        assert_eq!(overview.sends, 1);
        assert_eq!(overview.open_projects, 1);
        assert_eq!(overview.kind, SessionKind::Solid);
        assert_eq!(overview.label, "Solid session");
        assert_eq!(overview.hardest_grade.as_deref(), Some("6a"));

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    #[serial]
    async fn test_monthly_overview_excludes_other_months() {
        let pool = setup_test_db().await;
        let state = Arc::new(AppState { db: pool.clone() });
        let app = tauri::test::mock_app();
        app.manage(state);

        seed_session(&pool, "2025-06-30", Some("low")).await;
        seed_session(&pool, "2025-07-01", Some("low")).await;

        let overviews = get_sessions_for_month(app.state(), 2025, 7)
            .await
            .expect("Should build overview");

        assert_eq!(overviews.len(), 1);
        assert_eq!(
            overviews[0].session.date,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        // An empty session is a warm-up placeholder
        assert_eq!(overviews[0].kind, SessionKind::WarmUp);

        teardown_test_db(pool).await;
    }
}

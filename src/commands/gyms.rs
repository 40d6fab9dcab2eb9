//! Tauri commands for gyms and their grade ladders.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tauri::State;

use crate::db::AppState;
use crate::models::gym::GradingMode;
use crate::models::{Gym, GymGrade};
use crate::store;

/// All gyms plus their grades grouped by gym, for the profile view.
#[derive(Debug, Clone, Serialize)]
pub struct GymsAndGrades {
    pub gyms: Vec<Gym>,
    pub grades_by_gym: HashMap<i64, Vec<GymGrade>>,
}

#[tauri::command]
pub async fn get_gyms_and_grades(
    state: State<'_, Arc<AppState>>,
) -> Result<GymsAndGrades, String> {
    let gyms = store::load_gyms(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch gyms: {}", e))?;
    let grades = store::load_gym_grades(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch grades: {}", e))?;

    let mut grades_by_gym: HashMap<i64, Vec<GymGrade>> = HashMap::new();
    for grade in grades {
        grades_by_gym.entry(grade.gym_id).or_default().push(grade);
    }

    Ok(GymsAndGrades {
        gyms,
        grades_by_gym,
    })
}

#[tauri::command]
pub async fn create_gym(
    state: State<'_, Arc<AppState>>,
    name: String,
) -> Result<Gym, String> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO gyms (name, is_home, grading_mode, created_at) VALUES (?1, 0, 'specific', ?2)",
    )
    .bind(&name)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| format!("Failed to create gym: {}", e))?;

    Ok(Gym {
        id: result.last_insert_rowid(),
        name,
        is_home: false,
        grading_mode: GradingMode::Specific,
        created_at: now,
    })
}

/// Flag one gym as home. Clears the flag everywhere else first so at most
/// one gym ever has it.
#[tauri::command]
pub async fn set_home_gym(
    state: State<'_, Arc<AppState>>,
    gym_id: i64,
) -> Result<(), String> {
    sqlx::query("UPDATE gyms SET is_home = 0 WHERE id != ?1")
        .bind(gym_id)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to clear home gym: {}", e))?;

    sqlx::query("UPDATE gyms SET is_home = 1 WHERE id = ?1")
        .bind(gym_id)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to set home gym: {}", e))?;

    Ok(())
}

#[tauri::command]
pub async fn update_gym_grading_mode(
    state: State<'_, Arc<AppState>>,
    gym_id: i64,
    mode: GradingMode,
) -> Result<(), String> {
    sqlx::query("UPDATE gyms SET grading_mode = ?1 WHERE id = ?2")
        .bind(mode.as_str())
        .bind(gym_id)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to update grading mode: {}", e))?;

    Ok(())
}

/// Append a grade to a gym's ladder. New grades go to the hard end; the
/// user reorders by editing sort_order later.
#[tauri::command]
pub async fn create_gym_grade(
    state: State<'_, Arc<AppState>>,
    gym_id: i64,
    name: String,
    color: String,
) -> Result<GymGrade, String> {
    let next_sort: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM gym_grades WHERE gym_id = ?1",
    )
    .bind(gym_id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| format!("Failed to compute sort order: {}", e))?;

    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO gym_grades (gym_id, name, color, sort_order, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(gym_id)
    .bind(&name)
    .bind(&color)
    .bind(next_sort)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| format!("Failed to create grade: {}", e))?;

    Ok(GymGrade {
        id: result.last_insert_rowid(),
        gym_id,
        name,
        color,
        sort_order: next_sort,
        created_at: now,
    })
}

#[tauri::command]
pub async fn update_gym_grade(
    state: State<'_, Arc<AppState>>,
    grade_id: i64,
    name: String,
    color: String,
) -> Result<(), String> {
    sqlx::query("UPDATE gym_grades SET name = ?1, color = ?2 WHERE id = ?3")
        .bind(&name)
        .bind(&color)
        .bind(grade_id)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to update grade: {}", e))?;

    Ok(())
}

/// Delete a grade. Problems referencing it keep the dangling id and resolve
/// through their free-text label instead.
#[tauri::command]
pub async fn delete_gym_grade(
    state: State<'_, Arc<AppState>>,
    grade_id: i64,
) -> Result<(), String> {
    sqlx::query("DELETE FROM gym_grades WHERE id = ?1")
        .bind(grade_id)
        .execute(&state.db)
        .await
        .map_err(|e| format!("Failed to delete grade: {}", e))?;

    Ok(())
}

/// The home gym and its ladder, ordered easiest to hardest.
#[derive(Debug, Clone, Serialize)]
pub struct HomeGymWithGrades {
    pub gym: Option<Gym>,
    pub grades: Vec<GymGrade>,
}

#[tauri::command]
pub async fn get_home_gym_with_grades(
    state: State<'_, Arc<AppState>>,
) -> Result<HomeGymWithGrades, String> {
    let gyms = store::load_gyms(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch gyms: {}", e))?;

    let Some(gym) = gyms.into_iter().find(|g| g.is_home) else {
        return Ok(HomeGymWithGrades {
            gym: None,
            grades: Vec::new(),
        });
    };

    let grades = store::load_gym_grades(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch grades: {}", e))?
        .into_iter()
        .filter(|g| g.gym_id == gym.id)
        .collect();

    Ok(HomeGymWithGrades {
        gym: Some(gym),
        grades,
    })
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

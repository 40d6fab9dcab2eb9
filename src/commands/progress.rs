//! Tauri command for the progress view: load one snapshot, run the analytics
//! engine over it, hand the assembled payload to the webview.

use std::sync::Arc;

use chrono::Utc;
use tauri::State;

use crate::db::AppState;
use crate::progress::ProgressPayload;
use crate::store::{Snapshot, SqliteStore};

/// Everything the progress view renders, computed in one pass. The snapshot
/// is loaded completely before the engine runs; a fetch failure surfaces here
/// and the engine is never invoked with partial collections.
#[tauri::command]
pub async fn get_progress_overview(
  state: State<'_, Arc<AppState>>,
) -> Result<ProgressPayload, String> {
  let store = SqliteStore::new(&state.db);
  let snapshot = Snapshot::load(&store)
    .await
    .map_err(|e| format!("Failed to load progress data: {}", e))?;

  Ok(ProgressPayload::compute(&snapshot, Utc::now()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

mod commands;
mod db;
mod grades;
mod models;
mod progress;
mod store;
#[cfg(test)]
mod test_utils;

use db::AppState;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(|app| {
      // Initialize database
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle).await {
          Ok(pool) => {
            let state = Arc::new(AppState { db: pool });
            app_handle.manage(state);
            println!("Database ready");
          }
          Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::get_problems,
      commands::create_problem,
      commands::delete_problem,
      commands::log_attempt,
      commands::get_problem_stats,
      // Session commands
      commands::sessions::get_or_create_today_session,
      commands::sessions::get_sessions_for_month,
      // Gym commands
      commands::gyms::get_gyms_and_grades,
      commands::gyms::create_gym,
      commands::gyms::set_home_gym,
      commands::gyms::update_gym_grading_mode,
      commands::gyms::create_gym_grade,
      commands::gyms::update_gym_grade,
      commands::gyms::delete_gym_grade,
      commands::gyms::get_home_gym_with_grades,
      // Progress commands
      commands::progress::get_progress_overview,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}

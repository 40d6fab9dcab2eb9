use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a gym grades its problems. Informational only; the analytics engine
/// does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMode {
  Specific,
  Ranges,
}

impl GradingMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      GradingMode::Specific => "specific",
      GradingMode::Ranges => "ranges",
    }
  }
}

impl std::fmt::Display for GradingMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for GradingMode {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "specific" => Ok(GradingMode::Specific),
      "ranges" => Ok(GradingMode::Ranges),
      _ => Err(format!("Unknown grading mode: {}", s)),
    }
  }
}

/// A gym. At most one gym has `is_home = true` at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gym {
  pub id: i64,
  pub name: String,
  pub is_home: bool,
  pub grading_mode: GradingMode,
  pub created_at: DateTime<Utc>,
}

/// One grade in a gym's ladder. Rank is only meaningful within a single
/// gym's grade set; grades of different gyms are never comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymGrade {
  pub id: i64,
  pub gym_id: i64,
  pub name: String,
  pub color: String,
  pub sort_order: i64,
  pub created_at: DateTime<Utc>,
}

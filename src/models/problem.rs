use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status. This is a cached display hint kept in sync by the
/// attempt-logging command; derived statistics recompute "sent" from the
/// attempt log instead of trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemStatus {
  Project,
  Sent,
}

impl ProblemStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProblemStatus::Project => "project",
      ProblemStatus::Sent => "sent",
    }
  }
}

impl std::fmt::Display for ProblemStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for ProblemStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "project" => Ok(ProblemStatus::Project),
      "sent" => Ok(ProblemStatus::Sent),
      _ => Err(format!("Unknown problem status: {}", s)),
    }
  }
}

/// A boulder problem. Grade can be free text, a structured reference into a
/// gym's grade ladder, or both; all of them are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
  pub id: i64,
  pub grade: Option<String>,
  pub status: ProblemStatus,
  pub gym_id: Option<i64>,
  pub grade_id: Option<i64>,
  pub photo_url: Option<String>,
  pub boulder_color: Option<String>,
  pub created_at: DateTime<Utc>,
}

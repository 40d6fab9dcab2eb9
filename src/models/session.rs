use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// User-reported energy level for a session. Nullable historically: early
/// sessions were created before the field existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
  Low,
  Normal,
  High,
}

impl Energy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Energy::Low => "low",
      Energy::Normal => "normal",
      Energy::High => "high",
    }
  }
}

impl std::fmt::Display for Energy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for Energy {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "low" => Ok(Energy::Low),
      "normal" => Ok(Energy::Normal),
      "high" => Ok(Energy::High),
      _ => Err(format!("Unknown energy level: {}", s)),
    }
  }
}

/// A climbing session. At most one row per calendar date, created lazily on
/// the first interaction of a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub id: i64,
  pub date: NaiveDate,
  pub energy: Option<Energy>,
  pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How far up the problem an attempt got. Ordered by climbing progress
/// (not by time): reaching the crux beats falling at the start, a send
/// beats everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Start,
  Crux,
  Almost,
  Sent,
}

impl Outcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      Outcome::Start => "start",
      Outcome::Crux => "crux",
      Outcome::Almost => "almost",
      Outcome::Sent => "sent",
    }
  }

  pub fn is_send(&self) -> bool {
    matches!(self, Outcome::Sent)
  }
}

impl std::fmt::Display for Outcome {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for Outcome {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "start" => Ok(Outcome::Start),
      "crux" => Ok(Outcome::Crux),
      "almost" => Ok(Outcome::Almost),
      "sent" => Ok(Outcome::Sent),
      _ => Err(format!("Unknown outcome: {}", s)),
    }
  }
}

/// One physical try on a problem. Append-only; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
  pub id: i64,
  pub session_id: i64,
  pub problem_id: i64,
  pub outcome: Outcome,
  pub created_at: DateTime<Utc>,
}

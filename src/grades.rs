//! Grade resolution: map a problem's grade reference to a rank + display label
//!
//! Rank comes from the home gym's grade ladder when the problem belongs to the
//! home gym, and from a fixed fallback vocabulary of FB-scale tokens otherwise.
//! Rank is only well-ordered within one gym's grade set; the textual fallback
//! is a heuristic for everything else, not a guarantee.

use serde::{Deserialize, Serialize};

use crate::models::{Gym, GymGrade, Problem};

/// ---------------------------------------------------------------------------
/// Fallback grade vocabulary
/// ---------------------------------------------------------------------------

/// FB-like grade tokens ordered easiest to hardest. Only used when a problem
/// has no usable home-gym grade reference.
pub const GRADE_SCALE: [&str; 18] = [
  "4", "4+",
  "5", "5+",
  "5a", "5a+",
  "5b", "5b+",
  "5c", "5c+",
  "6a", "6a+",
  "6b", "6b+",
  "6c", "6c+",
  "7a", "7a+",
];

/// Find the first scale token contained in a free-text grade label.
/// Case-insensitive substring match; first token in scale order wins.
pub fn extract_grade_token(grade: &str) -> Option<usize> {
  let lower = grade.to_lowercase();
  GRADE_SCALE.iter().position(|token| lower.contains(token))
}

/// ---------------------------------------------------------------------------
/// Resolver
/// ---------------------------------------------------------------------------

/// A problem's grade resolved for ranking and display.
///
/// `rank = None` means the problem is excluded from ranked comparisons
/// (hardest grade, milestones); the label can still be shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGrade {
  pub rank: Option<usize>,
  pub label: Option<String>,
  pub color: Option<String>,
}

/// Resolves problem grades against the home gym's ladder.
///
/// The ladder is ordered by explicit sort key, tie-broken by creation time, so
/// two grades sharing a sort_order still resolve deterministically.
#[derive(Debug, Clone)]
pub struct GradeResolver {
  home_gym_id: Option<i64>,
  home_grades: Vec<GymGrade>,
}

impl GradeResolver {
  pub fn new(home_gym: Option<&Gym>, home_grades: &[GymGrade]) -> Self {
    let mut grades = home_grades.to_vec();
    grades.sort_by(|a, b| {
      a.sort_order
        .cmp(&b.sort_order)
        .then(a.created_at.cmp(&b.created_at))
    });

    Self {
      home_gym_id: home_gym.map(|g| g.id),
      home_grades: grades,
    }
  }

  /// Resolve a problem's grade, in strict priority order:
  /// 1. home-gym grade reference -> position in the home ladder
  /// 2. free-text token -> position in GRADE_SCALE
  /// 3. neither -> unranked, free text kept for display
  pub fn resolve(&self, problem: &Problem) -> ResolvedGrade {
    if let (Some(home_id), Some(gym_id), Some(grade_id)) =
      (self.home_gym_id, problem.gym_id, problem.grade_id)
    {
      // Authoritative path: only for home-gym problems, because rank is only
      // meaningful within one grading system.
      if gym_id == home_id {
        if let Some(idx) = self.home_grades.iter().position(|g| g.id == grade_id) {
          let grade = &self.home_grades[idx];
          return ResolvedGrade {
            rank: Some(idx),
            label: Some(grade.name.clone()),
            color: Some(grade.color.clone()),
          };
        }
      }
    }

    // Fallback: textual token from the free-form grade label. A grade_id
    // pointing at another gym's ladder lands here too; cross-gym positions
    // are never compared directly.
    if let Some(grade) = &problem.grade {
      if let Some(rank) = extract_grade_token(grade) {
        return ResolvedGrade {
          rank: Some(rank),
          label: Some(grade.clone()),
          color: None,
        };
      }
    }

    ResolvedGrade {
      rank: None,
      label: problem.grade.clone(),
      color: None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

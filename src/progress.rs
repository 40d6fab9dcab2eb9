//! Progress analytics engine
//!
//! Pure computations that turn the raw attempt log into the derived signals
//! shown on the progress view: first-send extraction, conversion rates and
//! coaching zones, grade milestones, session labels, and the activity heatmap.
//! Everything here is a total function of an in-memory snapshot; "now" is a
//! parameter so results are reproducible.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::grades::GradeResolver;
use crate::models::{Attempt, Problem};
use crate::store::Snapshot;

/// Rolling conversion window feeding the coach card.
pub const ROLLING_WINDOW_DAYS: i64 = 14;

/// Trailing calendar weeks in the conversion trend series.
pub const WEEKLY_WINDOW_WEEKS: usize = 8;

/// Trailing days in the activity heatmap (7x4 grid).
pub const HEATMAP_WINDOW_DAYS: usize = 28;

/// ---------------------------------------------------------------------------
/// Send Extraction
/// ---------------------------------------------------------------------------

/// First successful send of a problem, with the effort it took.
///
/// `attempts_to_send` counts every attempt up to and including the sending
/// one, so it is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
  pub problem_id: i64,
  pub first_sent_at: DateTime<Utc>,
  pub attempts_to_send: usize,
}

fn group_attempts(attempts: &[Attempt]) -> HashMap<i64, Vec<&Attempt>> {
  let mut by_problem: HashMap<i64, Vec<&Attempt>> = HashMap::new();
  for attempt in attempts {
    by_problem.entry(attempt.problem_id).or_default().push(attempt);
  }
  by_problem
}

/// Derive one SendRecord per problem with at least one sent attempt.
///
/// Problems without attempts or without a send produce no record; that is the
/// normal "not yet sent" state, not an error. Attempts referencing a problem
/// that is not in `problems` are skipped, join integrity is the store's job.
pub fn extract_sends(problems: &[Problem], attempts: &[Attempt]) -> Vec<SendRecord> {
  let by_problem = group_attempts(attempts);
  let mut records = Vec::new();

  for problem in problems {
    let Some(list) = by_problem.get(&problem.id) else {
      continue;
    };

    // Earliest sent attempt; strict < keeps the first-loaded row on
    // timestamp ties
    let mut first_sent: Option<&Attempt> = None;
    for attempt in list {
      if attempt.outcome.is_send()
        && first_sent.is_none_or(|cur| attempt.created_at < cur.created_at)
      {
        first_sent = Some(attempt);
      }
    }

    let Some(first_sent) = first_sent else {
      continue;
    };

    let attempts_to_send = list
      .iter()
      .filter(|a| a.created_at <= first_sent.created_at)
      .count();

    records.push(SendRecord {
      problem_id: problem.id,
      first_sent_at: first_sent.created_at,
      attempts_to_send,
    });
  }

  records
}

/// Send extraction restricted to one session's attempts, for per-session
/// hardest-send displays.
pub fn extract_session_sends(
  problems: &[Problem],
  attempts: &[Attempt],
  session_id: i64,
) -> Vec<SendRecord> {
  let scoped: Vec<Attempt> = attempts
    .iter()
    .filter(|a| a.session_id == session_id)
    .cloned()
    .collect();
  extract_sends(problems, &scoped)
}

/// ---------------------------------------------------------------------------
/// Conversion Aggregation
/// ---------------------------------------------------------------------------

/// Attempt -> send conversion over some window. Rate is 0 when there are no
/// attempts, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
  pub attempts: usize,
  pub sends: usize,
  pub rate: f64,
}

impl Conversion {
  pub fn from_counts(attempts: usize, sends: usize) -> Self {
    let rate = if attempts > 0 {
      sends as f64 / attempts as f64
    } else {
      0.0
    };
    Self {
      attempts,
      sends,
      rate,
    }
  }
}

/// Conversion over a trailing window of N days ending at `now`.
pub fn rolling_conversion(attempts: &[Attempt], now: DateTime<Utc>, days: i64) -> Conversion {
  let since = now - Duration::days(days);
  let mut total = 0;
  let mut sends = 0;
  for attempt in attempts {
    if attempt.created_at >= since {
      total += 1;
      if attempt.outcome.is_send() {
        sends += 1;
      }
    }
  }
  Conversion::from_counts(total, sends)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// One calendar week of conversion data, keyed by its Monday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
  pub week: NaiveDate,
  pub attempts: usize,
  pub sends: usize,
  pub rate: f64,
}

/// Per-week conversion over the trailing `weeks` calendar weeks (current week
/// included). Buckets are sorted ascending; weeks without attempts produce no
/// bucket.
pub fn weekly_conversion(attempts: &[Attempt], now: DateTime<Utc>, weeks: usize) -> Vec<WeekBucket> {
  if weeks == 0 {
    return Vec::new();
  }

  let current_week = week_start(now.date_naive());
  let earliest = current_week - Duration::days(7 * (weeks as i64 - 1));

  let mut buckets: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
  for attempt in attempts {
    let week = week_start(attempt.created_at.date_naive());
    if week < earliest || week > current_week {
      continue;
    }
    let entry = buckets.entry(week).or_default();
    entry.0 += 1;
    if attempt.outcome.is_send() {
      entry.1 += 1;
    }
  }

  buckets
    .into_iter()
    .map(|(week, (attempts, sends))| {
      let conversion = Conversion::from_counts(attempts, sends);
      WeekBucket {
        week,
        attempts,
        sends,
        rate: conversion.rate,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Conversion Zones
/// ---------------------------------------------------------------------------

/// Coaching zone derived from the conversion rate. Evaluated high to low with
/// inclusive lower bounds, so every rate in [0,1] lands in exactly one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionZone {
  Cruising,     // rate >= 0.25
  Growth,       // 0.12 <= rate < 0.25
  Limit,        // 0.05 <= rate < 0.12
  Overreaching, // rate < 0.05
}

/// Coach copy for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoachCopy {
  pub title: &'static str,
  pub body: &'static str,
}

impl ConversionZone {
  pub fn from_rate(rate: f64) -> Self {
    if rate >= 0.25 {
      ConversionZone::Cruising
    } else if rate >= 0.12 {
      ConversionZone::Growth
    } else if rate >= 0.05 {
      ConversionZone::Limit
    } else {
      ConversionZone::Overreaching
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      ConversionZone::Cruising => "Cruising",
      ConversionZone::Growth => "Growth",
      ConversionZone::Limit => "Limit",
      ConversionZone::Overreaching => "Overreaching",
    }
  }

  pub fn color(&self) -> &'static str {
    match self {
      ConversionZone::Cruising => "#22C55E",
      ConversionZone::Growth => "#EAB308",
      ConversionZone::Limit => "#F97316",
      ConversionZone::Overreaching => "#EF4444",
    }
  }

  pub fn hint(&self) -> &'static str {
    match self {
      ConversionZone::Cruising => "Mostly comfortable",
      ConversionZone::Growth => "Ideal learning zone",
      ConversionZone::Limit => "Hard projecting",
      ConversionZone::Overreaching => "Too hard right now",
    }
  }

  pub fn coach_copy(&self) -> CoachCopy {
    match self {
      ConversionZone::Cruising => CoachCopy {
        title: "You're cruising",
        body: "You convert a lot of attempts into sends. Add one slightly harder learning project next session to keep progressing.",
      },
      ConversionZone::Growth => CoachCopy {
        title: "Healthy growth zone",
        body: "Nice balance: you're pushing but still converting. Keep the mix of a few confidence sends plus one or two projects.",
      },
      ConversionZone::Limit => CoachCopy {
        title: "You're pushing your limit",
        body: "Lower conversion is normal here. Prioritize rest between tries and repeat quality attempts instead of spreading yourself thin.",
      },
      ConversionZone::Overreaching => CoachCopy {
        title: "Likely overreaching",
        body: "Very low conversion often means problems are too far above your current level. Choose easier learnable projects and rebuild momentum.",
      },
    }
  }
}

/// ---------------------------------------------------------------------------
/// Milestones / Grade Steps
/// ---------------------------------------------------------------------------

/// A send record joined with its resolved grade rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSend {
  pub problem_id: i64,
  pub rank: usize,
  pub grade: Option<String>,
  pub color: Option<String>,
  pub first_sent_at: DateTime<Utc>,
  pub attempts_to_send: usize,
}

/// Join send records to their problems, resolve grades, and keep the ranked
/// ones sorted by first-send time (input order breaks ties).
pub fn rank_sends(
  problems: &[Problem],
  sends: &[SendRecord],
  resolver: &GradeResolver,
) -> Vec<RankedSend> {
  let by_id: HashMap<i64, &Problem> = problems.iter().map(|p| (p.id, p)).collect();

  let mut ranked: Vec<RankedSend> = sends
    .iter()
    .filter_map(|send| {
      let problem = by_id.get(&send.problem_id)?;
      let resolved = resolver.resolve(problem);
      let rank = resolved.rank?;
      Some(RankedSend {
        problem_id: send.problem_id,
        rank,
        grade: resolved.label,
        color: resolved.color,
        first_sent_at: send.first_sent_at,
        attempts_to_send: send.attempts_to_send,
      })
    })
    .collect();

  ranked.sort_by_key(|s| s.first_sent_at);
  ranked
}

/// One entry of the grade-step series. `max_rank_so_far` is non-decreasing by
/// construction; `is_new_hardest` marks strict improvements only, so a repeat
/// of the current hardest grade is not a new milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeStep {
  pub day: NaiveDate,
  pub rank: usize,
  pub max_rank_so_far: usize,
  pub is_new_hardest: bool,
  pub grade: Option<String>,
  pub color: Option<String>,
  pub attempts_to_send: usize,
}

/// The hardest ranked send. Ties go to whoever reached the rank first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardestSend {
  pub rank: usize,
  pub grade: Option<String>,
  pub color: Option<String>,
  pub first_sent_at: DateTime<Utc>,
}

/// Build the step series and the overall hardest send from ranked sends
/// sorted ascending by first-send time. Empty input is a valid state for new
/// users and yields an empty series.
pub fn build_grade_steps(ranked: &[RankedSend]) -> (Vec<GradeStep>, Option<HardestSend>) {
  let mut steps = Vec::with_capacity(ranked.len());
  let mut hardest: Option<HardestSend> = None;
  let mut max_rank: Option<usize> = None;

  for send in ranked {
    let is_new_hardest = max_rank.is_none_or(|m| send.rank > m);

    if is_new_hardest {
      max_rank = Some(send.rank);
      hardest = Some(HardestSend {
        rank: send.rank,
        grade: send.grade.clone(),
        color: send.color.clone(),
        first_sent_at: send.first_sent_at,
      });
    }

    steps.push(GradeStep {
      day: send.first_sent_at.date_naive(),
      rank: send.rank,
      max_rank_so_far: max_rank.unwrap_or(send.rank),
      is_new_hardest,
      grade: send.grade.clone(),
      color: send.color.clone(),
      attempts_to_send: send.attempts_to_send,
    });
  }

  (steps, hardest)
}

/// ---------------------------------------------------------------------------
/// Session Classification
/// ---------------------------------------------------------------------------

/// Descriptive label for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
  FlowDay,
  ProgressDay,
  VolumeDay,
  WarmUp,
  Solid,
}

impl SessionKind {
  /// Classify a session from its total attempt and send counts.
  ///
  /// First match wins. Several conditions can hold at once, so the rule
  /// order is load-bearing: flow > progress > volume > warm-up > default.
  pub fn classify(attempts: usize, sends: usize) -> Self {
    if sends >= 3 && attempts > 0 && attempts as f64 / sends as f64 <= 3.0 {
      SessionKind::FlowDay
    } else if sends >= 1 && attempts >= 15 {
      SessionKind::ProgressDay
    } else if attempts >= 25 {
      SessionKind::VolumeDay
    } else if attempts == 0 {
      SessionKind::WarmUp
    } else {
      SessionKind::Solid
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      SessionKind::FlowDay => "Flow day",
      SessionKind::ProgressDay => "Progress day",
      SessionKind::VolumeDay => "Volume day",
      SessionKind::WarmUp => "Warm-up",
      SessionKind::Solid => "Solid session",
    }
  }

  pub fn blurb(&self) -> &'static str {
    match self {
      SessionKind::FlowDay => "Lots of sends with little effort each.",
      SessionKind::ProgressDay => "Heavy projecting that paid off.",
      SessionKind::VolumeDay => "Big mileage day, good conditioning.",
      SessionKind::WarmUp => "Nothing logged yet.",
      SessionKind::Solid => "Balanced effort and results.",
    }
  }
}

/// ---------------------------------------------------------------------------
/// Heatmap
/// ---------------------------------------------------------------------------

/// One calendar day of the activity heatmap. Days without attempts are
/// explicit zero records so the grid never has gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
  pub day: NaiveDate,
  pub attempts: usize,
  pub sends: usize,
}

/// Daily activity for the trailing `days` days ending at `today`, oldest
/// first. Output length is always exactly `days`.
pub fn build_heatmap(attempts: &[Attempt], today: NaiveDate, days: usize) -> Vec<HeatmapDay> {
  let mut by_day: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
  for attempt in attempts {
    let entry = by_day.entry(attempt.created_at.date_naive()).or_default();
    entry.0 += 1;
    if attempt.outcome.is_send() {
      entry.1 += 1;
    }
  }

  let mut series = Vec::with_capacity(days);
  for offset in (0..days as i64).rev() {
    let day = today - Duration::days(offset);
    let (attempts, sends) = by_day.get(&day).copied().unwrap_or((0, 0));
    series.push(HeatmapDay {
      day,
      attempts,
      sends,
    });
  }

  series
}

/// ---------------------------------------------------------------------------
/// Attempts-to-send Histogram
/// ---------------------------------------------------------------------------

/// How hard-won sends were: flash (<= 2 tries), learn (3-6), project (>= 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendHistogram {
  pub flash: usize,
  pub learn: usize,
  pub project: usize,
}

impl SendHistogram {
  pub fn from_sends(sends: &[SendRecord]) -> Self {
    let mut histogram = SendHistogram::default();
    for send in sends {
      match send.attempts_to_send {
        0..=2 => histogram.flash += 1,
        3..=6 => histogram.learn += 1,
        _ => histogram.project += 1,
      }
    }
    histogram
  }
}

/// ---------------------------------------------------------------------------
/// Assembled Payload
/// ---------------------------------------------------------------------------

/// Header counts for the progress view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressHeader {
  pub total_attempts: usize,
  pub total_problems: usize,
  pub worked_problems: usize,
  pub worked_pct: Option<f64>,
  pub avg_attempts_per_send: Option<f64>,
  pub home_gym_name: Option<String>,
}

/// Rolling-window conversion plus its coaching zone and display copy.
#[derive(Debug, Clone, Serialize)]
pub struct WindowConversion {
  pub attempts: usize,
  pub sends: usize,
  pub rate: f64,
  pub zone: ConversionZone,
  pub label: &'static str,
  pub color: &'static str,
  pub hint: &'static str,
  pub coach: CoachCopy,
}

/// The complete read-only payload for the progress view, assembled from one
/// snapshot in a single pass per component.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPayload {
  pub header: ProgressHeader,
  pub conversion_14d: WindowConversion,
  pub weekly: Vec<WeekBucket>,
  pub send_histogram: SendHistogram,
  pub grade_steps: Vec<GradeStep>,
  pub hardest: Option<HardestSend>,
  pub heatmap: Vec<HeatmapDay>,
}

impl ProgressPayload {
  pub fn compute(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
    let resolver = GradeResolver::new(snapshot.home_gym.as_ref(), &snapshot.home_grades);

    let sends = extract_sends(&snapshot.problems, &snapshot.attempts);
    let ranked = rank_sends(&snapshot.problems, &sends, &resolver);
    let (grade_steps, hardest) = build_grade_steps(&ranked);

    // Worked problems: intersect the problem list with the attempt log so a
    // dangling attempt cannot inflate the percentage
    let attempted: HashSet<i64> = snapshot.attempts.iter().map(|a| a.problem_id).collect();
    let worked_problems = snapshot
      .problems
      .iter()
      .filter(|p| attempted.contains(&p.id))
      .count();
    let total_problems = snapshot.problems.len();
    let worked_pct = if total_problems > 0 {
      Some((worked_problems as f64 / total_problems as f64) * 100.0)
    } else {
      None
    };

    let avg_attempts_per_send = if sends.is_empty() {
      None
    } else {
      let total: usize = sends.iter().map(|s| s.attempts_to_send).sum();
      Some(total as f64 / sends.len() as f64)
    };

    let conversion = rolling_conversion(&snapshot.attempts, now, ROLLING_WINDOW_DAYS);
    let zone = ConversionZone::from_rate(conversion.rate);

    Self {
      header: ProgressHeader {
        total_attempts: snapshot.attempts.len(),
        total_problems,
        worked_problems,
        worked_pct,
        avg_attempts_per_send,
        home_gym_name: snapshot.home_gym.as_ref().map(|g| g.name.clone()),
      },
      conversion_14d: WindowConversion {
        attempts: conversion.attempts,
        sends: conversion.sends,
        rate: conversion.rate,
        zone,
        label: zone.label(),
        color: zone.color(),
        hint: zone.hint(),
        coach: zone.coach_copy(),
      },
      weekly: weekly_conversion(&snapshot.attempts, now, WEEKLY_WINDOW_WEEKS),
      send_histogram: SendHistogram::from_sends(&sends),
      grade_steps,
      hardest,
      heatmap: build_heatmap(
        &snapshot.attempts,
        now.date_naive(),
        HEATMAP_WINDOW_DAYS,
      ),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

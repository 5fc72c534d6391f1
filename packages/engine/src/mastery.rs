//! Mastery Tracker
//!
//! Turns per-question attempt history into mastery scores for objectives,
//! misconception tags and free-form question tags.
//!
//! Scoring, per key:
//! - each question's attempts are weighted by `0.5 ^ (age_days / half_life)`
//!   where age is measured from the question's `last_seen_at`
//! - `score = 100 * Σ w·correct / (Σ w·attempts + prior_attempts)`
//! - keys with no attempted question score 0 with `attempt_count = 0`
//!
//! The prior term shrinks thin evidence towards zero, so one lucky answer
//! never reads as mastery. Everything here is a pure function of its inputs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MasteryConfig;
use crate::resolve::{ObjectiveResolver, ResolvedQuestion};
use crate::sanitize::{clamp_score, finite_or, round1};
use crate::types::{normalize_tag, Pack, QuestionStat, QuestionStats};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Steady,
    Declining,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRow {
    pub objective_id: String,
    pub score: f64,
    pub attempt_count: u32,
    pub question_count: u32,
    pub attempted_question_count: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryReport {
    /// One row per catalog objective, catalog order.
    pub rows: Vec<MasteryRow>,
    /// Objective ids, weakest first.
    pub sorted_weakest: Vec<String>,
}

impl MasteryReport {
    pub fn row(&self, objective_id: &str) -> Option<&MasteryRow> {
        self.rows.iter().find(|r| r.objective_id == objective_id)
    }

    pub fn score_of(&self, objective_id: &str) -> Option<f64> {
        self.row(objective_id).map(|r| r.score)
    }

    /// Rows in `sorted_weakest` order.
    pub fn weakest_rows(&self) -> Vec<MasteryRow> {
        self.sorted_weakest
            .iter()
            .filter_map(|id| self.row(id).cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisconceptionRow {
    pub misconception_tag: String,
    pub score: f64,
    pub priority: f64,
    pub attempt_count: u32,
    /// Objectives of the questions carrying this tag.
    pub objective_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisconceptionReport {
    /// Highest priority first.
    pub rows: Vec<MisconceptionRow>,
}

// ==================== Evidence ====================

#[derive(Debug, Clone, Default)]
struct Evidence {
    decayed_attempts: f64,
    decayed_correct: f64,
    attempts: u32,
    correct: u32,
    recent_attempts: u32,
    recent_correct: u32,
    question_count: u32,
    attempted_questions: u32,
}

fn age_days(last_seen_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - last_seen_at).num_milliseconds().max(0);
    millis as f64 / MILLIS_PER_DAY
}

/// `0.5^x` using only additions, multiplications and divisions, which IEEE
/// 754 rounds exactly, so weights are bit-identical on every platform.
fn half_pow(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return 1.0;
    }
    if x >= 1100.0 {
        return 0.0;
    }
    let whole = x.floor();
    // e^(-frac * ln 2); |t| < 0.7 so 20 Taylor terms reach full precision
    let t = -(x - whole) * std::f64::consts::LN_2;
    let mut term = 1.0;
    let mut value = 1.0;
    for k in 1..=20 {
        term *= t / k as f64;
        value += term;
    }
    for _ in 0..whole as u32 {
        value *= 0.5;
    }
    value
}

/// Weight of a question's evidence given when it was last seen.
pub fn decay_weight(
    last_seen_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &MasteryConfig,
) -> f64 {
    let floor = finite_or(config.minimum_decay_weight, 0.0).clamp(0.0, 1.0);
    match last_seen_at {
        None => floor,
        Some(seen) => {
            let half_life = finite_or(config.half_life_days, 1.0).max(f64::EPSILON);
            let weight = half_pow(age_days(seen, now) / half_life);
            finite_or(weight, floor).max(floor)
        }
    }
}

impl Evidence {
    fn add(&mut self, stat: Option<&QuestionStat>, now: DateTime<Utc>, config: &MasteryConfig) {
        self.question_count += 1;
        let Some(stat) = stat.filter(|s| s.attempts > 0) else {
            return;
        };
        let correct = stat.effective_correct();
        let weight = decay_weight(stat.last_seen_at, now, config);

        self.attempted_questions += 1;
        self.attempts = self.attempts.saturating_add(stat.attempts);
        self.correct = self.correct.saturating_add(correct);
        self.decayed_attempts += weight * stat.attempts as f64;
        self.decayed_correct += weight * correct as f64;

        let recent = stat
            .last_seen_at
            .map(|seen| age_days(seen, now) <= config.trend_window_days)
            .unwrap_or(false);
        if recent {
            self.recent_attempts = self.recent_attempts.saturating_add(stat.attempts);
            self.recent_correct = self.recent_correct.saturating_add(correct);
        }
    }

    fn score(&self, config: &MasteryConfig) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        let prior = finite_or(config.prior_attempts, 0.0).max(0.0);
        let denominator = self.decayed_attempts + prior;
        if denominator <= 0.0 {
            return 0.0;
        }
        round1(clamp_score(100.0 * self.decayed_correct / denominator))
    }

    fn trend(&self, config: &MasteryConfig) -> Trend {
        let older_attempts = self.attempts.saturating_sub(self.recent_attempts);
        if self.recent_attempts < config.trend_min_attempts
            || older_attempts < config.trend_min_attempts
        {
            return Trend::Insufficient;
        }
        let recent = self.recent_correct as f64 / self.recent_attempts as f64;
        let overall = self.correct as f64 / self.attempts as f64;
        let delta = recent - overall;
        if delta <= -config.trend_threshold {
            Trend::Declining
        } else if delta >= config.trend_threshold {
            Trend::Improving
        } else {
            Trend::Steady
        }
    }
}

/// Accumulate evidence per key, where `keys_of` names the keys a question
/// counts towards.
fn accumulate<F>(
    questions: &[ResolvedQuestion<'_>],
    stats: &QuestionStats,
    now: DateTime<Utc>,
    config: &MasteryConfig,
    mut keys_of: F,
) -> BTreeMap<String, Evidence>
where
    F: FnMut(&ResolvedQuestion<'_>) -> Vec<String>,
{
    let mut evidence: BTreeMap<String, Evidence> = BTreeMap::new();
    for rq in questions {
        let stat = stats.get(&rq.question.id);
        for key in keys_of(rq) {
            evidence.entry(key).or_default().add(stat, now, config);
        }
    }
    evidence
}

// ==================== Objectives ====================

pub fn compute_mastery(
    resolver: &ObjectiveResolver<'_>,
    packs: &[Pack],
    stats: &QuestionStats,
    now: DateTime<Utc>,
    config: &MasteryConfig,
) -> MasteryReport {
    let questions = resolver.resolve_all(packs);
    let evidence = accumulate(&questions, stats, now, config, |rq| {
        rq.resolution.objective_ids.clone()
    });
    let empty = Evidence::default();

    let rows: Vec<MasteryRow> = resolver
        .catalog()
        .objectives
        .iter()
        .map(|objective| {
            let e = evidence.get(&objective.id).unwrap_or(&empty);
            MasteryRow {
                objective_id: objective.id.clone(),
                score: e.score(config),
                attempt_count: e.attempts,
                question_count: e.question_count,
                attempted_question_count: e.attempted_questions,
                trend: e.trend(config),
            }
        })
        .collect();

    let mut order: Vec<&MasteryRow> = rows.iter().collect();
    order.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.attempt_count.cmp(&b.attempt_count))
            .then_with(|| a.objective_id.cmp(&b.objective_id))
    });
    let sorted_weakest = order.into_iter().map(|r| r.objective_id.clone()).collect();

    tracing::debug!(objectives = rows.len(), "computed objective mastery");

    MasteryReport {
        rows,
        sorted_weakest,
    }
}

// ==================== Misconceptions ====================

pub fn compute_misconception_mastery(
    resolver: &ObjectiveResolver<'_>,
    packs: &[Pack],
    stats: &QuestionStats,
    now: DateTime<Utc>,
    config: &MasteryConfig,
) -> MisconceptionReport {
    let questions = resolver.resolve_all(packs);
    let mut evidence =
        accumulate(&questions, stats, now, config, |rq| rq.pack.misconception_tags_of(rq.question));

    // Traps nobody has a question for yet still show up, as maximally weak.
    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    for pack in packs {
        for trap in &pack.traps {
            let tag = normalize_tag(&trap.tag);
            if tag.is_empty() {
                continue;
            }
            evidence.entry(tag.clone()).or_default();
            let weight = trap.weight.filter(|w| w.is_finite() && *w >= 0.0).unwrap_or(1.0);
            weights
                .entry(tag)
                .and_modify(|w| *w = w.max(weight))
                .or_insert(weight);
        }
    }

    let mut objectives: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for rq in &questions {
        for tag in rq.pack.misconception_tags_of(rq.question) {
            objectives
                .entry(tag)
                .or_default()
                .extend(rq.resolution.objective_ids.iter().cloned());
        }
    }

    let mut rows: Vec<MisconceptionRow> = evidence
        .iter()
        .map(|(tag, e)| {
            let score = e.score(config);
            let weight = weights.get(tag).copied().unwrap_or(1.0);
            MisconceptionRow {
                misconception_tag: tag.clone(),
                score,
                priority: round1((100.0 - score) * weight),
                attempt_count: e.attempts,
                objective_ids: objectives
                    .get(tag)
                    .map(|ids| ids.iter().cloned().collect())
                    .unwrap_or_default(),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| a.misconception_tag.cmp(&b.misconception_tag))
    });

    MisconceptionReport { rows }
}

// ==================== Tags ====================

/// Mastery per normalized question tag, the `masteryByTag` map practice
/// runs are weighted by. Tags need no objective resolution.
pub fn compute_tag_mastery(
    packs: &[Pack],
    stats: &QuestionStats,
    now: DateTime<Utc>,
    config: &MasteryConfig,
) -> BTreeMap<String, f64> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut evidence: BTreeMap<String, Evidence> = BTreeMap::new();
    for question in packs.iter().flat_map(|p| p.question_bank.iter()) {
        if !seen.insert(question.id.as_str()) {
            continue;
        }
        let stat = stats.get(&question.id);
        let tags: BTreeSet<String> = question
            .tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();
        for tag in tags {
            evidence.entry(tag).or_default().add(stat, now, config);
        }
    }
    evidence
        .into_iter()
        .map(|(tag, e)| (tag, e.score(config)))
        .collect()
}

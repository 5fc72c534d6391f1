//! Exam Plan Builder
//!
//! Builds a fixed-length, domain-weighted timed exam from every pack's
//! question bank and scores a completed attempt against it.
//!
//! A question belongs to the domain of its primary (first resolved)
//! objective. Its draw weight grows with the deficit of its weakest resolved
//! objective against the configured target mastery.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ExamConfig, MasteryConfig};
use crate::error::EngineResult;
use crate::mastery::compute_mastery;
use crate::resolve::ObjectiveResolver;
use crate::rng::{derive_id, SeededRng};
use crate::sampler::{sample_with_rng, PoolItem, SampleConstraints};
use crate::sanitize::{mastery_deficit, round1};
use crate::types::{Pack, QuestionStats};

pub const CATEGORY_SCENARIO: &str = "scenario";
pub const CATEGORY_INTERACTIVE: &str = "interactive";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedQuestion {
    pub question_id: String,
    pub pack_id: String,
    pub domain_id: String,
    pub objective_ids: Vec<String>,
}

/// Frozen exam snapshot, persisted verbatim by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSimulationPlan {
    pub id: String,
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub questions: Vec<PlannedQuestion>,
    pub domain_targets: BTreeMap<String, usize>,
    pub domain_actual: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

impl ExamSimulationPlan {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.questions.iter().any(|q| q.question_id == question_id)
    }
}

/// Plan id for a `(seed, startedAt)` pair.
pub fn exam_plan_id(seed: &str, started_at: DateTime<Utc>) -> String {
    let started = started_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    derive_id("exam", &[seed, &started])
}

pub fn generate_plan(
    resolver: &ObjectiveResolver<'_>,
    packs: &[Pack],
    stats: &QuestionStats,
    seed: &str,
    now: DateTime<Utc>,
    config: &ExamConfig,
    mastery_config: &MasteryConfig,
) -> EngineResult<ExamSimulationPlan> {
    config.validate(resolver.catalog())?;
    let mut rng = SeededRng::from_seed_str(seed)?;

    let mastery = compute_mastery(resolver, packs, stats, now, mastery_config);
    let questions = resolver.resolve_all(packs);

    let mut pool = Vec::with_capacity(questions.len());
    let mut owners: BTreeMap<&str, (&str, &[String])> = BTreeMap::new();
    let mut no_domain = 0usize;

    for rq in &questions {
        let Some(domain) = rq
            .resolution
            .primary()
            .and_then(|id| resolver.catalog().domain_of(id))
        else {
            no_domain += 1;
            continue;
        };

        let weakest = rq
            .resolution
            .objective_ids
            .iter()
            .filter_map(|id| mastery.score_of(id))
            .fold(f64::INFINITY, f64::min);
        let weakness = if weakest.is_finite() {
            mastery_deficit(config.target_mastery, weakest)
        } else {
            0.0
        };

        let mut item = PoolItem::new(rq.question.id.clone(), domain).with_weakness(weakness);
        if rq.question.is_scenario() {
            item = item.with_category(CATEGORY_SCENARIO);
        }
        if rq.question.question_type.is_interactive() {
            item = item.with_category(CATEGORY_INTERACTIVE);
        }
        pool.push(item);
        owners.insert(
            rq.question.id.as_str(),
            (rq.pack.id.as_str(), rq.resolution.objective_ids.as_slice()),
        );
    }

    let mut category_minimums = BTreeMap::new();
    if config.min_scenario_questions > 0 {
        category_minimums.insert(CATEGORY_SCENARIO.to_string(), config.min_scenario_questions);
    }
    if config.min_interactive_questions > 0 {
        category_minimums.insert(
            CATEGORY_INTERACTIVE.to_string(),
            config.min_interactive_questions,
        );
    }
    let constraints = SampleConstraints {
        total_count: config.total_questions,
        category_minimums,
        weight_groups: config.domain_weights.clone(),
    };

    let outcome = sample_with_rng(&pool, &constraints, &mut rng)?;

    let mut warnings = Vec::new();
    if no_domain > 0 {
        warnings.push(format!(
            "{no_domain} questions have no resolvable domain and were excluded"
        ));
    }
    if outcome.ineligible > 0 {
        warnings.push(format!(
            "{} questions belong to domains without an exam weight and were excluded",
            outcome.ineligible
        ));
    }
    warnings.extend(outcome.shortfalls.iter().map(|s| s.to_string()));

    let planned = outcome
        .picked
        .iter()
        .map(|item| {
            let (pack_id, objective_ids) = owners
                .get(item.id.as_str())
                .copied()
                .unwrap_or_default();
            PlannedQuestion {
                question_id: item.id.clone(),
                pack_id: pack_id.to_string(),
                domain_id: item.group.clone(),
                objective_ids: objective_ids.to_vec(),
            }
        })
        .collect::<Vec<_>>();

    if !warnings.is_empty() {
        tracing::warn!(seed, warnings = warnings.len(), "exam plan has shortfalls");
    }
    tracing::debug!(seed, questions = planned.len(), "generated exam plan");

    Ok(ExamSimulationPlan {
        id: exam_plan_id(seed, now),
        seed: seed.to_string(),
        started_at: now,
        duration_minutes: config.duration_minutes,
        questions: planned,
        domain_targets: outcome.targets,
        domain_actual: outcome.actual,
        warnings,
    })
}

// ==================== Scoring ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResponse {
    pub question_id: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    pub total: u32,
    pub correct: u32,
}

/// Replaces the plan once an exam is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub plan_id: String,
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_questions: u32,
    pub answered: u32,
    pub correct: u32,
    pub score_percent: f64,
    pub passed: bool,
    /// Submitted after `startedAt + durationMinutes`.
    pub overtime: bool,
    pub domains: BTreeMap<String, DomainResult>,
}

/// Unanswered questions count as wrong. For an id answered more than once
/// the last response wins; ids outside the plan are ignored.
pub fn score_exam(
    plan: &ExamSimulationPlan,
    responses: &[ExamResponse],
    completed_at: DateTime<Utc>,
    config: &ExamConfig,
) -> ExamResult {
    let answers: BTreeMap<&str, bool> = responses
        .iter()
        .filter(|r| plan.contains(&r.question_id))
        .map(|r| (r.question_id.as_str(), r.correct))
        .collect();

    let mut domains: BTreeMap<String, DomainResult> = BTreeMap::new();
    let mut correct = 0u32;
    for question in &plan.questions {
        let entry = domains.entry(question.domain_id.clone()).or_default();
        entry.total += 1;
        if answers.get(question.question_id.as_str()).copied().unwrap_or(false) {
            entry.correct += 1;
            correct += 1;
        }
    }

    let total = plan.questions.len() as u32;
    let score_percent = if total == 0 {
        0.0
    } else {
        round1(100.0 * f64::from(correct) / f64::from(total))
    };

    ExamResult {
        plan_id: plan.id.clone(),
        seed: plan.seed.clone(),
        started_at: plan.started_at,
        completed_at,
        total_questions: total,
        answered: answers.len() as u32,
        correct,
        score_percent,
        passed: total > 0 && score_percent >= config.passing_percent,
        overtime: completed_at > plan.ends_at(),
        domains,
    }
}

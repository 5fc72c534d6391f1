//! Practice Run Generator
//!
//! Open-ended practice sized by a runtime budget. Questions are grouped by
//! their weakest tag and weak tags get the larger share; there is no domain
//! balancing.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::RuntimeConfig;
use crate::error::EngineResult;
use crate::rng::{derive_id, SeededRng};
use crate::sampler::{sample_with_rng, PoolItem, SampleConstraints};
use crate::sanitize::{clamp_score, mastery_deficit};
use crate::types::{normalize_tag, Pack};

/// Group of questions that carry no tag at all. Normalized tags are
/// lowercase, so no real tag can share this key.
pub const UNTAGGED_GROUP: &str = "Untagged";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQuestion {
    pub question_id: String,
    pub pack_id: String,
    /// Tag the question was drawn for.
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPlan {
    pub id: String,
    pub seed: String,
    pub focus_tags: Vec<String>,
    pub chapter_scope: Vec<String>,
    pub runtime: RuntimeConfig,
    pub target_count: usize,
    pub questions: Vec<RunQuestion>,
    pub tag_targets: BTreeMap<String, usize>,
    pub tag_actual: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

fn normalized_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| normalize_tag(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Run id for a `(seed, focusTags, chapterScope, runtime)` key.
pub fn run_plan_id(
    seed: &str,
    focus: &BTreeSet<String>,
    scope: &BTreeSet<String>,
    runtime: &RuntimeConfig,
) -> String {
    let focus = focus.iter().cloned().collect::<Vec<_>>().join(",");
    let scope = scope.iter().cloned().collect::<Vec<_>>().join(",");
    let runtime = format!(
        "{}/{}/{}/{}/{}/{}",
        runtime.runtime_minutes,
        runtime.minutes_per_question,
        runtime.min_questions,
        runtime.max_questions,
        runtime.target_mastery,
        runtime.min_tag_weight
    );
    derive_id("run", &[seed, &focus, &scope, &runtime])
}

fn in_scope(pack: &Pack, scope: &BTreeSet<String>) -> bool {
    scope.is_empty()
        || scope.contains(&normalize_tag(&pack.id))
        || pack
            .chapter_id
            .as_deref()
            .map(|c| scope.contains(&normalize_tag(c)))
            .unwrap_or(false)
}

pub fn generate_run_plan(
    packs: &[Pack],
    mastery_by_tag: &BTreeMap<String, f64>,
    seed: &str,
    focus_tags: &[String],
    chapter_scope: &[String],
    runtime: &RuntimeConfig,
) -> EngineResult<RunPlan> {
    let target_count = runtime.target_count()?;
    let mut rng = SeededRng::from_seed_str(seed)?;

    let focus = normalized_set(focus_tags);
    let scope = normalized_set(chapter_scope);
    let mastery: BTreeMap<String, f64> = mastery_by_tag
        .iter()
        .map(|(tag, score)| (normalize_tag(tag), clamp_score(*score)))
        .collect();
    let mastery_of = |tag: &str| -> f64 { mastery.get(tag).copied().unwrap_or(0.0) };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut pool = Vec::new();
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    let mut weights: BTreeMap<String, f64> = BTreeMap::new();

    for pack in packs.iter().filter(|p| in_scope(p, &scope)) {
        for question in &pack.question_bank {
            if !seen.insert(question.id.as_str()) {
                continue;
            }
            let mut tags: Vec<String> = question
                .tags
                .iter()
                .map(|t| normalize_tag(t))
                .filter(|t| !t.is_empty())
                .collect();
            if !focus.is_empty() {
                tags.retain(|t| focus.contains(t));
                if tags.is_empty() {
                    continue;
                }
            }

            let weakest = tags.into_iter().min_by(|a, b| {
                mastery_of(a)
                    .total_cmp(&mastery_of(b))
                    .then_with(|| a.cmp(b))
            });
            let (group, score) = match weakest {
                Some(tag) => {
                    let score = mastery_of(&tag);
                    (tag, score)
                }
                None => (UNTAGGED_GROUP.to_string(), clamp_score(runtime.target_mastery)),
            };
            weights
                .entry(group.clone())
                .or_insert_with(|| (100.0 - score).max(runtime.min_tag_weight));
            pool.push(
                PoolItem::new(question.id.clone(), group)
                    .with_weakness(mastery_deficit(runtime.target_mastery, score)),
            );
            owners.insert(question.id.as_str(), pack.id.as_str());
        }
    }

    let constraints = SampleConstraints {
        total_count: target_count,
        category_minimums: BTreeMap::new(),
        weight_groups: weights,
    };
    let outcome = sample_with_rng(&pool, &constraints, &mut rng)?;
    let warnings: Vec<String> = outcome.shortfalls.iter().map(|s| s.to_string()).collect();

    let questions = outcome
        .picked
        .iter()
        .map(|item| RunQuestion {
            question_id: item.id.clone(),
            pack_id: owners.get(item.id.as_str()).copied().unwrap_or_default().to_string(),
            tag: item.group.clone(),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        seed,
        target_count,
        questions = questions.len(),
        "generated practice run"
    );

    Ok(RunPlan {
        id: run_plan_id(seed, &focus, &scope, runtime),
        seed: seed.to_string(),
        focus_tags: focus.into_iter().collect(),
        chapter_scope: scope.into_iter().collect(),
        runtime: runtime.clone(),
        target_count,
        questions,
        tag_targets: outcome.targets,
        tag_actual: outcome.actual,
        warnings,
    })
}

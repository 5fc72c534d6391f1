//! Coverage Analyzer
//!
//! Cross-references the question catalog against the objective catalog.
//! A question counts towards every objective it resolves to; a question id
//! repeated across packs counts once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::CoverageConfig;
use crate::resolve::{ObjectiveResolver, ResolutionSource};
use crate::types::{Pack, Question, QuestionStats, QuestionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub scenario: u32,
    pub matching: u32,
    pub ordering: u32,
    pub other_interactive: u32,
    pub total: u32,
}

impl CategoryCounts {
    pub fn add(&mut self, question: &Question) {
        self.total += 1;
        if question.is_scenario() {
            self.scenario += 1;
        }
        match question.question_type {
            QuestionType::Matching => self.matching += 1,
            QuestionType::Ordering => self.ordering += 1,
            QuestionType::MultiSelect => self.other_interactive += 1,
            _ => {}
        }
    }

    /// Sum of the per-category gaps against the configured minimums.
    pub fn deficit(&self, config: &CoverageConfig) -> u32 {
        [
            (config.min_total, self.total),
            (config.min_scenario, self.scenario),
            (config.min_matching, self.matching),
            (config.min_ordering, self.ordering),
            (config.min_other_interactive, self.other_interactive),
        ]
        .into_iter()
        .map(|(required, actual)| required.saturating_sub(actual))
        .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub objective_id: String,
    pub domain_id: String,
    pub counts: CategoryCounts,
    pub deficit: u32,
    /// Mean wrong-answer rate over attempted questions. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_wrong_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageWeakness {
    pub objective_id: String,
    pub deficit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionBreakdown {
    pub explicit: u32,
    pub tag_inferred: u32,
    pub chapter_fallback: u32,
    pub unresolved: u32,
}

impl ResolutionBreakdown {
    fn record(&mut self, source: ResolutionSource) {
        match source {
            ResolutionSource::Explicit => self.explicit += 1,
            ResolutionSource::TagInferred => self.tag_inferred += 1,
            ResolutionSource::ChapterFallback => self.chapter_fallback += 1,
            ResolutionSource::Unresolved => self.unresolved += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// Catalog order.
    pub rows: Vec<CoverageRow>,
    pub missing_objective_ids: Vec<String>,
    pub untagged_question_count: u32,
    pub top_weakest: Vec<CoverageWeakness>,
    pub resolution_breakdown: ResolutionBreakdown,
    pub total_questions: u32,
}

impl CoverageReport {
    pub fn row(&self, objective_id: &str) -> Option<&CoverageRow> {
        self.rows.iter().find(|r| r.objective_id == objective_id)
    }
}

#[derive(Default)]
struct WrongRate {
    sum: f64,
    questions: u32,
}

pub fn compute_coverage(
    resolver: &ObjectiveResolver<'_>,
    packs: &[Pack],
    stats: Option<&QuestionStats>,
    config: &CoverageConfig,
) -> CoverageReport {
    let questions = resolver.resolve_all(packs);

    let mut counts: BTreeMap<&str, CategoryCounts> = BTreeMap::new();
    let mut wrong: BTreeMap<&str, WrongRate> = BTreeMap::new();
    let mut breakdown = ResolutionBreakdown::default();
    let mut untagged = 0u32;

    for rq in &questions {
        breakdown.record(rq.resolution.source);
        if !rq.resolution.is_resolved() {
            untagged += 1;
            continue;
        }
        let rate = stats
            .and_then(|s| s.get(&rq.question.id))
            .filter(|stat| stat.attempts > 0)
            .map(|stat| {
                let misses = stat.attempts - stat.effective_correct();
                misses as f64 / stat.attempts as f64
            });
        for objective_id in &rq.resolution.objective_ids {
            counts.entry(objective_id.as_str()).or_default().add(rq.question);
            if let Some(rate) = rate {
                let acc = wrong.entry(objective_id.as_str()).or_default();
                acc.sum += rate;
                acc.questions += 1;
            }
        }
    }

    let mut rows = Vec::with_capacity(resolver.catalog().objectives.len());
    let mut missing = Vec::new();
    for objective in &resolver.catalog().objectives {
        let c = counts.get(objective.id.as_str()).copied().unwrap_or_default();
        if c.total == 0 {
            missing.push(objective.id.clone());
        }
        // None both without stats and when no question here was attempted
        let avg_wrong_rate = stats.and_then(|_| {
            wrong
                .get(objective.id.as_str())
                .filter(|w| w.questions > 0)
                .map(|w| w.sum / w.questions as f64)
        });
        rows.push(CoverageRow {
            objective_id: objective.id.clone(),
            domain_id: objective.domain_id.clone(),
            counts: c,
            deficit: c.deficit(config),
            avg_wrong_rate,
        });
    }

    let mut top_weakest: Vec<CoverageWeakness> = rows
        .iter()
        .filter(|r| r.deficit > 0)
        .map(|r| CoverageWeakness {
            objective_id: r.objective_id.clone(),
            deficit: r.deficit,
        })
        .collect();
    top_weakest.sort_by(|a, b| {
        b.deficit
            .cmp(&a.deficit)
            .then_with(|| a.objective_id.cmp(&b.objective_id))
    });
    top_weakest.truncate(config.top_weakest_limit);

    if untagged > 0 {
        tracing::warn!(untagged, "questions without a resolvable objective");
    }
    tracing::debug!(
        questions = questions.len(),
        missing = missing.len(),
        "computed coverage"
    );

    CoverageReport {
        rows,
        missing_objective_ids: missing,
        untagged_question_count: untagged,
        top_weakest,
        resolution_breakdown: breakdown,
        total_questions: questions.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChapterObjectiveMap, Domain, Objective, ObjectiveCatalog, QuestionStat};

    fn catalog() -> ObjectiveCatalog {
        let objective = |id: &str, domain: &str| Objective {
            id: id.to_string(),
            title: String::new(),
            domain_id: domain.to_string(),
        };
        ObjectiveCatalog {
            exam_code: "EX".to_string(),
            domains: vec![
                Domain { id: "1.0".to_string(), title: String::new() },
                Domain { id: "2.0".to_string(), title: String::new() },
            ],
            objectives: vec![
                objective("1.1", "1.0"),
                objective("1.2", "1.0"),
                objective("2.1", "2.0"),
            ],
        }
    }

    fn question(id: &str, kind: QuestionType, tags: &[&str], objectives: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            question_type: kind,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            objective_ids: objectives.iter().map(|t| t.to_string()).collect(),
            misconception_tags: Vec::new(),
            scenario: false,
            difficulty: None,
            estimated_seconds: None,
        }
    }

    fn packs() -> Vec<Pack> {
        vec![
            Pack {
                id: "p1".to_string(),
                question_bank: vec![
                    question("q1", QuestionType::Matching, &["Scenario"], &["1.1"]),
                    question("q2", QuestionType::SingleChoice, &[], &["1.1"]),
                    question("q3", QuestionType::MultiSelect, &["see 2.1"], &[]),
                    question("q4", QuestionType::TrueFalse, &["misc"], &[]),
                ],
                ..Default::default()
            },
            Pack {
                id: "p2".to_string(),
                question_bank: vec![question("q1", QuestionType::Ordering, &[], &["2.1"])],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_counts_and_missing() {
        let catalog = catalog();
        let chapters = ChapterObjectiveMap::new();
        let resolver = ObjectiveResolver::new(&catalog, &chapters);
        let report = compute_coverage(&resolver, &packs(), None, &CoverageConfig::default());

        let r11 = report.row("1.1").unwrap();
        assert_eq!(r11.counts.total, 2);
        assert_eq!(r11.counts.scenario, 1);
        assert_eq!(r11.counts.matching, 1);
        assert_eq!(r11.avg_wrong_rate, None);

        // the duplicate q1 in p2 is ignored
        let r21 = report.row("2.1").unwrap();
        assert_eq!(r21.counts.total, 1);
        assert_eq!(r21.counts.other_interactive, 1);
        assert_eq!(r21.counts.ordering, 0);

        assert_eq!(report.missing_objective_ids, vec!["1.2"]);
        assert_eq!(report.untagged_question_count, 1);
        assert_eq!(report.total_questions, 4);
        assert_eq!(
            report.resolution_breakdown,
            ResolutionBreakdown { explicit: 2, tag_inferred: 1, chapter_fallback: 0, unresolved: 1 }
        );
    }

    #[test]
    fn test_top_weakest_ordering() {
        let catalog = catalog();
        let chapters = ChapterObjectiveMap::new();
        let resolver = ObjectiveResolver::new(&catalog, &chapters);
        let config = CoverageConfig::default();
        let report = compute_coverage(&resolver, &packs(), None, &config);

        // 1.2 has nothing: 6 + 2 + 1 + 1 + 1
        assert_eq!(
            report.top_weakest[0],
            CoverageWeakness {
                objective_id: "1.2".to_string(),
                deficit: 11
            }
        );
        let deficits: Vec<u32> = report.top_weakest.iter().map(|w| w.deficit).collect();
        assert!(deficits.windows(2).all(|w| w[0] >= w[1]));

        let mut limited = config.clone();
        limited.top_weakest_limit = 1;
        assert_eq!(compute_coverage(&resolver, &packs(), None, &limited).top_weakest.len(), 1);
    }

    #[test]
    fn test_wrong_rate_with_stats() {
        let catalog = catalog();
        let chapters = ChapterObjectiveMap::new();
        let resolver = ObjectiveResolver::new(&catalog, &chapters);
        let mut stats = QuestionStats::new();
        let stat = |attempts, correct| QuestionStat {
            attempts,
            correct,
            last_seen_at: None,
        };
        stats.insert("q1".to_string(), stat(4, 1));
        stats.insert("q2".to_string(), stat(2, 2));
        let config = CoverageConfig::default();
        let report = compute_coverage(&resolver, &packs(), Some(&stats), &config);
        let rate = report.row("1.1").unwrap().avg_wrong_rate.unwrap();
        assert!((rate - 0.375).abs() < 1e-12);
        // nothing attempted is not the same as never wrong
        assert_eq!(report.row("1.2").unwrap().avg_wrong_rate, None);

        let mut perfect = QuestionStats::new();
        perfect.insert("q2".to_string(), stat(3, 3));
        let report = compute_coverage(&resolver, &packs(), Some(&perfect), &config);
        assert_eq!(report.row("1.1").unwrap().avg_wrong_rate, Some(0.0));
    }

    #[test]
    fn test_coverage_grows_with_catalog() {
        let catalog = catalog();
        let chapters = ChapterObjectiveMap::new();
        let resolver = ObjectiveResolver::new(&catalog, &chapters);
        let config = CoverageConfig::default();
        let before = compute_coverage(&resolver, &packs(), None, &config);
        let mut more = packs();
        more[0].question_bank.push(question("q9", QuestionType::Ordering, &[], &["1.2"]));
        let after = compute_coverage(&resolver, &more, None, &config);
        for (a, b) in before.rows.iter().zip(&after.rows) {
            assert!(b.counts.total >= a.counts.total);
        }
        assert!(after.missing_objective_ids.is_empty());
    }
}

//! Content Model
//!
//! Serde shapes of the documents the engine reads: the objective catalog,
//! question packs, lessons, the outline map and the learner's local state.
//! All of them are read-only snapshots owned by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Objective Catalog ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub domain_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectiveCatalog {
    #[serde(default)]
    pub exam_code: String,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl ObjectiveCatalog {
    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    pub fn contains_objective(&self, id: &str) -> bool {
        self.objective(id).is_some()
    }

    pub fn has_domain(&self, id: &str) -> bool {
        self.domains.iter().any(|d| d.id == id)
    }

    /// Domain id of an objective, if the objective is in the catalog.
    pub fn domain_of(&self, objective_id: &str) -> Option<&str> {
        self.objective(objective_id).map(|o| o.domain_id.as_str())
    }
}

// ==================== Questions & Packs ====================

/// Closed set of question types, including the legacy single-answer forms
/// older packs still ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    #[serde(alias = "single", alias = "mcq")]
    SingleChoice,
    #[serde(alias = "multi", alias = "multiple_select")]
    MultiSelect,
    #[serde(alias = "order", alias = "sequence")]
    Ordering,
    #[serde(alias = "match")]
    Matching,
    #[serde(alias = "mc")]
    MultipleChoice,
    #[serde(alias = "tf", alias = "boolean")]
    TrueFalse,
}

impl QuestionType {
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            QuestionType::MultiSelect | QuestionType::Ordering | QuestionType::Matching
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "objectiveIds")]
    pub objective_ids: Vec<String>,
    #[serde(default, alias = "misconceptionTags")]
    pub misconception_tags: Vec<String>,
    #[serde(default)]
    pub scenario: bool,
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default, alias = "estimatedSeconds")]
    pub estimated_seconds: Option<u32>,
}

impl Question {
    pub fn is_scenario(&self) -> bool {
        self.scenario || self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case("scenario"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progression {
    #[serde(default)]
    pub xp_rules: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackExam {
    #[serde(default)]
    pub max_exam_minutes: Option<u32>,
}

/// Misconception ("trap") a pack drills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trap {
    #[serde(alias = "id")]
    pub tag: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub boss: bool,
    #[serde(default)]
    pub objective_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pack {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<u32>,
    #[serde(default)]
    pub question_bank: Vec<Question>,
    #[serde(default)]
    pub progression: Progression,
    #[serde(default)]
    pub exam: PackExam,
    #[serde(default)]
    pub traps: Vec<Trap>,
    #[serde(default)]
    pub missions: Vec<Mission>,
}

impl Pack {
    pub fn trap(&self, tag: &str) -> Option<&Trap> {
        let tag = normalize_tag(tag);
        self.traps.iter().find(|t| normalize_tag(&t.tag) == tag)
    }

    /// Misconception tags of a question: explicit ones win, otherwise the
    /// question's tags that this pack lists as traps.
    pub fn misconception_tags_of(&self, question: &Question) -> Vec<String> {
        let mut tags: Vec<String> = if question.misconception_tags.is_empty() {
            question
                .tags
                .iter()
                .filter(|t| self.trap(t).is_some())
                .map(|t| normalize_tag(t))
                .collect()
        } else {
            question.misconception_tags.iter().map(|t| normalize_tag(t)).collect()
        };
        tags.retain(|t| !t.is_empty());
        tags.sort();
        tags.dedup();
        tags
    }
}

/// Static chapter number -> objective ids table used as the last
/// resolution tier.
pub type ChapterObjectiveMap = BTreeMap<u32, Vec<String>>;

pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

// ==================== Lessons & Outline ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonPage {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objective_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonModule {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pages: Vec<LessonPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub modules: Vec<LessonModule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineStatus {
    Done,
    Draft,
    #[default]
    Unmapped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objective_ids: Vec<String>,
    #[serde(default)]
    pub pack_ids: Vec<String>,
    #[serde(default)]
    pub lesson_page_ids: Vec<String>,
    #[serde(default)]
    pub status: OutlineStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineMap {
    #[serde(default)]
    pub sections: Vec<OutlineSection>,
}

// ==================== Local State ====================

/// Per-question learner history. Only accumulates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStat {
    pub attempts: u32,
    pub correct: u32,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl QuestionStat {
    /// Correct count never exceeds attempts, whatever the stored document says.
    pub fn effective_correct(&self) -> u32 {
        self.correct.min(self.attempts)
    }
}

pub type QuestionStats = BTreeMap<String, QuestionStat>;

/// Returns a copy of `stats` with one completed answer accumulated.
pub fn record_attempt(
    stats: &QuestionStats,
    question_id: &str,
    correct: bool,
    at: DateTime<Utc>,
) -> QuestionStats {
    let mut next = stats.clone();
    let entry = next.entry(question_id.to_string()).or_default();
    entry.attempts = entry.attempts.saturating_add(1);
    if correct {
        entry.correct = entry.correct.saturating_add(1);
    }
    entry.last_seen_at = Some(match entry.last_seen_at {
        Some(prev) if prev > at => prev,
        _ => at,
    });
    next
}

/// The learner's persisted state. Sessions and run history are opaque to
/// the engine and survive a round trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    #[serde(default)]
    pub question_stats: QuestionStats,
    #[serde(default)]
    pub mastery_by_tag: BTreeMap<String, f64>,
    #[serde(default)]
    pub active_sessions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub run_history: Vec<serde_json::Value>,
    #[serde(default)]
    pub lesson_progress: BTreeMap<String, DateTime<Utc>>,
}

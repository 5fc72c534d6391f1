//! Recommendation Engine
//!
//! Ranks "next best activity" suggestions by walking the weakest objectives
//! and resolving each to a reachable lesson page or pack mission.
//!
//! Objectives at or above the mastery ceiling are only considered once
//! nothing weaker resolves, and every such plan carries `fallback = true`.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RecommendationConfig;
use crate::mastery::{MasteryRow, MisconceptionReport, MisconceptionRow};
use crate::types::{
    Lesson, LocalState, Mission, ObjectiveCatalog, OutlineMap, OutlineStatus, Pack,
};

pub struct RecommendationInput<'a> {
    pub catalog: &'a ObjectiveCatalog,
    /// Objectives in priority order, weakest first.
    pub weakest_objectives: &'a [MasteryRow],
    pub misconceptions: &'a MisconceptionReport,
    pub outline: &'a OutlineMap,
    pub packs: &'a [Pack],
    pub lessons: &'a [Lesson],
    pub state: &'a LocalState,
    pub now: DateTime<Utc>,
    pub config: &'a RecommendationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActivityReason {
    #[serde(rename_all = "camelCase")]
    WeakMastery { score: f64 },
    #[serde(rename_all = "camelCase")]
    Misconception {
        misconception_tag: String,
        priority: f64,
        score: f64,
    },
}

impl ActivityReason {
    pub fn describe(&self) -> String {
        match self {
            ActivityReason::WeakMastery { score } => format!("mastery is {score:.1}/100"),
            ActivityReason::Misconception {
                misconception_tag,
                priority,
                ..
            } => format!("misconception '{misconception_tag}' flagged (priority {priority:.1})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActivityTarget {
    #[serde(rename_all = "camelCase")]
    LessonPage {
        lesson_id: String,
        module_id: String,
        page_id: String,
        title: String,
    },
    #[serde(rename_all = "camelCase")]
    PackMission {
        pack_id: String,
        mission_id: String,
        title: String,
        boss: bool,
    },
}

impl ActivityTarget {
    pub fn href(&self) -> String {
        match self {
            ActivityTarget::LessonPage {
                lesson_id,
                module_id,
                page_id,
                ..
            } => format!("#/lessons/{lesson_id}/{module_id}/{page_id}"),
            ActivityTarget::PackMission {
                pack_id,
                mission_id,
                ..
            } => format!("#/packs/{pack_id}/missions/{mission_id}"),
        }
    }

    fn page_id(&self) -> Option<&str> {
        match self {
            ActivityTarget::LessonPage { page_id, .. } => Some(page_id),
            ActivityTarget::PackMission { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPlan {
    pub objective_id: String,
    pub objective_title: String,
    pub reason: ActivityReason,
    pub summary: String,
    pub target: ActivityTarget,
    pub href: String,
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

// ==================== Target Resolution ====================

struct PageLocation<'a> {
    lesson_id: &'a str,
    module_id: &'a str,
    page_id: &'a str,
    title: &'a str,
    objective_ids: &'a [String],
}

impl PageLocation<'_> {
    fn target(&self) -> ActivityTarget {
        ActivityTarget::LessonPage {
            lesson_id: self.lesson_id.to_string(),
            module_id: self.module_id.to_string(),
            page_id: self.page_id.to_string(),
            title: self.title.to_string(),
        }
    }
}

fn page_index(lessons: &[Lesson]) -> Vec<PageLocation<'_>> {
    lessons
        .iter()
        .flat_map(|lesson| {
            lesson.modules.iter().flat_map(move |module| {
                module.pages.iter().map(move |page| PageLocation {
                    lesson_id: &lesson.id,
                    module_id: &module.id,
                    page_id: &page.id,
                    title: &page.title,
                    objective_ids: &page.objective_ids,
                })
            })
        })
        .collect()
}

/// First non-boss mission gated by the objective, else the boss, else the
/// first mission.
fn pick_mission<'p>(pack: &'p Pack, objective_id: &str) -> Option<&'p Mission> {
    pack.missions
        .iter()
        .find(|m| !m.boss && m.objective_ids.iter().any(|id| id == objective_id))
        .or_else(|| pack.missions.iter().find(|m| m.boss))
        .or_else(|| pack.missions.first())
}

fn mission_target(pack: &Pack, mission: &Mission) -> ActivityTarget {
    ActivityTarget::PackMission {
        pack_id: pack.id.clone(),
        mission_id: mission.id.clone(),
        title: mission.title.clone(),
        boss: mission.boss,
    }
}

struct TargetResolver<'a> {
    pages: Vec<PageLocation<'a>>,
    outline: &'a OutlineMap,
    packs: &'a [Pack],
    completed: &'a BTreeMap<String, DateTime<Utc>>,
}

impl<'a> TargetResolver<'a> {
    fn new(input: &RecommendationInput<'a>) -> Self {
        Self {
            pages: page_index(input.lessons),
            outline: input.outline,
            packs: input.packs,
            completed: &input.state.lesson_progress,
        }
    }

    fn page(&self, page_id: &str) -> Option<&PageLocation<'a>> {
        self.pages.iter().find(|p| p.page_id == page_id)
    }

    /// Lesson and mission candidates for an objective, each list in
    /// preference order.
    fn candidates(&self, objective_id: &str) -> (Vec<ActivityTarget>, Vec<ActivityTarget>) {
        let mut pages = Vec::new();
        let mut missions = Vec::new();
        let mut seen_pages: HashSet<&str> = HashSet::new();
        let mut seen_packs: HashSet<&str> = HashSet::new();

        for page in &self.pages {
            let linked = page.objective_ids.iter().any(|id| id == objective_id);
            if linked && seen_pages.insert(page.page_id) {
                pages.push(page.target());
            }
        }

        let mut sections: Vec<_> = self
            .outline
            .sections
            .iter()
            .filter(|s| s.status != OutlineStatus::Unmapped)
            .filter(|s| s.objective_ids.iter().any(|id| id == objective_id))
            .collect();
        sections.sort_by_key(|s| s.status);

        for section in sections {
            for page_id in &section.lesson_page_ids {
                if let Some(page) = self.page(page_id) {
                    if seen_pages.insert(page.page_id) {
                        pages.push(page.target());
                    }
                }
            }
            for pack_id in &section.pack_ids {
                let Some(pack) = self.packs.iter().find(|p| &p.id == pack_id) else {
                    continue;
                };
                if !seen_packs.insert(pack.id.as_str()) {
                    continue;
                }
                if let Some(mission) = pick_mission(pack, objective_id) {
                    missions.push(mission_target(pack, mission));
                }
            }
        }

        (pages, missions)
    }

    /// Preferred target, passing over completed pages while anything else
    /// is available.
    fn resolve(&self, objective_id: &str, prefer_drill: bool) -> Option<ActivityTarget> {
        let (pages, missions) = self.candidates(objective_id);
        let ordered: Vec<ActivityTarget> = if prefer_drill {
            missions.into_iter().chain(pages).collect()
        } else {
            pages.into_iter().chain(missions).collect()
        };
        let completed = |t: &ActivityTarget| {
            t.page_id()
                .map(|id| self.completed.contains_key(id))
                .unwrap_or(false)
        };
        match ordered.iter().position(|t| !completed(t)) {
            Some(pos) => ordered.into_iter().nth(pos),
            None => ordered.into_iter().next(),
        }
    }
}

// ==================== Ranking ====================

/// Highest-priority flagged misconception touching the objective.
fn flagged_misconception<'m>(
    report: &'m MisconceptionReport,
    objective_id: &str,
    threshold: f64,
) -> Option<&'m MisconceptionRow> {
    report
        .rows
        .iter()
        .filter(|row| row.priority >= threshold)
        .find(|row| row.objective_ids.iter().any(|id| id == objective_id))
}

fn plan_for(
    input: &RecommendationInput<'_>,
    targets: &TargetResolver<'_>,
    row: &MasteryRow,
    fallback: bool,
) -> Option<ActivityPlan> {
    let flagged = flagged_misconception(
        input.misconceptions,
        &row.objective_id,
        input.config.misconception_priority_threshold,
    );
    let target = targets.resolve(&row.objective_id, flagged.is_some())?;

    let reason = match flagged {
        Some(m) => ActivityReason::Misconception {
            misconception_tag: m.misconception_tag.clone(),
            priority: m.priority,
            score: row.score,
        },
        None => ActivityReason::WeakMastery { score: row.score },
    };
    let objective_title = input
        .catalog
        .objective(&row.objective_id)
        .map(|o| o.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| row.objective_id.clone());

    Some(ActivityPlan {
        objective_id: row.objective_id.clone(),
        summary: format!("{}: {}", objective_title, reason.describe()),
        objective_title,
        reason,
        href: target.href(),
        target,
        fallback,
        generated_at: input.now,
    })
}

/// Up to `limit` plans, one per objective, in the order of
/// `weakest_objectives`.
pub fn rank_activities(input: &RecommendationInput<'_>, limit: usize) -> Vec<ActivityPlan> {
    if limit == 0 {
        return Vec::new();
    }
    let targets = TargetResolver::new(input);
    let ceiling = input.config.mastery_ceiling;
    let mut seen: HashSet<&str> = HashSet::new();
    let rows: Vec<&MasteryRow> = input
        .weakest_objectives
        .iter()
        .filter(|row| seen.insert(row.objective_id.as_str()))
        .collect();

    let below: Vec<ActivityPlan> = rows
        .iter()
        .filter(|row| row.score < ceiling)
        .filter_map(|row| plan_for(input, &targets, row, false))
        .take(limit)
        .collect();
    if !below.is_empty() {
        return below;
    }

    let fallback: Vec<ActivityPlan> = rows
        .iter()
        .filter(|row| row.score >= ceiling)
        .filter_map(|row| plan_for(input, &targets, row, true))
        .take(limit)
        .collect();
    if fallback.is_empty() {
        tracing::debug!(objectives = rows.len(), "no objective resolved to content");
    }
    fallback
}

pub fn build_next_best_activity_plan(input: &RecommendationInput<'_>) -> Option<ActivityPlan> {
    rank_activities(input, 1).into_iter().next()
}

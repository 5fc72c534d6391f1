//! Objective resolution
//!
//! A question's objective set comes from the first tier that yields at least
//! one catalog objective:
//!
//! 1. explicit `objective_ids`
//! 2. `D.N` patterns found in the question's free-text tags
//! 3. the chapter table entry for the owning pack's chapter number
//!
//! Changing this order changes coverage and mastery results.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{ChapterObjectiveMap, ObjectiveCatalog, Pack, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    Explicit,
    TagInferred,
    ChapterFallback,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub objective_ids: Vec<String>,
    pub source: ResolutionSource,
}

impl Resolution {
    fn unresolved() -> Self {
        Self {
            objective_ids: Vec::new(),
            source: ResolutionSource::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.objective_ids.is_empty()
    }

    /// First objective in resolution order.
    pub fn primary(&self) -> Option<&str> {
        self.objective_ids.first().map(String::as_str)
    }
}

/// A question paired with its owning pack and resolved objectives.
#[derive(Debug, Clone)]
pub struct ResolvedQuestion<'a> {
    pub pack: &'a Pack,
    pub question: &'a Question,
    pub resolution: Resolution,
}

fn objective_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b\d+(?:\.\d+)+\b").expect("objective id pattern is valid")
    })
}

fn chapter_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)\bchapter\s*0*(\d{1,3})\b").expect("chapter pattern is valid"),
            Regex::new(r"(?i)\bch(?:apter)?[_\-\s]*0*(\d{1,3})\b")
                .expect("short chapter pattern is valid"),
        ]
    })
}

/// `D.N` ids mentioned in free text, normalized (`01.02` -> `1.2`).
///
/// Whole dotted runs are matched first so versions and addresses such as
/// `192.168.1.1` never yield an id.
pub fn objective_ids_in_text(text: &str) -> Vec<String> {
    objective_pattern()
        .find_iter(text)
        .filter_map(|m| {
            let (domain, number) = m.as_str().split_once('.')?;
            if domain.len() > 2 || number.len() > 2 || number.contains('.') {
                return None;
            }
            let domain: u32 = domain.parse().ok()?;
            let number: u32 = number.parse().ok()?;
            Some(format!("{domain}.{number}"))
        })
        .collect()
}

/// Chapter number of a pack: the declared number, else the first match in
/// chapter id, pack id, then title.
pub fn infer_chapter_number(pack: &Pack) -> Option<u32> {
    if let Some(number) = pack.chapter_number {
        return Some(number);
    }
    let candidates = [
        pack.chapter_id.as_deref(),
        Some(pack.id.as_str()),
        Some(pack.title.as_str()),
    ];
    for candidate in candidates.into_iter().flatten() {
        for pattern in chapter_patterns() {
            if let Some(number) = pattern
                .captures(candidate)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
            {
                return Some(number);
            }
        }
    }
    None
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, id: String) {
    if seen.insert(id.clone()) {
        out.push(id);
    }
}

pub struct ObjectiveResolver<'a> {
    catalog: &'a ObjectiveCatalog,
    chapter_map: &'a ChapterObjectiveMap,
}

impl<'a> ObjectiveResolver<'a> {
    pub fn new(catalog: &'a ObjectiveCatalog, chapter_map: &'a ChapterObjectiveMap) -> Self {
        Self {
            catalog,
            chapter_map,
        }
    }

    pub fn catalog(&self) -> &'a ObjectiveCatalog {
        self.catalog
    }

    fn known<I>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            let id = id.trim().to_string();
            if self.catalog.contains_objective(&id) {
                push_unique(&mut out, &mut seen, id);
            }
        }
        out
    }

    pub fn explicit(&self, question: &Question) -> Vec<String> {
        self.known(question.objective_ids.iter().cloned())
    }

    pub fn tag_inferred(&self, question: &Question) -> Vec<String> {
        self.known(question.tags.iter().flat_map(|t| objective_ids_in_text(t)))
    }

    pub fn chapter_fallback(&self, pack: &Pack) -> Vec<String> {
        infer_chapter_number(pack)
            .and_then(|n| self.chapter_map.get(&n))
            .map(|ids| self.known(ids.iter().cloned()))
            .unwrap_or_default()
    }

    pub fn resolve(&self, pack: &Pack, question: &Question) -> Resolution {
        let tiers: [(ResolutionSource, Vec<String>); 3] = [
            (ResolutionSource::Explicit, self.explicit(question)),
            (ResolutionSource::TagInferred, self.tag_inferred(question)),
            (ResolutionSource::ChapterFallback, self.chapter_fallback(pack)),
        ];
        tiers
            .into_iter()
            .find(|(_, ids)| !ids.is_empty())
            .map(|(source, objective_ids)| Resolution {
                objective_ids,
                source,
            })
            .unwrap_or_else(Resolution::unresolved)
    }

    /// Every question across `packs` in pack order, first occurrence of each
    /// question id only.
    pub fn resolve_all<'p>(&self, packs: &'p [Pack]) -> Vec<ResolvedQuestion<'p>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for pack in packs {
            for question in &pack.question_bank {
                if !seen.insert(question.id.as_str()) {
                    continue;
                }
                out.push(ResolvedQuestion {
                    pack,
                    question,
                    resolution: self.resolve(pack, question),
                });
            }
        }
        out
    }
}

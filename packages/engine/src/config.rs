use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::ObjectiveCatalog;

/// Accepted distance of a domain weight table's sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

// ==================== Algorithm Tunables ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasteryConfig {
    /// Days after which an attempt counts half as much.
    pub half_life_days: f64,
    /// Floor of the decay weight; also the weight of attempts with no timestamp.
    pub minimum_decay_weight: f64,
    /// Pseudo-attempts of missing evidence added to every denominator.
    pub prior_attempts: f64,
    pub trend_window_days: f64,
    pub trend_min_attempts: u32,
    pub trend_threshold: f64,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            half_life_days: 21.0,
            minimum_decay_weight: 0.05,
            prior_attempts: 1.0,
            trend_window_days: 7.0,
            trend_min_attempts: 3,
            trend_threshold: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverageConfig {
    pub min_total: u32,
    pub min_scenario: u32,
    pub min_matching: u32,
    pub min_ordering: u32,
    pub min_other_interactive: u32,
    pub top_weakest_limit: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            min_total: 6,
            min_scenario: 2,
            min_matching: 1,
            min_ordering: 1,
            min_other_interactive: 1,
            top_weakest_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamConfig {
    pub total_questions: usize,
    pub duration_minutes: u32,
    /// Domain id -> fraction of the exam. Supplied by the caller.
    pub domain_weights: BTreeMap<String, f64>,
    pub min_scenario_questions: usize,
    pub min_interactive_questions: usize,
    /// Mastery score every objective is pushed towards when weighting draws.
    pub target_mastery: f64,
    pub passing_percent: f64,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            total_questions: 90,
            duration_minutes: 90,
            domain_weights: BTreeMap::new(),
            min_scenario_questions: 0,
            min_interactive_questions: 0,
            target_mastery: 80.0,
            passing_percent: 72.0,
        }
    }
}

impl ExamConfig {
    pub fn validate(&self, catalog: &ObjectiveCatalog) -> EngineResult<()> {
        if self.total_questions == 0 {
            return Err(EngineError::NonPositiveCount {
                field: "totalQuestions",
            });
        }
        if self.duration_minutes == 0 {
            return Err(EngineError::NonPositiveCount {
                field: "durationMinutes",
            });
        }
        if self.domain_weights.is_empty() {
            return Err(EngineError::EmptyWeightTable);
        }
        for (domain, &weight) in &self.domain_weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidWeight {
                    group: domain.clone(),
                    weight,
                });
            }
            if !catalog.has_domain(domain) {
                return Err(EngineError::UnknownDomain(domain.clone()));
            }
        }
        let sum: f64 = self.domain_weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Sizing of a practice run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub runtime_minutes: f64,
    pub minutes_per_question: f64,
    pub min_questions: usize,
    pub max_questions: usize,
    pub target_mastery: f64,
    /// Allocation weight floor so mastered tags still appear.
    pub min_tag_weight: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_minutes: 20.0,
            minutes_per_question: 1.5,
            min_questions: 5,
            max_questions: 60,
            target_mastery: 80.0,
            min_tag_weight: 5.0,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.runtime_minutes.is_finite() || self.runtime_minutes < 0.0 {
            return Err(EngineError::InvalidRuntime(format!(
                "runtimeMinutes must be finite and non-negative, got {}",
                self.runtime_minutes
            )));
        }
        if !self.minutes_per_question.is_finite() || self.minutes_per_question <= 0.0 {
            return Err(EngineError::InvalidRuntime(format!(
                "minutesPerQuestion must be positive, got {}",
                self.minutes_per_question
            )));
        }
        if self.max_questions == 0 {
            return Err(EngineError::NonPositiveCount {
                field: "maxQuestions",
            });
        }
        if self.min_questions > self.max_questions {
            return Err(EngineError::InvalidRuntime(format!(
                "minQuestions ({}) exceeds maxQuestions ({})",
                self.min_questions, self.max_questions
            )));
        }
        if !self.min_tag_weight.is_finite() || self.min_tag_weight <= 0.0 {
            return Err(EngineError::InvalidRuntime(format!(
                "minTagWeight must be positive, got {}",
                self.min_tag_weight
            )));
        }
        Ok(())
    }

    /// `floor(runtime / minutesPerQuestion)` clamped to the configured bounds.
    pub fn target_count(&self) -> EngineResult<usize> {
        self.validate()?;
        let raw = (self.runtime_minutes / self.minutes_per_question).floor() as usize;
        Ok(raw.clamp(self.min_questions, self.max_questions))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendationConfig {
    /// Objectives at or above this score are only recommended as a fallback.
    pub mastery_ceiling: f64,
    pub misconception_priority_threshold: f64,
    pub max_activities: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            mastery_ceiling: 85.0,
            misconception_priority_threshold: 40.0,
            max_activities: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub mastery: MasteryConfig,
    pub coverage: CoverageConfig,
    pub exam: ExamConfig,
    pub runtime: RuntimeConfig,
    pub recommendation: RecommendationConfig,
}

// ==================== Process Settings ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub engine_config_path: Option<PathBuf>,
    /// Directory for the daily rolling log file; `None` keeps logs on stderr only.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. `RUST_LOG` sets the filter,
    /// `CERTPREP_CONFIG` the tunables file and `CERTPREP_LOG_DIR` turns on
    /// file logging.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            log_level: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            engine_config_path: non_empty("CERTPREP_CONFIG").map(PathBuf::from),
            log_dir: non_empty("CERTPREP_LOG_DIR").map(PathBuf::from),
        }
    }
}

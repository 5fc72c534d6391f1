//! # certprep-engine - adaptive selection and mastery tracking
//!
//! Pure, deterministic core of a certification self-study platform:
//!
//! - **Mastery Tracker** - decayed accuracy per objective, misconception and tag
//! - **Weighted Sampler** - seeded selection under group weights and category minimums
//! - **Coverage Analyzer** - objective coverage gaps of the question catalog
//! - **Exam Plan Builder** - domain-weighted timed exams, plus scoring
//! - **Practice Run Generator** - weak-tag practice sized by a runtime budget
//! - **Recommendation Engine** - next best lesson page or pack mission
//!
//! Every operation is a synchronous function of immutable snapshots. The
//! only randomness is [`rng::SeededRng`], keyed by a caller-supplied seed.
//!
//! ## Modules
//!
//! - [`types`] - content and learner-state documents
//! - [`resolve`] - explicit / tag / chapter objective resolution
//! - [`mastery`] - objective, misconception and tag mastery
//! - [`sampler`] - deterministic constrained sampling
//! - [`coverage`] - coverage report
//! - [`exam`] - exam plans and results
//! - [`practice`] - practice runs
//! - [`recommend`] - activity recommendations
//! - [`config`] - tunables and process settings
//!
//! ```rust
//! use certprep_engine::sampler::{sample, PoolItem, SampleConstraints};
//!
//! let pool: Vec<PoolItem> = (0..5).map(|i| PoolItem::new(format!("q{i}"), "")).collect();
//! let constraints = SampleConstraints { total_count: 90, ..Default::default() };
//! let outcome = sample(&pool, &constraints, "exam-001").unwrap();
//! assert_eq!(outcome.picked.len(), 5);
//! assert!(!outcome.shortfalls.is_empty());
//! ```

// ==================== Modules ====================

pub mod config;
pub mod coverage;
pub mod error;
pub mod exam;
pub mod logging;
pub mod mastery;
pub mod practice;
pub mod recommend;
pub mod resolve;
pub mod rng;
pub mod sampler;
pub mod sanitize;
pub mod types;

// ==================== Re-exports ====================

pub use config::{
    Config, CoverageConfig, EngineConfig, ExamConfig, MasteryConfig, RecommendationConfig,
    RuntimeConfig,
};
pub use coverage::{compute_coverage, CoverageReport};
pub use error::{EngineError, EngineResult};
pub use exam::{generate_plan, score_exam, ExamResponse, ExamResult, ExamSimulationPlan};
pub use mastery::{
    compute_mastery, compute_misconception_mastery, compute_tag_mastery, MasteryReport,
    MasteryRow, MisconceptionReport, MisconceptionRow, Trend,
};
pub use practice::{generate_run_plan, RunPlan};
pub use recommend::{
    build_next_best_activity_plan, rank_activities, ActivityPlan, RecommendationInput,
};
pub use resolve::ObjectiveResolver;
pub use sampler::{sample, PoolItem, SampleConstraints, SampleOutcome, Shortfall};
pub use types::*;

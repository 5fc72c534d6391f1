//! Engine errors
//!
//! Only structural and configuration problems surface as errors. Pool
//! shortfalls, unresolvable questions and missing remediation targets are
//! reported inside the returned values instead.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("seed must be a non-empty string")]
    EmptySeed,
    #[error("{field} must be greater than zero")]
    NonPositiveCount { field: &'static str },
    #[error("weight table is empty")]
    EmptyWeightTable,
    #[error("weight for group '{group}' must be finite and non-negative, got {weight}")]
    InvalidWeight { group: String, weight: f64 },
    #[error("weights must sum to a sensible total, got {sum}")]
    WeightSum { sum: f64 },
    #[error("weight table references unknown domain '{0}'")]
    UnknownDomain(String),
    #[error("invalid runtime config: {0}")]
    InvalidRuntime(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

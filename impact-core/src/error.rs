use fact_registry::FactError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("severity level names must not be blank")]
    BlankSeverity,
    #[error("severity level '{0}' is listed more than once")]
    DuplicateSeverity(String),
    #[error("evaluation metric names must not be blank")]
    BlankMetric,
    #[error("escalation time ({escalation}m) for '{severity}' is shorter than its response time ({response}m)")]
    InvertedThreshold {
        severity: String,
        response: u32,
        escalation: u32,
    },
}

/// Failures surfaced by the engine.
///
/// Evaluation of typed facts is total; these only arise while building an
/// engine or while reading untyped caller input.
#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid incident facts: {0}")]
    InvalidFacts(#[from] FactError),
    #[error("invalid initial assessment: {0}")]
    InvalidAssessment(#[source] serde_json::Error),
}

impl ImpactError {
    /// True when the caller supplied bad input, as opposed to a bad setup.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidFacts(_) | Self::InvalidAssessment(_))
    }
}

pub type ImpactResult<T> = Result<T, ImpactError>;

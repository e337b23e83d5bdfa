//! Incident impact scoring.
//!
//! Metric evaluators score each impact dimension of an incident, the engine
//! folds their severities into one classification on a configured scale, and
//! derives response timings, reach and a response recommendation.

pub mod assessment;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluators;
pub mod metrics;
pub mod recommendation;
pub mod severity;

pub use assessment::{Assessment, PartialAssessment};
pub use config::ImpactConfig;
pub use engine::ImpactEngine;
pub use error::{ConfigError, ImpactError, ImpactResult};
pub use metrics::{MetricDetails, MetricEvaluator, MetricRegistry, MetricResult};
pub use severity::{NotificationThresholds, SeverityBand, SeverityScale, Threshold};

pub use fact_registry::{CustomerTier, FactPolicy, IncidentFacts};

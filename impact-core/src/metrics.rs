use crate::evaluators::{CustomerImpact, RevenueImpact, SecurityImpact, ServiceImpact};
use crate::severity::UNKNOWN_SEVERITY;
use fact_registry::{CustomerTier, IncidentFacts};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of scoring one impact dimension.
///
/// Results seeded from outside the engine round-trip unchanged: fields they
/// leave out stay out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<f64>,
    #[serde(default, skip_serializing_if = "MetricDetails::is_absent")]
    pub details: MetricDetails,
}

impl MetricResult {
    pub fn unknown(metric: &str) -> Self {
        Self {
            severity: UNKNOWN_SEVERITY.into(),
            confidence: Some(0.0),
            impact_score: None,
            details: MetricDetails::Note(format!("Unknown metric type: {metric}")),
        }
    }
}

/// Echo of the facts a metric was scored from.
///
/// A details object matches a typed variant only when it carries exactly
/// that variant's keys; anything else lands in `Other` verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricDetails {
    Service(ServiceDetails),
    Customer(CustomerDetails),
    Revenue(RevenueDetails),
    Security(SecurityDetails),
    Note(String),
    Other(serde_json::Value),
}

impl MetricDetails {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Other(serde_json::Value::Null))
    }
}

impl Default for MetricDetails {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceDetails {
    pub service_outage: bool,
    pub service_degradation: bool,
    pub percentage_impacted: f64,
    pub duration_minutes: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerDetails {
    pub customers_facing: bool,
    pub customer_count: u64,
    pub customer_tier: CustomerTier,
    pub customer_reports: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RevenueDetails {
    pub revenue_impacted: bool,
    pub estimated_loss: f64,
    pub affects_payments: bool,
    pub affects_billing: bool,
    pub duration_minutes: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecurityDetails {
    pub security_breach: bool,
    pub data_exposure: bool,
    pub sensitive_data_involved: bool,
    pub breach_size: u64,
    pub systems_compromised: Vec<String>,
}

/// Scores one impact dimension from incident facts.
pub trait MetricEvaluator: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn evaluate(&self, facts: &IncidentFacts) -> MetricResult;
}

/// Metric name to evaluator lookup, built once per engine.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    evaluators: HashMap<String, Arc<dyn MetricEvaluator>>,
}

impl MetricRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the service, customer, revenue and security evaluators.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ServiceImpact);
        registry.register(CustomerImpact);
        registry.register(RevenueImpact);
        registry.register(SecurityImpact);
        registry
    }

    /// Adds an evaluator, replacing any previous one with the same name.
    pub fn register(&mut self, evaluator: impl MetricEvaluator) -> &mut Self {
        self.evaluators
            .insert(evaluator.name().to_string(), Arc::new(evaluator));
        self
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.evaluators.contains_key(metric)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn evaluate(&self, metric: &str, facts: &IncidentFacts) -> MetricResult {
        let incident = facts.id.as_deref().unwrap_or("-");
        match self.evaluators.get(metric) {
            Some(evaluator) => {
                tracing::debug!(metric, incident, "evaluating metric");
                evaluator.evaluate(facts)
            }
            None => {
                tracing::warn!(metric, incident, "unknown metric type");
                MetricResult::unknown(metric)
            }
        }
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("evaluators", &self.names())
            .finish()
    }
}

use crate::assessment::{Assessment, PartialAssessment};
use crate::config::ImpactConfig;
use crate::error::{ImpactError, ImpactResult};
use crate::metrics::{MetricRegistry, MetricResult};
use crate::recommendation::recommend;
use fact_registry::{parse_incident_facts, IncidentFacts};
use indexmap::IndexMap;

/// Rough reach of one impacted system when no user counts are known.
const ESTIMATED_USERS_PER_SYSTEM: u64 = 100;

/// Scores incidents against a validated configuration.
///
/// The engine holds no mutable state; one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct ImpactEngine {
    config: ImpactConfig,
    registry: MetricRegistry,
}

impl ImpactEngine {
    pub fn new(config: ImpactConfig) -> ImpactResult<Self> {
        Self::with_registry(config, MetricRegistry::builtin())
    }

    pub fn with_registry(config: ImpactConfig, registry: MetricRegistry) -> ImpactResult<Self> {
        config.validate()?;
        for metric in &config.evaluation_metrics {
            if !registry.contains(metric) {
                tracing::warn!(metric = %metric, "configured metric has no evaluator");
            }
        }
        tracing::info!(metrics = ?config.evaluation_metrics, "impact engine initialized");
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn evaluate_metric(&self, metric: &str, facts: &IncidentFacts) -> MetricResult {
        self.registry.evaluate(metric, facts)
    }

    /// Completes an assessment for `facts`.
    ///
    /// Anything already decided in `seed` is kept as is; only missing fields
    /// are computed.
    pub fn evaluate(&self, facts: &IncidentFacts, seed: Option<PartialAssessment>) -> Assessment {
        let incident = facts.id.as_deref().unwrap_or("-");
        let span = tracing::info_span!("impact_evaluation", incident);
        let _enter = span.enter();
        tracing::info!("evaluating impact");

        let mut seed = seed.unwrap_or_default();

        let mut metrics = std::mem::take(&mut seed.metrics);
        for metric in &self.config.evaluation_metrics {
            if !metrics.contains_key(metric) {
                let result = self.registry.evaluate(metric, facts);
                metrics.insert(metric.clone(), result);
            }
        }

        let overall_severity = seed
            .take_overall_severity()
            .unwrap_or_else(|| self.determine_severity(&metrics));

        let timing = self
            .config
            .notification_thresholds
            .timing_for(&overall_severity);
        let response_time = seed.response_time.unwrap_or(timing.response_time);
        let escalation_time = seed.escalation_time.unwrap_or(timing.escalation_time);

        let impacted_systems = seed
            .take_impacted_systems()
            .unwrap_or_else(|| identify_impacted_systems(facts));

        let impacted_users = seed
            .take_impacted_users()
            .unwrap_or_else(|| estimate_impacted_users(facts, &impacted_systems));

        let recommendation = seed
            .take_recommendation()
            .unwrap_or_else(|| recommend(&overall_severity, &impacted_systems, impacted_users));

        tracing::info!(severity = %overall_severity, "impact evaluation complete");

        Assessment {
            overall_severity,
            metrics,
            response_time,
            escalation_time,
            impacted_systems,
            impacted_users,
            recommendation,
        }
    }

    /// Reads untyped facts under the configured [`FactPolicy`](fact_registry::FactPolicy).
    pub fn parse_facts(&self, payload: &serde_json::Value) -> ImpactResult<IncidentFacts> {
        parse_incident_facts(payload, self.config.fact_policy).map_err(ImpactError::InvalidFacts)
    }

    pub fn evaluate_json(
        &self,
        payload: &serde_json::Value,
        seed: Option<PartialAssessment>,
    ) -> ImpactResult<Assessment> {
        let facts = self.parse_facts(payload)?;
        Ok(self.evaluate(&facts, seed))
    }

    /// Most severe metric severity on the scale, or the scale's least severe
    /// level when no metric produced a recognized one.
    pub fn determine_severity(&self, metrics: &IndexMap<String, MetricResult>) -> String {
        let scale = &self.config.severity_levels;
        scale
            .most_severe(metrics.values().map(|m| m.severity.as_str()))
            .unwrap_or_else(|| scale.least_severe())
            .to_string()
    }
}

/// Union of affected systems and related services, first occurrence wins.
pub fn identify_impacted_systems(facts: &IncidentFacts) -> Vec<String> {
    let mut systems: Vec<String> = Vec::new();
    for system in facts.affected_systems.iter().chain(&facts.related_services) {
        if !systems.contains(system) {
            systems.push(system.clone());
        }
    }
    systems
}

/// Estimated reach: explicit user counts first, then a per-system guess.
pub fn estimate_impacted_users(facts: &IncidentFacts, impacted_systems: &[String]) -> u64 {
    let users = facts.user_count;
    let pct = facts.percentage_impacted;

    if users > 0 && pct > 0.0 {
        return (users as f64 * (pct / 100.0)).round() as u64;
    }
    if users > 0 {
        return users;
    }
    (impacted_systems.len() as u64).saturating_mul(ESTIMATED_USERS_PER_SYSTEM)
}

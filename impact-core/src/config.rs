use crate::error::ConfigError;
use crate::evaluators::{CUSTOMER_IMPACT, REVENUE_IMPACT, SECURITY_IMPACT, SERVICE_IMPACT};
use crate::severity::{NotificationThresholds, SeverityScale};
use fact_registry::FactPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Engine settings, read from the `[impact]` section of the host config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Metrics evaluated per incident, in evaluation order.
    pub evaluation_metrics: Vec<String>,
    /// Severity level names, most severe first.
    pub severity_levels: SeverityScale,
    pub notification_thresholds: NotificationThresholds,
    pub fact_policy: FactPolicy,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            evaluation_metrics: [SERVICE_IMPACT, CUSTOMER_IMPACT, REVENUE_IMPACT, SECURITY_IMPACT]
                .into_iter()
                .map(String::from)
                .collect(),
            severity_levels: SeverityScale::default(),
            notification_thresholds: NotificationThresholds::default(),
            fact_policy: FactPolicy::default(),
        }
    }
}

impl ImpactConfig {
    /// Checks the configuration once, before any evaluation.
    ///
    /// An empty severity scale is accepted and degrades to "low". Threshold
    /// entries for levels not on the scale are only reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for level in self.severity_levels.levels() {
            if level.trim().is_empty() {
                return Err(ConfigError::BlankSeverity);
            }
            if !seen.insert(level.as_str()) {
                return Err(ConfigError::DuplicateSeverity(level.clone()));
            }
        }

        if self.evaluation_metrics.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::BlankMetric);
        }

        for (severity, threshold) in self.notification_thresholds.iter() {
            if let (Some(response), Some(escalation)) =
                (threshold.response_time, threshold.escalation_time)
            {
                if escalation < response {
                    return Err(ConfigError::InvertedThreshold {
                        severity: severity.to_string(),
                        response,
                        escalation,
                    });
                }
            }
            if !self.severity_levels.contains(severity) {
                tracing::warn!(severity, "notification threshold for a level not on the severity scale");
            }
        }

        if self.severity_levels.is_empty() {
            tracing::warn!("severity scale is empty; every incident will classify as low");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Threshold;

    #[test]
    fn default_config_is_valid() {
        let config = ImpactConfig::default();
        assert_eq!(config.evaluation_metrics.len(), 4);
        assert_eq!(config.fact_policy, FactPolicy::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_levels() {
        let config = ImpactConfig {
            severity_levels: SeverityScale::new(["critical", "high", "critical"]),
            ..ImpactConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateSeverity("critical".into()))
        );
    }

    #[test]
    fn rejects_blank_names() {
        let config = ImpactConfig {
            severity_levels: SeverityScale::new(["critical", " "]),
            ..ImpactConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BlankSeverity));

        let config = ImpactConfig {
            evaluation_metrics: vec!["service_impact".into(), String::new()],
            ..ImpactConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BlankMetric));
    }

    #[test]
    fn rejects_escalation_before_response() {
        let config = ImpactConfig {
            notification_thresholds: NotificationThresholds::new([(
                "high",
                Threshold {
                    response_time: Some(30),
                    escalation_time: Some(10),
                },
            )]),
            ..ImpactConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedThreshold { response: 30, escalation: 10, .. })
        ));
    }

    #[test]
    fn empty_scale_and_foreign_thresholds_are_tolerated() {
        let config = ImpactConfig {
            severity_levels: SeverityScale::new(Vec::<String>::new()),
            notification_thresholds: NotificationThresholds::new([(
                "sev0",
                Threshold::default(),
            )]),
            ..ImpactConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_partial_section() {
        let config: ImpactConfig = serde_json::from_value(serde_json::json!({
            "severity_levels": ["sev1", "sev2"],
            "notification_thresholds": {"sev1": {"response_time": 5}},
            "fact_policy": "strict"
        }))
        .expect("deserialize");

        assert_eq!(config.evaluation_metrics, ImpactConfig::default().evaluation_metrics);
        assert_eq!(config.severity_levels.levels(), ["sev1", "sev2"]);
        assert_eq!(config.notification_thresholds.timing_for("sev1").response_time, 5);
        assert_eq!(config.fact_policy, FactPolicy::Strict);
    }
}

use crate::error::ImpactError;
use crate::metrics::MetricResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An assessment with any subset of fields already decided, typically by an
/// upstream classifier. Fields set here are authoritative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_severity: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metrics: IndexMap<String, MetricResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impacted_systems: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impacted_users: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl PartialAssessment {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ImpactError> {
        serde_json::from_value(value).map_err(ImpactError::InvalidAssessment)
    }

    // Empty strings, empty lists and zero users read as "not set".

    pub(crate) fn take_overall_severity(&mut self) -> Option<String> {
        self.overall_severity.take().filter(|s| !s.trim().is_empty())
    }

    pub(crate) fn take_impacted_systems(&mut self) -> Option<Vec<String>> {
        self.impacted_systems.take().filter(|s| !s.is_empty())
    }

    pub(crate) fn take_impacted_users(&mut self) -> Option<u64> {
        self.impacted_users.take().filter(|&n| n > 0)
    }

    pub(crate) fn take_recommendation(&mut self) -> Option<String> {
        self.recommendation.take().filter(|s| !s.trim().is_empty())
    }
}

/// A completed impact assessment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub overall_severity: String,
    pub metrics: IndexMap<String, MetricResult>,
    /// Minutes until first response is expected.
    pub response_time: u32,
    /// Minutes until the incident escalates.
    pub escalation_time: u32,
    pub impacted_systems: Vec<String>,
    pub impacted_users: u64,
    pub recommendation: String,
}

impl From<Assessment> for PartialAssessment {
    fn from(assessment: Assessment) -> Self {
        Self {
            overall_severity: Some(assessment.overall_severity),
            metrics: assessment.metrics,
            response_time: Some(assessment.response_time),
            escalation_time: Some(assessment.escalation_time),
            impacted_systems: Some(assessment.impacted_systems),
            impacted_users: Some(assessment.impacted_users),
            recommendation: Some(assessment.recommendation),
        }
    }
}

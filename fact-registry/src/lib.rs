use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const INCIDENT_SCHEMA_V1: &str = "incident.v1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerTier {
    #[default]
    Standard,
    Premium,
    Business,
    Enterprise,
}

impl CustomerTier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "premium" => Some(Self::Premium),
            "business" => Some(Self::Business),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

/// Facts about one incident, grouped by impact dimension.
///
/// Every field is optional on the wire; absent fields read as false, zero or
/// empty. Identifier lists are deduplicated, keeping first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub service_outage: bool,
    pub service_degradation: bool,
    pub percentage_impacted: f64,
    pub duration_minutes: f64,

    pub customers_facing: bool,
    pub customer_count: u64,
    pub customer_tier: CustomerTier,
    pub customer_reports: u64,

    pub revenue_impacted: bool,
    pub estimated_loss: f64,
    pub affects_payments: bool,
    pub affects_billing: bool,

    pub security_breach: bool,
    pub data_exposure: bool,
    pub sensitive_data_involved: bool,
    pub breach_size: u64,
    pub systems_compromised: Vec<String>,

    pub affected_systems: Vec<String>,
    pub related_services: Vec<String>,
    pub user_count: u64,
}

/// How wrong-typed incident fields are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactPolicy {
    /// Wrong-typed or null fields fall back to their default.
    #[default]
    Permissive,
    /// Wrong-typed fields and out-of-range numbers are rejected.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactError {
    #[error("incident facts must be a JSON object")]
    NotAnObject,
    #[error("unsupported schema '{0}'")]
    UnsupportedSchema(String),
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field '{field}' is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Builds [`IncidentFacts`] from an untyped JSON payload.
///
/// The payload must be an object under either policy. An optional `schema`
/// key, when present, must equal [`INCIDENT_SCHEMA_V1`].
pub fn parse_incident_facts(payload: &Value, policy: FactPolicy) -> Result<IncidentFacts, FactError> {
    let obj = payload.as_object().ok_or(FactError::NotAnObject)?;

    if let Some(schema) = obj.get("schema").and_then(Value::as_str) {
        if schema != INCIDENT_SCHEMA_V1 {
            return Err(FactError::UnsupportedSchema(schema.to_string()));
        }
    }

    let fields = FieldReader { obj, policy };
    let facts = IncidentFacts {
        id: fields.id("id")?,
        service_outage: fields.flag("serviceOutage")?,
        service_degradation: fields.flag("serviceDegradation")?,
        percentage_impacted: fields.number("percentageImpacted")?,
        duration_minutes: fields.number("durationMinutes")?,
        customers_facing: fields.flag("customersFacing")?,
        customer_count: fields.count("customerCount")?,
        customer_tier: fields.tier("customerTier")?,
        customer_reports: fields.count("customerReports")?,
        revenue_impacted: fields.flag("revenueImpacted")?,
        estimated_loss: fields.number("estimatedLoss")?,
        affects_payments: fields.flag("affectsPayments")?,
        affects_billing: fields.flag("affectsBilling")?,
        security_breach: fields.flag("securityBreach")?,
        data_exposure: fields.flag("dataExposure")?,
        sensitive_data_involved: fields.flag("sensitiveDataInvolved")?,
        breach_size: fields.count("breachSize")?,
        systems_compromised: fields.ids("systemsCompromised")?,
        affected_systems: fields.ids("affectedSystems")?,
        related_services: fields.ids("relatedServices")?,
        user_count: fields.count("userCount")?,
    };

    if policy == FactPolicy::Strict {
        validate_incident_facts(&facts)?;
    }
    Ok(facts)
}

/// Range checks applied under [`FactPolicy::Strict`].
pub fn validate_incident_facts(facts: &IncidentFacts) -> Result<(), FactError> {
    let pct = facts.percentage_impacted;
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(FactError::OutOfRange {
            field: "percentageImpacted",
            value: pct,
        });
    }
    for (field, value) in [
        ("durationMinutes", facts.duration_minutes),
        ("estimatedLoss", facts.estimated_loss),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(FactError::OutOfRange { field, value });
        }
    }
    Ok(())
}

struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    policy: FactPolicy,
}

impl FieldReader<'_> {
    fn present(&self, field: &str) -> Option<&Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    fn reject<T: Default>(&self, field: &'static str, expected: &'static str) -> Result<T, FactError> {
        match self.policy {
            FactPolicy::Strict => Err(FactError::InvalidField { field, expected }),
            FactPolicy::Permissive => {
                tracing::debug!(field, expected, "defaulting wrong-typed incident field");
                Ok(T::default())
            }
        }
    }

    fn flag(&self, field: &'static str) -> Result<bool, FactError> {
        match self.present(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => self.reject(field, "a boolean"),
        }
    }

    fn number(&self, field: &'static str) -> Result<f64, FactError> {
        match self.present(field).and_then(Value::as_f64) {
            Some(n) => Ok(n),
            None if self.present(field).is_none() => Ok(0.0),
            None => self.reject(field, "a number"),
        }
    }

    fn count(&self, field: &'static str) -> Result<u64, FactError> {
        let Some(value) = self.present(field) else {
            return Ok(0);
        };
        if let Some(n) = value.as_u64() {
            return Ok(n);
        }
        // Integral floats such as 500.0 still count.
        match value.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(f as u64)
            }
            _ => self.reject(field, "a non-negative integer"),
        }
    }

    fn ids(&self, field: &'static str) -> Result<Vec<String>, FactError> {
        let Some(value) = self.present(field) else {
            return Ok(Vec::new());
        };
        let Some(items) = value.as_array() else {
            return self.reject(field, "an array of strings");
        };

        let mut out: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(s) => {
                    if !out.iter().any(|seen| seen == s) {
                        out.push(s.to_string());
                    }
                }
                None if self.policy == FactPolicy::Strict => {
                    return Err(FactError::InvalidField {
                        field,
                        expected: "an array of strings",
                    });
                }
                None => {}
            }
        }
        Ok(out)
    }

    fn tier(&self, field: &'static str) -> Result<CustomerTier, FactError> {
        match self.present(field) {
            None => Ok(CustomerTier::Standard),
            Some(Value::String(s)) => match CustomerTier::parse(s) {
                Some(tier) => Ok(tier),
                None => self.reject(field, "one of standard, premium, business, enterprise"),
            },
            Some(_) => self.reject(field, "one of standard, premium, business, enterprise"),
        }
    }

    fn id(&self, field: &'static str) -> Result<Option<String>, FactError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => self.reject(field, "a non-empty string or number"),
        }
    }
}

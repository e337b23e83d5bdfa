use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity reported for metrics the registry does not know.
pub const UNKNOWN_SEVERITY: &str = "unknown";

/// Classification used when the configured scale is empty.
pub const FALLBACK_SEVERITY: &str = "low";

pub const DEFAULT_RESPONSE_MINUTES: u32 = 30;
pub const DEFAULT_ESCALATION_MINUTES: u32 = 60;

/// Bands emitted by the built-in evaluators, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Critical,
    High,
    Medium,
    Low,
}

impl SeverityBand {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Maps a score onto a band by descending `>=` comparison against the
    /// critical, high and medium cutoffs.
    pub fn from_score(score: f64, cutoffs: BandCutoffs) -> Self {
        if score >= cutoffs.critical {
            Self::Critical
        } else if score >= cutoffs.high {
            Self::High
        } else if score >= cutoffs.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandCutoffs {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

/// Ordered severity level names, most severe first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityScale(Vec<String>);

impl Default for SeverityScale {
    fn default() -> Self {
        Self::new(["critical", "high", "medium", "low"])
    }
}

impl SeverityScale {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(levels.into_iter().map(Into::into).collect())
    }

    pub fn levels(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position on the scale; lower is more severe.
    pub fn rank(&self, severity: &str) -> Option<usize> {
        self.0.iter().position(|level| level == severity)
    }

    pub fn contains(&self, severity: &str) -> bool {
        self.rank(severity).is_some()
    }

    pub fn least_severe(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or(FALLBACK_SEVERITY)
    }

    /// Most severe of the given severities; names not on the scale are ignored.
    pub fn most_severe<'a, I>(&self, severities: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        severities
            .into_iter()
            .filter_map(|s| self.rank(s).map(|rank| (rank, s)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, s)| s)
    }
}

/// Per-level notification timings in minutes. Either side may be left out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_time: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub response_time: u32,
    pub escalation_time: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationThresholds(BTreeMap<String, Threshold>);

impl NotificationThresholds {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Threshold)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Threshold)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn timing_for(&self, severity: &str) -> Timing {
        let threshold = self.0.get(severity).copied().unwrap_or_default();
        Timing {
            response_time: threshold.response_time.unwrap_or(DEFAULT_RESPONSE_MINUTES),
            escalation_time: threshold.escalation_time.unwrap_or(DEFAULT_ESCALATION_MINUTES),
        }
    }
}

//! Built-in metric evaluators.
//!
//! Each evaluator adds up independent point contributions into an impact
//! score, then maps the score onto a [`SeverityBand`]. Bonus thresholds are
//! strict (`>`), band cutoffs inclusive (`>=`).

use crate::metrics::{
    CustomerDetails, MetricDetails, MetricEvaluator, MetricResult, RevenueDetails,
    SecurityDetails, ServiceDetails,
};
use crate::severity::{BandCutoffs, SeverityBand};
use fact_registry::{CustomerTier, IncidentFacts};

pub const SERVICE_IMPACT: &str = "service_impact";
pub const CUSTOMER_IMPACT: &str = "customer_impact";
pub const REVENUE_IMPACT: &str = "revenue_impact";
pub const SECURITY_IMPACT: &str = "security_impact";

fn scored(score: f64, confidence: f64, cutoffs: BandCutoffs, details: MetricDetails) -> MetricResult {
    MetricResult {
        severity: SeverityBand::from_score(score, cutoffs).as_str().to_string(),
        confidence: Some(confidence),
        impact_score: Some(score),
        details,
    }
}

/// Outage, degradation, blast radius and duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServiceImpact;

impl ServiceImpact {
    const CONFIDENCE: f64 = 0.8;
    const CUTOFFS: BandCutoffs = BandCutoffs {
        critical: 75.0,
        high: 50.0,
        medium: 25.0,
    };

    pub fn score(facts: &IncidentFacts) -> f64 {
        let mut score = 0.0;
        if facts.service_outage {
            score += 50.0;
        } else if facts.service_degradation {
            score += 25.0;
        }

        score += facts.percentage_impacted * 0.5;

        score += match facts.duration_minutes {
            d if d > 60.0 => 25.0,
            d if d > 30.0 => 15.0,
            d if d > 10.0 => 10.0,
            _ => 5.0,
        };
        score
    }
}

impl MetricEvaluator for ServiceImpact {
    fn name(&self) -> &'static str {
        SERVICE_IMPACT
    }

    fn evaluate(&self, facts: &IncidentFacts) -> MetricResult {
        scored(
            Self::score(facts),
            Self::CONFIDENCE,
            Self::CUTOFFS,
            MetricDetails::Service(ServiceDetails {
                service_outage: facts.service_outage,
                service_degradation: facts.service_degradation,
                percentage_impacted: facts.percentage_impacted,
                duration_minutes: facts.duration_minutes,
            }),
        )
    }
}

/// Customer exposure, head count, tier and inbound reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct CustomerImpact;

impl CustomerImpact {
    const CONFIDENCE: f64 = 0.7;
    const CUTOFFS: BandCutoffs = BandCutoffs {
        critical: 70.0,
        high: 50.0,
        medium: 30.0,
    };

    pub fn score(facts: &IncidentFacts) -> f64 {
        let mut score = 0.0;
        if facts.customers_facing {
            score += 30.0;
        }

        score += match facts.customer_count {
            n if n > 1000 => 40.0,
            n if n > 100 => 30.0,
            n if n > 10 => 20.0,
            n if n > 0 => 10.0,
            _ => 0.0,
        };

        score += match facts.customer_tier {
            CustomerTier::Enterprise => 20.0,
            CustomerTier::Business => 15.0,
            CustomerTier::Premium => 10.0,
            CustomerTier::Standard => 0.0,
        };

        score += match facts.customer_reports {
            n if n > 50 => 20.0,
            n if n > 10 => 15.0,
            n if n > 0 => 10.0,
            _ => 0.0,
        };
        score
    }
}

impl MetricEvaluator for CustomerImpact {
    fn name(&self) -> &'static str {
        CUSTOMER_IMPACT
    }

    fn evaluate(&self, facts: &IncidentFacts) -> MetricResult {
        scored(
            Self::score(facts),
            Self::CONFIDENCE,
            Self::CUTOFFS,
            MetricDetails::Customer(CustomerDetails {
                customers_facing: facts.customers_facing,
                customer_count: facts.customer_count,
                customer_tier: facts.customer_tier,
                customer_reports: facts.customer_reports,
            }),
        )
    }
}

/// Direct revenue loss plus payment and billing paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct RevenueImpact;

impl RevenueImpact {
    const CONFIDENCE: f64 = 0.6;
    const CUTOFFS: BandCutoffs = BandCutoffs {
        critical: 75.0,
        high: 50.0,
        medium: 30.0,
    };

    pub fn score(facts: &IncidentFacts) -> f64 {
        let mut score = 0.0;
        if facts.revenue_impacted {
            score += 30.0;
        }

        score += match facts.estimated_loss {
            l if l > 100_000.0 => 50.0,
            l if l > 10_000.0 => 40.0,
            l if l > 1_000.0 => 30.0,
            l if l > 0.0 => 20.0,
            _ => 0.0,
        };

        if facts.affects_payments {
            score += 25.0;
        }
        if facts.affects_billing {
            score += 15.0;
        }

        // Unlike service impact, short incidents earn no duration points here.
        score += match facts.duration_minutes {
            d if d > 60.0 => 15.0,
            d if d > 30.0 => 10.0,
            d if d > 10.0 => 5.0,
            _ => 0.0,
        };
        score
    }
}

impl MetricEvaluator for RevenueImpact {
    fn name(&self) -> &'static str {
        REVENUE_IMPACT
    }

    fn evaluate(&self, facts: &IncidentFacts) -> MetricResult {
        scored(
            Self::score(facts),
            Self::CONFIDENCE,
            Self::CUTOFFS,
            MetricDetails::Revenue(RevenueDetails {
                revenue_impacted: facts.revenue_impacted,
                estimated_loss: facts.estimated_loss,
                affects_payments: facts.affects_payments,
                affects_billing: facts.affects_billing,
                duration_minutes: facts.duration_minutes,
            }),
        )
    }
}

/// Breach, exposure, data sensitivity and compromised footprint.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecurityImpact;

impl SecurityImpact {
    const CONFIDENCE: f64 = 0.7;
    const CUTOFFS: BandCutoffs = BandCutoffs {
        critical: 70.0,
        high: 50.0,
        medium: 30.0,
    };
    const POINTS_PER_SYSTEM: usize = 5;
    const MAX_SYSTEM_POINTS: usize = 20;

    pub fn score(facts: &IncidentFacts) -> f64 {
        let mut score = 0.0;
        if facts.security_breach {
            score += 50.0;
        }
        if facts.data_exposure {
            score += 30.0;
        }
        if facts.sensitive_data_involved {
            score += 20.0;
        }

        score += match facts.breach_size {
            n if n > 10_000 => 30.0,
            n if n > 1_000 => 20.0,
            n if n > 0 => 10.0,
            _ => 0.0,
        };

        let system_points = facts
            .systems_compromised
            .len()
            .saturating_mul(Self::POINTS_PER_SYSTEM)
            .min(Self::MAX_SYSTEM_POINTS);
        score + system_points as f64
    }
}

impl MetricEvaluator for SecurityImpact {
    fn name(&self) -> &'static str {
        SECURITY_IMPACT
    }

    fn evaluate(&self, facts: &IncidentFacts) -> MetricResult {
        scored(
            Self::score(facts),
            Self::CONFIDENCE,
            Self::CUTOFFS,
            MetricDetails::Security(SecurityDetails {
                security_breach: facts.security_breach,
                data_exposure: facts.data_exposure,
                sensitive_data_involved: facts.sensitive_data_involved,
                breach_size: facts.breach_size,
                systems_compromised: facts.systems_compromised.clone(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> IncidentFacts {
        IncidentFacts::default()
    }

    #[test]
    fn full_outage_is_critical() {
        let facts = IncidentFacts {
            service_outage: true,
            percentage_impacted: 100.0,
            duration_minutes: 70.0,
            ..base()
        };
        let result = ServiceImpact.evaluate(&facts);
        assert_eq!(result.impact_score, Some(125.0));
        assert_eq!(result.severity, "critical");
        assert_eq!(result.confidence, Some(0.8));
    }

    #[test]
    fn quiet_service_still_earns_duration_floor() {
        let result = ServiceImpact.evaluate(&base());
        assert_eq!(result.impact_score, Some(5.0));
        assert_eq!(result.severity, "low");
    }

    #[test]
    fn outage_outranks_degradation() {
        let both = IncidentFacts {
            service_outage: true,
            service_degradation: true,
            ..base()
        };
        assert_eq!(ServiceImpact::score(&both), 55.0);

        let degraded = IncidentFacts {
            service_degradation: true,
            duration_minutes: 30.0,
            ..base()
        };
        // 30 minutes is not > 30, so the 10-minute bonus applies.
        assert_eq!(ServiceImpact::score(&degraded), 35.0);
        assert_eq!(ServiceImpact.evaluate(&degraded).severity, "medium");
    }

    #[test]
    fn service_band_boundary_is_inclusive() {
        let facts = IncidentFacts {
            service_degradation: true,
            percentage_impacted: 40.0,
            duration_minutes: 45.0,
            ..base()
        };
        // 25 + 20 + 15
        assert_eq!(ServiceImpact::score(&facts), 60.0);

        // 50 + 15 + 10 lands exactly on the critical cutoff.
        let at_cutoff = IncidentFacts {
            service_outage: true,
            percentage_impacted: 30.0,
            duration_minutes: 20.0,
            ..base()
        };
        assert_eq!(ServiceImpact::score(&at_cutoff), 75.0);
        assert_eq!(ServiceImpact.evaluate(&at_cutoff).severity, "critical");
    }

    #[test]
    fn enterprise_customer_flood_is_critical() {
        let facts = IncidentFacts {
            customers_facing: true,
            customer_count: 1500,
            customer_tier: CustomerTier::Enterprise,
            customer_reports: 60,
            ..base()
        };
        let result = CustomerImpact.evaluate(&facts);
        assert_eq!(result.impact_score, Some(110.0));
        assert_eq!(result.severity, "critical");
        assert_eq!(result.confidence, Some(0.7));
    }

    #[test]
    fn customer_count_bonuses_are_strict() {
        let at = |count| CustomerImpact::score(&IncidentFacts {
            customer_count: count,
            ..base()
        });
        assert_eq!(at(0), 0.0);
        assert_eq!(at(1), 10.0);
        assert_eq!(at(10), 10.0);
        assert_eq!(at(11), 20.0);
        assert_eq!(at(100), 20.0);
        assert_eq!(at(101), 30.0);
        assert_eq!(at(1000), 30.0);
        assert_eq!(at(1001), 40.0);
    }

    #[test]
    fn customer_medium_cutoff_is_thirty() {
        let facts = IncidentFacts {
            customers_facing: true,
            ..base()
        };
        assert_eq!(CustomerImpact.evaluate(&facts).severity, "medium");

        let facts = IncidentFacts {
            customer_count: 50,
            customer_reports: 1,
            ..base()
        };
        // 20 + 10
        assert_eq!(CustomerImpact.evaluate(&facts).severity, "medium");

        let facts = IncidentFacts {
            customer_tier: CustomerTier::Premium,
            customer_reports: 12,
            ..base()
        };
        // 10 + 15
        assert_eq!(CustomerImpact.evaluate(&facts).severity, "low");
    }

    #[test]
    fn payment_outage_with_large_loss_is_critical() {
        let facts = IncidentFacts {
            revenue_impacted: true,
            estimated_loss: 250_000.0,
            affects_payments: true,
            duration_minutes: 90.0,
            ..base()
        };
        let result = RevenueImpact.evaluate(&facts);
        assert_eq!(result.impact_score, Some(120.0));
        assert_eq!(result.severity, "critical");
        assert_eq!(result.confidence, Some(0.6));
    }

    #[test]
    fn revenue_has_no_duration_floor() {
        assert_eq!(RevenueImpact::score(&base()), 0.0);
        assert_eq!(RevenueImpact.evaluate(&base()).severity, "low");

        let facts = IncidentFacts {
            affects_billing: true,
            estimated_loss: 500.0,
            ..base()
        };
        // 15 + 20
        assert_eq!(RevenueImpact.evaluate(&facts).severity, "medium");
    }

    #[test]
    fn revenue_loss_tiers() {
        let at = |loss| RevenueImpact::score(&IncidentFacts {
            estimated_loss: loss,
            ..base()
        });
        assert_eq!(at(0.0), 0.0);
        assert_eq!(at(0.5), 20.0);
        assert_eq!(at(1_000.0), 20.0);
        assert_eq!(at(1_000.01), 30.0);
        assert_eq!(at(10_001.0), 40.0);
        assert_eq!(at(100_000.0), 40.0);
        assert_eq!(at(100_001.0), 50.0);
    }

    #[test]
    fn compromised_systems_are_capped() {
        let systems = |n: usize| IncidentFacts {
            systems_compromised: (0..n).map(|i| format!("host-{i}")).collect(),
            ..base()
        };
        assert_eq!(SecurityImpact::score(&systems(0)), 0.0);
        assert_eq!(SecurityImpact::score(&systems(3)), 15.0);
        assert_eq!(SecurityImpact::score(&systems(4)), 20.0);
        assert_eq!(SecurityImpact::score(&systems(9)), 20.0);
    }

    #[test]
    fn breach_with_sensitive_exposure_is_critical() {
        let facts = IncidentFacts {
            security_breach: true,
            data_exposure: true,
            breach_size: 20,
            ..base()
        };
        let result = SecurityImpact.evaluate(&facts);
        assert_eq!(result.impact_score, Some(90.0));
        assert_eq!(result.severity, "critical");

        let facts = IncidentFacts {
            security_breach: true,
            ..base()
        };
        assert_eq!(SecurityImpact.evaluate(&facts).severity, "high");
    }

    #[test]
    fn details_echo_inputs() {
        let facts = IncidentFacts {
            customer_count: 7,
            customer_tier: CustomerTier::Business,
            ..base()
        };
        assert_eq!(
            CustomerImpact.evaluate(&facts).details,
            MetricDetails::Customer(CustomerDetails {
                customers_facing: false,
                customer_count: 7,
                customer_tier: CustomerTier::Business,
                customer_reports: 0,
            })
        );
    }

    fn assert_band(evaluator: &dyn MetricEvaluator, facts: IncidentFacts, score: f64, severity: &str) {
        let result = evaluator.evaluate(&facts);
        assert_eq!(result.impact_score, Some(score), "{} score", evaluator.name());
        assert_eq!(result.severity, severity, "{} at {score}", evaluator.name());
    }

    #[test]
    fn service_cutoffs_are_inclusive() {
        let at = |pct: f64, outage: bool, degradation: bool| IncidentFacts {
            service_outage: outage,
            service_degradation: degradation,
            percentage_impacted: pct,
            ..base()
        };
        assert_band(&ServiceImpact, at(40.0, true, false), 75.0, "critical");
        assert_band(&ServiceImpact, at(39.0, true, false), 74.5, "high");
        assert_band(&ServiceImpact, at(40.0, false, true), 50.0, "high");
        assert_band(&ServiceImpact, at(39.0, false, true), 49.5, "medium");
        assert_band(&ServiceImpact, at(40.0, false, false), 25.0, "medium");
        assert_band(&ServiceImpact, at(39.0, false, false), 24.5, "low");
    }

    #[test]
    fn customer_cutoffs_are_inclusive() {
        let facing = |customer_count: u64| IncidentFacts {
            customers_facing: true,
            customer_count,
            ..base()
        };
        assert_band(&CustomerImpact, facing(1001), 70.0, "critical");
        assert_band(&CustomerImpact, facing(1000), 60.0, "high");
        assert_band(&CustomerImpact, facing(11), 50.0, "high");
        assert_band(&CustomerImpact, facing(1), 40.0, "medium");
        assert_band(&CustomerImpact, facing(0), 30.0, "medium");
        let enterprise = IncidentFacts {
            customer_tier: CustomerTier::Enterprise,
            ..base()
        };
        assert_band(&CustomerImpact, enterprise, 20.0, "low");
    }

    #[test]
    fn revenue_cutoffs_are_inclusive() {
        let lost = |estimated_loss: f64, duration_minutes: f64| IncidentFacts {
            revenue_impacted: true,
            estimated_loss,
            duration_minutes,
            ..base()
        };
        assert_band(&RevenueImpact, lost(1_001.0, 61.0), 75.0, "critical");
        assert_band(&RevenueImpact, lost(1_001.0, 31.0), 70.0, "high");
        assert_band(&RevenueImpact, lost(1.0, 0.0), 50.0, "high");
        let billing = IncidentFacts {
            estimated_loss: 1_001.0,
            affects_billing: true,
            ..base()
        };
        assert_band(&RevenueImpact, billing, 45.0, "medium");
        assert_band(&RevenueImpact, lost(0.0, 0.0), 30.0, "medium");
        let payments = IncidentFacts {
            affects_payments: true,
            ..base()
        };
        assert_band(&RevenueImpact, payments, 25.0, "low");
    }

    #[test]
    fn security_cutoffs_are_inclusive() {
        let breach = |breach_size: u64, systems: usize| IncidentFacts {
            security_breach: true,
            breach_size,
            systems_compromised: (0..systems).map(|i| format!("host-{i}")).collect(),
            ..base()
        };
        assert_band(&SecurityImpact, breach(1_001, 0), 70.0, "critical");
        assert_band(&SecurityImpact, breach(1, 1), 65.0, "high");
        assert_band(&SecurityImpact, breach(0, 0), 50.0, "high");
        let exposure = |breach_size: u64, systems: usize| IncidentFacts {
            data_exposure: true,
            breach_size,
            systems_compromised: (0..systems).map(|i| format!("host-{i}")).collect(),
            ..base()
        };
        assert_band(&SecurityImpact, exposure(1, 1), 45.0, "medium");
        assert_band(&SecurityImpact, exposure(0, 0), 30.0, "medium");
        let sensitive = IncidentFacts {
            sensitive_data_involved: true,
            systems_compromised: vec!["host-0".into()],
            ..base()
        };
        assert_band(&SecurityImpact, sensitive, 25.0, "low");
    }
}

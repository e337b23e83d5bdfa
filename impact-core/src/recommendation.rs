use crate::severity::SeverityBand;

const UNDETERMINED: &str = "Unable to determine appropriate response. Investigate further.";

const PUBLIC_STATUS_USERS: u64 = 1000;
const SUPPORT_WATCH_USERS: u64 = 100;

fn posture(severity: &str) -> &'static str {
    match SeverityBand::parse(severity) {
        Some(SeverityBand::Critical) => {
            "Immediate all-hands response required. \
             Notify executive team and establish incident command. \
             Begin user communication strategy immediately."
        }
        Some(SeverityBand::High) => {
            "Assemble dedicated response team. \
             Escalate to service owners and senior technical staff. \
             Prepare user communication if outage exceeds 30 minutes."
        }
        Some(SeverityBand::Medium) => {
            "Assign dedicated engineer for investigation. \
             Notify service owners and prepare contingency plans. \
             Monitor for escalation triggers."
        }
        Some(SeverityBand::Low) => {
            "Standard troubleshooting procedures. \
             Monitor for changes in impact level. \
             Document in ticket and address during business hours."
        }
        None => UNDETERMINED,
    }
}

/// Response guidance: severity posture, then the systems to focus on, then a
/// note on user reach when it is large enough to matter.
pub fn recommend(severity: &str, impacted_systems: &[String], impacted_users: u64) -> String {
    let mut text = String::from(posture(severity));

    if !impacted_systems.is_empty() {
        text.push_str(" Focus on affected systems: ");
        text.push_str(&impacted_systems.join(", "));
        text.push('.');
    }

    if impacted_users > PUBLIC_STATUS_USERS {
        text.push_str(" Significant user base affected; consider public status update.");
    } else if impacted_users > SUPPORT_WATCH_USERS {
        text.push_str(" Multiple users affected; monitor support channels for reports.");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_template() {
        assert_eq!(
            recommend("critical", &[], 0),
            "Immediate all-hands response required. Notify executive team and establish \
             incident command. Begin user communication strategy immediately."
        );
    }

    #[test]
    fn unknown_severity_asks_for_investigation() {
        assert_eq!(recommend("sev1", &[], 0), UNDETERMINED);
        assert_eq!(recommend("", &[], 0), UNDETERMINED);
    }

    #[test]
    fn clauses_follow_template_in_order() {
        let systems = vec!["payments".to_string(), "checkout".to_string()];
        assert_eq!(
            recommend("low", &systems, 1500),
            "Standard troubleshooting procedures. Monitor for changes in impact level. \
             Document in ticket and address during business hours. \
             Focus on affected systems: payments, checkout. \
             Significant user base affected; consider public status update."
        );
    }

    #[test]
    fn user_clause_thresholds_are_strict() {
        assert!(!recommend("medium", &[], 100).contains("support channels"));
        assert!(recommend("medium", &[], 101).contains("monitor support channels"));
        assert!(recommend("medium", &[], 1000).contains("monitor support channels"));
        assert!(recommend("medium", &[], 1001).contains("consider public status update"));
    }

    #[test]
    fn high_mentions_thirty_minute_window() {
        assert!(recommend("high", &[], 0).starts_with("Assemble dedicated response team."));
        assert!(recommend("high", &[], 0).ends_with("exceeds 30 minutes."));
    }
}

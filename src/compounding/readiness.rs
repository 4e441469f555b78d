//! Retirement readiness score

use serde::{Deserialize, Serialize};

use super::future_value;
use crate::assumptions::PlanningAssumptions;
use crate::profile::MemberFinancialProfile;

/// Projected corpus compared with the corpus the member needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementReadiness {
    /// Projected / target, as a percentage capped at 100
    pub readiness_score: f64,
    pub projected_corpus: f64,
    pub target_corpus: f64,
    pub years_to_retirement: i32,
}

/// Score how close the member's current trajectory gets to their target
///
/// With a desired retirement income the target is that income capitalised at
/// the safe withdrawal rate; otherwise the income-multiple rule applies.
pub fn retirement_readiness(
    profile: &MemberFinancialProfile,
    target_retirement_income: Option<f64>,
    assumptions: &PlanningAssumptions,
) -> RetirementReadiness {
    let years = profile.years_to_retirement();
    let projected_corpus = future_value(
        profile.current_savings,
        profile.annual_contribution(),
        profile.assumed_return(assumptions.default_return),
        years,
    );

    let target_corpus = match target_retirement_income {
        Some(income) if income > 0.0 => income / assumptions.safe_withdrawal_rate,
        _ => assumptions.target_corpus(profile.annual_income),
    };

    let readiness_score = if target_corpus > 0.0 {
        (projected_corpus / target_corpus * 100.0).min(100.0)
    } else {
        100.0
    };

    RetirementReadiness {
        readiness_score: (readiness_score * 10.0).round() / 10.0,
        projected_corpus,
        target_corpus,
        years_to_retirement: years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::sample_profile;
    use approx::assert_relative_eq;

    #[test]
    fn test_readiness_caps_at_100() {
        let profile = sample_profile();
        let assumptions = PlanningAssumptions::default_planning();

        let readiness = retirement_readiness(&profile, None, &assumptions);
        assert_eq!(readiness.target_corpus, 600_000.0);
        assert_eq!(readiness.readiness_score, 100.0);
        assert_eq!(readiness.years_to_retirement, 35);
    }

    #[test]
    fn test_income_target_uses_withdrawal_rate() {
        let mut profile = sample_profile();
        profile.current_savings = 0.0;
        profile.contribution_amount = 0.0;
        let assumptions = PlanningAssumptions::default_planning();

        let readiness = retirement_readiness(&profile, Some(40_000.0), &assumptions);
        assert_relative_eq!(readiness.target_corpus, 1_000_000.0);
        assert_eq!(readiness.readiness_score, 0.0);
    }
}

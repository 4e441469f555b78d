//! Member financial profile as handed in by the persistence layer

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Retirement age assumed when the member has not set a goal
fn default_retirement_age_goal() -> i32 {
    65
}

/// Stated risk tolerance of the member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// Parse the label used in member extracts; unknown labels yield `None`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTolerance::Low),
            "medium" => Some(RiskTolerance::Medium),
            "high" => Some(RiskTolerance::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "Low",
            RiskTolerance::Medium => "Medium",
            RiskTolerance::High => "High",
        }
    }

    /// Ordinal used as a clustering feature (Low=1, Medium=2, High=3)
    pub fn ordinal(&self) -> f64 {
        match self {
            RiskTolerance::Low => 1.0,
            RiskTolerance::Medium => 2.0,
            RiskTolerance::High => 3.0,
        }
    }
}

/// Ordinal for an optional tolerance; unspecified counts as Medium
pub fn risk_ordinal(tolerance: Option<RiskTolerance>) -> f64 {
    tolerance.map(|t| t.ordinal()).unwrap_or(2.0)
}

/// A member's financial profile
///
/// Numeric fields default to zero when absent so they never poison
/// downstream arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberFinancialProfile {
    /// Unique member identifier
    pub member_id: String,

    /// Current age in whole years
    #[serde(default)]
    pub age: i32,

    #[serde(default)]
    pub annual_income: f64,

    #[serde(default)]
    pub current_savings: f64,

    /// Stated risk tolerance (None when missing or unrecognised)
    #[serde(default)]
    pub risk_tolerance: Option<RiskTolerance>,

    /// Free-text investment category (e.g. "Equity Fund", "Bonds")
    #[serde(default)]
    pub investment_type: String,

    #[serde(default = "default_retirement_age_goal")]
    pub retirement_age_goal: i32,

    /// Member contribution per period
    #[serde(default)]
    pub contribution_amount: f64,

    #[serde(default)]
    pub contribution_frequency: String,

    #[serde(default)]
    pub employer_contribution: f64,

    /// Member plus employer contributions per year
    #[serde(default)]
    pub total_annual_contribution: f64,

    #[serde(default)]
    pub years_contributed: f64,

    /// Stated annual return, in percent
    #[serde(default)]
    pub annual_return_rate: f64,

    /// Stated volatility, in percent
    #[serde(default)]
    pub volatility: f64,

    /// Diversification score on a 0-100 scale (0 = not reported)
    #[serde(default)]
    pub portfolio_diversity_score: f64,

    #[serde(default)]
    pub projected_pension_amount: f64,

    #[serde(default)]
    pub expected_annual_payout: f64,

    #[serde(default)]
    pub inflation_adjusted_payout: f64,

    #[serde(default)]
    pub years_of_payout: f64,

    /// e.g. "Defined Contribution", "Defined Benefit"
    #[serde(default)]
    pub pension_type: String,

    /// e.g. "Fixed", "Flexible", "Dynamic", "Bucket"
    #[serde(default)]
    pub withdrawal_strategy: String,

    /// Measured equity allocation in percent, when the caller knows it
    #[serde(default)]
    pub equity_allocation: Option<f64>,
}

impl MemberFinancialProfile {
    /// Create a profile with the core planning fields; everything else zeroed
    pub fn new(
        member_id: impl Into<String>,
        age: i32,
        annual_income: f64,
        current_savings: f64,
        risk_tolerance: Option<RiskTolerance>,
        retirement_age_goal: i32,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            age,
            annual_income,
            current_savings,
            risk_tolerance,
            investment_type: String::new(),
            retirement_age_goal,
            contribution_amount: 0.0,
            contribution_frequency: String::new(),
            employer_contribution: 0.0,
            total_annual_contribution: 0.0,
            years_contributed: 0.0,
            annual_return_rate: 0.0,
            volatility: 0.0,
            portfolio_diversity_score: 0.0,
            projected_pension_amount: 0.0,
            expected_annual_payout: 0.0,
            inflation_adjusted_payout: 0.0,
            years_of_payout: 0.0,
            pension_type: String::new(),
            withdrawal_strategy: String::new(),
            equity_allocation: None,
        }
    }

    /// Years until the retirement-age goal (negative once past it)
    pub fn years_to_retirement(&self) -> i32 {
        self.retirement_age_goal - self.age
    }

    pub fn is_retired(&self) -> bool {
        self.age >= self.retirement_age_goal
    }

    /// Annual contribution: total (member + employer) if recorded, else the member amount
    pub fn annual_contribution(&self) -> f64 {
        if self.total_annual_contribution > 0.0 {
            self.total_annual_contribution
        } else {
            self.contribution_amount
        }
    }

    /// Member-specific return if stated, else the supplied fallback
    pub fn assumed_return(&self, fallback: f64) -> f64 {
        if self.annual_return_rate > 0.0 {
            self.annual_return_rate / 100.0
        } else {
            if self.annual_return_rate < 0.0 {
                log::debug!(
                    "member {}: stated return {}% ignored, assuming {}",
                    self.member_id,
                    self.annual_return_rate,
                    fallback
                );
            }
            fallback
        }
    }

    /// Diversity score, treating an unreported (zero) score as neutral
    pub fn diversity_score(&self) -> f64 {
        if self.portfolio_diversity_score > 0.0 {
            self.portfolio_diversity_score
        } else {
            50.0
        }
    }

    /// Reject values the calculations are not defined for
    pub fn validate(&self) -> Result<()> {
        if self.age < 0 {
            return Err(AnalyticsError::invalid_parameter(
                "age",
                format!("must not be negative (member {}, got {})", self.member_id, self.age),
            ));
        }
        if self.retirement_age_goal <= 0 {
            return Err(AnalyticsError::invalid_parameter(
                "retirement_age_goal",
                format!("must be positive (member {}, got {})", self.member_id, self.retirement_age_goal),
            ));
        }
        for (name, value) in [
            ("annual_income", self.annual_income),
            ("current_savings", self.current_savings),
            ("contribution_amount", self.contribution_amount),
            ("total_annual_contribution", self.total_annual_contribution),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(AnalyticsError::invalid_parameter(
                    name,
                    format!("must be a non-negative number (member {}, got {})", self.member_id, value),
                ));
            }
        }
        if self.annual_return_rate <= -100.0 || !self.annual_return_rate.is_finite() {
            return Err(AnalyticsError::invalid_parameter(
                "annual_return_rate",
                format!("must exceed -100% (member {}, got {})", self.member_id, self.annual_return_rate),
            ));
        }
        if let Some(equity) = self.equity_allocation {
            if !(0.0..=100.0).contains(&equity) {
                return Err(AnalyticsError::invalid_parameter(
                    "equity_allocation",
                    format!("must be a percentage in 0..=100 (member {}, got {})", self.member_id, equity),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> MemberFinancialProfile {
    let mut profile = MemberFinancialProfile::new("U1001", 30, 60_000.0, 50_000.0, Some(RiskTolerance::Medium), 65);
    profile.investment_type = "Mixed Fund".to_string();
    profile.contribution_amount = 6_000.0;
    profile.pension_type = "Defined Contribution".to_string();
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tolerance_labels() {
        assert_eq!(RiskTolerance::from_label("Low"), Some(RiskTolerance::Low));
        assert_eq!(RiskTolerance::from_label(" high "), Some(RiskTolerance::High));
        assert_eq!(RiskTolerance::from_label("Moderate"), None);
        assert_eq!(risk_ordinal(None), 2.0);
        assert_eq!(risk_ordinal(Some(RiskTolerance::High)), 3.0);
    }

    #[test]
    fn test_contribution_and_return_fallbacks() {
        let mut profile = sample_profile();
        assert_eq!(profile.annual_contribution(), 6_000.0);
        assert_eq!(profile.assumed_return(0.07), 0.07);

        profile.total_annual_contribution = 9_000.0;
        profile.annual_return_rate = 5.5;
        assert_eq!(profile.annual_contribution(), 9_000.0);
        assert!((profile.assumed_return(0.07) - 0.055).abs() < 1e-12);
    }

    #[test]
    fn test_serde_defaults() {
        let profile: MemberFinancialProfile = serde_json::from_str(r#"{ "member_id": "U1" }"#).unwrap();
        assert_eq!(profile.age, 0);
        assert_eq!(profile.retirement_age_goal, 65);
        assert_eq!(profile.current_savings, 0.0);
        assert!(profile.risk_tolerance.is_none());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut profile = sample_profile();
        profile.age = -1;
        assert!(matches!(profile.validate(), Err(AnalyticsError::InvalidParameterRange { .. })));

        let mut profile = sample_profile();
        profile.annual_return_rate = -100.0;
        assert!(profile.validate().is_err());

        let mut profile = sample_profile();
        profile.current_savings = -5.0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_equity_allocation_range() {
        for bad in [150.0, -1.0, f64::NAN] {
            let mut profile = sample_profile();
            profile.equity_allocation = Some(bad);
            assert!(matches!(profile.validate(), Err(AnalyticsError::InvalidParameterRange { .. })));
        }

        let mut profile = sample_profile();
        profile.equity_allocation = Some(85.0);
        assert!(profile.validate().is_ok());
        profile.equity_allocation = Some(100.0);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_negative_return_uses_default() {
        let mut profile = sample_profile();
        profile.annual_return_rate = -3.0;
        assert!(profile.validate().is_ok());
        assert_eq!(profile.assumed_return(0.07), 0.07);

        profile.annual_return_rate = f64::NAN;
        assert!(profile.validate().is_err());
    }
}

//! Age-based contribution limits

use serde::{Deserialize, Serialize};

/// Statutory limits for workplace plans and IRAs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionLimits {
    /// Standard workplace-plan elective deferral limit
    pub base_limit: f64,
    /// Workplace-plan catch-up amount
    pub catch_up: f64,
    /// Age at which catch-up contributions become available
    pub catch_up_age: i32,
    /// Standard IRA limit
    pub ira_limit: f64,
    /// IRA catch-up amount
    pub ira_catch_up: f64,
}

impl Default for ContributionLimits {
    fn default() -> Self {
        Self {
            base_limit: 23_000.0,
            catch_up: 7_500.0,
            catch_up_age: 50,
            ira_limit: 7_000.0,
            ira_catch_up: 1_000.0,
        }
    }
}

/// Limits resolved for one member's age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitSummary {
    pub standard_401k: f64,
    pub catch_up_401k: f64,
    pub total_401k: f64,
    pub standard_ira: f64,
    pub catch_up_ira: f64,
    pub total_ira: f64,
    pub combined_max: f64,
}

impl ContributionLimits {
    pub fn catch_up_eligible(&self, age: i32) -> bool {
        age >= self.catch_up_age
    }

    /// Maximum workplace-plan contribution for the given age
    pub fn max_contribution(&self, age: i32) -> f64 {
        self.for_age(age).total_401k
    }

    pub fn for_age(&self, age: i32) -> LimitSummary {
        let eligible = self.catch_up_eligible(age);
        let catch_up_401k = if eligible { self.catch_up } else { 0.0 };
        let catch_up_ira = if eligible { self.ira_catch_up } else { 0.0 };
        let total_401k = self.base_limit + catch_up_401k;
        let total_ira = self.ira_limit + catch_up_ira;

        LimitSummary {
            standard_401k: self.base_limit,
            catch_up_401k,
            total_401k,
            standard_ira: self.ira_limit,
            catch_up_ira,
            total_ira,
            combined_max: total_401k + total_ira,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_up_threshold() {
        let limits = ContributionLimits::default();

        assert_eq!(limits.max_contribution(49), 23_000.0);
        assert_eq!(limits.max_contribution(50), 30_500.0);

        let summary = limits.for_age(55);
        assert_eq!(summary.total_ira, 8_000.0);
        assert_eq!(summary.combined_max, 38_500.0);
    }
}

//! Profile lookup seam owned by the persistence layer

use serde::{Deserialize, Serialize};

use super::{MemberFinancialProfile, RiskTolerance};
use crate::error::{AnalyticsError, Result};

/// Source of member profiles
///
/// Implement this trait over whatever store holds member data; the
/// analytics core only ever reads through it.
pub trait MemberProfileProvider {
    /// Fetch a single member, failing with `ProfileNotFound` when absent
    fn find_by_id(&self, member_id: &str) -> Result<MemberFinancialProfile>;

    /// Fetch every member matching the filter
    fn find_all(&self, filter: &ProfileFilter) -> Result<Vec<MemberFinancialProfile>>;
}

/// Population filter used by segmentation and bulk operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFilter {
    pub member_ids: Vec<String>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub income_min: Option<f64>,
    pub income_max: Option<f64>,
    pub risk_tolerances: Vec<RiskTolerance>,
}

impl ProfileFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_age_range(mut self, min: i32, max: i32) -> Self {
        self.age_min = Some(min);
        self.age_max = Some(max);
        self
    }

    pub fn with_income_range(mut self, min: f64, max: f64) -> Self {
        self.income_min = Some(min);
        self.income_max = Some(max);
        self
    }

    pub fn with_risk_tolerances(mut self, tolerances: Vec<RiskTolerance>) -> Self {
        self.risk_tolerances = tolerances;
        self
    }

    pub fn with_member_ids(mut self, ids: Vec<String>) -> Self {
        self.member_ids = ids;
        self
    }

    pub fn matches(&self, profile: &MemberFinancialProfile) -> bool {
        if !self.member_ids.is_empty() && !self.member_ids.iter().any(|id| *id == profile.member_id) {
            return false;
        }
        if self.age_min.is_some_and(|min| profile.age < min) || self.age_max.is_some_and(|max| profile.age > max) {
            return false;
        }
        if self.income_min.is_some_and(|min| profile.annual_income < min)
            || self.income_max.is_some_and(|max| profile.annual_income > max)
        {
            return false;
        }
        if !self.risk_tolerances.is_empty() {
            match profile.risk_tolerance {
                Some(tolerance) if self.risk_tolerances.contains(&tolerance) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Provider over profiles already held in memory (e.g. a loaded CSV extract)
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfiles {
    profiles: Vec<MemberFinancialProfile>,
}

impl InMemoryProfiles {
    pub fn new(profiles: Vec<MemberFinancialProfile>) -> Self {
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl MemberProfileProvider for InMemoryProfiles {
    fn find_by_id(&self, member_id: &str) -> Result<MemberFinancialProfile> {
        self.profiles
            .iter()
            .find(|p| p.member_id == member_id)
            .cloned()
            .ok_or_else(|| AnalyticsError::not_found(member_id))
    }

    fn find_all(&self, filter: &ProfileFilter) -> Result<Vec<MemberFinancialProfile>> {
        Ok(self.profiles.iter().filter(|p| filter.matches(p)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> InMemoryProfiles {
        InMemoryProfiles::new(vec![
            MemberFinancialProfile::new("A", 28, 40_000.0, 5_000.0, Some(RiskTolerance::High), 65),
            MemberFinancialProfile::new("B", 45, 90_000.0, 150_000.0, Some(RiskTolerance::Medium), 65),
            MemberFinancialProfile::new("C", 61, 70_000.0, 300_000.0, None, 65),
        ])
    }

    #[test]
    fn test_find_by_id() {
        let provider = provider();
        assert_eq!(provider.find_by_id("B").unwrap().age, 45);
        assert!(matches!(provider.find_by_id("Z"), Err(AnalyticsError::ProfileNotFound { .. })));
    }

    #[test]
    fn test_filters() {
        let provider = provider();

        let by_age = provider.find_all(&ProfileFilter::all().with_age_range(30, 65)).unwrap();
        assert_eq!(by_age.len(), 2);

        let by_risk = provider
            .find_all(&ProfileFilter::all().with_risk_tolerances(vec![RiskTolerance::High, RiskTolerance::Medium]))
            .unwrap();
        assert_eq!(by_risk.len(), 2);

        let by_income = provider.find_all(&ProfileFilter::all().with_income_range(60_000.0, 80_000.0)).unwrap();
        assert_eq!(by_income.len(), 1);
        assert_eq!(by_income[0].member_id, "C");

        let by_id = provider.find_all(&ProfileFilter::all().with_member_ids(vec!["A".into()])).unwrap();
        assert_eq!(by_id.len(), 1);
    }
}

//! Analytics engine: profile lookup plus dispatch to the pure analytics functions

use rand::Rng;

use crate::alerts::{evaluate_bulk, evaluate_member, BulkRiskReport, MemberRiskReport, RiskLevel};
use crate::allocation::{bulk_optimize, optimize_portfolio, Allocation, BulkOptimization, PortfolioOptimization};
use crate::assumptions::PlanningAssumptions;
use crate::compounding::{retirement_readiness, solve_retirement_age, RetirementAgeOutcome, RetirementReadiness};
use crate::contribution::{
    bulk_plan, plan_contributions, what_if_contributions, BulkContributionPlan, ContributionChange, ContributionPlan,
    ContributionWhatIf,
};
use crate::error::Result;
use crate::profile::{MemberProfileProvider, ProfileFilter};
use crate::segmentation::{segment_members, SegmentationConfig, SegmentationResult};
use crate::simulation::{
    run_monte_carlo, run_what_if_simulation, MonteCarloConfig, MonteCarloResult, SimulationParameters,
    WhatIfSimulation,
};

/// Main analytics engine
///
/// Holds the profile provider and the planning assumptions every operation
/// runs under. Single-member operations fail with `ProfileNotFound` for an
/// unknown id; bulk operations record per-member failures in their result.
pub struct AnalyticsEngine<P: MemberProfileProvider> {
    provider: P,
    assumptions: PlanningAssumptions,
}

impl<P: MemberProfileProvider> AnalyticsEngine<P> {
    /// Create engine with default planning assumptions
    pub fn new(provider: P) -> Self {
        Self::with_assumptions(provider, PlanningAssumptions::default_planning())
    }

    pub fn with_assumptions(provider: P, assumptions: PlanningAssumptions) -> Self {
        Self { provider, assumptions }
    }

    pub fn assumptions(&self) -> &PlanningAssumptions {
        &self.assumptions
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn risk_alerts(&self, member_id: &str) -> Result<MemberRiskReport> {
        let profile = self.provider.find_by_id(member_id)?;
        evaluate_member(&profile, &self.assumptions)
    }

    pub fn bulk_risk_alerts(&self, filter: &ProfileFilter, min_level: Option<RiskLevel>) -> Result<BulkRiskReport> {
        let profiles = self.provider.find_all(filter)?;
        Ok(evaluate_bulk(&profiles, &self.assumptions, min_level))
    }

    pub fn optimize(&self, member_id: &str, current: Option<Allocation>) -> Result<PortfolioOptimization> {
        let profile = self.provider.find_by_id(member_id)?;
        optimize_portfolio(&profile, current, &self.assumptions)
    }

    pub fn bulk_optimize(&self, filter: &ProfileFilter) -> Result<BulkOptimization> {
        let profiles = self.provider.find_all(filter)?;
        Ok(bulk_optimize(&profiles, &self.assumptions))
    }

    pub fn contribution_plan(&self, member_id: &str) -> Result<ContributionPlan> {
        let profile = self.provider.find_by_id(member_id)?;
        plan_contributions(&profile, &self.assumptions)
    }

    pub fn bulk_contribution_plans(&self, filter: &ProfileFilter) -> Result<BulkContributionPlan> {
        let profiles = self.provider.find_all(filter)?;
        Ok(bulk_plan(&profiles, &self.assumptions))
    }

    pub fn what_if_contributions(&self, member_id: &str, changes: &[ContributionChange]) -> Result<ContributionWhatIf> {
        let profile = self.provider.find_by_id(member_id)?;
        what_if_contributions(&profile, changes, &self.assumptions)
    }

    pub fn simulate(&self, member_id: &str, params: &SimulationParameters) -> Result<WhatIfSimulation> {
        let profile = self.provider.find_by_id(member_id)?;
        run_what_if_simulation(&profile, params, &self.assumptions)
    }

    pub fn monte_carlo<R: Rng + ?Sized>(
        &self,
        member_id: &str,
        config: &MonteCarloConfig,
        rng: &mut R,
    ) -> Result<MonteCarloResult> {
        let profile = self.provider.find_by_id(member_id)?;
        run_monte_carlo(&profile, config, &self.assumptions, rng)
    }

    pub fn segment<R: Rng + ?Sized>(
        &self,
        filter: &ProfileFilter,
        config: &SegmentationConfig,
        rng: &mut R,
    ) -> Result<SegmentationResult> {
        let profiles = self.provider.find_all(filter)?;
        segment_members(&profiles, config, rng)
    }

    /// Age at which the member's plan reaches the income-multiple target
    pub fn retirement_age(&self, member_id: &str) -> Result<RetirementAgeOutcome> {
        let profile = self.provider.find_by_id(member_id)?;
        profile.validate()?;
        solve_retirement_age(
            profile.age,
            self.assumptions.target_corpus(profile.annual_income),
            profile.annual_contribution(),
            profile.assumed_return(self.assumptions.default_return),
            profile.current_savings,
        )
    }

    pub fn readiness(&self, member_id: &str, target_retirement_income: Option<f64>) -> Result<RetirementReadiness> {
        let profile = self.provider.find_by_id(member_id)?;
        profile.validate()?;
        Ok(retirement_readiness(&profile, target_retirement_income, &self.assumptions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::profile::{sample_profile, InMemoryProfiles, MemberFinancialProfile, RiskTolerance};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> AnalyticsEngine<InMemoryProfiles> {
        let mut broke = MemberFinancialProfile::new("U2002", 30, 0.0, 0.0, Some(RiskTolerance::High), 65);
        broke.annual_income = 50_000.0;

        let mut mature = MemberFinancialProfile::new("U3003", 58, 120_000.0, 900_000.0, Some(RiskTolerance::Low), 65);
        mature.contribution_amount = 20_000.0;
        mature.total_annual_contribution = 20_000.0;
        mature.investment_type = "Equity Fund".to_string();

        let mut young = MemberFinancialProfile::new("U4004", 24, 42_000.0, 3_000.0, Some(RiskTolerance::High), 65);
        young.contribution_amount = 2_500.0;
        young.total_annual_contribution = 2_500.0;

        AnalyticsEngine::new(InMemoryProfiles::new(vec![sample_profile(), broke, mature, young]))
    }

    #[test]
    fn test_unknown_member() {
        let engine = engine();
        assert!(matches!(engine.risk_alerts("NOPE"), Err(AnalyticsError::ProfileNotFound { .. })));
        assert!(matches!(
            engine.simulate("NOPE", &SimulationParameters::default()),
            Err(AnalyticsError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_single_member_dispatch() {
        let engine = engine();

        let plan = engine.contribution_plan("U1001").unwrap();
        assert_eq!(plan.member_id, "U1001");

        let optimization = engine.optimize("U1001", None).unwrap();
        assert_abs_diff_eq!(optimization.recommended_allocation.total(), 100.0, epsilon = 1e-9);

        let simulation = engine.simulate("U1001", &SimulationParameters::default()).unwrap();
        assert_eq!(simulation.stress_tests.len(), 7);

        let mut rng = StdRng::seed_from_u64(5);
        let monte_carlo = engine
            .monte_carlo("U1001", &MonteCarloConfig::default().with_simulations(100), &mut rng)
            .unwrap();
        assert_eq!(monte_carlo.simulations, 100);
    }

    #[test]
    fn test_retirement_age() {
        let engine = engine();

        // 50k at 7% plus 6k a year passes 600k in year 24
        let outcome = engine.retirement_age("U1001").unwrap();
        assert_eq!(outcome.age(), Some(54));

        let outcome = engine.retirement_age("U2002").unwrap();
        assert!(!outcome.is_reachable());
        assert!(outcome.into_result(30, 500_000.0).is_err());
    }

    #[test]
    fn test_bulk_dispatch() {
        let engine = engine();
        let all = ProfileFilter::all();

        let report = engine.bulk_risk_alerts(&all, None).unwrap();
        assert_eq!(report.evaluated_members, 4);

        let optimizations = engine.bulk_optimize(&all).unwrap();
        assert_eq!(optimizations.optimizations.len(), 4);

        let mut rng = StdRng::seed_from_u64(11);
        let config = SegmentationConfig {
            cluster_count: 2,
            ..Default::default()
        };
        let segments = engine.segment(&all, &config, &mut rng).unwrap();
        assert_eq!(segments.total_members, 4);

        let filtered = engine
            .bulk_contribution_plans(&ProfileFilter::all().with_age_range(50, 70))
            .unwrap();
        assert_eq!(filtered.plans.len(), 1);
    }
}

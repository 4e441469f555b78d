//! Pension Analytics - Retirement analytics engine for pension plan members
//!
//! This library provides:
//! - Compounding math, retirement-age solving and readiness scoring
//! - K-means member segmentation with cluster labels and advisor guidance
//! - Age-based allocation optimization and rebalancing trades
//! - Rule-based personalized risk alerts
//! - Contribution scenario planning and what-if analysis
//! - Parameter-grid what-if simulation, stress tests and Monte Carlo projection

pub mod error;
pub mod assumptions;
pub mod profile;
pub mod compounding;
pub mod scenario;
pub mod segmentation;
pub mod allocation;
pub mod alerts;
pub mod contribution;
pub mod simulation;
pub mod engine;

// Re-export commonly used types
pub use error::{AnalyticsError, MemberFailure, Result};
pub use assumptions::{ContributionLimits, PlanningAssumptions};
pub use profile::{InMemoryProfiles, MemberFinancialProfile, MemberProfileProvider, ProfileFilter, RiskTolerance};
pub use compounding::{future_value, solve_retirement_age, RetirementAgeOutcome};
pub use scenario::{Scenario, ScenarioParameters, ScenarioResults, ScenarioRunner};
pub use segmentation::{segment_members, SegmentationConfig, SegmentationResult};
pub use allocation::{optimize_portfolio, Allocation, PortfolioOptimization};
pub use alerts::{evaluate_member, MemberRiskReport, RiskAlert, RiskAlertType, RiskLevel};
pub use contribution::{plan_contributions, ContributionChange, ContributionPlan};
pub use simulation::{run_monte_carlo, run_what_if_simulation, MonteCarloConfig, SimulationParameters};
pub use engine::AnalyticsEngine;

//! Risk alert evaluator
//!
//! Six independent rule checks run over a single profile:
//! 1. **Withdrawal rate**: retired members under the income replacement target
//! 2. **Asset allocation**: equity exposure far from the age-based target
//! 3. **Savings gap**: projected corpus below the income-multiple target
//! 4. **Market risk**: heavy equity close to retirement
//! 5. **Inflation risk**: conservative allocation with a long horizon
//! 6. **Longevity risk**: retirees drawing down too fast
//!
//! Results are aggregated into a member risk level; bulk runs isolate
//! per-member failures.

mod checks;
mod evaluator;
mod types;

pub use checks::{
    check_asset_allocation, check_inflation_risk, check_longevity_risk, check_market_risk, check_savings_gap,
    check_withdrawal_rate, recommended_equity, CheckFn, CHECKS,
};
pub(crate) use checks::format_currency;
pub use evaluator::{
    action_items, evaluate_bulk, evaluate_member, overall_risk_level, run_checks, AlertSummary, BulkRiskReport,
    MemberRiskReport, RiskDistribution,
};
pub use types::{ActionItem, Priority, RiskAlert, RiskAlertType, RiskLevel, Severity};

//! Per-member evaluation, aggregation and bulk runs

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assumptions::PlanningAssumptions;
use crate::error::{split_outcomes, MemberFailure, Result};
use crate::profile::MemberFinancialProfile;

use super::checks::CHECKS;
use super::types::{ActionItem, Priority, RiskAlert, RiskAlertType, RiskLevel, Severity};

/// Alert counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[RiskAlert]) -> Self {
        let count = |severity: Severity| alerts.iter().filter(|a| a.severity == severity).count();
        Self {
            total_alerts: alerts.len(),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRiskReport {
    pub member_id: String,
    pub risk_level: RiskLevel,
    pub alerts: Vec<RiskAlert>,
    pub summary: AlertSummary,
    pub action_items: Vec<ActionItem>,
}

/// Run every check against one profile
pub fn run_checks(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Vec<RiskAlert> {
    CHECKS
        .iter()
        .filter_map(|(_, check)| check(profile, assumptions))
        .collect()
}

/// CRITICAL with two or more HIGH alerts, HIGH with one, MEDIUM with two MEDIUM, else LOW
pub fn overall_risk_level(alerts: &[RiskAlert]) -> RiskLevel {
    let summary = AlertSummary::from_alerts(alerts);
    if summary.high >= 2 {
        RiskLevel::Critical
    } else if summary.high >= 1 {
        RiskLevel::High
    } else if summary.medium >= 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Follow-ups for the alert types present; a maintenance item when none apply
pub fn action_items(alerts: &[RiskAlert]) -> Vec<ActionItem> {
    let has = |alert_type: RiskAlertType| alerts.iter().any(|a| a.alert_type == alert_type);
    let mut items = Vec::new();

    if has(RiskAlertType::WithdrawalRate) {
        items.push(ActionItem::new(
            Priority::High,
            "Income Planning",
            "Review retirement income strategy immediately",
            "Within 30 days",
        ));
    }
    if has(RiskAlertType::SavingsGap) {
        items.push(ActionItem::new(
            Priority::High,
            "Savings Strategy",
            "Increase retirement contributions",
            "Next payroll cycle",
        ));
    }
    if has(RiskAlertType::AssetAllocation) {
        items.push(ActionItem::new(
            Priority::Medium,
            "Portfolio Management",
            "Rebalance investment allocation",
            "Within 60 days",
        ));
    }
    if has(RiskAlertType::MarketRisk) {
        items.push(ActionItem::new(
            Priority::High,
            "Risk Management",
            "Implement de-risking strategy",
            "Within 90 days",
        ));
    }

    if items.is_empty() {
        items.push(ActionItem::new(
            Priority::Low,
            "Maintenance",
            "Continue current strategy with periodic reviews",
            "Annual review",
        ));
    }

    items
}

/// Evaluate one member
pub fn evaluate_member(profile: &MemberFinancialProfile, assumptions: &PlanningAssumptions) -> Result<MemberRiskReport> {
    profile.validate()?;

    let alerts = run_checks(profile, assumptions);
    let risk_level = overall_risk_level(&alerts);

    log::debug!(
        "member {}: {} alerts, risk level {}",
        profile.member_id,
        alerts.len(),
        risk_level.as_str()
    );

    Ok(MemberRiskReport {
        member_id: profile.member_id.clone(),
        risk_level,
        summary: AlertSummary::from_alerts(&alerts),
        action_items: action_items(&alerts),
        alerts,
    })
}

/// Member counts and rounded percentages per risk level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub counts: BTreeMap<RiskLevel, usize>,
    pub percentages: BTreeMap<RiskLevel, f64>,
}

impl RiskDistribution {
    pub fn from_reports(reports: &[MemberRiskReport]) -> Self {
        let total = reports.len();
        let mut counts = BTreeMap::new();
        let mut percentages = BTreeMap::new();

        for level in RiskLevel::ALL {
            let count = reports.iter().filter(|r| r.risk_level == level).count();
            let pct = if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64 * 100.0).round()
            };
            counts.insert(level, count);
            percentages.insert(level, pct);
        }

        Self { counts, percentages }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRiskReport {
    /// Members evaluated successfully, before level filtering
    pub evaluated_members: usize,
    /// Reports at or above the requested minimum level
    pub reports: Vec<MemberRiskReport>,
    pub errors: Vec<MemberFailure>,
    /// Distribution over every evaluated member
    pub distribution: RiskDistribution,
}

/// Evaluate many members in parallel
///
/// Failed members are recorded in `errors`. `min_level` keeps only members at
/// or above that aggregate level.
pub fn evaluate_bulk(
    profiles: &[MemberFinancialProfile],
    assumptions: &PlanningAssumptions,
    min_level: Option<RiskLevel>,
) -> BulkRiskReport {
    let outcomes: Vec<_> = profiles
        .par_iter()
        .map(|profile| (profile.member_id.clone(), evaluate_member(profile, assumptions)))
        .collect();

    let (evaluated, errors) = split_outcomes(outcomes);
    let distribution = RiskDistribution::from_reports(&evaluated);
    let evaluated_members = evaluated.len();

    let reports: Vec<MemberRiskReport> = match min_level {
        Some(min) => evaluated.into_iter().filter(|r| r.risk_level >= min).collect(),
        None => evaluated,
    };

    log::info!(
        "evaluated {} members: {} reported, {} failed",
        evaluated_members,
        reports.len(),
        errors.len()
    );

    BulkRiskReport {
        evaluated_members,
        reports,
        errors,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{sample_profile, RiskTolerance};

    fn alert(severity: Severity) -> RiskAlert {
        RiskAlert::new(RiskAlertType::SavingsGap, severity, "t", "d")
    }

    #[test]
    fn test_overall_level() {
        assert_eq!(overall_risk_level(&[]), RiskLevel::Low);
        assert_eq!(overall_risk_level(&[alert(Severity::Medium)]), RiskLevel::Low);
        assert_eq!(overall_risk_level(&[alert(Severity::Medium), alert(Severity::Medium)]), RiskLevel::Medium);
        assert_eq!(overall_risk_level(&[alert(Severity::High), alert(Severity::Medium)]), RiskLevel::High);
        assert_eq!(overall_risk_level(&[alert(Severity::High), alert(Severity::High)]), RiskLevel::Critical);
    }

    #[test]
    fn test_near_retiree_is_critical() {
        let mut profile = MemberFinancialProfile::new("U2", 62, 80_000.0, 400_000.0, Some(RiskTolerance::Low), 65);
        profile.equity_allocation = Some(85.0);

        let report = evaluate_member(&profile, &PlanningAssumptions::default_planning()).unwrap();
        let allocation = report
            .alerts
            .iter()
            .find(|a| a.alert_type == RiskAlertType::AssetAllocation)
            .unwrap();

        assert_eq!(allocation.severity, Severity::High);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert!(report.action_items.iter().any(|i| i.category == "Risk Management"));
    }

    #[test]
    fn test_all_zero_profile_does_not_fail() {
        let profile = MemberFinancialProfile::new("Z", 0, 0.0, 0.0, None, 65);
        let report = evaluate_member(&profile, &PlanningAssumptions::default_planning()).unwrap();
        assert_eq!(report.summary.total_alerts, report.alerts.len());
        assert!(report
            .alerts
            .iter()
            .all(|a| a.metrics.values().all(|v| v.is_finite())));
    }

    #[test]
    fn test_quiet_member_gets_maintenance_item() {
        let items = action_items(&[]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].priority, Priority::Low);
        assert_eq!(items[0].timeline, "Annual review");
    }

    #[test]
    fn test_bulk_filter_and_errors() {
        let mut critical = MemberFinancialProfile::new("C", 62, 80_000.0, 400_000.0, Some(RiskTolerance::Low), 65);
        critical.equity_allocation = Some(85.0);
        let mut broken = sample_profile();
        broken.member_id = "BAD".to_string();
        broken.annual_income = f64::NAN;

        let report = evaluate_bulk(
            &[sample_profile(), critical, broken],
            &PlanningAssumptions::default_planning(),
            Some(RiskLevel::High),
        );

        assert_eq!(report.evaluated_members, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.reports.len(), 1);
        assert_eq!(report.reports[0].member_id, "C");
        assert_eq!(report.distribution.counts[&RiskLevel::Critical], 1);
        assert_eq!(report.distribution.percentages[&RiskLevel::Critical], 50.0);
    }
}

//! Prioritized contribution advice

use serde::{Deserialize, Serialize};

use crate::alerts::{format_currency, Priority};
use crate::assumptions::PlanningAssumptions;
use crate::profile::MemberFinancialProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub action: String,
    pub impact: String,
}

impl ContributionRecommendation {
    fn new(priority: Priority, category: &str, title: &str, description: &str, action: String, impact: &str) -> Self {
        Self {
            priority,
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            action,
            impact: impact.to_string(),
        }
    }
}

/// Share of income that goes into `amount`; zero without income
fn rate_of_income(amount: f64, annual_income: f64) -> f64 {
    if annual_income > 0.0 {
        amount / annual_income
    } else {
        0.0
    }
}

/// Advice driven by savings rate, employer match uptake and age bracket
pub fn contribution_recommendations(
    profile: &MemberFinancialProfile,
    assumptions: &PlanningAssumptions,
) -> Vec<ContributionRecommendation> {
    let income = profile.annual_income;
    let contribution_rate = rate_of_income(profile.annual_contribution(), income);
    let member_rate = rate_of_income(profile.contribution_amount, income);
    let employer_rate = rate_of_income(profile.employer_contribution, income);

    let mut recommendations = Vec::new();

    if contribution_rate < 0.03 {
        recommendations.push(ContributionRecommendation::new(
            Priority::High,
            "Immediate Action",
            "Start Emergency Contributions",
            "Current savings rate is critically low",
            "Increase to at least 6% of income immediately".to_string(),
            "Foundation for retirement security",
        ));
    }

    if employer_rate > 0.0 && member_rate < employer_rate {
        recommendations.push(ContributionRecommendation::new(
            Priority::High,
            "Free Money",
            "Maximize Employer Match",
            "Not taking full advantage of employer matching",
            format!("Contribute at least {:.0}% to get full match", employer_rate * 100.0),
            "Immediate 100% return on investment",
        ));
    }

    if profile.age < 30 {
        recommendations.push(ContributionRecommendation::new(
            Priority::Medium,
            "Early Career",
            "Leverage Time Advantage",
            "You have decades for compound growth",
            "Target 10-15% savings rate with aggressive allocation".to_string(),
            "Maximize long-term growth potential",
        ));
    } else if assumptions.limits.catch_up_eligible(profile.age) {
        recommendations.push(ContributionRecommendation::new(
            Priority::High,
            "Catch-Up Strategy",
            "Utilize Catch-Up Contributions",
            "Take advantage of higher contribution limits",
            format!(
                "Consider contributing up to {}",
                format_currency(assumptions.limits.max_contribution(profile.age))
            ),
            "Accelerate retirement savings in final years",
        ));
    }

    if contribution_rate < 0.10 {
        recommendations.push(ContributionRecommendation::new(
            Priority::Medium,
            "Savings Rate",
            "Increase Contribution Rate",
            "Current savings rate may not meet retirement goals",
            "Gradually increase to 10-15% of income".to_string(),
            "Significantly improve retirement readiness",
        ));
    }

    recommendations.push(ContributionRecommendation::new(
        Priority::Medium,
        "Tax Strategy",
        "Optimize Tax Benefits",
        "Review tax-advantaged account strategies",
        "Consider Roth vs Traditional based on current vs future tax rates".to_string(),
        "Maximize after-tax retirement income",
    ));

    recommendations
}

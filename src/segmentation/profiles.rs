//! Cluster statistics, descriptive labels and advisor guidance

use serde::{Deserialize, Serialize};

use super::features::{MemberFeatures, AGE, INCOME, RISK, SAVINGS};

/// Summary statistics of one raw feature within a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    /// Upper-middle element of the sorted values
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            median: sorted[sorted.len() / 2],
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Per-feature statistics over a cluster's members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub count: usize,
    pub age: FeatureStats,
    pub annual_income: FeatureStats,
    pub current_savings: FeatureStats,
    pub risk_tolerance: FeatureStats,
}

impl ClusterProfile {
    pub fn from_members(members: &[MemberFeatures]) -> Self {
        let column = |j: usize| -> Vec<f64> { members.iter().map(|m| m.vector[j]).collect() };

        Self {
            count: members.len(),
            age: FeatureStats::from_values(&column(AGE)),
            annual_income: FeatureStats::from_values(&column(INCOME)),
            current_savings: FeatureStats::from_values(&column(SAVINGS)),
            risk_tolerance: FeatureStats::from_values(&column(RISK)),
        }
    }
}

/// Descriptive segment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterLabel {
    #[serde(rename = "High Capacity Savers")]
    HighCapacitySavers,
    #[serde(rename = "High Income, Low Savings")]
    HighIncomeLowSavings,
    #[serde(rename = "Aggressive & Underfunded")]
    AggressiveUnderfunded,
    #[serde(rename = "Conservative & Funded")]
    ConservativeFunded,
    #[serde(rename = "Balanced")]
    Balanced,
    #[serde(rename = "Empty Cluster")]
    Empty,
}

impl ClusterLabel {
    pub const ALL: [ClusterLabel; 6] = [
        ClusterLabel::HighCapacitySavers,
        ClusterLabel::HighIncomeLowSavings,
        ClusterLabel::AggressiveUnderfunded,
        ClusterLabel::ConservativeFunded,
        ClusterLabel::Balanced,
        ClusterLabel::Empty,
    ];

    /// Display text; matches the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::HighCapacitySavers => "High Capacity Savers",
            ClusterLabel::HighIncomeLowSavings => "High Income, Low Savings",
            ClusterLabel::AggressiveUnderfunded => "Aggressive & Underfunded",
            ClusterLabel::ConservativeFunded => "Conservative & Funded",
            ClusterLabel::Balanced => "Balanced",
            ClusterLabel::Empty => "Empty Cluster",
        }
    }

    /// Label a cluster against the population medians
    ///
    /// Rules are evaluated in order; the first match wins.
    pub fn classify(profile: &ClusterProfile, median_income: f64, median_savings: f64) -> Self {
        if profile.count == 0 {
            return ClusterLabel::Empty;
        }

        let income = profile.annual_income.mean;
        let savings = profile.current_savings.mean;
        let risk = profile.risk_tolerance.mean;

        let high_income = income >= median_income;
        let high_savings = savings >= median_savings;

        if high_savings && high_income {
            ClusterLabel::HighCapacitySavers
        } else if high_income {
            ClusterLabel::HighIncomeLowSavings
        } else if risk >= 2.5 && !high_savings {
            ClusterLabel::AggressiveUnderfunded
        } else if risk <= 1.5 && high_savings {
            ClusterLabel::ConservativeFunded
        } else {
            ClusterLabel::Balanced
        }
    }

    /// Advisor talking points for members in this segment
    pub fn guidance(&self) -> AdvisorGuidance {
        let (description, actions, risks): (&str, &[&str], &[&str]) = match self {
            ClusterLabel::HighCapacitySavers => (
                "High earners with substantial savings - ideal candidates for advanced planning",
                &[
                    "Offer premium investment products and private banking services",
                    "Discuss tax-efficient strategies and estate planning",
                    "Present alternative investment opportunities",
                ],
                &["Market volatility impact on large portfolios"],
            ),
            ClusterLabel::HighIncomeLowSavings => (
                "High earners who need help with savings discipline and budgeting",
                &[
                    "Implement automatic contribution increases",
                    "Provide budgeting and expense management tools",
                    "Set up aggressive catch-up contribution schedules",
                ],
                &["Lifestyle inflation", "Insufficient retirement savings"],
            ),
            ClusterLabel::AggressiveUnderfunded => (
                "High risk tolerance but low savings - need balance between growth and security",
                &[
                    "Educate on risk management and diversification",
                    "Increase contribution rates before taking more risk",
                    "Consider target-date funds for automatic rebalancing",
                ],
                &["Excessive risk taking", "Inadequate emergency funds"],
            ),
            ClusterLabel::ConservativeFunded => (
                "Well-funded conservatives who may be too risk-averse for long-term growth",
                &[
                    "Gradually introduce growth-oriented investments",
                    "Explain inflation risk of overly conservative allocations",
                    "Consider inflation-protected government bonds",
                ],
                &["Inflation erosion", "Insufficient growth for retirement goals"],
            ),
            ClusterLabel::Balanced => (
                "Balanced members with moderate risk and savings profiles",
                &[
                    "Regular portfolio reviews and rebalancing",
                    "Gradual contribution increases with salary growth",
                    "Education on lifecycle investing strategies",
                ],
                &["Complacency", "Not adjusting strategy with life changes"],
            ),
            ClusterLabel::Empty => ("No members in this cluster", &[], &[]),
        };

        AdvisorGuidance {
            description: description.to_string(),
            actions: actions.iter().map(|s| s.to_string()).collect(),
            risks: risks.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorGuidance {
    pub description: String,
    pub actions: Vec<String>,
    pub risks: Vec<String>,
}

/// Median with averaging of the two middle values for even counts
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(count: usize, income: f64, savings: f64, risk: f64) -> ClusterProfile {
        let stats = |mean: f64| FeatureStats { mean, median: mean, min: mean, max: mean };
        ClusterProfile {
            count,
            age: stats(40.0),
            annual_income: stats(income),
            current_savings: stats(savings),
            risk_tolerance: stats(risk),
        }
    }

    #[test]
    fn test_feature_stats() {
        let stats = FeatureStats::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(FeatureStats::from_values(&[]), FeatureStats::default());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_label_rules() {
        let (mi, ms) = (60_000.0, 100_000.0);
        assert_eq!(ClusterLabel::classify(&profile(5, 80_000.0, 150_000.0, 2.0), mi, ms), ClusterLabel::HighCapacitySavers);
        assert_eq!(ClusterLabel::classify(&profile(5, 80_000.0, 50_000.0, 2.0), mi, ms), ClusterLabel::HighIncomeLowSavings);
        assert_eq!(ClusterLabel::classify(&profile(5, 40_000.0, 50_000.0, 2.8), mi, ms), ClusterLabel::AggressiveUnderfunded);
        assert_eq!(ClusterLabel::classify(&profile(5, 40_000.0, 150_000.0, 1.2), mi, ms), ClusterLabel::ConservativeFunded);
        assert_eq!(ClusterLabel::classify(&profile(5, 40_000.0, 50_000.0, 2.0), mi, ms), ClusterLabel::Balanced);
        assert_eq!(ClusterLabel::classify(&profile(0, 0.0, 0.0, 0.0), mi, ms), ClusterLabel::Empty);
    }

    #[test]
    fn test_guidance() {
        assert!(ClusterLabel::Empty.guidance().actions.is_empty());
        assert_eq!(ClusterLabel::HighIncomeLowSavings.guidance().risks.len(), 2);
        assert_eq!(ClusterLabel::Balanced.as_str(), "Balanced");
    }

    #[test]
    fn test_label_serializes_as_display_text() {
        assert_eq!(
            serde_json::to_string(&ClusterLabel::HighCapacitySavers).unwrap(),
            "\"High Capacity Savers\""
        );
        for label in ClusterLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
            let parsed: ClusterLabel = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, label);
        }
    }
}

//! Feature extraction and z-score standardization

use serde::{Deserialize, Serialize};

use crate::profile::{risk_ordinal, MemberFinancialProfile, RiskTolerance};

/// Number of clustering features: age, income, savings, risk ordinal
pub const FEATURE_COUNT: usize = 4;

pub type FeatureVector = [f64; FEATURE_COUNT];

pub const AGE: usize = 0;
pub const INCOME: usize = 1;
pub const SAVINGS: usize = 2;
pub const RISK: usize = 3;

/// Raw (unstandardized) features of one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFeatures {
    pub member_id: String,
    pub risk_tolerance: Option<RiskTolerance>,
    pub vector: FeatureVector,
}

impl MemberFeatures {
    pub fn from_profile(profile: &MemberFinancialProfile) -> Self {
        Self {
            member_id: profile.member_id.clone(),
            risk_tolerance: profile.risk_tolerance,
            vector: [
                profile.age as f64,
                profile.annual_income,
                profile.current_savings,
                risk_ordinal(profile.risk_tolerance),
            ],
        }
    }

    pub fn age(&self) -> f64 {
        self.vector[AGE]
    }

    pub fn annual_income(&self) -> f64 {
        self.vector[INCOME]
    }

    pub fn current_savings(&self) -> f64 {
        self.vector[SAVINGS]
    }

    pub fn risk_ordinal(&self) -> f64 {
        self.vector[RISK]
    }
}

/// Population mean and standard deviation per feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub means: FeatureVector,
    pub std_devs: FeatureVector,
}

impl FeatureScaler {
    /// Fit on a population; a zero standard deviation is replaced by 1
    pub fn fit(points: &[FeatureVector]) -> Self {
        let mut means = [0.0; FEATURE_COUNT];
        let mut std_devs = [1.0; FEATURE_COUNT];

        if points.is_empty() {
            return Self { means, std_devs };
        }

        let n = points.len() as f64;
        for j in 0..FEATURE_COUNT {
            means[j] = points.iter().map(|p| p[j]).sum::<f64>() / n;
            let variance = points.iter().map(|p| (p[j] - means[j]).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            std_devs[j] = if std_dev > 0.0 { std_dev } else { 1.0 };
        }

        Self { means, std_devs }
    }

    pub fn transform(&self, point: &FeatureVector) -> FeatureVector {
        let mut scaled = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            scaled[j] = (point[j] - self.means[j]) / self.std_devs[j];
        }
        scaled
    }
}

/// Z-score every feature using population statistics
pub fn standardize(points: &[FeatureVector]) -> Vec<FeatureVector> {
    let scaler = FeatureScaler::fit(points);
    points.iter().map(|p| scaler.transform(p)).collect()
}

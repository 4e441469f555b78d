//! Member segmentation
//!
//! Reduces each member to `[age, income, savings, risk ordinal]`, z-scores the
//! population, clusters it with K-means and describes every cluster:
//! 1. **Features**: raw vectors and standardization (`features`)
//! 2. **Clustering**: seeded K-means with a hard round cap (`kmeans`)
//! 3. **Profiling**: per-cluster statistics, labels and advisor guidance (`profiles`)

pub mod features;
pub mod kmeans;
mod profiles;

pub use features::{standardize, FeatureScaler, FeatureVector, MemberFeatures};
pub use kmeans::{kmeans, KMeansResult, DEFAULT_MAX_ITERATIONS};
pub use profiles::{median, AdvisorGuidance, ClusterLabel, ClusterProfile, FeatureStats};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::MemberFinancialProfile;

/// Clustering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub cluster_count: usize,
    pub max_iterations: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            cluster_count: 4,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// One segment of the population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub label: ClusterLabel,
    pub members: Vec<MemberFeatures>,
    pub profile: ClusterProfile,
    pub guidance: AdvisorGuidance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub member_id: String,
    pub cluster: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationResult {
    pub clusters: Vec<Cluster>,
    pub assignments: Vec<ClusterAssignment>,
    pub total_members: usize,
    pub cluster_count: usize,
    pub iterations: usize,
    pub converged: bool,
    pub median_income: f64,
    pub median_savings: f64,
}

impl SegmentationResult {
    /// Members of one cluster, highest savings first
    pub fn cluster_members(&self, cluster_id: usize) -> Vec<&MemberFeatures> {
        let mut members: Vec<&MemberFeatures> = self
            .clusters
            .iter()
            .find(|c| c.id == cluster_id)
            .map(|c| c.members.iter().collect())
            .unwrap_or_default();
        members.sort_by(|a, b| b.current_savings().total_cmp(&a.current_savings()));
        members
    }
}

/// Segment a member population into `config.cluster_count` clusters
pub fn segment_members<R: Rng + ?Sized>(
    profiles: &[MemberFinancialProfile],
    config: &SegmentationConfig,
    rng: &mut R,
) -> Result<SegmentationResult> {
    let features: Vec<MemberFeatures> = profiles.iter().map(MemberFeatures::from_profile).collect();
    let raw: Vec<FeatureVector> = features.iter().map(|f| f.vector).collect();
    let standardized = standardize(&raw);

    let clustering = kmeans(&standardized, config.cluster_count, config.max_iterations, rng)?;

    let incomes: Vec<f64> = features.iter().map(|f| f.annual_income()).collect();
    let savings: Vec<f64> = features.iter().map(|f| f.current_savings()).collect();
    let median_income = median(&incomes);
    let median_savings = median(&savings);

    let mut grouped: Vec<Vec<MemberFeatures>> = vec![Vec::new(); config.cluster_count];
    for (member, &label) in features.iter().zip(&clustering.labels) {
        grouped[label].push(member.clone());
    }

    let clusters: Vec<Cluster> = grouped
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            let profile = ClusterProfile::from_members(&members);
            let label = ClusterLabel::classify(&profile, median_income, median_savings);
            Cluster {
                id,
                label,
                guidance: label.guidance(),
                members,
                profile,
            }
        })
        .collect();

    let assignments = features
        .iter()
        .zip(&clustering.labels)
        .map(|(f, &cluster)| ClusterAssignment {
            member_id: f.member_id.clone(),
            cluster,
        })
        .collect();

    log::info!(
        "segmented {} members into {} clusters ({} iterations)",
        features.len(),
        config.cluster_count,
        clustering.iterations
    );

    Ok(SegmentationResult {
        clusters,
        assignments,
        total_members: features.len(),
        cluster_count: config.cluster_count,
        iterations: clustering.iterations,
        converged: clustering.converged,
        median_income,
        median_savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::profile::RiskTolerance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population() -> Vec<MemberFinancialProfile> {
        vec![
            MemberFinancialProfile::new("A", 25, 40_000.0, 5_000.0, Some(RiskTolerance::High), 65),
            MemberFinancialProfile::new("B", 27, 42_000.0, 8_000.0, Some(RiskTolerance::High), 65),
            MemberFinancialProfile::new("C", 29, 45_000.0, 6_000.0, Some(RiskTolerance::High), 65),
            MemberFinancialProfile::new("D", 58, 140_000.0, 900_000.0, Some(RiskTolerance::Low), 65),
            MemberFinancialProfile::new("E", 60, 150_000.0, 950_000.0, Some(RiskTolerance::Low), 65),
            MemberFinancialProfile::new("F", 62, 135_000.0, 880_000.0, Some(RiskTolerance::Low), 65),
        ]
    }

    #[test]
    fn test_segment_two_groups() {
        let config = SegmentationConfig { cluster_count: 2, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(11);
        let result = segment_members(&population(), &config, &mut rng).unwrap();

        assert_eq!(result.total_members, 6);
        assert_eq!(result.clusters.len(), 2);

        let young = result.assignments.iter().find(|a| a.member_id == "A").unwrap().cluster;
        let old = result.assignments.iter().find(|a| a.member_id == "E").unwrap().cluster;
        assert_ne!(young, old);

        assert_eq!(result.clusters[old].label, ClusterLabel::HighCapacitySavers);
        assert_eq!(result.clusters[young].label, ClusterLabel::AggressiveUnderfunded);
        assert_eq!(result.clusters[old].profile.count, 3);
        assert_eq!(result.clusters[old].profile.age.min, 58.0);

        let ordered = result.cluster_members(old);
        assert_eq!(ordered[0].member_id, "E");
        assert_eq!(ordered[2].member_id, "F");
    }

    #[test]
    fn test_single_cluster_holds_everyone() {
        let config = SegmentationConfig { cluster_count: 1, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(0);
        let result = segment_members(&population(), &config, &mut rng).unwrap();

        assert_eq!(result.clusters[0].members.len(), 6);
        assert!(result.assignments.iter().all(|a| a.cluster == 0));
    }

    #[test]
    fn test_too_few_members() {
        let config = SegmentationConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let err = segment_members(&population()[..3], &config, &mut rng).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientMembers { required: 4, available: 3 }));
    }
}

//! K-means clustering with injectable randomness

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::features::{FeatureVector, FEATURE_COUNT};
use crate::error::{AnalyticsError, Result};

/// Default cap on assignment/update rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansResult {
    /// Cluster index for each input point
    pub labels: Vec<usize>,
    pub centroids: Vec<FeatureVector>,
    /// Rounds executed (including the round that detected convergence)
    pub iterations: usize,
    pub converged: bool,
}

pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Partition `points` into `k` clusters
///
/// Initial centroids are `k` distinct points drawn uniformly from `rng`.
/// Empty clusters keep their previous centroid.
pub fn kmeans<R: Rng + ?Sized>(
    points: &[FeatureVector],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<KMeansResult> {
    if k == 0 {
        return Err(AnalyticsError::invalid_parameter("cluster_count", "must be at least 1"));
    }
    if points.len() < k {
        return Err(AnalyticsError::InsufficientMembers {
            required: k,
            available: points.len(),
        });
    }

    let mut centroids: Vec<FeatureVector> = index::sample(rng, points.len(), k)
        .iter()
        .map(|i| points[i])
        .collect();

    let mut labels: Option<Vec<usize>> = None;
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..max_iterations {
        iterations += 1;
        let new_labels = assign(points, &centroids);

        if labels.as_ref() == Some(&new_labels) {
            converged = true;
            break;
        }

        update_centroids(points, &new_labels, &mut centroids);
        labels = Some(new_labels);
    }

    let labels = labels.unwrap_or_else(|| assign(points, &centroids));

    log::debug!(
        "k-means: {} points, k={}, {} iterations, converged={}",
        points.len(),
        k,
        iterations,
        converged
    );

    Ok(KMeansResult {
        labels,
        centroids,
        iterations,
        converged,
    })
}

/// Index of the nearest centroid for every point (ties go to the lower index)
fn assign(points: &[FeatureVector], centroids: &[FeatureVector]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut closest = 0;
            let mut min_distance = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let distance = euclidean_distance(point, centroid);
                if distance < min_distance {
                    min_distance = distance;
                    closest = c;
                }
            }
            closest
        })
        .collect()
}

fn update_centroids(points: &[FeatureVector], labels: &[usize], centroids: &mut [FeatureVector]) {
    let k = centroids.len();
    let mut sums = vec![[0.0; FEATURE_COUNT]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for j in 0..FEATURE_COUNT {
            sums[label][j] += point[j];
        }
    }

    for c in 0..k {
        if counts[c] == 0 {
            continue;
        }
        for j in 0..FEATURE_COUNT {
            centroids[c][j] = sums[c][j] / counts[c] as f64;
        }
    }
}

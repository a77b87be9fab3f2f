//! Groups regions whose time series have a similar shape.
//!
//! Each region's series is min-max scaled on its own before k-means, so
//! clusters reflect the course over time rather than the absolute level.

use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seaforge_core::model::ParameterFrame;
use seaforge_schemas::region::RegionKey;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Scaled series of every region without missing values, in region order.
#[derive(Debug, Clone)]
pub struct ScaledSeries {
    pub regions: Vec<RegionKey>,
    pub points: Vec<Vec<f64>>,
}

/// Rescales `values` to `[0, 1]`. A constant series maps to zeros.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range > 0.0 {
        values.iter().map(|v| (v - min) / range).collect()
    } else {
        vec![0.0; values.len()]
    }
}

impl ScaledSeries {
    pub fn from_frame(frame: &ParameterFrame) -> Self {
        let mut regions = Vec::new();
        let mut points = Vec::new();
        for (region, values) in &frame.columns {
            if values.iter().any(|v| v.is_nan()) {
                warn!(%region, parameter = %frame.parameter, "Skipping region with missing values");
                continue;
            }
            regions.push(*region);
            points.push(min_max_scale(values));
        }
        Self { regions, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        })
}

/// Result of one k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster of each input point. Cluster 0 has the highest mean centroid.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances of the points to their centroid.
    pub inertia: f64,
    pub iterations: usize,
}

/// Lloyd's k-means with k-means++ seeding.
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            max_iterations: 300,
            seed,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn initial_centroids(&self, points: &[Vec<f64>], rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let mut centroids = vec![points[rng.random_range(0..points.len())].clone()];
        while centroids.len() < self.k {
            let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
            let total: f64 = weights.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                weights
                    .iter()
                    .position(|&w| {
                        target -= w;
                        target < 0.0
                    })
                    .unwrap_or(points.len() - 1)
            } else {
                // every point already coincides with a centroid
                rng.random_range(0..points.len())
            };
            centroids.push(points[next].clone());
        }
        centroids
    }

    pub fn fit(&self, points: &[Vec<f64>]) -> Result<KMeansFit> {
        if self.k == 0 {
            bail!("k-means needs at least one cluster");
        }
        if points.len() < self.k {
            bail!("Cannot form {} clusters from {} series", self.k, points.len());
        }
        let dimension = points[0].len();
        if points.iter().any(|p| p.len() != dimension) {
            bail!("All series must have the same length for clustering");
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut centroids = self.initial_centroids(points, &mut rng);
        let mut labels = vec![usize::MAX; points.len()];
        let max_iterations = self.max_iterations.max(1);
        let mut iterations = 0;

        while iterations < max_iterations {
            iterations += 1;
            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(points) {
                let (cluster, _) = nearest(point, &centroids);
                if *label != cluster {
                    *label = cluster;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = vec![vec![0.0; dimension]; self.k];
            let mut counts = vec![0usize; self.k];
            for (&label, point) in labels.iter().zip(points) {
                counts[label] += 1;
                for (sum, value) in sums[label].iter_mut().zip(point) {
                    *sum += value;
                }
            }
            for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
                // an empty cluster keeps its previous centroid
                if count > 0 {
                    *centroid = sum.into_iter().map(|s| s / count as f64).collect();
                }
            }
        }
        debug!(k = self.k, iterations, "k-means finished");

        Ok(relabel(points, centroids, labels, iterations))
    }
}

/// Orders clusters by descending centroid mean so labels do not depend on
/// the seeding order.
fn relabel(
    points: &[Vec<f64>],
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    iterations: usize,
) -> KMeansFit {
    let mean = |c: &Vec<f64>| c.iter().sum::<f64>() / c.len().max(1) as f64;
    let mut order: Vec<usize> = (0..centroids.len()).collect();
    order.sort_by(|&a, &b| mean(&centroids[b]).total_cmp(&mean(&centroids[a])));

    let mut new_label = vec![0; centroids.len()];
    for (new, &old) in order.iter().enumerate() {
        new_label[old] = new;
    }
    let labels: Vec<usize> = labels.into_iter().map(|l| new_label[l]).collect();
    let centroids: Vec<Vec<f64>> = order.iter().map(|&old| centroids[old].clone()).collect();
    let inertia = labels
        .iter()
        .zip(points)
        .map(|(&l, p)| squared_distance(p, &centroids[l]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

/// Inertia for every k in `1..=max_k` that the data supports.
pub fn elbow(points: &[Vec<f64>], max_k: usize, seed: u64, max_iterations: usize) -> Result<Vec<(usize, f64)>> {
    (1..=max_k.min(points.len()))
        .map(|k| {
            let fit = KMeans::new(k, seed)
                .with_max_iterations(max_iterations)
                .fit(points)?;
            Ok((k, fit.inertia))
        })
        .collect()
}

/// Cluster of every clustered region.
pub fn assignments(series: &ScaledSeries, fit: &KMeansFit) -> BTreeMap<RegionKey, usize> {
    series
        .regions
        .iter()
        .copied()
        .zip(fit.labels.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seaforge_schemas::{parameter::Parameter, region::LmeId, time::TimeKey};

    fn rising(offset: f64) -> Vec<f64> {
        (0..12).map(|i| offset + i as f64).collect()
    }

    fn falling(offset: f64) -> Vec<f64> {
        (0..12).map(|i| offset - i as f64).collect()
    }

    #[test]
    fn scaling_maps_to_unit_interval() {
        for (scaled, expected) in min_max_scale(&[2.0, 4.0, 3.0]).into_iter().zip([0.0, 1.0, 0.5]) {
            assert_relative_eq!(scaled, expected, epsilon = 1e-12);
        }
        assert_eq!(min_max_scale(&[5.0, 5.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn regions_with_missing_values_are_skipped() {
        let key = |n| RegionKey::lme(LmeId::new(n).unwrap());
        let frame = ParameterFrame {
            parameter: Parameter::SeaweedGrowthRate,
            index: (0..3).map(TimeKey::Month).collect(),
            columns: [
                (key(1), vec![0.1, 0.2, 0.3]),
                (key(2), vec![0.1, f64::NAN, 0.3]),
            ]
            .into_iter()
            .collect(),
        };
        let series = ScaledSeries::from_frame(&frame);
        assert_eq!(series.regions, vec![key(1)]);
        for (scaled, expected) in series.points[0].iter().zip([0.0, 0.5, 1.0]) {
            assert_relative_eq!(*scaled, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn shapes_are_separated() {
        let points: Vec<Vec<f64>> = [rising(0.0), rising(10.0), falling(5.0), falling(50.0)]
            .iter()
            .map(|s| min_max_scale(s))
            .collect();
        let fit = KMeans::new(2, 1).fit(&points).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[2], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[2]);
        assert_relative_eq!(fit.inertia, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn same_seed_gives_same_clusters() {
        let points: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![(i % 7) as f64 / 7.0, (i % 3) as f64 / 3.0])
            .collect();
        let a = KMeans::new(3, 99).fit(&points).unwrap();
        let b = KMeans::new(3, 99).fit(&points).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn elbow_sweeps_supported_k() {
        let points: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, 0.0]).collect();
        let curve = elbow(&points, 5, 3, 100).unwrap();
        assert_eq!(curve.iter().map(|c| c.0).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        // one cluster: total squared deviation from the mean 5.5
        assert_relative_eq!(curve[0].1, 143.0, epsilon = 1e-9);
        assert!(curve[4].1 < curve[0].1);

        let single = elbow(&points[..2], 5, 3, 100).unwrap();
        assert_eq!(single.len(), 2);
        assert_relative_eq!(single[1].1, 0.0);
    }

    #[test]
    fn too_few_series_is_an_error() {
        assert!(KMeans::new(3, 0).fit(&[vec![1.0], vec![2.0]]).is_err());
    }
}

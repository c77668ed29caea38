use std::fmt;
use std::str::FromStr;

use kmeans_lab::distance::Distance;
use kmeans_lab::Float;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand;
use ndarray_rand::rand::distributions::{Distribution, WeightedIndex};
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use thiserror::Error;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
/// Specifies centroid initialization algorithm for KMeans.
pub enum KMeansInit {
    /// Pick random points as centroids.
    #[default]
    Random,
    /// Start from a random point, then keep adding the point that lies farthest from every
    /// centroid chosen so far. Ties go to the earliest point.
    FarthestFirst,
    /// K-means++ algorithm. Start from a random point, then sample the following centroids
    /// with a probability proportional to their squared distance from the closest centroid
    /// chosen so far.
    KMeansPlusPlus,
    /// Centroids are placed by the caller one at a time, the number of clusters follows the
    /// number of placed centroids.
    Manual,
}

impl KMeansInit {
    /// All initialization methods, in the order a control panel lists them.
    pub const ALL: [KMeansInit; 4] = [
        KMeansInit::Random,
        KMeansInit::FarthestFirst,
        KMeansInit::KMeansPlusPlus,
        KMeansInit::Manual,
    ];

    pub fn is_manual(&self) -> bool {
        matches!(self, KMeansInit::Manual)
    }

    /// Runs the chosen initialization routine. Returns `None` for `Manual`, whose centroids are
    /// supplied from outside.
    ///
    /// Callers guarantee `1 <= n_clusters <= observations.nrows()`.
    pub(crate) fn run<F: Float, D: Distance<F>>(
        &self,
        dist_fn: &D,
        n_clusters: usize,
        observations: ArrayView2<F>,
        rng: &mut impl Rng,
    ) -> Option<Array2<F>> {
        match self {
            Self::Random => Some(random_init(n_clusters, observations, rng)),
            Self::FarthestFirst => Some(farthest_first(dist_fn, n_clusters, observations, rng)),
            Self::KMeansPlusPlus => Some(k_means_plusplus(dist_fn, n_clusters, observations, rng)),
            Self::Manual => None,
        }
    }
}

impl fmt::Display for KMeansInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Random => "Random",
            Self::FarthestFirst => "Farthest First",
            Self::KMeansPlusPlus => "KMeans++",
            Self::Manual => "Manual",
        };
        f.write_str(label)
    }
}

/// An unknown initialization method label
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown initialization method `{0}`")]
pub struct ParseInitError(pub String);

impl FromStr for KMeansInit {
    type Err = ParseInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "random" => Ok(Self::Random),
            "farthestfirst" => Ok(Self::FarthestFirst),
            "kmeans++" | "kmeansplusplus" => Ok(Self::KMeansPlusPlus),
            "manual" => Ok(Self::Manual),
            _ => Err(ParseInitError(s.to_string())),
        }
    }
}

// Sampling distinct indices is the same as shuffling and taking the first `n_clusters`.
fn random_init<F: Float>(
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, _) = observations.dim();
    let indices = rand::seq::index::sample(rng, n_samples, n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

fn farthest_first<F: Float, D: Distance<F>>(
    dist_fn: &D,
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let first = rng.gen_range(0..observations.nrows());
    farthest_first_from(dist_fn, first, n_clusters, observations)
}

/// Farthest-first traversal seeded with the point at index `first`.
pub(crate) fn farthest_first_from<F: Float, D: Distance<F>>(
    dist_fn: &D,
    first: usize,
    n_clusters: usize,
    observations: ArrayView2<F>,
) -> Array2<F> {
    let mut chosen = vec![first];
    let mut dists = Array1::from_elem(observations.nrows(), F::infinity());

    while chosen.len() < n_clusters {
        let newest = observations.row(chosen[chosen.len() - 1]);
        update_min_dists(dist_fn, newest, observations, &mut dists);

        chosen.push(farthest_index(&dists));
    }
    observations.select(Axis(0), &chosen)
}

fn k_means_plusplus<F: Float, D: Distance<F>>(
    dist_fn: &D,
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let n_samples = observations.nrows();
    let mut chosen = vec![rng.gen_range(0..n_samples)];
    let mut dists = Array1::from_elem(n_samples, F::infinity());

    while chosen.len() < n_clusters {
        let newest = observations.row(chosen[chosen.len() - 1]);
        update_min_dists(dist_fn, newest, observations, &mut dists);

        let max_dist = dists[farthest_index(&dists)];
        let next = if max_dist.is_infinite() {
            // distances overflowed, the farthest points outweigh every other one
            farthest_index(&dists)
        } else if max_dist > F::zero() {
            // scaled into [0, 1] so that the total weight stays finite
            let weights = dists.mapv(|d| {
                let scaled = d / max_dist;
                scaled * scaled
            });
            match WeightedIndex::<F>::new(weights.iter()) {
                Ok(index) => index.sample(rng),
                Err(_) => rng.gen_range(0..n_samples),
            }
        } else {
            // every point sits on a chosen centroid
            rng.gen_range(0..n_samples)
        };
        chosen.push(next);
    }
    observations.select(Axis(0), &chosen)
}

// Index of the largest entry of `dists`, the earliest one on ties.
fn farthest_index<F: Float>(dists: &Array1<F>) -> usize {
    let mut farthest = 0;
    for (idx, &dist) in dists.iter().enumerate() {
        if dist > dists[farthest] {
            farthest = idx;
        }
    }
    farthest
}

// Lowers each entry of `dists` to the distance from `centroid` where that is closer.
fn update_min_dists<F: Float, D: Distance<F>>(
    dist_fn: &D,
    centroid: ndarray::ArrayView1<F>,
    observations: ArrayView2<F>,
    dists: &mut Array1<F>,
) {
    for (observation, dist) in observations.rows().into_iter().zip(dists.iter_mut()) {
        let d = dist_fn.distance(observation, centroid);
        if d < *dist {
            *dist = d;
        }
    }
}

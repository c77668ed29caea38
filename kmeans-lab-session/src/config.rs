use std::time::Duration;

use kmeans_lab_clustering::{KMeansInit, DEFAULT_MAX_N_ITERATIONS, DEFAULT_TOLERANCE};
use kmeans_lab_datasets::PointDistribution;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Number of clusters of a fresh session, also restored when leaving `Manual` without any.
pub const DEFAULT_N_CLUSTERS: usize = 3;

/// Delay between two auto-play steps unless configured otherwise.
pub const DEFAULT_PLAY_INTERVAL: Duration = Duration::from_millis(500);

/// Settings of an interactive session, mirroring the control panel.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Number of clusters for the automatic initialization methods
    pub n_clusters: usize,
    pub init: KMeansInit,
    /// Size of the datasets generated by `new_dataset` callers that use the defaults
    pub n_points: usize,
    pub distribution: PointDistribution,
    pub tolerance: f64,
    /// Cap of a run to convergence
    pub max_n_iterations: u64,
    pub play_interval: Duration,
    /// Seed of the session random generator. `None` draws one from system entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_N_CLUSTERS,
            init: KMeansInit::Random,
            n_points: 200,
            distribution: PointDistribution::Uniform,
            tolerance: DEFAULT_TOLERANCE,
            max_n_iterations: DEFAULT_MAX_N_ITERATIONS,
            play_interval: DEFAULT_PLAY_INTERVAL,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_init(mut self, init: KMeansInit) -> Self {
        self.init = init;
        self
    }

    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = n_points;
        self
    }

    pub fn with_distribution(mut self, distribution: PointDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.max_n_iterations = max_n_iterations;
        self
    }

    pub fn with_play_interval(mut self, play_interval: Duration) -> Self {
        self.play_interval = play_interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

use crate::KMeansParamsError;

use super::init::KMeansInit;
use kmeans_lab::distance::Distance;
use kmeans_lab::{Float, ParamGuard};
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Centroids moving less than this between two iterations count as converged.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Iteration ceiling used when running to convergence.
pub const DEFAULT_MAX_N_ITERATIONS: u64 = 100;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The set of hyperparameters that can be specified for the execution of
/// the [K-means engine](crate::KMeansEngine).
pub struct KMeansValidParams<F: Float, R: Rng, D: Distance<F>> {
    /// An iteration is considered converged if every centroid moved by at most
    /// `tolerance` (euclidean distance) during it.
    tolerance: F,
    /// Callers running the engine to convergence stop after `max_n_iterations`
    /// iterations even if the `tolerance` convergence condition has not been met.
    /// The engine itself never caps its iterations.
    max_n_iterations: u64,
    /// The number of clusters we will be looking for. Ignored by `Manual`
    /// initialization, where it follows the number of placed centroids.
    n_clusters: usize,
    /// The initialization strategy used to initialize the centroids.
    init: KMeansInit,
    /// The random number generator
    rng: R,
    /// Distance metric used in the centroid assignment step
    dist_fn: D,
}

#[derive(Clone, Debug, PartialEq)]
/// An helper struct used to construct a set of [valid hyperparameters](KMeansValidParams) for
/// the [K-means engine](crate::KMeansEngine) (using the builder pattern).
pub struct KMeansParams<F: Float, R: Rng, D: Distance<F>>(KMeansValidParams<F, R, D>);

impl<F: Float, R: Rng, D: Distance<F>> KMeansParams<F, R, D> {
    /// `new` lets us configure our engine parameters:
    /// * we will be looking for `n_clusters` clusters;
    /// * an iteration is converged if no centroid moved by more than `tolerance`;
    /// * running to convergence gives up after `max_n_iterations` iterations.
    ///
    /// Defaults are provided if optional parameters are not specified:
    /// * `tolerance = 1e-6`
    /// * `max_n_iterations = 100`
    /// * `init = Random`
    pub fn new(n_clusters: usize, rng: R, dist_fn: D) -> Self {
        Self(KMeansValidParams {
            tolerance: F::cast(DEFAULT_TOLERANCE),
            max_n_iterations: DEFAULT_MAX_N_ITERATIONS,
            n_clusters,
            init: KMeansInit::Random,
            rng,
            dist_fn,
        })
    }

    /// Change the value of `tolerance`
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Change the value of `max_n_iterations`
    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Change the value of `init`
    pub fn init_method(mut self, init: KMeansInit) -> Self {
        self.0.init = init;
        self
    }

    /// Change the value of `n_clusters`
    pub fn n_clusters(mut self, n_clusters: usize) -> Self {
        self.0.n_clusters = n_clusters;
        self
    }
}

impl<F: Float, R: Rng, D: Distance<F>> ParamGuard for KMeansParams<F, R, D> {
    type Checked = KMeansValidParams<F, R, D>;
    type Error = KMeansParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_clusters == 0 && !self.0.init.is_manual() {
            Err(KMeansParamsError::NClusters)
        } else if self.0.tolerance.is_nan() || self.0.tolerance <= F::zero() {
            Err(KMeansParamsError::Tolerance)
        } else if self.0.max_n_iterations == 0 {
            Err(KMeansParamsError::MaxIterations)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, R: Rng, D: Distance<F>> KMeansValidParams<F, R, D> {
    /// Maximum centroid movement of a converged iteration.
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    /// Iteration ceiling for callers running the engine to convergence.
    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    /// The number of clusters requested for automatic initialization.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster initialization strategy
    pub fn init_method(&self) -> KMeansInit {
        self.init
    }

    /// Returns the random generator
    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Returns the distance metric
    pub fn dist_fn(&self) -> &D {
        &self.dist_fn
    }
}

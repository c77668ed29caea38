//! `kmeans-lab-datasets` generates the point clouds the playground clusters.
//!
//! ## The Big Picture
//!
//! `kmeans-lab-datasets` is a crate in the `kmeans-lab` workspace. Every dataset is a
//! `(n_points, 2)` matrix of coordinates inside the unit square, ready to be handed to a
//! `KMeansEngine`.
//!
//! ## Current State
//!
//! Two distributions are provided:
//!
//! * [`PointDistribution::Uniform`]: independent uniform draws per axis
//! * [`PointDistribution::Gaussian`]: points dealt round-robin to three fixed blob centers,
//!   jittered with a small normal noise
//!
//! ```
//! use kmeans_lab_datasets::PointDistribution;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_isaac::Isaac64Rng;
//!
//! let mut rng = Isaac64Rng::seed_from_u64(42);
//! let points = PointDistribution::Gaussian.generate(200, &mut rng).unwrap();
//! assert_eq!(points.dim(), (200, 2));
//! ```

pub mod generate;

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use thiserror::Error;

/// An error when generating a dataset
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("standard deviation must be finite and non-negative, got {0}")]
    StdDev(f64),
    #[error("at least one blob center is required")]
    NoBlobCenters,
    #[error("unknown point distribution `{0}`")]
    UnknownDistribution(String),
}

/// How the points of a fresh dataset are spread over the unit square
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PointDistribution {
    #[default]
    Uniform,
    Gaussian,
}

impl PointDistribution {
    /// Draw `n_points` points from this distribution.
    pub fn generate(
        self,
        n_points: usize,
        rng: &mut impl Rng,
    ) -> Result<Array2<f64>, DatasetError> {
        match self {
            Self::Uniform => Ok(generate::uniform(n_points, rng)),
            Self::Gaussian => generate::gaussian_blobs(
                n_points,
                &generate::blob_centers(),
                generate::BLOB_STD_DEV,
                rng,
            ),
        }
    }
}

impl fmt::Display for PointDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::Gaussian => f.write_str("gaussian"),
        }
    }
}

impl FromStr for PointDistribution {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "gaussian" => Ok(Self::Gaussian),
            _ => Err(DatasetError::UnknownDistribution(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::Isaac64Rng;

    #[test]
    fn parse_labels() {
        assert_eq!("uniform".parse(), Ok(PointDistribution::Uniform));
        assert_eq!("Gaussian".parse(), Ok(PointDistribution::Gaussian));
        assert_eq!(
            "poisson".parse::<PointDistribution>(),
            Err(DatasetError::UnknownDistribution("poisson".to_string()))
        );
    }

    #[test]
    fn empty_datasets_are_allowed() {
        let mut rng = Isaac64Rng::seed_from_u64(0);
        for dist in &[PointDistribution::Uniform, PointDistribution::Gaussian] {
            assert_eq!(dist.generate(0, &mut rng).unwrap().dim(), (0, 2));
        }
    }

    #[test]
    fn same_seed_same_points() {
        let a = PointDistribution::Gaussian
            .generate(50, &mut Isaac64Rng::seed_from_u64(7))
            .unwrap();
        let b = PointDistribution::Gaussian
            .generate(50, &mut Isaac64Rng::seed_from_u64(7))
            .unwrap();
        assert_eq!(a, b);
    }
}

//! Distance metrics used to assign points to centroids
//!
use ndarray::{ArrayView1, Zip};

use crate::Float;

/// A single point, one row of an observation or centroid matrix
pub type Point<'a, F> = ArrayView1<'a, F>;

// Should satisfy triangle inequality (no squared Euclidean)
pub trait Distance<F: Float>: Clone + Send + Sync {
    // Panics if a and b are not of equal dimension
    fn distance(&self, a: Point<F>, b: Point<F>) -> F;

    // Fast distance metric that keeps the order of the distance function
    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        self.distance(a, b)
    }
}

/// Euclidean distance
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: Point<F>, b: Point<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        assert_eq!(a.len(), b.len(), "points must share a dimension");
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &a, &b| {
            let diff = a - b;
            acc + diff * diff
        })
    }
}

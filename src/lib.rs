//! `kmeans-lab` is a playground for watching K-means clustering converge, one Lloyd iteration
//! at a time.
//!
//! ## The big picture
//!
//! The workspace is split the way classical ML toolkits usually are:
//!
//! * `kmeans-lab` (this crate) holds what every other crate shares: the [`Float`] bound,
//!   the [`ParamGuard`](param_guard::ParamGuard) hyperparameter checking trait, distance
//!   metrics and the crate-wide [`Error`](error::Error).
//! * `kmeans-lab-clustering` provides the steppable K-means engine together with its four
//!   centroid initialization strategies (random, farthest-first, k-means++ and manual).
//! * `kmeans-lab-datasets` generates the synthetic point clouds the playground starts from.
//! * `kmeans-lab-session` wraps the engine in a run-state machine (step, play, pause,
//!   converge, reset) that a user interface can drive and observe.
//!

pub mod distance;
pub mod error;
mod float;
pub mod param_guard;
pub mod prelude;

pub use float::Float;
pub use param_guard::ParamGuard;

use ndarray::{ArrayBase, Data, Dimension};

/// Returns an error naming `what` if any element of `values` is NaN or infinite.
pub fn ensure_finite<F: Float, S: Data<Elem = F>, I: Dimension>(
    values: &ArrayBase<S, I>,
    what: &'static str,
) -> error::Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(error::Error::NonFinite(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn finite_values_pass() {
        assert!(ensure_finite(&array![[0.0, 1.0], [0.5, 0.5]], "points").is_ok());
    }

    #[test]
    fn nan_is_rejected() {
        let res = ensure_finite(&array![[0.0, f64::NAN]], "points");
        assert!(matches!(res, Err(error::Error::NonFinite("points"))));
    }
}

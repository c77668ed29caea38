//! `kmeans-lab-clustering` provides a K-means engine that can be driven one Lloyd iteration
//! at a time.
//!
//! ## The big picture
//!
//! `kmeans-lab-clustering` is the algorithmic heart of the `kmeans-lab` workspace. It knows
//! nothing about timers, user interfaces or rendering: it owns a point set and a list of
//! centroids and exposes the individual steps of the algorithm (initialization, assignment,
//! update) together with read-only views of its state.
//!
//! ## Current state
//!
//! * [K-Means](KMeansEngine) with an explicit, steppable convergence loop
//! * centroid initialization by [random sampling, farthest-first traversal, k-means++ or
//!   manual placement](KMeansInit)
//!
//! Implementation choices and a tutorial can be found in the documentation of
//! [`KMeansEngine`].
mod k_means;

pub use k_means::*;

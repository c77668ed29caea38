//! `kmeans-lab-session` turns the K-means engine into an interactive playground.
//!
//! ## The Big Picture
//!
//! A [`Session`] holds a dataset, a [`KMeansEngine`](kmeans_lab_clustering::KMeansEngine)
//! over it and the state of the current run. It is what a control panel talks to: generate a
//! dataset, place centroids by hand, step, run to convergence, reset. After every change the
//! session hands an owned [`Snapshot`] to its [`Observer`], and tells it about noteworthy
//! events with a [`Notification`].
//!
//! [`SessionController`] wraps a session behind a lock and adds auto-play: a tokio task that
//! steps the session at a fixed interval until it converges or is paused.
//!
//! ## Current State
//!
//! The crate also ships the `kmeans-lab` binary, which drives a controller from the command
//! line and prints the resulting clusters.

mod config;
mod controller;
mod error;
pub mod observer;
mod session;
mod snapshot;

pub use config::*;
pub use controller::SessionController;
pub use error::{Result, SessionError};
pub use observer::{Level, Notification, Observer, TracingObserver};
pub use session::*;
pub use snapshot::*;

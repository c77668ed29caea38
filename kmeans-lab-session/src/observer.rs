//! The rendering and notification side of a session.
//!
//! A [`Session`](crate::Session) calls [`Observer::render`] after every change of its state
//! and [`Observer::notify`] whenever the control panel would show a toast. Both are called
//! with the session locked: an observer must not call back into the session.

use std::fmt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::Snapshot;

/// How a notification should be presented
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// Something worth telling the user about
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    DatasetGenerated { n_points: usize },
    /// `iterations` counts the iterations of the operation that converged: the whole run
    /// for single steps and auto-play, the call alone for a run to convergence.
    Converged { iterations: u64 },
    AlreadyConverged,
    /// `iterations` counts the iterations of the run to convergence that gave up
    MaxIterationsReached { iterations: u64 },
    Reset,
    /// A rejected operation, carrying the error message
    Error(String),
}

impl Notification {
    pub fn level(&self) -> Level {
        match self {
            Self::DatasetGenerated { .. } | Self::Converged { .. } => Level::Success,
            Self::AlreadyConverged | Self::MaxIterationsReached { .. } | Self::Reset => Level::Info,
            Self::Error(_) => Level::Error,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatasetGenerated { n_points } => write!(f, "Generated {} points", n_points),
            Self::Converged { iterations } => write!(f, "Converged in {} iterations", iterations),
            Self::AlreadyConverged => f.write_str("Already converged"),
            Self::MaxIterationsReached { iterations } => write!(
                f,
                "Stopped after {} iterations without converging",
                iterations
            ),
            Self::Reset => f.write_str("Reset"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

pub trait Observer: Send + Sync {
    fn render(&self, _snapshot: &Snapshot) {}

    fn notify(&self, _notification: &Notification) {}
}

/// Forwards renders and notifications to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn render(&self, snapshot: &Snapshot) {
        tracing::trace!(
            iteration = snapshot.state.iteration,
            converged = snapshot.state.converged,
            playing = snapshot.state.playing,
            n_points = snapshot.points.len(),
            n_centroids = snapshot.centroids.len(),
            "render"
        );
    }

    fn notify(&self, notification: &Notification) {
        match notification.level() {
            Level::Error => tracing::warn!("{}", notification),
            Level::Info | Level::Success => tracing::info!("{}", notification),
        }
    }
}

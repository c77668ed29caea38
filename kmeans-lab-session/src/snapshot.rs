use kmeans_lab_clustering::{KMeansEngine, KMeansInit};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A point as handed to the rendering side. `cluster` is `None` until the first assignment.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub cluster: Option<usize>,
}

/// A centroid; its index in [`Snapshot::centroids`] is the cluster label.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

/// Progress of the current run. `playing` implies `!converged`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunState {
    /// Iterations performed since the last (re-)initialization
    pub iteration: u64,
    pub converged: bool,
    pub playing: bool,
}

/// Owned copy of everything a renderer draws.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub points: Vec<Point>,
    pub centroids: Vec<Centroid>,
    pub state: RunState,
    pub method: KMeansInit,
}

impl Snapshot {
    pub(crate) fn new(engine: Option<&KMeansEngine<f64>>, state: RunState, method: KMeansInit) -> Self {
        let (points, centroids) = match engine {
            Some(engine) => (
                engine
                    .observations()
                    .rows()
                    .into_iter()
                    .zip(engine.memberships())
                    .map(|(row, &cluster)| Point {
                        x: row[0],
                        y: row[1],
                        cluster,
                    })
                    .collect(),
                engine
                    .centroids()
                    .rows()
                    .into_iter()
                    .map(|row| Centroid { x: row[0], y: row[1] })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        Snapshot {
            points,
            centroids,
            state,
            method,
        }
    }

    /// Number of points carrying each cluster label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for cluster in self.points.iter().filter_map(|p| p.cluster) {
            sizes[cluster] += 1;
        }
        sizes
    }
}

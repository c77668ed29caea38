use thiserror::Error;

/// An error when building the engine with an invalid hyperparameter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KMeansParamsError {
    #[error("n_clusters cannot be 0 unless centroids are placed manually")]
    NClusters,
    #[error("tolerance must be greater than 0")]
    Tolerance,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
}

/// An error when driving the K-means engine
#[derive(Error, Debug, Clone)]
pub enum KMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] KMeansParamsError),
    /// When centroids are requested for a dataset without points
    #[error("Cannot initialize centroids: the dataset is empty")]
    EmptyDataset,
    /// When more centroids are requested than there are points to seed them from
    #[error("Cannot pick {n_clusters} centroids from {n_points} points")]
    TooManyClusters { n_clusters: usize, n_points: usize },
    /// When centroids are supplied by hand to an automatically seeded engine
    #[error("Centroids can only be placed by hand with the Manual initialization method")]
    NotManual,
    #[error(transparent)]
    LabError(#[from] kmeans_lab::error::Error),
}

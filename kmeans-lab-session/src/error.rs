use kmeans_lab_clustering::{KMeansError, KMeansParamsError};
use kmeans_lab_datasets::DatasetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// An operation the session refused. The session state is left as it was.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] KMeansParamsError),
    #[error(transparent)]
    KMeans(#[from] KMeansError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("Generate a dataset first")]
    NoDataset,
    #[error("Place at least one centroid first")]
    NoCentroids,
    #[error("Centroids can only be placed by hand with the Manual initialization method")]
    NotManual,
    #[error("The number of clusters follows the placed centroids in Manual mode")]
    ManualClusterCount,
    #[error("Auto-play needs a running tokio runtime")]
    NoRuntime,
}

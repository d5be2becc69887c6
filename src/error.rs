use thiserror::Error;

/// Possible errors that arise when constructing, running or reusing a clustering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusteringError {
    #[error("Minimum cluster size is too small, it must be at least 1")]
    MinClusterSizeTooSmall,

    #[error("Length of data ({len}) is less than the minimum cluster size ({min_cluster_size})")]
    DataTooShort { len: usize, min_cluster_size: usize },

    #[error("Input vectors have mismatched dimensions: {0}")]
    WrongDimension(String),

    #[error("Non finite coordinate: {0}")]
    NonFiniteCoordinate(String),

    #[error("Sample of {sample} rows is below the minimum cluster size ({min_cluster_size})")]
    SampleTooSmall { sample: usize, min_cluster_size: usize },

    #[error("Unknown score mode: {0}")]
    UnknownScoreMode(String),

    #[error("Clustering has already been run, build a new clustering to run again")]
    AlreadyRun,

    #[error("No clusters")]
    NoClusters,

    #[error("Cluster {cluster_id} has {children} child clusters, but forks must be binary")]
    NonBinaryFork { cluster_id: usize, children: usize },

    #[error("Nearest neighbour search failed: {0}")]
    NearestNeighbour(String),
}

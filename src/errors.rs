use thiserror::Error;

pub type Result<T> = std::result::Result<T, KMeansError>;

/// An error when building an invalid set of hyperparameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KMeansParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("tolerance must be greater than 0")]
    Tolerance,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
}

/// An error when fitting a k-means model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("invalid hyperparameter: {0}")]
    InvalidParams(#[from] KMeansParamsError),
    /// The one hard precondition of the whole engine
    #[error("n_clusters ({n_clusters}) cannot exceed the number of points ({n_samples})")]
    TooManyClusters { n_clusters: usize, n_samples: usize },
    /// When precomputed centroids disagree with the data or `n_clusters`
    #[error("precomputed centroids have shape ({found_rows}, {found_cols}), expected ({expected_rows}, {expected_cols})")]
    CentroidShape {
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
    /// When per-point labels don't line up with the data
    #[error("{found} labels supplied for {expected} points")]
    LabelCount { expected: usize, found: usize },
}

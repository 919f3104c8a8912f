//! Partitioning of unlabeled observations with Lloyd's algorithm.
//!
//! The crate implements the standard (naive) k-means algorithm with
//! k-means++ seeding, best-of-N run selection, optional per-feature
//! standardization, cluster-quality scoring (sum-of-squared-error and
//! silhouette) and out-of-sample prediction.
//!
//! ## The algorithm
//!
//! K-means is an iterative algorithm: it progressively refines the choice of
//! centroids. It is guaranteed to terminate, even though it might not find
//! the optimal set of centroids (it can get stuck in a local minimum;
//! finding the global minimum is NP-hard). There are three steps:
//! - initialisation: select initial centroids with one of the strategies in
//!   [`CentroidInit`];
//! - assignment: assign each observation to the nearest centroid;
//! - update: recompute the centroid of each cluster.
//!
//! Assignment and update repeat in a loop until the largest centroid
//! movement falls below `tolerance` or `max_n_iterations` is reached.
//! Because the outcome depends on the random seeding, the whole loop is run
//! `n_runs` times and the run with the lowest sum of squared errors wins.
//!
//! The iteration only touches the data through a [`Variant`], which pairs a
//! distance metric with a centroid aggregation rule: [`L2Mean`] is standard
//! k-means, [`L1Median`] is k-medians. Randomness comes from an explicitly
//! passed, seedable generator, so fits are reproducible.
//!
//! ## Example
//!
//! ```
//! use kmeans_clusterer::KMeans;
//! use ndarray::array;
//!
//! let data = array![[1.0, 1.0], [1.5, 2.0], [8.0, 8.0], [9.0, 9.5]];
//!
//! let model = KMeans::params(2).fit(&data).unwrap();
//!
//! assert_eq!(model.clusters().len(), 2);
//! // New observations go to the nearest centroid of the fitted model
//! let assignments = model.predict(&array![[1.2, 1.4], [8.5, 9.0]]);
//! assert_ne!(assignments[0], assignments[1]);
//! ```

mod algorithm;
mod distance;
mod errors;
mod generate;
mod hyperparams;
mod init;
mod metrics;
mod model;
mod scaling;

pub use distance::{L1Median, L2Mean, Variant};
pub use errors::{KMeansError, KMeansParamsError, Result};
pub use generate::{generate_blob, generate_blobs};
pub use hyperparams::{KMeansParams, KMeansValidParams};
pub use init::CentroidInit;
pub use model::{Cluster, KMeans, KMedians, Point, StopReason};
pub use scaling::Standardizer;

use ndarray::NdFloat;
use num_traits::{FromPrimitive, NumCast, Signed};

/// Floating point numbers the engine can operate on.
///
/// Implemented for `f32` and `f64`.
pub trait Float:
    NdFloat + FromPrimitive + Signed + Default + std::iter::Sum + approx::AbsDiffEq<Epsilon = Self>
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}
impl Float for f64 {}

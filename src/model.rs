use std::time::Duration;

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix2};
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

use crate::algorithm::argmin;
use crate::distance::{L1Median, L2Mean, Variant};
use crate::hyperparams::KMeansParams;
use crate::scaling::Standardizer;
use crate::{metrics, Float};

/// Why a run stopped iterating. Both are valid, successful exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// No centroid moved further than the tolerance in the last iteration.
    Converged,
    /// The iteration cap was reached before the tolerance was met.
    MaxIterations,
}

/// One training observation in the fitted model.
///
/// Points don't own their feature vectors: the model keeps the training
/// matrix and a point addresses its row by index, while the owning
/// [`Cluster`] lists its members the same way.
#[derive(Clone, Debug, PartialEq)]
pub struct Point<F: Float> {
    pub(crate) index: usize,
    pub(crate) label: Option<String>,
    pub(crate) cluster: usize,
    pub(crate) centroid_dists: Array1<F>,
}

impl<F: Float> Point<F> {
    /// Row index into the training matrix.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The caller-supplied label, if labels were attached at fit time.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Index of the cluster this point belongs to.
    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// Distance from this point to every centroid of the fitted model.
    pub fn centroid_dists(&self) -> &Array1<F> {
        &self.centroid_dists
    }
}

/// One of the k partitions of the fitted model.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster<F: Float> {
    pub(crate) index: usize,
    pub(crate) centroid: Array1<F>,
    pub(crate) members: Vec<usize>,
}

impl<F: Float> Cluster<F> {
    /// Cluster index, in `0..n_clusters`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The centroid: aggregate of the member vectors, or the seeding
    /// position if the cluster ended up empty.
    pub fn centroid(&self) -> &Array1<F> {
        &self.centroid
    }

    /// Indices of the member points.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The fitted model: the best of N randomized runs of Lloyd's algorithm.
///
/// Immutable once fitted; prediction never updates the centroids.
#[derive(Clone, Debug)]
pub struct KMeans<F: Float, V: Variant<F> = L2Mean> {
    pub(crate) centroids: Array2<F>,
    /// Training matrix in model space (standardized when scaling was on).
    pub(crate) records: Array2<F>,
    pub(crate) memberships: Array1<usize>,
    pub(crate) points: Vec<Point<F>>,
    pub(crate) clusters: Vec<Cluster<F>>,
    pub(crate) iterations: u64,
    pub(crate) runtime: Duration,
    pub(crate) sse: F,
    pub(crate) stop: StopReason,
    pub(crate) scaler: Option<Standardizer<F>>,
    pub(crate) variant: V,
}

/// Fitted k-medians model.
pub type KMedians<F> = KMeans<F, L1Median>;

impl<F: Float> KMeans<F, L2Mean> {
    /// Configure a k-means fit with the default random generator.
    pub fn params(n_clusters: usize) -> KMeansParams<F, Isaac64Rng, L2Mean> {
        Self::params_with_rng(n_clusters, Isaac64Rng::seed_from_u64(42))
    }

    /// Configure a k-means fit with a caller-supplied random generator.
    pub fn params_with_rng<R: Rng>(n_clusters: usize, rng: R) -> KMeansParams<F, R, L2Mean> {
        KMeansParams::new(n_clusters, rng, L2Mean)
    }
}

impl<F: Float, V: Variant<F>> KMeans<F, V> {
    /// Configure a fit of an arbitrary variant, e.g.
    /// `KMeans::params_with(3, rng, L1Median)` for k-medians.
    pub fn params_with<R: Rng>(n_clusters: usize, rng: R, variant: V) -> KMeansParams<F, R, V> {
        KMeansParams::new(n_clusters, rng, variant)
    }

    /// Return the set of centroids as a 2-dimensional matrix with shape
    /// `(n_centroids, n_features)`.
    pub fn centroids(&self) -> &Array2<F> {
        &self.centroids
    }

    /// The k clusters, indexed by their label.
    pub fn clusters(&self) -> &[Cluster<F>] {
        &self.clusters
    }

    /// The training points, in dataset order.
    pub fn points(&self) -> &[Point<F>] {
        &self.points
    }

    /// Feature vector of the i-th training point, in model space (scaled
    /// when scaling was on).
    pub fn record(&self, index: usize) -> ArrayView1<F> {
        self.records.row(index)
    }

    /// Cluster index per training point.
    pub fn memberships(&self) -> &Array1<usize> {
        &self.memberships
    }

    /// Total sum of squared distances from each training point to its
    /// cluster's centroid.
    pub fn sse(&self) -> F {
        self.sse
    }

    /// Iterations performed by the winning run.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Wall-clock time of the winning run.
    pub fn runtime(&self) -> Duration {
        self.runtime
    }

    /// Whether the winning run converged or hit the iteration cap.
    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    /// The standardization transform fitted on the training data, when
    /// scaling was requested.
    pub fn scaler(&self) -> Option<&Standardizer<F>> {
        self.scaler.as_ref()
    }

    /// Mean silhouette coefficient over all training points.
    ///
    /// Computed from the full pairwise point-distance matrix, which is
    /// exact but O(n²) in the number of points. For each point, `a` is the
    /// mean distance to its own cluster's members (its own zero distance
    /// included in the average) and `b` the mean distance to the members of
    /// the nearest other cluster, nearest by point-to-centroid distance;
    /// the coefficient is `(b − a) / max(a, b)`. Defined as exactly 1.0
    /// when there are fewer than two occupied clusters.
    pub fn silhouette(&self) -> F {
        metrics::silhouette(self)
    }

    /// Given an input matrix `records`, with shape `(m, n_features)`,
    /// `predict` returns for each row the index of the nearest centroid.
    ///
    /// When the model was fitted with scaling, the training transform is
    /// reapplied to `records` first. The model itself is never modified.
    ///
    /// Panics if `records` doesn't have `n_features` columns.
    pub fn predict(&self, records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<usize> {
        let dists = match &self.scaler {
            Some(scaler) => {
                let scaled = scaler.transform(records);
                self.variant
                    .pairwise(scaled.view(), self.centroids.view(), None)
            }
            None => self
                .variant
                .pairwise(records.view(), self.centroids.view(), None),
        };
        dists.rows().into_iter().map(argmin).collect()
    }

    /// Cluster index of a single observation.
    pub fn predict_row(&self, observation: ArrayView1<F>) -> usize {
        self.predict(&observation.insert_axis(Axis(0)))[0]
    }
}

use crate::distance::Variant;
use crate::errors::KMeansParamsError;
use crate::init::CentroidInit;
use crate::Float;
use rand::Rng;

/// The set of hyperparameters that can be specified for the execution of
/// the k-means algorithm, after validation.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansValidParams<F: Float, R: Rng, V: Variant<F>> {
    /// The number of clusters we will be looking for in the training dataset.
    n_clusters: usize,
    /// Number of times the whole algorithm is run with different centroid
    /// seeds; the run with the lowest sum of squared errors is kept.
    n_runs: usize,
    /// The training is considered complete when no centroid moves further
    /// than `tolerance` in one iteration.
    tolerance: F,
    /// We exit the training loop when the number of training iterations
    /// reaches `max_n_iterations` even if the `tolerance` convergence
    /// condition has not been met.
    max_n_iterations: u64,
    /// The initialization strategy used to seed the centroids.
    init: CentroidInit<F>,
    /// Standardize features (zero mean, unit variance) before clustering.
    scale_data: bool,
    /// Optional per-point labels, carried onto the fitted model's points.
    labels: Option<Vec<String>>,
    /// The random number generator
    rng: R,
    /// Distance metric and aggregation rule
    variant: V,
}

/// A helper struct used to construct a set of [valid
/// hyperparameters](KMeansValidParams) for the k-means algorithm (using the
/// builder pattern).
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansParams<F: Float, R: Rng, V: Variant<F>>(KMeansValidParams<F, R, V>);

impl<F: Float, R: Rng, V: Variant<F>> KMeansParams<F, R, V> {
    /// `new` lets us configure our training algorithm parameters:
    /// * we will be looking for `n_clusters` in the training dataset;
    /// * the training is considered complete when no centroid moves further
    ///   than `tolerance` in one iteration;
    /// * we exit the training loop when the number of training iterations
    ///   reaches `max_n_iterations` even if the `tolerance` convergence
    ///   condition has not been met;
    /// * as the outcome depends on the random seeding, the algorithm is run
    ///   `n_runs` times and we keep the output which minimizes the sum of
    ///   squared distances to the closest centroid over all observations.
    ///
    /// Defaults are provided if optional parameters are not specified:
    /// * `tolerance = 1e-3`
    /// * `max_n_iterations = 300`
    /// * `n_runs = 10`
    /// * `init = CentroidInit::KMeansPlusPlus`
    /// * `scale_data = false`
    pub fn new(n_clusters: usize, rng: R, variant: V) -> Self {
        Self(KMeansValidParams {
            n_clusters,
            n_runs: 10,
            tolerance: F::cast(1e-3),
            max_n_iterations: 300,
            init: CentroidInit::KMeansPlusPlus,
            scale_data: false,
            labels: None,
            rng,
            variant,
        })
    }

    /// Change the value of `n_runs`
    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    /// Change the value of `tolerance`
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Change the value of `max_n_iterations`
    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Change the centroid initialization strategy
    pub fn init_method(mut self, init: CentroidInit<F>) -> Self {
        self.0.init = init;
        self
    }

    /// Standardize features before clustering. The fitted transform is kept
    /// on the model and reapplied by `predict`.
    pub fn scale_data(mut self, scale_data: bool) -> Self {
        self.0.scale_data = scale_data;
        self
    }

    /// Attach one label per training point
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.0.labels = Some(labels);
        self
    }

    /// Validate the hyperparameters, returning a reference to the checked
    /// set if successful.
    pub fn check_ref(&self) -> Result<&KMeansValidParams<F, R, V>, KMeansParamsError> {
        if self.0.n_clusters == 0 {
            Err(KMeansParamsError::NClusters)
        } else if self.0.n_runs == 0 {
            Err(KMeansParamsError::NRuns)
        } else if self.0.tolerance <= F::zero() {
            Err(KMeansParamsError::Tolerance)
        } else if self.0.max_n_iterations == 0 {
            Err(KMeansParamsError::MaxIterations)
        } else {
            Ok(&self.0)
        }
    }

    /// Validate the hyperparameters and return the checked set
    pub fn check(self) -> Result<KMeansValidParams<F, R, V>, KMeansParamsError> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, R: Rng, V: Variant<F>> KMeansValidParams<F, R, V> {
    /// The number of clusters we will be looking for in the training dataset.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// The final output is the best of `n_runs` runs, by sum of squared
    /// errors.
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// The training is considered complete when no centroid moves further
    /// than `tolerance` in one iteration.
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    /// We exit the training loop when the number of training iterations
    /// reaches `max_n_iterations` even if the `tolerance` convergence
    /// condition has not been met.
    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    /// Centroid initialization strategy
    pub fn init_method(&self) -> &CentroidInit<F> {
        &self.init
    }

    /// Whether features are standardized before clustering
    pub fn scale_data(&self) -> bool {
        self.scale_data
    }

    /// Per-point labels, if any
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Returns the random generator
    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Returns the distance metric and aggregation rule
    pub fn variant(&self) -> &V {
        &self.variant
    }
}

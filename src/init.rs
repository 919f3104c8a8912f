use crate::distance::Variant;
use crate::Float;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;

/// Strategy used to initialize the centroid matrix of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum CentroidInit<F: Float> {
    /// Probability-weighted seeding: after a uniform first pick, each
    /// subsequent centroid is drawn with probability proportional to the
    /// squared distance from the point to its nearest already-chosen
    /// centroid. The default, since it makes convergence to a poor local
    /// optimum much less likely than plain random seeding.
    KMeansPlusPlus,
    /// k distinct points drawn uniformly without replacement.
    Random,
    /// Caller-supplied centroid matrix with shape `(n_clusters, n_features)`.
    Precomputed(Array2<F>),
}

impl<F: Float> CentroidInit<F> {
    pub(crate) fn run<V: Variant<F>>(
        &self,
        variant: &V,
        n_clusters: usize,
        observations: ArrayView2<F>,
        rng: &mut impl Rng,
    ) -> Array2<F> {
        match self {
            Self::KMeansPlusPlus => k_means_plus_plus(variant, n_clusters, observations, rng),
            Self::Random => random_init(n_clusters, observations, rng),
            Self::Precomputed(centroids) => centroids.clone(),
        }
    }
}

fn random_init<F: Float>(
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let indices = rand::seq::index::sample(rng, observations.nrows(), n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

fn k_means_plus_plus<F: Float, V: Variant<F>>(
    variant: &V,
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(first));

    // squared distance from each point to its nearest already-chosen centroid
    let mut weights: Array1<F> = Array1::zeros(n_samples);
    for (i, point) in observations.rows().into_iter().enumerate() {
        let d = variant.distance(point, centroids.row(0));
        weights[i] = d * d;
    }

    for chosen in 1..n_clusters {
        let pick = weighted_pick(&weights, rng);
        centroids.row_mut(chosen).assign(&observations.row(pick));

        if chosen + 1 < n_clusters {
            for (i, point) in observations.rows().into_iter().enumerate() {
                let d = variant.distance(point, centroids.row(chosen));
                let sq = d * d;
                if sq < weights[i] {
                    weights[i] = sq;
                }
            }
        }
    }
    centroids
}

/// First index whose cumulative weight reaches a uniform draw over the total
/// mass. A zero total (every remaining point coincides with a chosen
/// centroid) degenerates to a uniform pick.
fn weighted_pick<F: Float>(weights: &Array1<F>, rng: &mut impl Rng) -> usize {
    let total = weights.sum();
    if total <= F::zero() {
        return rng.gen_range(0..weights.len());
    }

    let threshold = F::cast(rng.gen::<f64>()) * total;
    let mut cumulative = F::zero();
    for (i, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative >= threshold {
            return i;
        }
    }
    // round-off can leave the last partial sum a hair under the total
    weights.len() - 1
}

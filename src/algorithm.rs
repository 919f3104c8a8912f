use std::time::{Duration, Instant};

use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};
use rand::{Rng, SeedableRng};

use crate::distance::Variant;
use crate::errors::{KMeansError, Result};
use crate::hyperparams::{KMeansParams, KMeansValidParams};
use crate::init::CentroidInit;
use crate::model::{Cluster, KMeans, Point, StopReason};
use crate::scaling::Standardizer;
use crate::{metrics, Float};

/// Everything a single randomized run produces.
struct RunOutcome<F: Float> {
    centroids: Array2<F>,
    memberships: Array1<usize>,
    /// Distance from every point to every settled centroid, (n, k).
    point_dists: Array2<F>,
    iterations: u64,
    runtime: Duration,
    sse: F,
    stop: StopReason,
}

impl<F: Float, R: Rng + SeedableRng + Clone, V: Variant<F>> KMeansParams<F, R, V> {
    /// Validate the hyperparameters and fit, in one call.
    pub fn fit(&self, records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<KMeans<F, V>> {
        let checked = self.check_ref()?;
        checked.fit(records)
    }
}

impl<F: Float, R: Rng + SeedableRng + Clone, V: Variant<F>> KMeansValidParams<F, R, V> {
    /// Given an input matrix `records`, with shape `(n_samples, n_features)`,
    /// `fit` identifies `n_clusters` centroids based on the training data
    /// distribution and returns the fitted [`KMeans`] model.
    ///
    /// The whole algorithm is run `n_runs` times, each run seeding its own
    /// sub-generator from the configured random source, and the run with the
    /// lowest sum of squared errors wins (ties keep the earlier run).
    /// Reaching the iteration cap is a valid exit, not an error; inspect
    /// [`KMeans::stop_reason`] to tell the cases apart.
    pub fn fit(&self, records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<KMeans<F, V>> {
        let (n_samples, n_features) = records.dim();

        if self.n_clusters() > n_samples {
            return Err(KMeansError::TooManyClusters {
                n_clusters: self.n_clusters(),
                n_samples,
            });
        }
        if let CentroidInit::Precomputed(centroids) = self.init_method() {
            if centroids.dim() != (self.n_clusters(), n_features) {
                return Err(KMeansError::CentroidShape {
                    expected_rows: self.n_clusters(),
                    expected_cols: n_features,
                    found_rows: centroids.nrows(),
                    found_cols: centroids.ncols(),
                });
            }
        }
        if let Some(labels) = self.labels() {
            if labels.len() != n_samples {
                return Err(KMeansError::LabelCount {
                    expected: n_samples,
                    found: labels.len(),
                });
            }
        }

        let variant = self.variant().clone();
        let (records, scaler) = if self.scale_data() {
            let (scaled, scaler) = Standardizer::fit_transform(records);
            (scaled, Some(scaler))
        } else {
            (records.to_owned(), None)
        };

        // the point matrix is invariant across runs and iterations, so its
        // cacheable per-row terms are computed exactly once
        let norms = variant.row_norms(records.view());

        let mut rng = self.rng().clone();
        let mut best: Option<RunOutcome<F>> = None;
        for run in 0..self.n_runs() {
            let mut run_rng = R::seed_from_u64(rng.gen());
            let outcome = lloyd(self, &variant, records.view(), norms.as_ref(), &mut run_rng);
            debug!(
                "run {}/{}: sse={}, iterations={}, {:?} after {:?}",
                run + 1,
                self.n_runs(),
                outcome.sse,
                outcome.iterations,
                outcome.stop,
                outcome.runtime
            );
            if best.as_ref().map_or(true, |b| outcome.sse < b.sse) {
                best = Some(outcome);
            }
        }
        // n_runs > 0 was checked when the params were built
        let best = best.unwrap();
        debug!("kept run with sse={} out of {} runs", best.sse, self.n_runs());

        Ok(assemble(best, records, scaler, variant, self.labels()))
    }
}

/// One full pass of Lloyd's algorithm: seed, then alternate assignment and
/// update until the largest centroid movement drops below the tolerance or
/// the iteration cap is hit.
fn lloyd<F: Float, R: Rng, V: Variant<F>>(
    params: &KMeansValidParams<F, impl Rng, V>,
    variant: &V,
    observations: ArrayView2<F>,
    norms: Option<&Array1<F>>,
    rng: &mut R,
) -> RunOutcome<F> {
    let start = Instant::now();
    let mut centroids = params
        .init_method()
        .run(variant, params.n_clusters(), observations, rng);
    let mut memberships = Array1::zeros(observations.nrows());
    let mut iterations = 0;

    let stop = loop {
        iterations += 1;

        let dists = variant.pairwise(observations, centroids.view(), norms);
        assign(&dists, &mut memberships);

        let new_centroids = update_centroids(variant, observations, &memberships, &centroids);
        let movement = max_movement(variant, centroids.view(), new_centroids.view());
        centroids = new_centroids;

        if movement < params.tolerance() {
            break StopReason::Converged;
        }
        if iterations >= params.max_n_iterations() {
            break StopReason::MaxIterations;
        }
    };

    // Distances to the settled centroids. The memberships keep the last
    // assignment pass, so every centroid is still the aggregate of its
    // members (the final update moved them less than the tolerance).
    let point_dists = variant.pairwise(observations, centroids.view(), norms);
    let sse = metrics::sum_of_squared_errors(&point_dists, &memberships);

    RunOutcome {
        centroids,
        memberships,
        point_dists,
        iterations,
        runtime: start.elapsed(),
        sse,
        stop,
    }
}

/// Update `memberships` with the column index of the smallest entry of each
/// row of `dists`. Ties go to the lowest cluster index.
fn assign<F: Float>(dists: &Array2<F>, memberships: &mut Array1<usize>) {
    for (row, membership) in dists.rows().into_iter().zip(memberships.iter_mut()) {
        *membership = argmin(row);
    }
}

pub(crate) fn argmin<F: Float>(row: ArrayView1<F>) -> usize {
    let mut closest = 0;
    let mut closest_dist = row[0];
    for (index, &dist) in row.iter().enumerate().skip(1) {
        if dist < closest_dist {
            closest = index;
            closest_dist = dist;
        }
    }
    closest
}

/// Aggregate each cluster's members into its new centroid. A cluster with no
/// members keeps its previous centroid unchanged.
fn update_centroids<F: Float, V: Variant<F>>(
    variant: &V,
    observations: ArrayView2<F>,
    memberships: &Array1<usize>,
    old_centroids: &Array2<F>,
) -> Array2<F> {
    let n_clusters = old_centroids.nrows();
    let mut members = vec![Vec::new(); n_clusters];
    for (point, &cluster) in memberships.iter().enumerate() {
        members[cluster].push(point);
    }

    let mut centroids = Array2::zeros(old_centroids.raw_dim());
    for (cluster, indices) in members.iter().enumerate() {
        if indices.is_empty() {
            centroids.row_mut(cluster).assign(&old_centroids.row(cluster));
        } else {
            let rows = observations.select(Axis(0), indices);
            centroids
                .row_mut(cluster)
                .assign(&variant.centroid(rows.view()));
        }
    }
    centroids
}

fn max_movement<F: Float, V: Variant<F>>(
    variant: &V,
    old_centroids: ArrayView2<F>,
    new_centroids: ArrayView2<F>,
) -> F {
    old_centroids
        .rows()
        .into_iter()
        .zip(new_centroids.rows())
        .map(|(old, new)| variant.distance(old, new))
        .fold(F::zero(), F::max)
}

/// Materialize the winning run into the immutable fitted model.
fn assemble<F: Float, V: Variant<F>>(
    outcome: RunOutcome<F>,
    records: Array2<F>,
    scaler: Option<Standardizer<F>>,
    variant: V,
    labels: Option<&[String]>,
) -> KMeans<F, V> {
    let n_clusters = outcome.centroids.nrows();

    let mut members = vec![Vec::new(); n_clusters];
    for (point, &cluster) in outcome.memberships.iter().enumerate() {
        members[cluster].push(point);
    }
    let clusters = members
        .into_iter()
        .enumerate()
        .map(|(index, members)| Cluster {
            index,
            centroid: outcome.centroids.row(index).to_owned(),
            members,
        })
        .collect();

    let points = outcome
        .memberships
        .iter()
        .enumerate()
        .map(|(index, &cluster)| Point {
            index,
            label: labels.map(|labels| labels[index].clone()),
            cluster,
            centroid_dists: outcome.point_dists.row(index).to_owned(),
        })
        .collect();

    KMeans {
        centroids: outcome.centroids,
        records,
        memberships: outcome.memberships,
        points,
        clusters,
        iterations: outcome.iterations,
        runtime: outcome.runtime,
        sse: outcome.sse,
        stop: outcome.stop,
        scaler,
        variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::L2Mean;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_isaac::Isaac64Rng;

    #[test]
    fn ties_break_to_the_lowest_index() {
        assert_eq!(argmin(array![3.0, 1.0, 1.0, 2.0].view()), 1);
        assert_eq!(argmin(array![0.0, 0.0].view()), 0);
    }

    #[test]
    // An observation is closest to itself.
    fn nothing_is_closer_than_self() {
        let n_centroids = 20;
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let centroids: Array2<f64> =
            Array2::random_using((n_centroids, 5), Uniform::new(-100.0, 100.0), &mut rng);

        let dists = L2Mean.pairwise(centroids.view(), centroids.view(), None);
        let mut memberships = Array1::zeros(n_centroids);
        assign(&dists, &mut memberships);

        let expected = (0..n_centroids).collect::<Array1<_>>();
        assert_eq!(memberships, expected);
    }

    #[test]
    fn oracle_test_for_assignment() {
        let centroids = array![[0.0, 0.0], [1.0, 2.0], [20.0, 0.0], [0.0, 20.0]];
        let observations = array![[1.0, 0.5], [20.0, 2.0], [20.0, 0.0], [7.0, 20.0]];

        let dists = L2Mean.pairwise(observations.view(), centroids.view(), None);
        let mut memberships = Array1::zeros(4);
        assign(&dists, &mut memberships);
        assert_eq!(memberships, array![0, 2, 2, 3]);
    }

    #[test]
    fn update_recomputes_means() {
        let observations = array![[-1.0, -3.0], [0.0, 0.0], [3.0, 5.0], [5.0, 5.0]];
        let memberships = array![0, 0, 1, 1];
        let old_centroids = array![[10.0, 10.0], [10.0, 10.0]];

        let centroids = update_centroids(&L2Mean, observations.view(), &memberships, &old_centroids);
        assert_abs_diff_eq!(
            centroids,
            array![[-0.5, -1.5], [4.0, 5.0]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_cluster_keeps_previous_centroid() {
        let observations = array![[1.0, 2.0]];
        let memberships = array![0];
        let old_centroids = array![[0.0, 0.0], [7.0, 8.0]];

        let centroids = update_centroids(&L2Mean, observations.view(), &memberships, &old_centroids);
        assert_abs_diff_eq!(centroids, array![[1.0, 2.0], [7.0, 8.0]], epsilon = 1e-12);
    }

    #[test]
    fn movement_is_the_per_cluster_maximum() {
        let old = array![[0.0, 0.0], [10.0, 10.0]];
        let new = array![[0.0, 1.0], [13.0, 14.0]];
        let movement = max_movement(&L2Mean, old.view(), new.view());
        assert_abs_diff_eq!(movement, 5.0, epsilon = 1e-12);
    }
}

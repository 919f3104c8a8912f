use crate::Float;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use ndarray_stats::DeviationExt;

/// Distance metric and centroid aggregation rule for one clustering variant.
///
/// Lloyd's iteration only touches the data through these two operations, so
/// swapping the implementation switches the variant: [`L2Mean`] gives
/// standard k-means, [`L1Median`] gives k-medians.
pub trait Variant<F: Float>: Clone + Send + Sync {
    /// Distance between two points.
    ///
    /// Panics if `a` and `b` are not of equal dimension.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    /// Per-row terms of `x` that [`pairwise`](Variant::pairwise) can reuse
    /// across calls, if the metric admits them.
    ///
    /// The point matrix is invariant across the iterations of a run, so the
    /// caller computes this once and passes it back in. `None` for metrics
    /// without a cacheable form.
    fn row_norms(&self, _x: ArrayView2<F>) -> Option<Array1<F>> {
        None
    }

    /// Distances between every row of `x` (n×d) and every row of `y` (m×d),
    /// returned as an n×m matrix. `x_norms` is the output of
    /// [`row_norms`](Variant::row_norms) on `x`, when cached.
    ///
    /// Panics if `x` and `y` disagree on the number of columns.
    fn pairwise(
        &self,
        x: ArrayView2<F>,
        y: ArrayView2<F>,
        _x_norms: Option<&Array1<F>>,
    ) -> Array2<F> {
        assert_eq!(
            x.ncols(),
            y.ncols(),
            "pairwise distances need points of equal dimension"
        );
        let mut out = Array2::zeros((x.nrows(), y.nrows()));
        for (i, a) in x.rows().into_iter().enumerate() {
            for (j, b) in y.rows().into_iter().enumerate() {
                out[(i, j)] = self.distance(a, b);
            }
        }
        out
    }

    /// Aggregate the member rows of one cluster into its new centroid.
    ///
    /// `members` is never empty: the iteration keeps the previous centroid
    /// of an empty cluster instead of aggregating.
    fn centroid(&self, members: ArrayView2<F>) -> Array1<F>;
}

/// Euclidean distance with arithmetic-mean aggregation: k-means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct L2Mean;

/// Manhattan distance with per-feature median aggregation: k-medians.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct L1Median;

impl<F: Float> Variant<F> for L2Mean {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        F::cast(a.l2_dist(&b).unwrap())
    }

    fn row_norms(&self, x: ArrayView2<F>) -> Option<Array1<F>> {
        Some(x.map_axis(Axis(1), |row| row.dot(&row)))
    }

    /// Batched distances through the expansion
    /// `d(x, y)² = ‖x‖² + ‖y‖² − 2·x·yᵀ`, which needs one matrix product
    /// instead of a difference vector per pair. Cancellation can push the
    /// squared distance of near-identical rows slightly below zero; those
    /// values are clamped before the square root.
    fn pairwise(
        &self,
        x: ArrayView2<F>,
        y: ArrayView2<F>,
        x_norms: Option<&Array1<F>>,
    ) -> Array2<F> {
        assert_eq!(
            x.ncols(),
            y.ncols(),
            "pairwise distances need points of equal dimension"
        );
        let computed;
        let xx = match x_norms {
            Some(norms) => norms,
            None => {
                computed = x.map_axis(Axis(1), |row| row.dot(&row));
                &computed
            }
        };
        let yy = y.map_axis(Axis(1), |row| row.dot(&row));
        let two = F::cast(2.0);

        let mut out = x.dot(&y.t());
        Zip::indexed(&mut out).for_each(|(i, j), cross| {
            let sq = xx[i] + yy[j] - two * *cross;
            *cross = if sq > F::zero() { sq.sqrt() } else { F::zero() };
        });
        out
    }

    fn centroid(&self, members: ArrayView2<F>) -> Array1<F> {
        members.mean_axis(Axis(0)).unwrap()
    }
}

impl<F: Float> Variant<F> for L1Median {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.l1_dist(&b).unwrap()
    }

    fn centroid(&self, members: ArrayView2<F>) -> Array1<F> {
        let mut centroid = Array1::zeros(members.ncols());
        for (feature, column) in members.columns().into_iter().enumerate() {
            let mut values = column.to_vec();
            values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
            let mid = values.len() / 2;
            centroid[feature] = if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / F::cast(2.0)
            } else {
                values[mid]
            };
        }
        centroid
    }
}

use crate::Float;
use approx::abs_diff_eq;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};

/// Per-feature standardization (zero mean, unit variance) fitted on the
/// training matrix.
///
/// The transform parameters are retained so new observations can be scaled
/// with the *training* mean and standard deviation at prediction time. A
/// feature with zero variance records a standard deviation of 1.0: it is
/// centered but not divided, which keeps constant features from turning
/// into NaN columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Standardizer<F: Float> {
    mean: Array1<F>,
    std: Array1<F>,
}

impl<F: Float> Standardizer<F> {
    /// Fit the per-feature mean and population standard deviation.
    ///
    /// Panics if `records` has no rows.
    pub fn fit(records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        let mean = records.mean_axis(Axis(0)).unwrap();
        let std = records.std_axis(Axis(0), F::zero()).mapv(|s| {
            if abs_diff_eq!(s, F::zero()) {
                F::one()
            } else {
                s
            }
        });
        Standardizer { mean, std }
    }

    /// Fit on `records` and return the scaled copy along with the transform.
    pub fn fit_transform(records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> (Array2<F>, Self) {
        let scaler = Self::fit(records);
        let scaled = scaler.transform(records);
        (scaled, scaler)
    }

    /// Apply the fitted transform to `records`.
    ///
    /// Always uses the parameters captured at fit time, never statistics of
    /// `records` itself.
    pub fn transform(&self, records: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut out = records.to_owned();
        Zip::from(out.columns_mut())
            .and(&self.mean)
            .and(&self.std)
            .for_each(|mut column, &mean, &std| {
                column.mapv_inplace(|value| (value - mean) / std);
            });
        out
    }

    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<F> {
        &self.std
    }
}

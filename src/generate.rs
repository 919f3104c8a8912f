//! Synthetic datasets for tests and benchmarks.

use crate::Float;
use ndarray::{s, Array2, ArrayBase, Data, Ix1, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, StandardNormal};
use ndarray_rand::RandomExt;

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob
/// centroids.
///
/// More specifically, each blob is formed by `blob_size` points sampled from
/// a normal distribution centered in the blob centroid with unit variance.
///
/// `generate_blobs` can be used to quickly assemble a synthetic dataset to
/// test or benchmark the clustering routines on a best-case scenario input.
pub fn generate_blobs<F: Float>(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rng: &mut impl Rng,
) -> Array2<F>
where
    StandardNormal: Distribution<F>,
{
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<F> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = generate_blob(blob_size, &blob_centroid, rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    blobs
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid`.
pub fn generate_blob<F: Float>(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = F>, Ix1>,
    rng: &mut impl Rng,
) -> Array2<F>
where
    StandardNormal: Distribution<F>,
{
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<F> = Array2::random_using(shape, StandardNormal, rng);
    origin_blob + blob_centroid
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::Isaac64Rng;

    #[test]
    fn blobs_stay_near_their_centroids() {
        let centroids = array![[0.0, 0.0], [100.0, 100.0]];
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let blobs: Array2<f64> = generate_blobs(50, &centroids, &mut rng);

        assert_eq!(blobs.dim(), (100, 2));
        let first = blobs.slice(s![..50, ..]).mean_axis(Axis(0)).unwrap();
        let second = blobs.slice(s![50.., ..]).mean_axis(Axis(0)).unwrap();
        assert!(first.iter().all(|v| v.abs() < 1.0));
        assert!(second.iter().all(|v| (v - 100.0).abs() < 1.0));
    }
}

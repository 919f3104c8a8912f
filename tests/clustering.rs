use approx::assert_abs_diff_eq;
use kmeans_clusterer::{CentroidInit, KMeans, KMeansError, L1Median, StopReason};
use ndarray::{array, Array1, Array2, Axis};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;

fn quadrants() -> Array2<f64> {
    array![
        [3.0, 3.0],
        [-3.0, 3.0],
        [3.0, -3.0],
        [-3.0, -3.0],
        [3.0, 4.0],
        [-3.0, 4.0],
        [3.0, -4.0],
        [-3.0, -4.0],
        [4.0, 3.0],
        [-4.0, 3.0],
        [4.0, -3.0],
        [-4.0, -3.0],
        [4.0, 4.0],
        [-4.0, 4.0],
        [4.0, -4.0],
        [-4.0, -4.0],
    ]
}

#[test]
fn four_quadrants_with_kmeans_plus_plus() {
    let data = quadrants();
    let model = KMeans::params(4).fit(&data).unwrap();

    assert_eq!(model.clusters().len(), 4);
    for cluster in model.clusters() {
        assert_eq!(cluster.len(), 4);
        // all members of a cluster share their quadrant (same sign pattern)
        let xs: f64 = cluster.members().iter().map(|&i| data[(i, 0)]).product();
        let ys: f64 = cluster.members().iter().map(|&i| data[(i, 1)]).product();
        assert!(xs > 0.0);
        assert!(ys > 0.0);
    }

    assert_abs_diff_eq!(model.sse(), 8.0, epsilon = 1e-6);
    assert_abs_diff_eq!(model.silhouette(), 0.8738, epsilon = 1e-3);
}

#[test]
fn four_quadrants_with_precomputed_seeds() {
    let data = quadrants();
    let seeds = array![[3.0, 3.0], [-3.0, 3.0], [3.0, -3.0], [-3.0, -3.0]];
    let model = KMeans::params(4)
        .n_runs(1)
        .init_method(CentroidInit::Precomputed(seeds))
        .fit(&data)
        .unwrap();

    // first pass moves every seed to its quadrant mean, second pass settles
    assert_eq!(model.iterations(), 2);
    assert_eq!(model.stop_reason(), StopReason::Converged);
    assert_abs_diff_eq!(model.sse(), 8.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.silhouette(), 0.8738, epsilon = 1e-3);

    let mut centroids: Vec<(i64, i64)> = model
        .centroids()
        .rows()
        .into_iter()
        .map(|row| ((row[0] * 2.0) as i64, (row[1] * 2.0) as i64))
        .collect();
    centroids.sort_unstable();
    assert_eq!(centroids, vec![(-7, -7), (-7, 7), (7, -7), (7, 7)]);
}

#[test]
fn k_cannot_exceed_the_number_of_points() {
    let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let result = KMeans::<f64>::params(5).fit(&data);
    assert!(matches!(
        result,
        Err(KMeansError::TooManyClusters {
            n_clusters: 5,
            n_samples: 3
        })
    ));
}

#[test]
fn precomputed_centroids_must_match_the_data() {
    let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let seeds = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let result = KMeans::params(2)
        .init_method(CentroidInit::Precomputed(seeds))
        .fit(&data);
    assert!(matches!(result, Err(KMeansError::CentroidShape { .. })));
}

#[test]
fn label_count_must_match_the_data() {
    let data = array![[1.0], [2.0], [3.0]];
    let result = KMeans::params(2)
        .labels(vec!["a".to_string(), "b".to_string()])
        .fit(&data);
    assert!(matches!(
        result,
        Err(KMeansError::LabelCount {
            expected: 3,
            found: 2
        })
    ));
}

#[test]
fn labels_end_up_on_the_points() {
    let data = array![[0.0, 0.0], [0.1, 0.0], [9.0, 9.0], [9.1, 9.0]];
    let labels = vec!["a", "b", "c", "d"];
    let model = KMeans::params(2)
        .labels(labels.iter().map(|s| s.to_string()).collect())
        .fit(&data)
        .unwrap();

    for (i, point) in model.points().iter().enumerate() {
        assert_eq!(point.index(), i);
        assert_eq!(point.label(), Some(labels[i]));
        assert_eq!(point.centroid_dists().len(), 2);
    }
    // the two tight pairs share clusters
    assert_eq!(model.points()[0].cluster(), model.points()[1].cluster());
    assert_eq!(model.points()[2].cluster(), model.points()[3].cluster());
    assert_ne!(model.points()[0].cluster(), model.points()[2].cluster());
}

#[test]
fn prediction_with_explicit_centroids() {
    let data = array![[2.0, 2.0], [-2.0, -2.0]];
    let seeds = array![[2.0, 2.0], [-2.0, -2.0]];
    let model = KMeans::params(2)
        .n_runs(1)
        .init_method(CentroidInit::Precomputed(seeds))
        .fit(&data)
        .unwrap();

    let predicted = model.predict(&array![[3.0, 3.0], [-3.0, -3.0]]);
    assert_eq!(predicted, array![0, 1]);
    assert_eq!(model.predict_row(array![3.0, 3.0].view()), 0);
}

#[test]
fn prediction_is_idempotent() {
    let data = quadrants();
    let model = KMeans::params(4).fit(&data).unwrap();

    let queries = array![[1.0, 1.0], [-5.0, 2.0], [0.0, -9.0], [4.2, 4.2]];
    let first = model.predict(&queries);
    let second = model.predict(&queries);
    assert_eq!(first, second);
}

#[test]
fn scaling_is_reapplied_at_prediction_time() {
    // middle feature is constant; third feature dwarfs the first without
    // standardization
    let data = array![[1.0, 5.0, 10.0], [10.0, 5.0, 205.0]];
    let model = KMeans::params(2).scale_data(true).fit(&data).unwrap();

    let scaler = model.scaler().unwrap();
    assert_abs_diff_eq!(*scaler.mean(), array![5.5, 5.0, 107.5], epsilon = 1e-9);
    assert_abs_diff_eq!(*scaler.std(), array![4.5, 1.0, 97.5], epsilon = 1e-9);

    // training points predict their own clusters through the same transform
    let predicted = model.predict(&data);
    assert_eq!(&predicted, model.memberships());
}

#[test]
fn best_of_n_is_at_least_as_good_as_a_single_run() {
    let mut rng = Isaac64Rng::seed_from_u64(64);
    let centroids = array![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [-10.0, -10.0]];
    let data = kmeans_clusterer::generate_blobs(40, &centroids, &mut rng);

    // both fits fork their run generators from the same base seed, so the
    // single run is identical to the first of the ten
    let single = KMeans::params_with_rng(4, Isaac64Rng::seed_from_u64(1))
        .init_method(CentroidInit::Random)
        .n_runs(1)
        .fit(&data)
        .unwrap();
    let best = KMeans::params_with_rng(4, Isaac64Rng::seed_from_u64(1))
        .init_method(CentroidInit::Random)
        .n_runs(10)
        .fit(&data)
        .unwrap();

    assert!(best.sse() <= single.sse() + 1e-9);
}

#[test]
fn converged_models_are_at_a_fixed_point() {
    let data = quadrants();
    let tolerance = 1e-3;
    let model = KMeans::params(4).tolerance(tolerance).fit(&data).unwrap();
    assert_eq!(model.stop_reason(), StopReason::Converged);

    // one more assignment/update pass must not move any centroid further
    // than the tolerance
    let assignments = model.predict(&data);
    for cluster in model.clusters() {
        let members: Vec<usize> = (0..data.nrows())
            .filter(|&i| assignments[i] == cluster.index())
            .collect();
        if members.is_empty() {
            continue;
        }
        let mean = data.select(Axis(0), &members).mean_axis(Axis(0)).unwrap();
        let movement = (&mean - cluster.centroid())
            .mapv(|v| v * v)
            .sum()
            .sqrt();
        assert!(movement < tolerance);
    }
}

#[test]
fn iteration_cap_is_a_valid_exit() {
    let data = quadrants();
    let seeds = array![[3.0, 3.0], [-3.0, 3.0], [3.0, -3.0], [-3.0, -3.0]];
    let model = KMeans::params(4)
        .n_runs(1)
        .init_method(CentroidInit::Precomputed(seeds))
        .max_n_iterations(1)
        .fit(&data)
        .unwrap();

    assert_eq!(model.stop_reason(), StopReason::MaxIterations);
    assert_eq!(model.iterations(), 1);
    // the capped result is still a usable model
    assert_eq!(model.predict(&data).len(), 16);
}

#[test]
fn silhouette_stays_in_bounds() {
    let mut rng = Isaac64Rng::seed_from_u64(3);
    let centroids = array![[0.0, 0.0], [3.0, 3.0], [-2.0, 4.0]];
    let data = kmeans_clusterer::generate_blobs(30, &centroids, &mut rng);

    let model = KMeans::params(3).fit(&data).unwrap();
    let score = model.silhouette();
    assert!((-1.0..=1.0).contains(&score));
}

#[test]
fn k_medians_aggregates_with_the_median() {
    let data = array![[0.0], [1.0], [2.0], [100.0]];
    let model = KMeans::params_with(1, Isaac64Rng::seed_from_u64(42), L1Median)
        .n_runs(1)
        .fit(&data)
        .unwrap();

    // the outlier drags the mean to 25.75 but leaves the median at 1.5
    assert_abs_diff_eq!(model.centroids()[(0, 0)], 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(model.silhouette(), 1.0);
}

#[test]
fn k_medians_clusters_around_medians() {
    let data = array![
        [0.0, 0.0],
        [0.0, 1.0],
        [1.0, 0.0],
        [50.0, 50.0],
        [50.0, 51.0],
        [51.0, 50.0],
    ];
    let model = KMeans::params_with(2, Isaac64Rng::seed_from_u64(42), L1Median)
        .fit(&data)
        .unwrap();

    let assignments: Array1<usize> = model.predict(&data);
    assert_eq!(assignments[0], assignments[1]);
    assert_eq!(assignments[0], assignments[2]);
    assert_eq!(assignments[3], assignments[4]);
    assert_eq!(assignments[3], assignments[5]);
    assert_ne!(assignments[0], assignments[3]);
}

#[test]
fn empty_clusters_survive_with_their_seed_position() {
    // two duplicate groups, three requested clusters: one cluster can end
    // up empty and must keep its centroid instead of dying
    let data = array![[0.0, 0.0], [0.0, 0.0], [10.0, 10.0], [10.0, 10.0]];
    let seeds = array![[0.0, 0.0], [10.0, 10.0], [500.0, 500.0]];
    let model = KMeans::params(3)
        .n_runs(1)
        .init_method(CentroidInit::Precomputed(seeds))
        .fit(&data)
        .unwrap();

    assert_eq!(model.clusters().len(), 3);
    let empty = &model.clusters()[2];
    assert!(empty.is_empty());
    assert_abs_diff_eq!(
        *empty.centroid(),
        array![500.0, 500.0],
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(model.sse(), 0.0, epsilon = 1e-12);
}

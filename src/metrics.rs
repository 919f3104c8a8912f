//! Cluster-quality metrics for fitted models.

use crate::distance::Variant;
use crate::model::KMeans;
use crate::Float;
use ndarray::{Array1, Array2};

/// Sum over all points of the squared distance to their own centroid.
pub(crate) fn sum_of_squared_errors<F: Float>(
    point_dists: &Array2<F>,
    memberships: &Array1<usize>,
) -> F {
    memberships
        .iter()
        .enumerate()
        .map(|(point, &cluster)| {
            let dist = point_dists[(point, cluster)];
            dist * dist
        })
        .sum()
}

/// Mean silhouette coefficient over all points, from the full pairwise
/// point-distance matrix (O(n²) in the number of points).
///
/// The nearest *other* cluster of a point is chosen by the point-to-centroid
/// distances cached on the point; empty clusters are never candidates. The
/// mean distance of a point to its own cluster divides by the member count,
/// so the point's own zero distance stays in the average.
pub(crate) fn silhouette<F: Float, V: Variant<F>>(model: &KMeans<F, V>) -> F {
    let occupied = model
        .clusters
        .iter()
        .filter(|cluster| !cluster.members.is_empty())
        .count();
    // a single partition separates perfectly, vacuously
    if occupied < 2 {
        return F::one();
    }

    let records = model.records.view();
    let norms = model.variant.row_norms(records);
    let pairwise = model.variant.pairwise(records, records, norms.as_ref());

    let mut total = F::zero();
    for point in &model.points {
        let own = &model.clusters[point.cluster];
        let a = mean_distance(&pairwise, point.index, &own.members);

        let mut neighbour: Option<(usize, F)> = None;
        for cluster in &model.clusters {
            if cluster.index == point.cluster || cluster.members.is_empty() {
                continue;
            }
            let dist = point.centroid_dists[cluster.index];
            if neighbour.map_or(true, |(_, nearest)| dist < nearest) {
                neighbour = Some((cluster.index, dist));
            }
        }
        // at least two clusters are occupied, so a neighbour always exists
        let (nearest_other, _) = neighbour.unwrap();
        let b = mean_distance(&pairwise, point.index, &model.clusters[nearest_other].members);

        let denom = if a > b { a } else { b };
        if denom > F::zero() {
            total += (b - a) / denom;
        }
    }
    total / F::cast(model.points.len())
}

fn mean_distance<F: Float>(pairwise: &Array2<F>, point: usize, members: &[usize]) -> F {
    let sum = members
        .iter()
        .map(|&member| pairwise[(point, member)])
        .sum::<F>();
    sum / F::cast(members.len())
}

use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Compute squared L2 norms for each row of a 2D array
#[inline]
pub fn compute_squared_norms(data: &ArrayView2<f64>) -> Array1<f64> {
    let n_samples = data.nrows();
    let mut norms = Array1::zeros(n_samples);

    // Parallel computation of row norms
    norms
        .as_slice_mut()
        .expect("freshly allocated array is contiguous")
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, norm)| {
            let row = data.row(i);
            *norm = row.dot(&row);
        });

    norms
}

/// Find the nearest centroid for each data point in a chunk, processing
/// centroids in sub-chunks.
///
/// Uses the identity: ||x - c||^2 = ||x||^2 + ||c||^2 - 2*x.c
///
/// Ties are broken toward the lowest centroid index: the strict `<`
/// comparison keeps the first occurrence of the minimum while scanning
/// centroids in index order.
///
/// # Returns
/// * `labels` - nearest-centroid index per data point (n_data,)
/// * `distances` - squared distance to that centroid, clamped at zero (n_data,)
pub fn find_nearest_centroids_chunked(
    data_chunk: &ArrayView2<f64>,
    data_norms: &ArrayView1<f64>,
    centroids: &ArrayView2<f64>,
    centroid_norms: &ArrayView1<f64>,
    chunk_size_centroids: usize,
) -> (Array1<usize>, Array1<f64>) {
    let n_data = data_chunk.nrows();
    let k = centroids.nrows();

    let mut best_labels = Array1::zeros(n_data);
    let mut best_dists = Array1::from_elem(n_data, f64::INFINITY);

    // Process centroids in chunks
    let mut c_start = 0;
    while c_start < k {
        let c_end = (c_start + chunk_size_centroids).min(k);
        let centroid_chunk = centroids.slice(ndarray::s![c_start..c_end, ..]);
        let centroid_chunk_norms = centroid_norms.slice(ndarray::s![c_start..c_end]);
        let n_centroids_chunk = c_end - c_start;

        // x.c via matrix multiplication: (n_data, n_centroids_chunk)
        let dot_products = data_chunk.dot(&centroid_chunk.t());

        best_labels
            .as_slice_mut()
            .expect("freshly allocated array is contiguous")
            .par_iter_mut()
            .zip(
                best_dists
                    .as_slice_mut()
                    .expect("freshly allocated array is contiguous")
                    .par_iter_mut(),
            )
            .enumerate()
            .for_each(|(i, (label, best_dist))| {
                let x_norm = data_norms[i];

                for j in 0..n_centroids_chunk {
                    let c_norm = centroid_chunk_norms[j];
                    let dot = dot_products[[i, j]];

                    // Squared distance: ||x||^2 + ||c||^2 - 2*x.c
                    let dist = x_norm + c_norm - 2.0 * dot;

                    if dist < *best_dist {
                        *best_dist = dist;
                        *label = c_start + j;
                    }
                }
            });

        c_start = c_end;
    }

    // The norm identity can go slightly negative for coincident points
    for dist in best_dists.iter_mut() {
        if *dist < 0.0 {
            *dist = 0.0;
        }
    }

    (best_labels, best_dists)
}

/// Maximum per-coordinate centroid shift between two centroid sets.
pub fn max_coordinate_shift(
    old_centroids: &ArrayView2<f64>,
    new_centroids: &ArrayView2<f64>,
) -> f64 {
    let k = old_centroids.nrows();

    (0..k)
        .into_par_iter()
        .map(|i| {
            let old_c = old_centroids.row(i);
            let new_c = new_centroids.row(i);

            let mut max_shift = 0.0f64;
            for j in 0..old_c.len() {
                let d = (new_c[j] - old_c[j]).abs();
                if d > max_shift {
                    max_shift = d;
                }
            }
            max_shift
        })
        .reduce(|| 0.0, f64::max)
}

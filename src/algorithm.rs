use crate::config::KMeansConfig;
use crate::distance::{compute_squared_norms, find_nearest_centroids_chunked, max_coordinate_shift};
use crate::error::ClusterError;
use crate::rng::RandomStream;
use ndarray::{Array1, Array2, ArrayView2};

/// Result of one completed k-means fit
pub struct KMeansFit {
    pub centroids: Array2<f64>,
    pub labels: Array1<usize>,
    pub inertia: f64,
    pub n_iterations: usize,
}

/// Run k-means with `n_init` independent restarts and keep the restart
/// with the lowest inertia (first encountered on ties).
///
/// Restart `r` draws from a fresh stream seeded with `seed + r` when a
/// seed is configured, so restarts stay reproducible yet independent.
pub fn run_kmeans(data: &ArrayView2<f64>, config: &KMeansConfig) -> Result<KMeansFit, ClusterError> {
    config.validate()?;

    let n_samples = data.nrows();
    if n_samples == 0 {
        return Err(ClusterError::InsufficientData(
            "Input data must contain at least one sample".to_string(),
        ));
    }
    if config.k > n_samples {
        return Err(ClusterError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, config.k
        )));
    }

    let mut best: Option<KMeansFit> = None;

    for restart in 0..config.n_init {
        let mut stream =
            RandomStream::new(config.seed.map(|s| s.wrapping_add(restart as u32)));
        let fit = kmeans_single(data, config, &mut stream)?;

        if config.verbose {
            eprintln!(
                "  Restart {}/{}: inertia = {:.6}, iterations = {}",
                restart + 1,
                config.n_init,
                fit.inertia,
                fit.n_iterations
            );
        }

        let improved = match &best {
            Some(current) => fit.inertia < current.inertia,
            None => true,
        };
        if improved {
            best = Some(fit);
        }
    }

    // n_init >= 1 is validated above, so at least one restart ran
    best.ok_or_else(|| {
        ClusterError::InvalidParameter("n_init must be a positive integer (>= 1)".to_string())
    })
}

/// One restart: k-means++ seeding followed by Lloyd iteration.
fn kmeans_single(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
    stream: &mut RandomStream,
) -> Result<KMeansFit, ClusterError> {
    let n_samples = data.nrows();
    let n_features = data.ncols();
    let k = config.k;

    let mut centroids = plus_plus_init(data, k, stream)?;
    let data_norms = compute_squared_norms(data);

    let mut labels = Array1::<usize>::zeros(n_samples);
    let mut prev_inertia = f64::INFINITY;
    let mut n_iterations = 0;

    for iteration in 0..config.max_iters {
        n_iterations = iteration + 1;

        let centroid_norms = compute_squared_norms(&centroids.view());

        // Accumulators for new centroids
        let mut cluster_sums: Array2<f64> = Array2::zeros((k, n_features));
        let mut cluster_counts: Array1<usize> = Array1::zeros(k);
        let mut inertia = 0.0f64;

        // a) assign samples to their nearest centroid, data in chunks
        let mut start_idx = 0;
        while start_idx < n_samples {
            let end_idx = (start_idx + config.chunk_size_data).min(n_samples);
            let data_chunk = data.slice(ndarray::s![start_idx..end_idx, ..]);
            let data_chunk_norms = data_norms.slice(ndarray::s![start_idx..end_idx]);

            let (chunk_labels, chunk_dists) = find_nearest_centroids_chunked(
                &data_chunk,
                &data_chunk_norms,
                &centroids.view(),
                &centroid_norms.view(),
                config.chunk_size_centroids,
            );

            for (i, &label) in chunk_labels.iter().enumerate() {
                labels[start_idx + i] = label;
                cluster_counts[label] += 1;
                inertia += chunk_dists[i];
                for j in 0..n_features {
                    cluster_sums[[label, j]] += data_chunk[[i, j]];
                }
            }

            start_idx = end_idx;
        }

        // b) recompute centroids; an empty cluster keeps its previous
        // centroid unchanged (reference-compatible policy, not the
        // farthest-point reassignment used elsewhere)
        let mut new_centroids = centroids.clone();
        for cluster_idx in 0..k {
            let count = cluster_counts[cluster_idx];
            if count > 0 {
                for j in 0..n_features {
                    new_centroids[[cluster_idx, j]] =
                        cluster_sums[[cluster_idx, j]] / count as f64;
                }
            }
        }

        let shift = max_coordinate_shift(&centroids.view(), &new_centroids.view());
        centroids = new_centroids;

        if config.verbose {
            eprintln!(
                "  Iteration {}/{}: inertia = {:.6}, shift = {:.6}",
                iteration + 1,
                config.max_iters,
                inertia,
                shift
            );
        }

        // c) convergence: relative inertia change or max coordinate shift
        let denom = if prev_inertia != 0.0 { prev_inertia } else { 1.0 };
        let relative_diff = (prev_inertia - inertia).abs() / denom;
        prev_inertia = inertia;

        if relative_diff <= config.tol || shift <= config.tol {
            if config.verbose {
                eprintln!("  Converged after {} iterations", iteration + 1);
            }
            break;
        }
    }

    Ok(KMeansFit {
        centroids,
        labels,
        inertia: prev_inertia,
        n_iterations,
    })
}

/// k-means++ seeding: first centroid uniform, each subsequent centroid
/// drawn proportional to its squared distance to the nearest already
/// chosen centroid.
fn plus_plus_init(
    data: &ArrayView2<f64>,
    k: usize,
    stream: &mut RandomStream,
) -> Result<Array2<f64>, ClusterError> {
    let n_samples = data.nrows();
    let n_features = data.ncols();

    let mut centroid_idxs: Vec<usize> = Vec::with_capacity(k);
    let mut chosen = vec![false; n_samples];

    let first = stream.next_int(n_samples as u32)? as usize;
    centroid_idxs.push(first);
    chosen[first] = true;
    let mut latest_idx = first;

    // Squared distance to the nearest chosen centroid, updated lazily as
    // centroids are added
    let mut min_dists = vec![f64::INFINITY; n_samples];

    while centroid_idxs.len() < k {
        let latest = data.row(latest_idx);
        for i in 0..n_samples {
            if chosen[i] {
                min_dists[i] = 0.0;
                continue;
            }
            let mut d2 = 0.0;
            let row = data.row(i);
            for j in 0..n_features {
                let diff = row[j] - latest[j];
                d2 += diff * diff;
            }
            if d2 < min_dists[i] {
                min_dists[i] = d2;
            }
        }

        let sum: f64 = min_dists.iter().sum();

        // Degenerate case: all remaining points coincide with a chosen
        // centroid; take the first sample not yet chosen
        if sum == 0.0 {
            for i in 0..n_samples {
                if !chosen[i] {
                    centroid_idxs.push(i);
                    chosen[i] = true;
                    latest_idx = i;
                    break;
                }
            }
            continue;
        }

        let r = stream.next_f64() * sum;
        let mut cumulative = 0.0;
        let mut selected = 0;
        for (i, &weight) in min_dists.iter().enumerate() {
            cumulative += weight;
            if r <= cumulative {
                selected = i;
                break;
            }
        }
        centroid_idxs.push(selected);
        chosen[selected] = true;
        latest_idx = selected;
    }

    let mut centroids = Array2::zeros((k, n_features));
    for (centroid_idx, &data_idx) in centroid_idxs.iter().enumerate() {
        for j in 0..n_features {
            centroids[[centroid_idx, j]] = data[[data_idx, j]];
        }
    }

    Ok(centroids)
}

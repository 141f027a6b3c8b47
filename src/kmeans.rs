use crate::algorithm::run_kmeans;
use crate::config::KMeansConfig;
use crate::distance::{compute_squared_norms, find_nearest_centroids_chunked};
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView2};

/// K-means clustering with k-means++ seeding, multiple restarts, and a
/// reference-compatible deterministic random stream.
///
/// The API shape follows scikit-learn: `fit()`, `predict()`,
/// `fit_predict()`, with centroids, labels, and inertia exposed after a
/// successful fit.
///
/// # Example
///
/// ```
/// use spectral_kmeans_rs::{KMeans, KMeansConfig};
/// use ndarray::array;
///
/// let data = array![
///     [0.0, 0.0],
///     [0.1, 0.0],
///     [10.0, 10.0],
///     [10.1, 10.0],
/// ];
///
/// let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(Some(42)));
/// let labels = kmeans.fit_predict(&data.view()).unwrap();
/// assert_eq!(labels.len(), 4);
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
/// ```
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions), set on the first fit
    d: usize,

    /// Trained centroids (None if not yet fitted)
    centroids: Option<Array2<f64>>,

    /// Labels from the winning restart of the last fit
    labels: Option<Array1<usize>>,

    /// Inertia of the winning restart of the last fit
    inertia: Option<f64>,
}

impl KMeans {
    /// Create a new instance with default configuration and `k` clusters.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new instance with custom configuration.
    pub fn with_config(config: KMeansConfig) -> Self {
        Self {
            config,
            d: 0,
            centroids: None,
            labels: None,
            inertia: None,
        }
    }

    /// Fit the model to the data.
    ///
    /// Returns `&mut Self` for method chaining.
    ///
    /// # Errors
    ///
    /// * `InvalidParameter` - malformed configuration (k, max_iters, tol, n_init)
    /// * `InsufficientData` - empty input or fewer samples than clusters
    /// * `InvalidDimensions` - feature count differs from an earlier fit
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, ClusterError> {
        let n_features = data.ncols();

        // Set dimensions on first call, validate on subsequent calls
        if self.d == 0 {
            self.d = n_features;
        } else if n_features != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let fit = run_kmeans(data, &self.config)?;

        self.centroids = Some(fit.centroids);
        self.labels = Some(fit.labels);
        self.inertia = Some(fit.inertia);
        Ok(self)
    }

    /// Predict cluster assignments for new data using the fitted centroids.
    ///
    /// # Errors
    ///
    /// * `NotFitted` - `fit()` has not been called
    /// * `InvalidDimensions` - feature count differs from the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        let centroids = self.centroids.as_ref().ok_or(ClusterError::NotFitted)?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let n_samples = data.nrows();
        let data_norms = compute_squared_norms(data);
        let centroid_norms = compute_squared_norms(&centroids.view());

        let mut labels = Array1::zeros(n_samples);
        let mut start_idx = 0;
        while start_idx < n_samples {
            let end_idx = (start_idx + self.config.chunk_size_data).min(n_samples);
            let data_chunk = data.slice(ndarray::s![start_idx..end_idx, ..]);
            let data_chunk_norms = data_norms.slice(ndarray::s![start_idx..end_idx]);

            let (chunk_labels, _) = find_nearest_centroids_chunked(
                &data_chunk,
                &data_chunk_norms,
                &centroids.view(),
                &centroid_norms.view(),
                self.config.chunk_size_centroids,
            );

            for (i, &label) in chunk_labels.iter().enumerate() {
                labels[start_idx + i] = label;
            }

            start_idx = end_idx;
        }

        Ok(labels)
    }

    /// Fit the model and return the training labels in one call.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        self.fit(data)?;
        self.labels
            .clone()
            .ok_or(ClusterError::NotFitted)
    }

    /// Centroids of the fitted model, `None` before the first fit.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// Training labels of the winning restart, `None` before the first fit.
    pub fn labels(&self) -> Option<&Array1<usize>> {
        self.labels.as_ref()
    }

    /// Inertia (sum of squared distances to assigned centroids) of the
    /// winning restart, `None` before the first fit.
    pub fn inertia(&self) -> Option<f64> {
        self.inertia
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}

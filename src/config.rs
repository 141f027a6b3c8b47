use crate::error::ClusterError;

/// Configuration for the k-means engine
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of Lloyd iterations per restart
    pub max_iters: usize,

    /// Convergence tolerance. A restart stops early when either the
    /// relative inertia change or the maximum per-coordinate centroid
    /// shift falls at or below this threshold.
    pub tol: f64,

    /// Number of independent restarts. The restart with the lowest
    /// inertia wins; ties keep the first one encountered.
    pub n_init: usize,

    /// Seed for the deterministic random stream. Restart `r` draws from
    /// a fresh stream seeded with `seed + r`. `None` uses the
    /// non-reproducible system source.
    pub seed: Option<u32>,

    /// Chunk size for data processing. Larger values use more memory but may be faster.
    pub chunk_size_data: usize,

    /// Chunk size for centroid processing. Larger values use more memory but may be faster.
    pub chunk_size_centroids: usize,

    /// Print verbose output during fitting
    pub verbose: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 300,
            tol: 1e-4,
            n_init: 10,
            seed: None,
            chunk_size_data: 51_200,
            chunk_size_centroids: 10_240,
            verbose: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of independent restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: Option<u32>) -> Self {
        self.seed = seed;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the data chunk size
    pub fn with_chunk_size_data(mut self, chunk_size: usize) -> Self {
        self.chunk_size_data = chunk_size;
        self
    }

    /// Set the centroid chunk size
    pub fn with_chunk_size_centroids(mut self, chunk_size: usize) -> Self {
        self.chunk_size_centroids = chunk_size;
        self
    }

    /// Reject malformed parameters before any computation starts.
    pub(crate) fn validate(&self) -> Result<(), ClusterError> {
        if self.k < 1 {
            return Err(ClusterError::InvalidParameter(
                "k must be a positive integer (>= 1)".to_string(),
            ));
        }
        if self.max_iters < 1 {
            return Err(ClusterError::InvalidParameter(
                "max_iters must be a positive integer (>= 1)".to_string(),
            ));
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(ClusterError::InvalidParameter(
                "tol must be a non-negative number".to_string(),
            ));
        }
        if self.n_init < 1 {
            return Err(ClusterError::InvalidParameter(
                "n_init must be a positive integer (>= 1)".to_string(),
            ));
        }
        if self.chunk_size_data < 1 || self.chunk_size_centroids < 1 {
            return Err(ClusterError::InvalidParameter(
                "chunk sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

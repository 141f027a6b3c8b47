//! Validation-guided model selection.
//!
//! Runs many k-means fits over random seeds and/or a grid of
//! similarity-graph scale parameters, scores every labeling with internal
//! validation metrics supplied by the caller, and keeps the best result.
//! Metric computation itself (Calinski-Harabasz, Davies-Bouldin,
//! silhouette) lives outside this crate behind [`ClusterValidation`].

use crate::algorithm::run_kmeans;
use crate::config::KMeansConfig;
use crate::error::ClusterError;
use ndarray::{Array2, ArrayView2};
use std::fmt;
use std::str::FromStr;

/// Default scale-parameter grid for the intensive sweep
const DEFAULT_GAMMA_RANGE: [f64; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0];

/// Attempt counts exercised by the validated pass of the sweep
const ATTEMPTS_RANGE: [usize; 3] = [10, 20, 30];

/// Internal validation metrics, each with a fixed optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMetric {
    /// Between/within dispersion ratio; higher is better
    CalinskiHarabasz,
    /// Average worst-case cluster similarity; lower is better
    DaviesBouldin,
    /// Cohesion vs. separation per sample; higher is better
    Silhouette,
}

impl ValidationMetric {
    pub const ALL: [ValidationMetric; 3] = [
        ValidationMetric::CalinskiHarabasz,
        ValidationMetric::DaviesBouldin,
        ValidationMetric::Silhouette,
    ];

    /// Whether a larger raw score is better for this metric.
    pub fn maximize(self) -> bool {
        !matches!(self, ValidationMetric::DaviesBouldin)
    }

    /// True when `candidate` beats `incumbent` in this metric's direction.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        if self.maximize() {
            candidate > incumbent
        } else {
            candidate < incumbent
        }
    }

    /// Sentinel that any real score improves upon.
    pub fn worst(self) -> f64 {
        if self.maximize() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    /// Score mapped so that higher is always better (Davies-Bouldin is
    /// sign-flipped), for comparisons across metrics.
    pub fn normalized(self, score: f64) -> f64 {
        if self.maximize() {
            score
        } else {
            -score
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMetric::CalinskiHarabasz => "calinski-harabasz",
            ValidationMetric::DaviesBouldin => "davies-bouldin",
            ValidationMetric::Silhouette => "silhouette",
        }
    }
}

impl fmt::Display for ValidationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMetric {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calinski-harabasz" => Ok(ValidationMetric::CalinskiHarabasz),
            "davies-bouldin" => Ok(ValidationMetric::DaviesBouldin),
            "silhouette" => Ok(ValidationMetric::Silhouette),
            other => Err(ClusterError::InvalidParameter(format!(
                "unknown validation metric: {}",
                other
            ))),
        }
    }
}

/// External collaborator computing internal validation metrics.
///
/// Implementations score a labeling of an embedding; any error is treated
/// as a failed candidate by the sweep and skipped.
pub trait ClusterValidation {
    fn score(
        &self,
        metric: ValidationMetric,
        embedding: &ArrayView2<f64>,
        labels: &[usize],
    ) -> Result<f64, ClusterError>;
}

/// Configuration that produced an optimization result
#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    /// Scale parameter of the similarity graph
    pub gamma: f64,
    /// Metric used for selection
    pub metric: ValidationMetric,
    /// Number of seed-sweep attempts (0 for the plain multi-restart pass)
    pub attempts: usize,
    /// Whether validation-based selection was used
    pub use_validation: bool,
}

/// Best labeling found by an optimization run
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best label vector; empty when every candidate evaluation failed
    pub labels: Vec<usize>,
    /// The winning configuration
    pub config: OptimizationConfig,
    /// Raw score of the winning labeling under `config.metric`
    pub score: Option<f64>,
}

/// Parameters for the intensive sweep
#[derive(Debug, Clone, Default)]
pub struct SweepParams {
    /// Number of clusters
    pub n_clusters: usize,
    /// Current scale parameter, reported in the placeholder result
    pub gamma: Option<f64>,
    /// Candidate scale parameters; defaults to the built-in grid
    pub gamma_range: Option<Vec<f64>>,
    /// Base seed; attempt/restart indices are added to it
    pub seed: Option<u32>,
}

/// Seed-sweep mode: one single-init k-means per attempt, each scored with
/// the selected metric; the best-scoring labeling wins.
///
/// When a base seed is given, attempt `a` is seeded with `seed + a` so
/// the sweep stays reproducible while still exploring distinct
/// initializations.
///
/// # Errors
///
/// * `InvalidParameter` - `attempts < 1`
/// * Errors from the k-means engine or the validation collaborator are
///   propagated; the caller (or the parameter sweep) decides whether to
///   skip them.
pub fn validation_based_optimization<V: ClusterValidation + ?Sized>(
    embedding: &ArrayView2<f64>,
    n_clusters: usize,
    metric: ValidationMetric,
    attempts: usize,
    seed: Option<u32>,
    validator: &V,
) -> Result<OptimizationResult, ClusterError> {
    if attempts < 1 {
        return Err(ClusterError::InvalidParameter(
            "attempts must be a positive integer (>= 1)".to_string(),
        ));
    }

    let mut best_labels: Option<Vec<usize>> = None;
    let mut best_score = metric.worst();

    for attempt in 0..attempts {
        // Single run per seed when using validation
        let config = KMeansConfig::new(n_clusters)
            .with_n_init(1)
            .with_seed(seed.map(|s| s.wrapping_add(attempt as u32)));

        let fit = run_kmeans(embedding, &config)?;
        let labels = fit.labels.to_vec();

        let score = validator.score(metric, embedding, &labels)?;

        if best_labels.is_none() || metric.improves(score, best_score) {
            best_score = score;
            best_labels = Some(labels);
        }
    }

    Ok(OptimizationResult {
        labels: best_labels.unwrap_or_default(),
        config: OptimizationConfig {
            gamma: 0.0, // set by the caller that knows the graph scale
            metric,
            attempts,
            use_validation: true,
        },
        score: Some(best_score),
    })
}

/// A successfully evaluated sweep candidate, comparable across metrics
struct Candidate {
    labels: Vec<usize>,
    config: OptimizationConfig,
    comparable: f64,
    score: Option<f64>,
}

/// Parameter-sweep mode for difficult clustering problems.
///
/// For every candidate scale parameter the similarity graph and embedding
/// are rebuilt through the supplied collaborators, then evaluated twice:
/// a plain multi-restart k-means scored by the average of all three
/// metrics (Davies-Bouldin sign-flipped), and a full seed-sweep per
/// {metric x attempt-count} combination. Each candidate evaluation is a
/// `Result`; failures are skipped so a single bad combination never
/// aborts the sweep. When every combination fails the placeholder result
/// is returned and its label vector is empty.
pub fn intensive_parameter_sweep<V, E, A>(
    data: &ArrayView2<f64>,
    params: &SweepParams,
    embedding_fn: E,
    affinity_fn: A,
    validator: &V,
) -> OptimizationResult
where
    V: ClusterValidation + ?Sized,
    E: Fn(&ArrayView2<f64>) -> Result<Array2<f64>, ClusterError>,
    A: Fn(&ArrayView2<f64>, f64) -> Result<Array2<f64>, ClusterError>,
{
    let gammas: Vec<f64> = params
        .gamma_range
        .clone()
        .unwrap_or_else(|| DEFAULT_GAMMA_RANGE.to_vec());

    let mut candidates: Vec<Candidate> = Vec::new();

    // Pass 1: plain multi-restart k-means per gamma, scored by the
    // average of all metrics
    for &gamma in &gammas {
        if let Ok(candidate) =
            evaluate_plain(data, params, gamma, &embedding_fn, &affinity_fn, validator)
        {
            candidates.push(candidate);
        }
    }

    // Pass 2: validation-based seed sweeps per {gamma x attempts x metric}
    for &gamma in &gammas {
        for &attempts in &ATTEMPTS_RANGE {
            for &metric in &ValidationMetric::ALL {
                if let Ok(candidate) = evaluate_validated(
                    data,
                    params,
                    gamma,
                    metric,
                    attempts,
                    &embedding_fn,
                    &affinity_fn,
                    validator,
                ) {
                    candidates.push(candidate);
                }
            }
        }
    }

    // Select the best successful candidate; the placeholder with empty
    // labels survives only when everything failed
    let mut best = OptimizationResult {
        labels: Vec::new(),
        config: OptimizationConfig {
            gamma: params.gamma.unwrap_or(1.0),
            metric: ValidationMetric::CalinskiHarabasz,
            attempts: 20,
            use_validation: false,
        },
        score: None,
    };
    let mut best_comparable = f64::NEG_INFINITY;

    for candidate in candidates {
        if candidate.comparable > best_comparable {
            best_comparable = candidate.comparable;
            best = OptimizationResult {
                labels: candidate.labels,
                config: candidate.config,
                score: candidate.score,
            };
        }
    }

    best
}

fn evaluate_plain<V, E, A>(
    data: &ArrayView2<f64>,
    params: &SweepParams,
    gamma: f64,
    embedding_fn: &E,
    affinity_fn: &A,
    validator: &V,
) -> Result<Candidate, ClusterError>
where
    V: ClusterValidation + ?Sized,
    E: Fn(&ArrayView2<f64>) -> Result<Array2<f64>, ClusterError>,
    A: Fn(&ArrayView2<f64>, f64) -> Result<Array2<f64>, ClusterError>,
{
    let affinity = affinity_fn(data, gamma)?;
    let embedding = embedding_fn(&affinity.view())?;

    let config = KMeansConfig::new(params.n_clusters)
        .with_n_init(10)
        .with_seed(params.seed);
    let fit = run_kmeans(&embedding.view(), &config)?;
    let labels = fit.labels.to_vec();

    let mut avg = 0.0;
    for metric in ValidationMetric::ALL {
        let score = validator.score(metric, &embedding.view(), &labels)?;
        avg += metric.normalized(score);
    }
    avg /= ValidationMetric::ALL.len() as f64;

    Ok(Candidate {
        labels,
        config: OptimizationConfig {
            gamma,
            metric: ValidationMetric::CalinskiHarabasz,
            attempts: 0,
            use_validation: false,
        },
        comparable: avg,
        score: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn evaluate_validated<V, E, A>(
    data: &ArrayView2<f64>,
    params: &SweepParams,
    gamma: f64,
    metric: ValidationMetric,
    attempts: usize,
    embedding_fn: &E,
    affinity_fn: &A,
    validator: &V,
) -> Result<Candidate, ClusterError>
where
    V: ClusterValidation + ?Sized,
    E: Fn(&ArrayView2<f64>) -> Result<Array2<f64>, ClusterError>,
    A: Fn(&ArrayView2<f64>, f64) -> Result<Array2<f64>, ClusterError>,
{
    let affinity = affinity_fn(data, gamma)?;
    let embedding = embedding_fn(&affinity.view())?;

    let result = validation_based_optimization(
        &embedding.view(),
        params.n_clusters,
        metric,
        attempts,
        params.seed,
        validator,
    )?;

    let raw = result.score.unwrap_or(0.0);
    Ok(Candidate {
        labels: result.labels,
        config: OptimizationConfig {
            gamma,
            metric,
            attempts,
            use_validation: true,
        },
        comparable: metric.normalized(raw),
        score: Some(raw),
    })
}

//! Connected-component detection and indicator features.
//!
//! When a similarity graph is disconnected its Laplacian has one zero
//! eigenvalue per component and the eigensolver embedding degenerates.
//! The indicator matrix built here substitutes for that embedding: one
//! unit-norm column per component, usable directly by k-means.

use crate::error::ClusterError;
use ndarray::{Array2, ArrayView2};
use std::collections::VecDeque;

/// Assignment of samples to connected components
#[derive(Debug, Clone)]
pub struct ComponentLabeling {
    /// Component id per sample, ids assigned in increasing order of the
    /// first-visited unlabeled sample
    pub labels: Vec<usize>,
    /// Samples per component, indexed by component id
    pub sizes: Vec<usize>,
}

impl ComponentLabeling {
    pub fn num_components(&self) -> usize {
        self.sizes.len()
    }

    /// A graph with a single component is fully connected and needs no
    /// indicator substitution.
    pub fn is_fully_connected(&self) -> bool {
        self.sizes.len() == 1
    }
}

/// Detect connected components of the graph implied by strictly-positive
/// affinity entries, via breadth-first search in sample-index order.
///
/// # Errors
///
/// Returns `InvalidDimensions` for a non-square affinity matrix.
pub fn detect_components(affinity: &ArrayView2<f64>) -> Result<ComponentLabeling, ClusterError> {
    let n = affinity.nrows();
    if affinity.ncols() != n {
        return Err(ClusterError::InvalidDimensions(format!(
            "affinity matrix must be square, got {}x{}",
            n,
            affinity.ncols()
        )));
    }

    const UNLABELED: usize = usize::MAX;
    let mut labels = vec![UNLABELED; n];
    let mut sizes = Vec::new();
    let mut current_component = 0;

    for start_node in 0..n {
        if labels[start_node] != UNLABELED {
            continue;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start_node);
        labels[start_node] = current_component;
        let mut size = 0usize;

        while let Some(node) = queue.pop_front() {
            size += 1;
            for neighbor in 0..n {
                if neighbor != node
                    && labels[neighbor] == UNLABELED
                    && affinity[[node, neighbor]] > 0.0
                {
                    labels[neighbor] = current_component;
                    queue.push_back(neighbor);
                }
            }
        }

        sizes.push(size);
        current_component += 1;
    }

    Ok(ComponentLabeling { labels, sizes })
}

/// Build the normalized component indicator matrix (n x num_components).
///
/// Row `i` has a single non-zero entry `1 / sqrt(size(component(i)))` in
/// its component's column, so every non-empty column has unit norm and
/// the matrix mimics the eigenvector embedding of a disconnected graph.
/// Columns beyond the discovered component count stay all-zero.
///
/// # Errors
///
/// * `InvalidDimensions` - non-square affinity matrix
/// * `InvalidParameter` - `num_components` smaller than the number of
///   components actually found
///
/// # Example
///
/// ```
/// use spectral_kmeans_rs::component_indicators;
/// use ndarray::array;
///
/// // Two disjoint edges
/// let affinity = array![
///     [0.0, 1.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
///     [0.0, 0.0, 1.0, 0.0],
/// ];
/// let indicators = component_indicators(&affinity.view(), 2).unwrap();
/// assert_eq!(indicators.shape(), &[4, 2]);
/// ```
pub fn component_indicators(
    affinity: &ArrayView2<f64>,
    num_components: usize,
) -> Result<Array2<f64>, ClusterError> {
    let labeling = detect_components(affinity)?;
    indicators_from_labeling(&labeling, num_components)
}

/// Indicator matrix from an already-computed labeling.
pub fn indicators_from_labeling(
    labeling: &ComponentLabeling,
    num_components: usize,
) -> Result<Array2<f64>, ClusterError> {
    let found = labeling.num_components();
    if num_components < found {
        return Err(ClusterError::InvalidParameter(format!(
            "num_components ({}) is less than the {} components found",
            num_components, found
        )));
    }

    let n = labeling.labels.len();
    let mut indicators = Array2::zeros((n, num_components));
    for (i, &component) in labeling.labels.iter().enumerate() {
        indicators[[i, component]] = 1.0 / (labeling.sizes[component] as f64).sqrt();
    }

    Ok(indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Block-diagonal affinity of two cliques of the given sizes
    fn two_clique_affinity(a: usize, b: usize) -> Array2<f64> {
        let n = a + b;
        let mut affinity = Array2::zeros((n, n));
        for i in 0..a {
            for j in 0..a {
                if i != j {
                    affinity[[i, j]] = 1.0;
                }
            }
        }
        for i in a..n {
            for j in a..n {
                if i != j {
                    affinity[[i, j]] = 1.0;
                }
            }
        }
        affinity
    }

    #[test]
    fn test_detect_two_cliques() {
        let affinity = two_clique_affinity(3, 5);
        let labeling = detect_components(&affinity.view()).unwrap();

        assert_eq!(labeling.num_components(), 2);
        assert!(!labeling.is_fully_connected());
        assert_eq!(labeling.sizes, vec![3, 5]);
        assert_eq!(labeling.labels[..3], [0, 0, 0]);
        assert_eq!(labeling.labels[3..], [1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_detect_fully_connected() {
        let affinity = two_clique_affinity(4, 0);
        let labeling = detect_components(&affinity.view()).unwrap();

        assert_eq!(labeling.num_components(), 1);
        assert!(labeling.is_fully_connected());
    }

    #[test]
    fn test_component_ids_follow_first_visit_order() {
        // Edges (0,3) and (1,2): sample 0's component gets id 0 even
        // though sample 1's component is contiguous
        let affinity = array![
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
        ];
        let labeling = detect_components(&affinity.view()).unwrap();

        assert_eq!(labeling.labels, vec![0, 1, 1, 0]);
        assert_eq!(labeling.sizes, vec![2, 2]);
    }

    #[test]
    fn test_isolated_nodes_are_singletons() {
        let affinity = Array2::<f64>::zeros((3, 3));
        let labeling = detect_components(&affinity.view()).unwrap();

        assert_eq!(labeling.labels, vec![0, 1, 2]);
        assert_eq!(labeling.sizes, vec![1, 1, 1]);
    }

    #[test]
    fn test_indicator_values_for_two_cliques() {
        let affinity = two_clique_affinity(3, 5);
        let indicators = component_indicators(&affinity.view(), 2).unwrap();

        assert_eq!(indicators.shape(), &[8, 2]);
        for i in 0..3 {
            assert_relative_eq!(indicators[[i, 0]], 1.0 / 3.0f64.sqrt(), epsilon = 1e-12);
            assert_eq!(indicators[[i, 1]], 0.0);
        }
        for i in 3..8 {
            assert_eq!(indicators[[i, 0]], 0.0);
            assert_relative_eq!(indicators[[i, 1]], 1.0 / 5.0f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_indicator_columns_have_unit_norm() {
        let affinity = two_clique_affinity(3, 5);
        let indicators = component_indicators(&affinity.view(), 2).unwrap();

        for col in indicators.columns() {
            let norm_sq: f64 = col.iter().map(|v| v * v).sum();
            assert_relative_eq!(norm_sq, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rows_have_single_nonzero_entry() {
        let affinity = two_clique_affinity(2, 4);
        let indicators = component_indicators(&affinity.view(), 2).unwrap();

        for row in indicators.rows() {
            let nonzero = row.iter().filter(|v| **v != 0.0).count();
            assert_eq!(nonzero, 1);
        }
    }

    #[test]
    fn test_extra_columns_stay_zero() {
        let affinity = two_clique_affinity(2, 2);
        let indicators = component_indicators(&affinity.view(), 4).unwrap();

        assert_eq!(indicators.shape(), &[4, 4]);
        for i in 0..4 {
            assert_eq!(indicators[[i, 2]], 0.0);
            assert_eq!(indicators[[i, 3]], 0.0);
        }
    }

    #[test]
    fn test_too_few_components_requested() {
        let affinity = two_clique_affinity(2, 2);
        assert!(matches!(
            component_indicators(&affinity.view(), 1),
            Err(ClusterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_non_square_affinity_rejected() {
        let affinity = Array2::<f64>::zeros((3, 4));
        assert!(matches!(
            detect_components(&affinity.view()),
            Err(ClusterError::InvalidDimensions(_))
        ));
    }
}

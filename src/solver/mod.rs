//! Sparse code inference
//!
//! A solver takes a batch of sample columns and the current dictionary and
//! returns one coefficient column per sample, such that `dictionary · codes`
//! approximates the samples while most coefficients are zero.
//!
//! # Available Solvers
//!
//! - Ista: iterative shrinkage-thresholding with a bounded inner loop
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use sparse_coding::solver::{Ista, SparseSolver};
//!
//! let dictionary = array![[1.0, 0.0], [0.0, 1.0]];
//! let samples = array![[2.0], [0.0]];
//!
//! let ista = Ista::new(0.1, 0.1, 0.01, 500);
//! let codes = ista.solve(samples.view(), dictionary.view()).unwrap();
//! assert_eq!(codes.codes().dim(), (2, 1));
//! ```

pub mod ista;

pub use ista::{shrink, shrink_value, sign, Ista};

use crate::error::Result;
use ndarray::{Array2, ArrayView2};

/// Core trait for sparse code solvers.
///
/// Columns are solved independently: no sample's code depends on another
/// sample, so implementations are free to process columns in parallel.
pub trait SparseSolver {
    /// Infer a `basis_function_count × samples.ncols()` code matrix.
    ///
    /// # Arguments
    ///
    /// * `samples` - One flattened patch per column (`patch_dim × batch`)
    /// * `dictionary` - Basis functions as columns (`patch_dim × basis_function_count`)
    fn solve(&self, samples: ArrayView2<'_, f64>, dictionary: ArrayView2<'_, f64>)
        -> Result<SparseCodes>;
}

/// How the inner loop of one column ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveExit {
    /// The code norm changed by less than the tolerance.
    Converged { iterations: usize },
    /// The iteration cap was reached; the lowest-residual iterate was kept.
    IterationCap { iterations: usize },
}

impl SolveExit {
    pub fn iterations(&self) -> usize {
        match *self {
            SolveExit::Converged { iterations } | SolveExit::IterationCap { iterations } => {
                iterations
            }
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, SolveExit::Converged { .. })
    }
}

/// Inferred codes plus per-column diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseCodes {
    codes: Array2<f64>,
    exits: Vec<SolveExit>,
}

impl SparseCodes {
    pub fn new(codes: Array2<f64>, exits: Vec<SolveExit>) -> Self {
        debug_assert_eq!(codes.ncols(), exits.len());
        Self { codes, exits }
    }

    pub fn codes(&self) -> &Array2<f64> {
        &self.codes
    }

    pub fn into_codes(self) -> Array2<f64> {
        self.codes
    }

    pub fn exits(&self) -> &[SolveExit] {
        &self.exits
    }

    pub fn converged_count(&self) -> usize {
        self.exits.iter().filter(|e| e.converged()).count()
    }

    pub fn capped_count(&self) -> usize {
        self.exits.len() - self.converged_count()
    }

    /// Inner rounds summed over all columns.
    pub fn total_iterations(&self) -> usize {
        self.exits.iter().map(SolveExit::iterations).sum()
    }

    /// Fraction of coefficients that are exactly zero.
    pub fn sparsity(&self) -> f64 {
        if self.codes.is_empty() {
            return 1.0;
        }
        let zeros = self.codes.iter().filter(|&&v| v == 0.0).count();
        zeros as f64 / self.codes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sparse_codes_counts() {
        let codes = SparseCodes::new(
            array![[0.0, 1.0, 0.0], [0.0, 0.0, 2.0]],
            vec![
                SolveExit::Converged { iterations: 1 },
                SolveExit::IterationCap { iterations: 10 },
                SolveExit::Converged { iterations: 4 },
            ],
        );

        assert_eq!(codes.converged_count(), 2);
        assert_eq!(codes.capped_count(), 1);
        assert_eq!(codes.total_iterations(), 15);
        assert!((codes.sparsity() - 4.0 / 6.0).abs() < 1e-12);
    }
}

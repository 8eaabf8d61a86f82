//! Iterative Shrinkage-Thresholding (ISTA)
//!
//! Per sample column, starting from a zero code:
//!
//! ```text
//! residual = sample - D · code
//! code     = shrink(code + step · Dᵀ · residual)
//! ```
//!
//! until the Euclidean norm of the code changes by less than `tolerance` in one
//! round, or `max_iterations` rounds have run. Columns are independent and are
//! solved in parallel with rayon; results are collected in column order, so the
//! output does not depend on scheduling.

use crate::error::{Result, SparseCodingError};
use crate::solver::{SolveExit, SparseCodes, SparseSolver};
use crate::utils::{all_finite, l2_norm};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};
use rayon::prelude::*;

/// ISTA solver settings.
///
/// * `step` - Gradient step of each round
/// * `noise_variance` - Shrinkage strength (`step · noise_variance` per round)
///   and clamp-to-zero threshold
/// * `tolerance` - Stop once the code norm changes by less than this
/// * `max_iterations` - Rounds allowed per column before giving up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ista {
    step: f64,
    noise_variance: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl Ista {
    pub fn new(step: f64, noise_variance: f64, tolerance: f64, max_iterations: usize) -> Self {
        Self {
            step,
            noise_variance,
            tolerance,
            max_iterations,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Solve a single sample column.
    ///
    /// Reaching `max_iterations` is not an error: the iterate with the smallest
    /// residual seen so far is returned with `SolveExit::IterationCap`.
    pub fn solve_column(
        &self,
        sample: ArrayView1<'_, f64>,
        dictionary: ArrayView2<'_, f64>,
    ) -> Result<(Array1<f64>, SolveExit)> {
        let mut code = Array1::<f64>::zeros(dictionary.ncols());
        let mut best: Option<(f64, Array1<f64>)> = None;

        for iteration in 1..=self.max_iterations {
            let previous = l2_norm(&code);

            let residual = &sample - &dictionary.dot(&code);
            let residual_norm = l2_norm(&residual);
            if best.as_ref().map_or(true, |(norm, _)| residual_norm < *norm) {
                best = Some((residual_norm, code.clone()));
            }

            code.scaled_add(self.step, &dictionary.t().dot(&residual));
            shrink(code.view_mut(), self.step, self.noise_variance);

            if !all_finite(&code) {
                return Err(SparseCodingError::NonFinite {
                    stage: "sparse code inference",
                });
            }

            let current = l2_norm(&code);
            if (current - previous).abs() < self.tolerance {
                return Ok((code, SolveExit::Converged { iterations: iteration }));
            }
        }

        let last_norm = l2_norm(&(&sample - &dictionary.dot(&code)));
        let code = match best {
            Some((norm, earlier)) if norm < last_norm => earlier,
            _ => code,
        };

        Ok((
            code,
            SolveExit::IterationCap {
                iterations: self.max_iterations,
            },
        ))
    }
}

impl SparseSolver for Ista {
    fn solve(
        &self,
        samples: ArrayView2<'_, f64>,
        dictionary: ArrayView2<'_, f64>,
    ) -> Result<SparseCodes> {
        if samples.nrows() != dictionary.nrows() {
            return Err(SparseCodingError::dimension_mismatch(
                "sample rows",
                dictionary.nrows(),
                samples.nrows(),
            ));
        }

        let columns = (0..samples.ncols())
            .into_par_iter()
            .map(|j| self.solve_column(samples.column(j), dictionary))
            .collect::<Result<Vec<_>>>()?;

        let mut codes = Array2::<f64>::zeros((dictionary.ncols(), samples.ncols()));
        let mut exits = Vec::with_capacity(columns.len());
        for (j, (code, exit)) in columns.into_iter().enumerate() {
            codes.column_mut(j).assign(&code);
            exits.push(exit);
        }

        Ok(SparseCodes::new(codes, exits))
    }
}

/// `1` for `x >= 0`, `-1` otherwise.
pub fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Shrink one coefficient by `step · noise_variance` towards zero.
///
/// The result is clamped to zero when its magnitude falls below
/// `noise_variance` (not below the shrink amount).
pub fn shrink_value(x: f64, step: f64, noise_variance: f64) -> f64 {
    let shrink_step = step * noise_variance;
    let result = x - shrink_step * sign(x);

    if result.abs() < noise_variance {
        0.0
    } else {
        result
    }
}

/// Apply [`shrink_value`] to every coefficient in place.
pub fn shrink(mut codes: ArrayViewMut1<'_, f64>, step: f64, noise_variance: f64) {
    codes.mapv_inplace(|x| shrink_value(x, step, noise_variance));
}

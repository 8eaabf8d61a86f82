//! Dictionary of basis functions
//!
//! The dictionary is a `patch_size² × basis_function_count` matrix whose columns
//! are the learned basis functions. Every column has unit Euclidean norm after
//! construction and after every update; `normalize_columns` enforces this and
//! refuses zero-norm columns instead of dividing by zero.

use crate::error::{Result, SparseCodingError};
use crate::utils::{all_finite, l2_norm, SimpleRng};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Lower and upper bound of the uniform initialization.
const INIT_LOW: f64 = -0.5;
const INIT_HIGH: f64 = 0.5;

/// Matrix of unit-norm basis functions stored as columns.
///
/// Columns use the column-major patch flattening of [`crate::sampler::extract_patch`]:
/// entry `c * patch_size + r` holds pixel `(r, c)` of the patch.
///
/// # Example
///
/// ```
/// use sparse_coding::dictionary::Dictionary;
/// use sparse_coding::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let dictionary = Dictionary::random(8, 64, &mut rng).unwrap();
/// assert_eq!(dictionary.patch_dim(), 64);
/// assert_eq!(dictionary.basis_function_count(), 64);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    patch_size: usize,
    atoms: Array2<f64>,
}

impl Dictionary {
    /// Create a dictionary with entries drawn uniformly from [-0.5, 0.5],
    /// then normalize each column.
    ///
    /// Entries are drawn row by row, so the same seed always yields the same
    /// matrix.
    pub fn random(
        patch_size: usize,
        basis_function_count: usize,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        if patch_size == 0 || basis_function_count == 0 {
            return Err(SparseCodingError::invalid_config(
                "dictionary needs a positive patch size and basis function count",
            ));
        }

        let patch_dim = patch_size * patch_size;
        let atoms = Array2::from_shape_simple_fn((patch_dim, basis_function_count), || {
            rng.gen_range_f64(INIT_LOW, INIT_HIGH)
        });

        Self::from_matrix(patch_size, atoms)
    }

    /// Wrap an existing matrix, normalizing its columns.
    ///
    /// The matrix must have `patch_size²` rows.
    pub fn from_matrix(patch_size: usize, mut atoms: Array2<f64>) -> Result<Self> {
        let patch_dim = patch_size * patch_size;
        if atoms.nrows() != patch_dim {
            return Err(SparseCodingError::dimension_mismatch(
                "dictionary rows",
                patch_dim,
                atoms.nrows(),
            ));
        }
        if atoms.ncols() == 0 {
            return Err(SparseCodingError::invalid_config(
                "dictionary needs at least one basis function",
            ));
        }

        normalize_columns(&mut atoms)?;
        Ok(Self { patch_size, atoms })
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    /// Length of a basis function (`patch_size²`).
    pub fn patch_dim(&self) -> usize {
        self.atoms.nrows()
    }

    pub fn basis_function_count(&self) -> usize {
        self.atoms.ncols()
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.atoms
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.atoms.view()
    }

    pub fn basis_function(&self, index: usize) -> ArrayView1<'_, f64> {
        self.atoms.column(index)
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.atoms
    }

    /// Euclidean norm of every column.
    pub fn column_norms(&self) -> Array1<f64> {
        self.atoms.columns().into_iter().map(|c| l2_norm(&c)).collect()
    }

    /// Reconstruct samples from sparse codes: `D · codes`.
    pub fn reconstruct(&self, codes: &Array2<f64>) -> Array2<f64> {
        self.atoms.dot(codes)
    }

    /// Take one gradient step `D += step · gradient`, then renormalize.
    ///
    /// Fails with `NonFinite` if the update produced NaN or infinity, and with
    /// `DegenerateColumn` if a column collapsed to zero.
    pub fn apply_gradient(&mut self, step: f64, gradient: &Array2<f64>) -> Result<()> {
        if gradient.dim() != self.atoms.dim() {
            return Err(SparseCodingError::dimension_mismatch(
                "dictionary gradient",
                format!("{:?}", self.atoms.dim()),
                format!("{:?}", gradient.dim()),
            ));
        }

        self.atoms.scaled_add(step, gradient);
        if !all_finite(&self.atoms) {
            return Err(SparseCodingError::NonFinite {
                stage: "dictionary update",
            });
        }
        normalize_columns(&mut self.atoms)
    }
}

/// Rescale every column of `matrix` to unit Euclidean norm in place.
pub fn normalize_columns(matrix: &mut Array2<f64>) -> Result<()> {
    for (index, mut column) in matrix.columns_mut().into_iter().enumerate() {
        let norm = l2_norm(&column);
        if norm == 0.0 || !norm.is_finite() {
            return Err(SparseCodingError::DegenerateColumn { index });
        }
        column /= norm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_random_dictionary_shape_and_norms() {
        let mut rng = SimpleRng::new(42);
        let dictionary = Dictionary::random(4, 6, &mut rng).unwrap();

        assert_eq!(dictionary.matrix().dim(), (16, 6));
        for norm in dictionary.column_norms() {
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_columns_rejects_zero_column() {
        let mut m = array![[1.0, 0.0], [1.0, 0.0]];
        let err = normalize_columns(&mut m).unwrap_err();
        assert!(matches!(err, SparseCodingError::DegenerateColumn { index: 1 }));
    }

    #[test]
    fn test_from_matrix_checks_rows() {
        let m = Array2::<f64>::ones((5, 2));
        assert!(matches!(
            Dictionary::from_matrix(2, m),
            Err(SparseCodingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_gradient_renormalizes() {
        let mut dictionary = Dictionary::from_matrix(1, array![[1.0, -1.0]]).unwrap();
        dictionary.apply_gradient(1.0, &array![[2.0, -5.0]]).unwrap();

        assert_eq!(dictionary.matrix(), &array![[1.0, -1.0]]);
    }

    #[test]
    fn test_apply_gradient_detects_non_finite() {
        let mut dictionary = Dictionary::from_matrix(1, array![[1.0]]).unwrap();
        let err = dictionary
            .apply_gradient(1.0, &array![[f64::NAN]])
            .unwrap_err();
        assert!(matches!(err, SparseCodingError::NonFinite { .. }));
    }
}

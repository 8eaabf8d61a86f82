//! Vector helpers on top of ndarray.

use ndarray::{ArrayBase, Data, Dimension};

/// Euclidean norm of any array, treated as a flat vector.
pub fn l2_norm<S, D>(values: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// True when no entry is NaN or infinite.
pub fn all_finite<S, D>(values: &ArrayBase<S, D>) -> bool
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    values.iter().all(|v| v.is_finite())
}

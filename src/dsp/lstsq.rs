//! Regularized least squares over complex design matrices
//!
//! Solves `coef = pinv(XᴴX + εI) · Xᴴ · y`. The pseudo-inverse discards
//! singular values below `1e-15 · σ_max`, so a rank-deficient Gram matrix
//! still yields a finite minimum-norm answer even with `ε = 0`.

use nalgebra::{DMatrix, DVector};

use crate::domain::{DpdError, DpdResult, Sample};

/// Relative singular-value cutoff for the pseudo-inverse
pub const PINV_RCOND: f64 = 1e-15;

const SVD_MAX_ITERATIONS: usize = 10_000;

fn all_finite<'a>(values: impl IntoIterator<Item = &'a Sample>) -> bool {
    values.into_iter().all(|v| v.re.is_finite() && v.im.is_finite())
}

/// Moore-Penrose pseudo-inverse via SVD
pub fn pinv(matrix: DMatrix<Sample>) -> DpdResult<DMatrix<Sample>> {
    if !all_finite(matrix.iter()) {
        return Err(DpdError::NumericDegeneracy(
            "matrix has non-finite entries".to_string(),
        ));
    }

    let svd = matrix
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| DpdError::NumericDegeneracy("SVD did not converge".to_string()))?;
    let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);

    svd.pseudo_inverse(PINV_RCOND * largest)
        .map_err(|e| DpdError::NumericDegeneracy(e.to_string()))
}

/// Tikhonov-regularized least-squares solve of `design · coef ≈ target`
pub fn regularized_solve(
    design: &DMatrix<Sample>,
    target: &DVector<Sample>,
    epsilon: f64,
) -> DpdResult<DVector<Sample>> {
    if design.nrows() != target.len() {
        return Err(DpdError::mismatch("least-squares target", design.nrows(), target.len()));
    }

    let mut gram = design.ad_mul(design);
    for i in 0..gram.nrows() {
        gram[(i, i)] += Sample::new(epsilon, 0.0);
    }
    let projected = design.ad_mul(target);
    if !all_finite(projected.iter()) {
        return Err(DpdError::NumericDegeneracy(
            "least-squares target has non-finite samples".to_string(),
        ));
    }

    let coef = pinv(gram)? * projected;
    if !all_finite(coef.iter()) {
        return Err(DpdError::NumericDegeneracy(
            "least-squares solution is not finite".to_string(),
        ));
    }
    Ok(coef)
}

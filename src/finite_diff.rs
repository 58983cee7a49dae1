//! Numerical derivatives for checking backward passes.

/// Central-difference gradient of `f` at `point`.
///
/// Entry `i` approximates `df/dx_i` as `(f(x + eps*e_i) - f(x - eps*e_i)) / 2eps`.
///
/// ```
/// use scalargrad::finite_diff::finite_diff_grad;
///
/// let grads = finite_diff_grad(|v: &[f64]| v[0] * v[1], &[3.0, 4.0], 1e-6);
/// assert!((grads[0] - 4.0).abs() < 1e-6);
/// assert!((grads[1] - 3.0).abs() < 1e-6);
/// ```
pub fn finite_diff_grad<F>(f: F, point: &[f64], eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut probe = point.to_vec();
    (0..point.len())
        .map(|i| {
            probe[i] = point[i] + eps;
            let upper = f(&probe);
            probe[i] = point[i] - eps;
            let lower = f(&probe);
            probe[i] = point[i];
            (upper - lower) / (2.0 * eps)
        })
        .collect()
}

/// Largest absolute difference between two gradient vectors of equal length.
///
/// # Panics
///
/// Panics if the lengths differ.
pub fn max_grad_error(lhs: &[f64], rhs: &[f64]) -> f64 {
    assert_eq!(lhs.len(), rhs.len(), "gradient vectors differ in length");
    lhs.iter()
        .zip(rhs)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

//! Least-squares curve fitting via the normal equations.
//!
//! For a design matrix `A` and response vector `y`, the fitted coefficients
//! are `c = (A^T A)^-1 (A^T y)`. The inverse is computed once and then
//! applied to `A^T y` rather than solving the system twice.

use crate::matrix::Matrix;
use forecast_types::{FitKind, ForecastError};

/// Coefficients are always in the polynomial-ascending convention
/// (`c[i]` multiplies `x^i`) regardless of fit family, so downstream code
/// (forecast/min/max/time-to-threshold) only ever deals with one
/// representation. Exponential/logarithmic/power fits carry their
/// back-transform alongside the two linear-space coefficients.
#[derive(Debug, Clone, PartialEq)]
pub enum Fit {
    /// `c[0] + c[1] * x`.
    Linear([f64; 2]),
    /// Ascending coefficients, length `degree + 1`.
    Polynomial(Vec<f64>),
    /// `y = a * e^(b * x)`, stored as `(a, b)`.
    Exponential(f64, f64),
    /// `y = a + b * ln(x)`.
    Logarithmic(f64, f64),
    /// `y = a * x^b`.
    Power(f64, f64),
}

impl Fit {
    /// Evaluates the fitted curve at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Fit::Linear([a, b]) => a + b * x,
            Fit::Polynomial(c) => crate::polynomial::evaluate(c, x),
            Fit::Exponential(a, b) => a * (b * x).exp(),
            Fit::Logarithmic(a, b) => a + b * x.ln(),
            Fit::Power(a, b) => a * x.powf(*b),
        }
    }
}

/// Fits `kind` to the `(x, y)` samples via ordinary least squares.
///
/// Exponential and power fits require `x > 0` for every sample (the fit is
/// performed in log-space); `NegativeOrZeroInput` is returned otherwise.
/// Logarithmic fits require the same for the same reason. At least
/// `kind.num_coefficients()` samples are required or the normal-equations
/// matrix would be singular; `IllDefined` is returned otherwise.
pub fn fit(kind: FitKind, xs: &[f64], ys: &[f64]) -> Result<Fit, ForecastError> {
    if xs.len() != ys.len() {
        return Err(ForecastError::DimMismatch { left: xs.len(), right: ys.len() });
    }
    if xs.is_empty() {
        return Err(ForecastError::IllDefined);
    }
    if !matches!(kind, FitKind::Polynomial(_)) {
        let needed = kind.num_coefficients();
        if xs.len() < needed {
            return Err(ForecastError::IllDefined);
        }
    }

    match kind {
        FitKind::Linear => {
            let c = least_squares(xs, ys, |x| vec![1.0, x])?;
            Ok(Fit::Linear([c[0], c[1]]))
        }
        FitKind::Polynomial(degree) => {
            // A degree-k polynomial needs k+1 samples to determine; clamp
            // down to however many samples are actually available rather
            // than reporting the fit as ill-defined.
            let degree = (degree as usize).min(xs.len() - 1) as u8;
            let c = least_squares(xs, ys, |x| (0..=degree).map(|p| x.powi(p as i32)).collect())?;
            Ok(Fit::Polynomial(c))
        }
        FitKind::Exponential => {
            require_positive(ys)?; // ln(y) requires y > 0
            let log_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
            let c = least_squares(xs, &log_ys, |x| vec![1.0, x])?;
            Ok(Fit::Exponential(c[0].exp(), c[1]))
        }
        FitKind::Logarithmic => {
            require_positive(xs)?;
            let log_xs: Vec<f64> = xs.iter().map(|x| x.ln()).collect();
            let c = least_squares(&log_xs, ys, |lx| vec![1.0, lx])?;
            Ok(Fit::Logarithmic(c[0], c[1]))
        }
        FitKind::Power => {
            require_positive(xs)?;
            require_positive(ys)?;
            let log_xs: Vec<f64> = xs.iter().map(|x| x.ln()).collect();
            let log_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
            let c = least_squares(&log_xs, &log_ys, |lx| vec![1.0, lx])?;
            Ok(Fit::Power(c[0].exp(), c[1]))
        }
    }
}

fn require_positive(values: &[f64]) -> Result<(), ForecastError> {
    if values.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::NegativeOrZeroInput);
    }
    Ok(())
}

/// Builds the design matrix from `basis(x)` per sample, then solves
/// `c = (A^T A)^-1 (A^T y)`.
fn least_squares(
    xs: &[f64],
    ys: &[f64],
    basis: impl Fn(f64) -> Vec<f64>,
) -> Result<Vec<f64>, ForecastError> {
    let rows: Vec<Vec<f64>> = xs.iter().map(|&x| basis(x)).collect();
    let a = Matrix::from_rows(rows)?;
    let y = Matrix::from_rows(ys.iter().map(|&v| vec![v]).collect())?;

    let at = a.transpose();
    let ata = at.mul(&a)?;
    let aty = at.mul(&y)?;
    let ata_inv = ata.inverse()?;
    let c = ata_inv.mul(&aty)?;

    Ok((0..c.rows()).map(|i| c[(i, 0)]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exact_line() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [3.0, 5.0, 7.0, 9.0]; // y = 1 + 2x
        let fit = fit(FitKind::Linear, &xs, &ys).unwrap();
        assert!((fit.evaluate(5.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn fits_exact_quadratic() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| 1.0 + 2.0 * x + 3.0 * x * x).collect();
        let fit = fit(FitKind::Polynomial(2), &xs, &ys).unwrap();
        assert!((fit.evaluate(5.0) - (1.0 + 2.0 * 5.0 + 3.0 * 25.0)).abs() < 1e-6);
    }

    #[test]
    fn exponential_requires_positive_y() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [1.0, -2.0, 3.0];
        assert!(matches!(
            fit(FitKind::Exponential, &xs, &ys),
            Err(ForecastError::NegativeOrZeroInput)
        ));
    }

    #[test]
    fn power_requires_positive_x() {
        let xs = [-1.0, 2.0, 3.0];
        let ys = [1.0, 2.0, 3.0];
        assert!(matches!(fit(FitKind::Power, &xs, &ys), Err(ForecastError::NegativeOrZeroInput)));
    }

    #[test]
    fn too_few_samples_is_ill_defined() {
        let xs = [1.0];
        let ys = [2.0];
        assert!(matches!(fit(FitKind::Linear, &xs, &ys), Err(ForecastError::IllDefined)));
    }

    #[test]
    fn polynomial_degree_is_clamped_to_sample_count() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [1.0, 3.0, 5.0]; // y = 1 + 2x, only 3 samples for a requested degree-5 fit
        let fit = fit(FitKind::Polynomial(5), &xs, &ys).unwrap();
        match &fit {
            Fit::Polynomial(c) => assert_eq!(c.len(), 3),
            _ => panic!("expected polynomial fit"),
        }
        assert!((fit.evaluate(4.0) - 9.0).abs() < 1e-6);
    }
}

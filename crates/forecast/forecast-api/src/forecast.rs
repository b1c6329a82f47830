//! `forecast()`: fits a curve to historical `(time, value)` samples and
//! reports a value, extremum, delta or average over a future window.

use forecast_math::polynomial;
use forecast_math::regression::Fit;
use forecast_types::{ERROR_SENTINEL, FitKind, ForecastError, ForecastMode, FORECAST_SENTINEL};

/// Fits `kind` to `(xs, ys)` and evaluates `mode` over the window
/// `[now, now + seconds]` (for `Value`, just the single point `now +
/// seconds`).
///
/// A `NaN` result (e.g. a `Logarithmic`/`Power` fit evaluated at a
/// nonsensical point) becomes [`ERROR_SENTINEL`]; anything else is clamped
/// to `±FORECAST_SENTINEL` rather than leaking `inf` into trigger
/// expressions.
pub fn forecast(
    kind: FitKind,
    xs: &[f64],
    ys: &[f64],
    now: f64,
    seconds: f64,
    mode: ForecastMode,
) -> Result<f64, ForecastError> {
    if xs.len() == 1 {
        return Ok(if mode == ForecastMode::Delta { 0.0 } else { clamp(ys[0]) });
    }
    let fitted = forecast_math::fit(kind, xs, ys)?;
    let raw = match mode {
        ForecastMode::Value => fitted.evaluate(now + seconds),
        ForecastMode::Max => extremum(&fitted, now, now + seconds, Extremum::Max)?,
        ForecastMode::Min => extremum(&fitted, now, now + seconds, Extremum::Min)?,
        ForecastMode::Delta => {
            let max = extremum(&fitted, now, now + seconds, Extremum::Max)?;
            let min = extremum(&fitted, now, now + seconds, Extremum::Min)?;
            max - min
        }
        ForecastMode::Avg => average(&fitted, now, now + seconds)?,
    };
    Ok(clamp(raw))
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        return ERROR_SENTINEL;
    }
    value.clamp(-FORECAST_SENTINEL, FORECAST_SENTINEL)
}

#[derive(Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

/// For the monotone families (linear / exponential / logarithmic / power)
/// the extremum over any interval is always at one of the two endpoints, so
/// no search is needed. Polynomial fits additionally check every real
/// derivative root that falls inside `[t0, t1]`.
fn extremum(fit: &Fit, t0: f64, t1: f64, which: Extremum) -> Result<f64, ForecastError> {
    let candidates = match fit {
        Fit::Polynomial(c) => {
            let mut xs = vec![t0, t1];
            let deriv = polynomial::derivative(c);
            if deriv.iter().any(|&v| v != 0.0) {
                for root in polynomial::real_roots(&deriv)? {
                    if root > t0 && root < t1 {
                        xs.push(root);
                    }
                }
            }
            xs
        }
        _ => vec![t0, t1],
    };

    let values: Vec<f64> = candidates.iter().map(|&x| fit.evaluate(x)).collect();
    let result = match which {
        Extremum::Max => values.into_iter().fold(f64::NEG_INFINITY, f64::max),
        Extremum::Min => values.into_iter().fold(f64::INFINITY, f64::min),
    };
    Ok(result)
}

/// Mean value of the fitted curve over `[t0, t1]`. Monotone families use
/// their closed-form antiderivative directly; polynomial fits reuse
/// [`polynomial::antiderivative`].
fn average(fit: &Fit, t0: f64, t1: f64) -> Result<f64, ForecastError> {
    if t1 == t0 {
        return Ok(fit.evaluate(t0));
    }
    let span = t1 - t0;
    let integral = match fit {
        Fit::Linear([a, b]) => a * span + b * (t1 * t1 - t0 * t0) / 2.0,
        Fit::Polynomial(c) => {
            let anti = polynomial::antiderivative(c);
            polynomial::evaluate(&anti, t1) - polynomial::evaluate(&anti, t0)
        }
        Fit::Exponential(a, b) => {
            if *b == 0.0 {
                a * span
            } else {
                a / b * ((b * t1).exp() - (b * t0).exp())
            }
        }
        Fit::Logarithmic(a, b) => {
            let antideriv = |x: f64| a * x + b * (x * x.ln() - x);
            antideriv(t1) - antideriv(t0)
        }
        Fit::Power(a, b) => {
            if (*b + 1.0).abs() < f64::EPSILON {
                a * (t1.ln() - t0.ln())
            } else {
                a * (t1.powf(b + 1.0) - t0.powf(b + 1.0)) / (b + 1.0)
            }
        }
    };
    Ok(integral / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_short_circuits_without_fitting() {
        let xs = [123.0];
        let ys = [7.0];
        let v = forecast(FitKind::Linear, &xs, &ys, 0.0, 10.0, ForecastMode::Value).unwrap();
        assert_eq!(v, 7.0);
        let d = forecast(FitKind::Linear, &xs, &ys, 0.0, 10.0, ForecastMode::Delta).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn value_mode_projects_forward() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0]; // y = 1 + 2x
        let v = forecast(FitKind::Linear, &xs, &ys, 3.0, 10.0, ForecastMode::Value).unwrap();
        assert!((v - (1.0 + 2.0 * 13.0)).abs() < 1e-6);
    }

    #[test]
    fn max_min_on_monotone_linear_fit() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 2.0, 4.0]; // y = 2x, increasing
        let max = forecast(FitKind::Linear, &xs, &ys, 0.0, 10.0, ForecastMode::Max).unwrap();
        let min = forecast(FitKind::Linear, &xs, &ys, 0.0, 10.0, ForecastMode::Min).unwrap();
        assert!((max - 20.0).abs() < 1e-6);
        assert!(min.abs() < 1e-6);
    }

    #[test]
    fn polynomial_max_uses_interior_critical_point() {
        // y = -(x-5)^2 + 25, peak at x = 5 within [0, 10]
        let xs = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let ys: Vec<f64> = xs.iter().map(|&x| -(x - 5.0).powi(2) + 25.0).collect();
        let max = forecast(FitKind::Polynomial(2), &xs, &ys, 0.0, 10.0, ForecastMode::Max).unwrap();
        assert!((max - 25.0).abs() < 1e-3);
    }

    #[test]
    fn result_is_clamped_to_sentinel() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [1.0, 10.0, 1000.0];
        let v = forecast(FitKind::Exponential, &xs, &ys, 3.0, 1e9, ForecastMode::Value).unwrap();
        assert!(v <= FORECAST_SENTINEL);
    }
}

//! `time_to_threshold()`: fits a curve and inverts it to find when it first
//! crosses a threshold after `now`.

use forecast_math::regression::Fit;
use forecast_types::{ERROR_SENTINEL, FitKind, ForecastError, FORECAST_SENTINEL};

/// Returns seconds from `now` until the fitted curve first reaches
/// `threshold`.
///
/// `Exponential`/`Power` curves are strictly positive, so a non-positive
/// `threshold` is rejected up front rather than producing a nonsensical
/// crossing time. A single sample short-circuits the fit entirely: `0` if
/// it already equals `threshold`, [`FORECAST_SENTINEL`] otherwise (no curve
/// to extrapolate).
///
/// For the closed-form families, a crossing `NaN` (the curve is flat at
/// exactly `threshold`) becomes [`ERROR_SENTINEL`]; anything negative (the
/// crossing is in the past) or past the sentinel magnitude collapses to
/// `+FORECAST_SENTINEL`, matching the "never, but don't say so as an error"
/// convention of the family this is ported from. Polynomial fits take a
/// narrower path: only a real root strictly after `now` counts as a
/// crossing at all, and the absence of one reports [`ERROR_SENTINEL`]
/// directly.
pub fn time_to_threshold(
    kind: FitKind,
    xs: &[f64],
    ys: &[f64],
    now: f64,
    threshold: f64,
) -> Result<f64, ForecastError> {
    if matches!(kind, FitKind::Exponential | FitKind::Power) && threshold <= 0.0 {
        return Err(ForecastError::InvalidParam(
            "exponential and power functions are always positive".to_string(),
        ));
    }
    if xs.len() == 1 {
        return Ok(if ys[0] == threshold { 0.0 } else { FORECAST_SENTINEL });
    }

    let fitted = forecast_math::fit(kind, xs, ys)?;
    if fitted.evaluate(now) == threshold {
        return Ok(0.0);
    }

    if let Fit::Polynomial(c) = &fitted {
        let mut shifted = c.clone();
        shifted[0] -= threshold;
        let roots = forecast_math::polynomial::real_roots(&shifted)?;
        let earliest = roots.into_iter().filter(|&t| t > now).fold(None, |best, t| match best {
            None => Some(t),
            Some(b) if t < b => Some(t),
            Some(b) => Some(b),
        });
        return Ok(match earliest {
            Some(t) => (t - now).min(FORECAST_SENTINEL),
            None => ERROR_SENTINEL,
        });
    }

    let raw = match &fitted {
        Fit::Linear([a, b]) => (threshold - a) / b - now,
        Fit::Exponential(a, b) => (threshold.ln() - a.ln()) / b - now,
        Fit::Logarithmic(a, b) => ((threshold - a) / b).exp() - now,
        Fit::Power(a, b) => ((threshold.ln() - a.ln()) / b).exp() - now,
        Fit::Polynomial(_) => unreachable!("handled above"),
    };

    Ok(clamp(raw))
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        ERROR_SENTINEL
    } else if !(0.0..=FORECAST_SENTINEL).contains(&value) {
        FORECAST_SENTINEL
    } else {
        value
    }
}

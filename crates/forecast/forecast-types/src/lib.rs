//! Shared vocabulary for the forecasting engine: fit families, forecast
//! modes, and the error type returned by every fallible operation in
//! `forecast-math` and `forecast-api`.

use thiserror::Error;

/// Regression family requested by a trigger expression, e.g. `forecast(...,
/// "polynomial3")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitKind {
    Linear,
    /// Degree is always in `1..=6`.
    Polynomial(u8),
    Exponential,
    Logarithmic,
    Power,
}

impl FitKind {
    /// Parses the textual fit specifier accepted by trigger functions, e.g.
    /// `"linear"`, `"polynomial3"`, `"exponential"`, `"logarithmic"`,
    /// `"power"`.
    ///
    /// `"polynomial"` must be followed by exactly one ASCII digit in
    /// `1..=6`; anything else is rejected rather than silently truncated or
    /// defaulted, unlike the malformed parser in the original C
    /// implementation.
    pub fn parse(text: &str) -> Result<Self, ForecastError> {
        if text == "linear" {
            return Ok(FitKind::Linear);
        }
        if text == "exponential" {
            return Ok(FitKind::Exponential);
        }
        if text == "logarithmic" {
            return Ok(FitKind::Logarithmic);
        }
        if text == "power" {
            return Ok(FitKind::Power);
        }
        if let Some(digit) = text.strip_prefix("polynomial") {
            let mut chars = digit.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(ForecastError::InvalidParam(format!(
                    "invalid fit function: {text}"
                )));
            };
            let degree = c
                .to_digit(10)
                .filter(|d| (1..=6).contains(d))
                .ok_or_else(|| {
                    ForecastError::InvalidParam(format!("invalid fit function: {text}"))
                })?;
            return Ok(FitKind::Polynomial(degree as u8));
        }
        Err(ForecastError::InvalidParam(format!(
            "invalid fit function: {text}"
        )))
    }

    /// Number of free coefficients the design matrix needs for this family.
    pub fn num_coefficients(self) -> usize {
        match self {
            FitKind::Linear => 2,
            FitKind::Polynomial(degree) => degree as usize + 1,
            FitKind::Exponential | FitKind::Logarithmic | FitKind::Power => 2,
        }
    }
}

/// What `forecast()` should report about the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    Value,
    Max,
    Min,
    Delta,
    Avg,
}

impl ForecastMode {
    pub fn parse(text: &str) -> Result<Self, ForecastError> {
        match text {
            "value" => Ok(ForecastMode::Value),
            "max" => Ok(ForecastMode::Max),
            "min" => Ok(ForecastMode::Min),
            "delta" => Ok(ForecastMode::Delta),
            "avg" => Ok(ForecastMode::Avg),
            other => Err(ForecastError::InvalidParam(format!(
                "invalid forecast mode: {other}"
            ))),
        }
    }
}

/// Forecast values are clamped to this magnitude instead of returning
/// `inf`/`nan` to callers — trigger expressions compare against it directly.
pub const FORECAST_SENTINEL: f64 = 1e12 - 1e-4;

/// Returned by `time_to_threshold()` when the fitted curve never crosses the
/// threshold within a representable horizon.
pub const ERROR_SENTINEL: f64 = -1.0;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("matrix must have positive dimensions, got {rows}x{cols}")]
    InvalidDims { rows: usize, cols: usize },
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("matrix is singular and cannot be inverted")]
    Singular,
    #[error("dimension mismatch: {left} vs {right}")]
    DimMismatch { left: usize, right: usize },
    #[error("fit requires strictly positive x values")]
    NegativeOrZeroInput,
    #[error("{0}")]
    InvalidParam(String),
    #[error("not enough data points to fit the requested curve")]
    IllDefined,
}

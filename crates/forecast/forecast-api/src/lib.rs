//! Public forecasting entry points: [`forecast()`] and
//! [`time_to_threshold()`].

mod forecast;
mod time_to_threshold;

pub use forecast::forecast;
pub use time_to_threshold::time_to_threshold;

pub use forecast_types::{FitKind, ForecastMode, ERROR_SENTINEL, FORECAST_SENTINEL};

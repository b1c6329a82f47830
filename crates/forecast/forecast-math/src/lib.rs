//! Numerical core for the forecasting engine: matrix inversion, least
//! squares regression, and polynomial calculus/root-finding.

pub mod matrix;
pub mod polynomial;
pub mod regression;

pub use matrix::Matrix;
pub use regression::{fit, Fit};

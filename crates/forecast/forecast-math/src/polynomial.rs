//! Polynomial evaluation, calculus, and the Durand-Kerner (Weierstrass)
//! simultaneous root finder used by `time_to_threshold()` and by the
//! min/max forecast modes.
//!
//! Coefficients are always stored ascending, `c[i]` multiplying `x^i`, so
//! `c.len() - 1` is the degree.

use forecast_types::ForecastError;

const ROOT_EPS: f64 = 1e-6;
const MAX_ITERATIONS: u32 = 200;
const MAX_RADIUS_DOUBLINGS: u32 = 10;

/// Evaluates `sum(c[i] * x^i)` via Horner's method.
pub fn evaluate(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &coef| acc * x + coef)
}

/// Closed-form antiderivative with constant term zero: `c[i] * x^(i+1) /
/// (i+1)`.
pub fn antiderivative(c: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(c.len() + 1);
    out.push(0.0);
    for (i, &coef) in c.iter().enumerate() {
        out.push(coef / (i as f64 + 1.0));
    }
    out
}

/// Derivative: `c'[i] = (i+1) * c[i+1]`. Degree drops by one; a constant
/// polynomial derives to `[0.0]`.
pub fn derivative(c: &[f64]) -> Vec<f64> {
    if c.len() <= 1 {
        return vec![0.0];
    }
    (1..c.len()).map(|i| c[i] * i as f64).collect()
}

/// A complex number, used only as the Durand-Kerner iterate; forecast
/// consumers only ever read back real roots within `ROOT_EPS` of the real
/// axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    fn sub(self, other: Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }

    fn add(self, other: Complex) -> Complex {
        Complex::new(self.re + other.re, self.im + other.im)
    }

    fn mul(self, other: Complex) -> Complex {
        Complex::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    fn div(self, other: Complex) -> Complex {
        let denom = other.re * other.re + other.im * other.im;
        Complex::new(
            (self.re * other.re + self.im * other.im) / denom,
            (self.im * other.re - self.re * other.im) / denom,
        )
    }

    fn is_real(self, tol: f64) -> bool {
        self.im.abs() < tol
    }
}

/// Finds every root of the polynomial with coefficients `c` (ascending),
/// returning only the ones that land within `ROOT_EPS` of the real axis, as
/// plain `f64`s. Leading (high-degree) coefficients equal to zero are
/// trimmed first; trailing (constant-side) zero coefficients strip off
/// roots at zero before the iterative solve runs on the remainder.
pub fn real_roots(c: &[f64]) -> Result<Vec<f64>, ForecastError> {
    let mut coeffs = c.to_vec();
    while coeffs.len() > 1 && *coeffs.last().unwrap() == 0.0 {
        coeffs.pop();
    }
    if coeffs.is_empty() || coeffs.iter().all(|&v| v == 0.0) {
        return Err(ForecastError::IllDefined);
    }

    let mut zero_roots = 0usize;
    while coeffs.len() > 1 && coeffs[0] == 0.0 {
        coeffs.remove(0);
        zero_roots += 1;
    }

    let degree = coeffs.len() - 1;
    let mut roots: Vec<f64> = vec![0.0; zero_roots];

    if degree == 0 {
        return Ok(roots);
    }
    if degree == 1 {
        roots.push(-coeffs[0] / coeffs[1]);
        return Ok(roots);
    }
    if degree == 2 {
        roots.extend(quadratic_roots(coeffs[0], coeffs[1], coeffs[2]));
        return Ok(roots);
    }

    roots.extend(durand_kerner(&coeffs)?);
    Ok(roots)
}

/// Numerically stable quadratic formula: picks the root-sum sign matching
/// `b` to avoid cancellation, then derives the second root from the
/// product-of-roots identity `c/a = r1 * r2` instead of repeating the
/// subtraction.
fn quadratic_roots(c0: f64, c1: f64, c2: f64) -> Vec<f64> {
    let disc = c1 * c1 - 4.0 * c2 * c0;
    if disc < 0.0 {
        return Vec::new();
    }
    let sqrt_disc = disc.sqrt();
    let sign = if c1 >= 0.0 { 1.0 } else { -1.0 };
    let q = -0.5 * (c1 + sign * sqrt_disc);
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / c2, c0 / q]
}

/// Durand-Kerner simultaneous iteration for `degree >= 3`. Coefficients are
/// normalized to monic first. Initial estimates are placed on a circle
/// around the origin using the classic `(0.4 + 0.9i)^k` staggering, which
/// avoids the symmetric collisions a plain `exp(2*pi*i*k/n)` placement would
/// hit on symmetric polynomials. If any iterate's magnitude blows past the
/// search radius ("exploding"), the radius is doubled and the iteration is
/// restarted from fresh estimates, up to a bounded number of retries.
fn durand_kerner(coeffs: &[f64]) -> Result<Vec<f64>, ForecastError> {
    let degree = coeffs.len() - 1;
    let leading = coeffs[degree];
    let monic: Vec<f64> = coeffs.iter().map(|&v| v / leading).collect();

    let max_coef = monic.iter().take(degree).fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    let mut radius = 1.0 + max_coef;

    for _ in 0..MAX_RADIUS_DOUBLINGS {
        match try_durand_kerner(&monic, degree, radius) {
            Some(estimates) => return Ok(durand_kerner_real_parts(&estimates)),
            None => radius *= 2.0,
        }
    }
    Err(ForecastError::IllDefined)
}

fn try_durand_kerner(monic: &[f64], degree: usize, radius: f64) -> Option<Vec<Complex>> {
    let base = Complex::new(0.4, 0.9);
    let mut estimates: Vec<Complex> = Vec::with_capacity(degree);
    let mut power = Complex::new(1.0, 0.0);
    for _ in 0..degree {
        power = power.mul(base);
        let scale = radius / power.abs().max(1e-12);
        estimates.push(Complex::new(power.re * scale, power.im * scale));
    }

    for _ in 0..MAX_ITERATIONS {
        let mut max_correction = 0.0_f64;
        for k in 0..degree {
            let zk = estimates[k];
            if zk.abs() > radius * 1e3 {
                return None; // exploding — caller doubles the radius and retries.
            }
            let numerator = eval_complex(monic, zk);
            let mut denom = Complex::new(1.0, 0.0);
            for (j, &zj) in estimates.iter().enumerate() {
                if j != k {
                    denom = denom.mul(zk.sub(zj));
                }
            }
            let correction = numerator.div(denom);
            estimates[k] = zk.sub(correction);
            max_correction = max_correction.max(correction.abs());
        }
        if max_correction < ROOT_EPS {
            return Some(estimates);
        }
    }
    Some(estimates)
}

fn eval_complex(c: &[f64], x: Complex) -> Complex {
    c.iter()
        .rev()
        .fold(Complex::new(0.0, 0.0), |acc, &coef| acc.mul(x).add(Complex::new(coef, 0.0)))
}

/// Filters Durand-Kerner's complex output down to roots real within
/// `ROOT_EPS` of the real axis.
fn durand_kerner_real_parts(estimates: &[Complex]) -> Vec<f64> {
    estimates
        .iter()
        .filter(|z| z.is_real(ROOT_EPS))
        .map(|z| z.re)
        .collect()
}

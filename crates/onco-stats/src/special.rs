//! Scalar special functions needed for the log-rank p-value. Plain-Rust
//! approximations; no external stats crate.

/// Error function approximation (Abramowitz & Stegun 7.1.26, Horner's method).
/// Absolute error below 1.5e-7.
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Survival function of the chi-square distribution with one degree of
/// freedom: P(X > x) = erfc(sqrt(x / 2)).
pub fn chi_square_sf_1df(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    1.0 - erf((x / 2.0).sqrt())
}

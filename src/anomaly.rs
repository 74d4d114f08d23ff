//! Conversions between the anomalies of a conic orbit.
//!
//! The true anomaly is the actual angle between the periapsis direction and
//! the body, as seen from the focus. The eccentric anomaly (elliptic), the
//! hyperbolic eccentric anomaly and the parabolic anomaly are auxiliary
//! parameters that make the relationship with time (the mean anomaly)
//! expressible as Kepler's equation for each kind of conic.
//!
//! None of these functions check that the eccentricity matches the kind
//! of conic they are written for.

use crate::{sinh_minus_x, x_minus_sin};

/// Gets the true anomaly from an elliptic eccentric anomaly.
///
/// `ν = 2 atan(sqrt((1 + e) / (1 - e)) tan(E / 2))`
///
/// The result lies in (-π, π].
pub fn true_from_eccentric(eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    2.0 * (((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt()
        * (eccentric_anomaly * 0.5).tan())
    .atan()
}

/// Gets the elliptic eccentric anomaly from a true anomaly.
///
/// `E = atan2(sqrt(1 - e²) sin ν, e + cos ν)`
///
/// The result lies in (-π, π].
///
/// # Example
/// ```
/// use keplerian_state::anomaly::{eccentric_from_true, true_from_eccentric};
///
/// let e = 0.4;
/// let ecc_anom = eccentric_from_true(e, 1.2);
/// assert!((true_from_eccentric(e, ecc_anom) - 1.2).abs() < 1e-12);
/// ```
pub fn eccentric_from_true(eccentricity: f64, true_anomaly: f64) -> f64 {
    let (sin, cos) = true_anomaly.sin_cos();
    (((1.0 - eccentricity) * (1.0 + eccentricity)).sqrt() * sin).atan2(eccentricity + cos)
}

/// Gets the true anomaly from a hyperbolic eccentric anomaly.
///
/// `ν = 2 atan(sqrt((e + 1) / (e - 1)) tanh(H / 2))`
pub fn true_from_hyperbolic(eccentricity: f64, hyperbolic_anomaly: f64) -> f64 {
    2.0 * (((eccentricity + 1.0) / (eccentricity - 1.0)).sqrt()
        * (hyperbolic_anomaly * 0.5).tanh())
    .atan()
}

/// Gets the hyperbolic eccentric anomaly from a true anomaly.
///
/// `H = asinh(sqrt(e² - 1) sin ν / (1 + e cos ν))`
///
/// The true anomaly must lie strictly between the asymptote angles
/// `±acos(-1 / e)`.
pub fn hyperbolic_from_true(eccentricity: f64, true_anomaly: f64) -> f64 {
    let (sin, cos) = true_anomaly.sin_cos();
    (((eccentricity - 1.0) * (eccentricity + 1.0)).sqrt() * sin / (1.0 + eccentricity * cos))
        .asinh()
}

/// Gets the true anomaly from a parabolic anomaly `D = tan(ν / 2)`.
pub fn true_from_parabolic(parabolic_anomaly: f64) -> f64 {
    2.0 * parabolic_anomaly.atan()
}

/// Gets the parabolic anomaly `D = tan(ν / 2)` from a true anomaly.
pub fn parabolic_from_true(true_anomaly: f64) -> f64 {
    (true_anomaly * 0.5).tan()
}

/// Gets the mean anomaly from an elliptic eccentric anomaly,
/// using Kepler's equation `M = E - e sin E`.
///
/// Evaluated as `(1 - e) sin E + (E - sin E)`, which stays accurate for
/// small `E` when `e` is close to 1.
pub fn mean_from_eccentric(eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    (1.0 - eccentricity) * eccentric_anomaly.sin() + x_minus_sin(eccentric_anomaly)
}

/// Gets the mean anomaly from a hyperbolic eccentric anomaly,
/// using the hyperbolic Kepler's equation `M = e sinh H - H`.
///
/// Evaluated as `(e - 1) sinh H + (sinh H - H)`, which stays accurate for
/// small `H` when `e` is close to 1.
///
/// # Example
/// ```
/// use keplerian_state::anomaly::mean_from_hyperbolic;
///
/// let e = 1.0 + 1e-11;
/// let m = mean_from_hyperbolic(e, 1e-6);
///
/// // `e * h.sinh() - h` only keeps about five digits here.
/// let expected = (e - 1.0) * 1e-6 + 1e-18 / 6.0;
/// assert!((m - expected).abs() < 1e-12 * expected);
/// ```
pub fn mean_from_hyperbolic(eccentricity: f64, hyperbolic_anomaly: f64) -> f64 {
    (eccentricity - 1.0) * hyperbolic_anomaly.sinh() + sinh_minus_x(hyperbolic_anomaly)
}

/// Gets the parabolic mean anomaly from a parabolic anomaly,
/// using Barker's equation `M = D + D³ / 3`.
pub fn mean_from_parabolic(parabolic_anomaly: f64) -> f64 {
    parabolic_anomaly + parabolic_anomaly.powi(3) / 3.0
}

//! Iterative and closed-form solvers for Kepler's equation.

use core::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    keplers_equation, keplers_equation_derivative, sinh_minus_x, sinhcosh, solve_monotone_cubic,
};

/// Default step size under which the Newton iteration stops.
pub const DEFAULT_TOLERANCE: f64 = 1e-18;

/// Default cap on the number of solver iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Eccentricity from which the elliptic solver starts at apoapsis instead
/// of at the mean anomaly. Newton's method converges poorly from `M` on
/// highly eccentric orbits.
const HIGH_ECCENTRICITY: f64 = 0.8;

/// A step this many epsilons (relative to the anomaly) or smaller means
/// the iteration is bouncing around the last representable digits.
const STALL_EPSILONS: f64 = 4.0;

/// Settings for the numerical Kepler's-equation solvers.
///
/// The defaults keep the historical behavior of the solver: a step
/// tolerance of `1e-18` and a cap of 100 iterations.
///
/// # Example
/// ```
/// use keplerian_state::{solve_kepler_with, KeplerSolverSettings};
///
/// let settings = KeplerSolverSettings {
///     tolerance: 1e-12,
///     ..Default::default()
/// };
///
/// let solution = solve_kepler_with(0.3, 1.0, &settings);
/// assert!(solution.converged);
/// assert!(solution.iterations < settings.max_iterations);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerSolverSettings {
    /// The iteration stops once the absolute step is at most this value.
    pub tolerance: f64,

    /// The iteration stops after this many steps, converged or not.
    pub max_iterations: u32,
}

impl Default for KeplerSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// The outcome of a numerical Kepler's-equation solve.
///
/// The solvers never fail: when the iteration cap is hit, the last
/// iterate is returned as-is, and `converged` is `false`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerSolution {
    /// The eccentric anomaly (or hyperbolic eccentric anomaly), in radians.
    pub anomaly: f64,

    /// How many update steps were taken.
    pub iterations: u32,

    /// The last update applied to the anomaly.
    /// Infinite if no step was taken.
    pub last_step: f64,

    /// The remaining error in Kepler's equation,
    /// i.e. the given mean anomaly minus the one implied by `anomaly`.
    pub residual: f64,

    /// Whether the last step met the tolerance, or had stalled at the
    /// resolution of `f64`.
    pub converged: bool,
}

impl KeplerSolution {
    fn finish(
        anomaly: f64,
        iterations: u32,
        last_step: f64,
        residual: f64,
        settings: &KeplerSolverSettings,
    ) -> Self {
        let step = last_step.abs();
        let converged = step <= settings.tolerance
            || step <= STALL_EPSILONS * f64::EPSILON * anomaly.abs().max(1.0);

        Self {
            anomaly,
            iterations,
            last_step,
            residual,
            converged,
        }
    }
}

/// Solves the elliptic Kepler's equation `M = E - e sin E` for the
/// eccentric anomaly `E`, using the default settings.
///
/// See [`solve_kepler_with`] for details.
///
/// # Example
/// ```
/// use keplerian_state::solve_kepler;
///
/// let solution = solve_kepler(0.002, 1.048037758440223);
///
/// assert!((solution.anomaly - 1.049772378330563).abs() < 1e-12);
/// assert!(solution.converged);
/// ```
pub fn solve_kepler(eccentricity: f64, mean_anomaly: f64) -> KeplerSolution {
    solve_kepler_with(eccentricity, mean_anomaly, &KeplerSolverSettings::default())
}

/// Solves the elliptic Kepler's equation `M = E - e sin E` for the
/// eccentric anomaly `E` with Newton-Raphson iteration.
///
/// The starting guess is `M` when `e < 0.8`. Otherwise it is the apoapsis
/// of the revolution `M` lies on, which is π for `M` in `[0, 2π)`.
/// The mean anomaly is not wrapped, so the result lies on the same
/// revolution as the input.
///
/// # Unchecked Operation
/// This function does not check whether the eccentricity is actually
/// elliptic (`0 <= e < 1`). Nonsensical output may be produced otherwise.
///
/// # Performance
/// This function uses numerical methods to approach the value and therefore
/// is not performant. It is bounded by `settings.max_iterations` steps.
pub fn solve_kepler_with(
    eccentricity: f64,
    mean_anomaly: f64,
    settings: &KeplerSolverSettings,
) -> KeplerSolution {
    let mut eccentric_anomaly = if eccentricity < HIGH_ECCENTRICITY {
        mean_anomaly
    } else {
        PI + TAU * (mean_anomaly / TAU).floor()
    };

    let mut last_step = f64::INFINITY;
    let mut iterations = 0;

    // dE = (M + e sin E - E) / (1 - e cos E)
    while last_step.abs() > settings.tolerance && iterations < settings.max_iterations {
        let step = -keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity)
            / keplers_equation_derivative(eccentric_anomaly, eccentricity);

        if !step.is_finite() {
            break;
        }

        eccentric_anomaly += step;
        last_step = step;
        iterations += 1;
    }

    let residual = -keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity);
    let solution = KeplerSolution::finish(
        eccentric_anomaly,
        iterations,
        last_step,
        residual,
        settings,
    );

    if !solution.converged {
        tracing::warn!(
            eccentricity,
            mean_anomaly,
            last_step,
            residual,
            iterations,
            "elliptic Kepler solver stopped without converging"
        );
    }

    solution
}

/// Solves the hyperbolic Kepler's equation `M = e sinh H - H` for the
/// hyperbolic eccentric anomaly `H`, using the default settings.
///
/// # Example
/// ```
/// use keplerian_state::solve_hyperbolic_kepler;
///
/// let e = 1.5;
/// let solution = solve_hyperbolic_kepler(e, 2.0);
/// let h = solution.anomaly;
///
/// assert!((e * h.sinh() - h - 2.0).abs() < 1e-12);
/// ```
pub fn solve_hyperbolic_kepler(eccentricity: f64, mean_anomaly: f64) -> KeplerSolution {
    solve_hyperbolic_kepler_with(eccentricity, mean_anomaly, &KeplerSolverSettings::default())
}

/// Solves the hyperbolic Kepler's equation `M = e sinh H - H` for the
/// hyperbolic eccentric anomaly `H`.
///
/// # Unchecked Operation
/// This function does not check whether the eccentricity is actually
/// hyperbolic (`e > 1`). Nonsensical output may be produced otherwise.
///
/// # Performance
/// This function uses numerical methods to approach the value and therefore
/// is not performant. It is bounded by `settings.max_iterations` steps.
///
/// # Source
/// The iteration is the fourth-order Schröder iteration of the second kind,
/// Equation 25 of "A new method for solving the hyperbolic Kepler equation"
/// by Baisheng Wu et al.
/// The starting guess is Danby's `sign(M) ln(2|M| / e + 1.8)`, capped by
/// `cbrt(6|M| / e)`, which bounds the root from above and is much closer
/// to it for small `M` when `e` is close to 1.
pub fn solve_hyperbolic_kepler_with(
    eccentricity: f64,
    mean_anomaly: f64,
    settings: &KeplerSolverSettings,
) -> KeplerSolution {
    let danby = (2.0 * mean_anomaly.abs() / eccentricity + 1.8).ln();
    let cubic = (6.0 * mean_anomaly.abs() / eccentricity).cbrt();
    let mut ecc_anom = mean_anomaly.signum() * danby.min(cubic);

    /*
    F_1^(4) = F_0 - (
        (6hr - 3h^2 h'' r^3) /
        (6 - 6h h'' r^2 + h^2 h''' r^3)
    )

    ...where:
    h   = e sinh(F_0) - F_0 - M = (e - 1) sinh(F_0) + (sinh(F_0) - F_0) - M
    h'  = e cosh(F_0) - 1       = (e - 1) cosh(F_0) + 2 sinh²(F_0 / 2)
    h'' = e sinh(F_0)
    h'''= e cosh(F_0)
    r   = 1 / h'
     */

    let mut last_step = f64::INFINITY;
    let mut iterations = 0;

    while last_step.abs() > settings.tolerance && iterations < settings.max_iterations {
        let (sinh_eca, cosh_eca) = sinhcosh(ecc_anom);
        let half_sinh = (ecc_anom * 0.5).sinh();
        let e_minus_one = eccentricity - 1.0;

        let hppp = eccentricity * cosh_eca;
        let hp = e_minus_one * cosh_eca + 2.0 * half_sinh * half_sinh;
        let hpp = eccentricity * sinh_eca;
        let h = e_minus_one * sinh_eca + sinh_minus_x(ecc_anom) - mean_anomaly;

        let h_sq = h * h;
        let r = hp.recip();
        let r_sq = r * r;
        let r_cub = r_sq * r;

        let denominator = 6.0 - 6.0 * h * hpp * r_sq + h_sq * hppp * r_cub;

        if denominator.abs() < 1e-30 || !denominator.is_finite() {
            // dangerously close to div-by-zero, break out
            break;
        }

        let numerator = 6.0 * h * r - 3.0 * h_sq * hpp * r_cub;
        let delta = numerator / denominator;

        ecc_anom -= delta;
        last_step = -delta;
        iterations += 1;
    }

    let residual = mean_anomaly
        - ((eccentricity - 1.0) * ecc_anom.sinh() + sinh_minus_x(ecc_anom));
    let solution = KeplerSolution::finish(ecc_anom, iterations, last_step, residual, settings);

    if !solution.converged {
        tracing::warn!(
            eccentricity,
            mean_anomaly,
            last_step,
            residual,
            iterations,
            "hyperbolic Kepler solver stopped without converging"
        );
    }

    solution
}

/// Solves Barker's equation `M = D + D³/3` for the parabolic anomaly
/// `D = tan(ν/2)`.
///
/// The cubic is monotone, so it has exactly one real root, found in
/// closed form and then polished with one Newton step.
///
/// # Example
/// ```
/// use keplerian_state::solve_barker;
///
/// let d = solve_barker(4.0 / 3.0);
/// assert!((d - 1.0).abs() < 1e-12);
/// ```
pub fn solve_barker(mean_anomaly: f64) -> f64 {
    let d = solve_monotone_cubic(1.0 / 3.0, 0.0, 1.0, -mean_anomaly);
    let d_sq = d * d;
    d - (d + d_sq * d / 3.0 - mean_anomaly) / (1.0 + d_sq)
}

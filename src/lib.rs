//! # Two-Body Keplerian State Conversion
//! This library crate converts between the two classical descriptions of a
//! body moving under two-body (Keplerian) gravity:
//!
//! - **Orbital elements**: the size and shape of the conic section, its
//!   orientation in space, and where along it the body was at an epoch.
//! - **State vectors**: the body's Cartesian position and velocity in an
//!   inertial frame at one instant.
//!
//! Keplerian motion has no time steps: the state at any time is computed
//! directly from the elements by solving Kepler's equation. The inverse
//! recovers elements from a single position/velocity pair.
//!
//! It's a two-body model, meaning that it doesn't account for external
//! forces like gravity from other bodies, drag, or oblateness.
//!
//! ## Getting started
//! This crate provides these main items:
//! - [`OrbitalElements`]: the elements of an elliptic, parabolic or hyperbolic
//!   trajectory, with the conic described by a [`Conic`].
//! - [`StateVectors`]: a position and a velocity in the inertial frame.
//! - [`TwoBody`]: a gravitational parameter together with solver settings,
//!   used for the conversions [`TwoBody::state_at`] and [`TwoBody::elements_at`].
//!   The free functions [`to_state`] and [`to_orbital_elements`] do the same
//!   starting from two body masses.
//! - [`Matrix3`] and [`orbital_plane_to_inertial`]: the rotation machinery used to
//!   move vectors between the orbital plane and the inertial frame.
//! - [`solve_kepler`]: the Newton-Raphson solver for Kepler's equation.
//!
//! ## Example
//!
//! ```rust
//! use keplerian_state::{to_orbital_elements, to_state, OrbitalElements, GRAVITATIONAL_CONSTANT};
//!
//! # fn main() -> keplerian_state::Result<()> {
//! // The mass that gives Earth's standard gravitational parameter.
//! const EARTH_MASS: f64 = 3.986004418e14 / GRAVITATIONAL_CONSTANT;
//!
//! let elements = OrbitalElements::new(
//!     6649e3,                 // Semi-major axis, in meters
//!     0.002,                  // Eccentricity
//!     97f64.to_radians(),     // Inclination
//!     118f64.to_radians(),    // Longitude of ascending node
//!     (-250f64).to_radians(), // Argument of periapsis
//!     0.0,                    // Mean anomaly at epoch
//!     0.0,                    // Epoch, in seconds
//! )?;
//!
//! let state = to_state(&elements, 900.0, EARTH_MASS, 0.0)?;
//! assert!((state.position.x - 3194418.357).abs() < 1e-1);
//!
//! let recovered = to_orbital_elements(&state, 900.0, EARTH_MASS, 0.0)?;
//! assert!((recovered.semi_major_axis() - 6649e3).abs() < 1.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod anomaly;
mod conversion;
mod elements;
mod error;
mod matrix;
mod solvers;
mod transform;

pub use conversion::{to_orbital_elements, to_state, TwoBody};
pub use elements::{Conic, OrbitalElements};
pub use error::{OrbitError, Result};
pub use matrix::{Axis, Matrix3};
pub use solvers::{
    solve_barker, solve_hyperbolic_kepler, solve_hyperbolic_kepler_with, solve_kepler,
    solve_kepler_with, KeplerSolution, KeplerSolverSettings, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};
pub use transform::{inertial_to_orbital_plane, orbital_plane_to_inertial, perifocal_matrix};

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The Newtonian constant of gravitation, in m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67384e-11;

/// Gets the gravitational parameter `GM = G * (m1 + m2)` of a two-body
/// system, in m^3 s^-2.
///
/// Learn more about the gravitational parameter:
/// <https://en.wikipedia.org/wiki/Standard_gravitational_parameter>
pub fn gravitational_parameter(mass1: f64, mass2: f64) -> f64 {
    GRAVITATIONAL_CONSTANT * (mass1 + mass2)
}

/// A struct representing a position and velocity at a point in the orbit.
///
/// The position and velocity vectors are three-dimensional and expressed
/// in the inertial frame.
///
/// The position vector is in meters, while the velocity vector is in
/// meters per second.
///
/// State vectors can be used to recover orbital elements, see
/// [`TwoBody::elements_at`] for more information.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateVectors {
    /// The 3D position at a point in the orbit, in meters.
    pub position: DVec3,
    /// The 3D velocity at a point in the orbit, in meters per second.
    pub velocity: DVec3,
}

impl StateVectors {
    /// Creates a new `StateVectors` instance.
    pub fn new(position: DVec3, velocity: DVec3) -> Self {
        Self { position, velocity }
    }

    /// Gets the distance from the central body, in meters.
    pub fn radius(&self) -> f64 {
        self.position.length()
    }

    /// Gets the speed, in meters per second.
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Gets the specific angular momentum vector `h = r × v`, in m^2 s^-1.
    ///
    /// It points along the orbit normal.
    pub fn angular_momentum(&self) -> DVec3 {
        self.position.cross(self.velocity)
    }

    /// Gets the specific orbital energy `v²/2 - GM/r`, in J/kg.
    ///
    /// Negative for elliptic orbits, zero for parabolic trajectories and
    /// positive for hyperbolic trajectories.
    ///
    /// # Example
    /// ```
    /// use glam::DVec3;
    /// use keplerian_state::StateVectors;
    ///
    /// // Unit circular orbit around a unit gravitational parameter
    /// let sv = StateVectors::new(DVec3::X, DVec3::Y);
    /// assert_eq!(sv.specific_energy(1.0), -0.5);
    /// ```
    pub fn specific_energy(&self, gravitational_parameter: f64) -> f64 {
        0.5 * self.velocity.length_squared() - gravitational_parameter / self.radius()
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}


// Kepler's equation and its relatives are written as `(1 - e) f(x) + g(x)`
// with `g` evaluated without cancellation, so they keep their precision
// for small anomalies on orbits with `e` close to 1.

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    x_minus_sin(eccentric_anomaly) + (1.0 - eccentricity) * eccentric_anomaly.sin() - mean_anomaly
}
#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half_sin = (eccentric_anomaly * 0.5).sin();
    2.0 * half_sin * half_sin + (1.0 - eccentricity) * eccentric_anomaly.cos()
}

/// `x - sin(x)`
fn x_minus_sin(x: f64) -> f64 {
    if x.abs() >= 1.0 {
        x - x.sin()
    } else {
        odd_series_tail(x, -1.0)
    }
}

/// `sinh(x) - x`
fn sinh_minus_x(x: f64) -> f64 {
    if x.abs() >= 1.0 {
        x.sinh() - x
    } else {
        odd_series_tail(x, 1.0)
    }
}

/// Sums `x³/3! + s x⁵/5! + s² x⁷/7! + ...` until the terms stop
/// contributing. Only meant for `|x| < 1`.
fn odd_series_tail(x: f64, sign: f64) -> f64 {
    let x_sq = x * x;
    let mut term = x * x_sq / 6.0;
    let mut sum = term;
    let mut k = 3.0;

    while term.abs() > f64::EPSILON * sum.abs() {
        term *= sign * x_sq / ((k + 1.0) * (k + 2.0));
        sum += term;
        k += 2.0;
    }

    sum
}

/// Get the hyperbolic sine and cosine of a number.
///
/// Usually faster than calling `x.sinh()` and `x.cosh()` separately.
///
/// Returns a tuple which contains:
/// - 0: The hyperbolic sine of the number.
/// - 1: The hyperbolic cosine of the number.
pub fn sinhcosh(x: f64) -> (f64, f64) {
    let e_x = x.exp();
    let e_neg_x = (-x).exp();

    ((e_x - e_neg_x) * 0.5, (e_x + e_neg_x) * 0.5)
}

/// Solve a cubic equation to get its real root.
///
/// The cubic equation is in the form of:
/// ax^3 + bx^2 + cx + d
///
/// The cubic equation is assumed to be monotone.
/// If it isn't monotone (i.e., the discriminant
/// is negative), it returns NaN.
fn solve_monotone_cubic(a: f64, b: f64, c: f64, d: f64) -> f64 {
    // Normalize coefficients so that a = 1
    let b = b / a;
    let c = c / a;
    let d = d / a;

    // Depress the cubic equation
    // t^3 + pt + q = 0
    // ...where, since a = 1:
    // p = (3c - b^2) / 3
    // q = (2b^3 - 9bc + 27d) / 27
    let b_sq = b * b;

    let p = (3.0 * c - b_sq) / 3.0;
    let q = (2.0 * b_sq * b - 9.0 * b * c + 27.0 * d) / 27.0;

    let q_div_two = q / 2.0;
    let p_div_three = p / 3.0;
    let p_div_three_cubed = p_div_three * p_div_three * p_div_three;
    let discriminant = q_div_two * q_div_two + p_div_three_cubed;

    if discriminant < 0.0 {
        // Function is not monotone
        return f64::NAN;
    }

    let t = {
        let sqrt_discriminant = discriminant.sqrt();
        let neg_q_div_two = -q_div_two;
        let u = (neg_q_div_two + sqrt_discriminant).cbrt();
        let v = (neg_q_div_two - sqrt_discriminant).cbrt();
        u + v
    };

    // x_i = t_i - b / 3a
    // here, a = 1
    t - b / 3.0
}

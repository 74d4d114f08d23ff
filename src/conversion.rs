use core::f64::consts::TAU;

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    anomaly, gravitational_parameter, orbital_plane_to_inertial, sinhcosh, solve_barker,
    solve_hyperbolic_kepler_with, solve_kepler_with, Axis, Conic, KeplerSolverSettings, Matrix3,
    OrbitError, OrbitalElements, Result, StateVectors,
};

/// Recovered eccentricities this close to 1 are treated as parabolic.
const PARABOLIC_TOLERANCE: f64 = 1e-12;

/// Recovered eccentricities at or below this are treated as circular,
/// placing periapsis at the current position.
const CIRCULAR_TOLERANCE: f64 = 1e-12;

/// Orbits whose normal is this close to the reference pole (relative to
/// the angular momentum) are treated as equatorial, with the ascending
/// node along the reference direction.
const EQUATORIAL_TOLERANCE: f64 = 1e-12;

/// Angular momentum below this fraction of `|r| |v|` means the trajectory
/// is radial.
const RADIAL_TOLERANCE: f64 = 1e-12;

/// Past `r = FAR_RADIUS_RATIO * sqrt(p |a|)` the semi-major axis is taken
/// from the energy and the anomaly from `r` and `r . v`. Closer in, both
/// come from the semi-latus rectum and the true anomaly.
const FAR_RADIUS_RATIO: f64 = 2.0;

/// The conic branch selected from a recovered eccentricity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConicBranch {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl ConicBranch {
    fn from_eccentricity(eccentricity: f64) -> Self {
        if (eccentricity - 1.0).abs() <= PARABOLIC_TOLERANCE {
            ConicBranch::Parabolic
        } else if eccentricity < 1.0 {
            ConicBranch::Elliptic
        } else {
            ConicBranch::Hyperbolic
        }
    }
}

/// A two-body system: the gravitational parameter of the pair, plus the
/// settings used when solving Kepler's equation.
///
/// # Mu
/// Mu is also known as the gravitational parameter, and
/// is equal to `G (m1 + m2)`, where `G` is the gravitational constant
/// and `m1`, `m2` are the masses of the two bodies.
///
/// # Example
/// ```
/// use keplerian_state::{OrbitalElements, TwoBody};
///
/// # fn main() -> keplerian_state::Result<()> {
/// let system = TwoBody::new(1.0)?;
/// let orbit = OrbitalElements::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)?;
///
/// let sv = system.state_at(&orbit, 0.0)?;
/// assert!((sv.position - glam::DVec3::X).length() < 1e-15);
/// assert!((sv.velocity - glam::DVec3::Y).length() < 1e-15);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoBody {
    gravitational_parameter: f64,
    solver: KeplerSolverSettings,
}

impl TwoBody {
    /// Creates a two-body system from its gravitational parameter, in m^3 s^-2.
    ///
    /// # Errors
    /// [`OrbitError::InvalidGravitationalParameter`] unless `mu` is finite and positive.
    pub fn new(gravitational_parameter: f64) -> Result<TwoBody> {
        if !(gravitational_parameter.is_finite() && gravitational_parameter > 0.0) {
            return Err(OrbitError::InvalidGravitationalParameter(
                gravitational_parameter,
            ));
        }

        Ok(TwoBody {
            gravitational_parameter,
            solver: KeplerSolverSettings::default(),
        })
    }

    /// Creates a two-body system from the masses of its bodies, in kilograms.
    pub fn from_masses(mass1: f64, mass2: f64) -> Result<TwoBody> {
        Self::new(gravitational_parameter(mass1, mass2))
    }

    /// Uses different settings when solving Kepler's equation.
    #[must_use]
    pub fn with_solver_settings(self, solver: KeplerSolverSettings) -> TwoBody {
        TwoBody { solver, ..self }
    }

    /// Gets the gravitational parameter of the system.
    #[doc(alias = "get_mu")]
    pub fn gravitational_parameter(&self) -> f64 {
        self.gravitational_parameter
    }

    /// Gets the settings used when solving Kepler's equation.
    pub fn solver_settings(&self) -> &KeplerSolverSettings {
        &self.solver
    }

    /// Gets the position and velocity at time `t` of a body moving along
    /// `elements`.
    ///
    /// The mean anomaly at `t` is `M0 + n (t - t0)`. It is converted into
    /// the anomaly of the conic by the matching solver, the perifocal
    /// position and velocity are evaluated from that anomaly, and they are
    /// then tilted into the inertial frame.
    ///
    /// # Time
    /// The time is measured in seconds, on the same scale as the epoch.
    ///
    /// # Errors
    /// - Any invariant violated by edited `elements` fields
    ///   (see [`OrbitalElements::new`]).
    /// - [`OrbitError::NonFiniteInput`] if `t` is not finite.
    /// - [`OrbitError::DegenerateOrbit`] if the state overflows, which only
    ///   happens far out along an open trajectory.
    pub fn state_at(&self, elements: &OrbitalElements, t: f64) -> Result<StateVectors> {
        elements.validate()?;
        if !t.is_finite() {
            return Err(OrbitError::NonFiniteInput("time"));
        }

        let mu = self.gravitational_parameter;
        let mean_anomaly = elements.mean_anomaly_at(t, mu);

        let (solved_anomaly, (pqw_position, pqw_velocity)) = match elements.conic {
            Conic::Elliptic {
                semi_major_axis,
                eccentricity,
            } => {
                let ecc_anom = solve_kepler_with(eccentricity, mean_anomaly, &self.solver).anomaly;
                (
                    ecc_anom,
                    elliptic_perifocal(semi_major_axis, eccentricity, ecc_anom, mu),
                )
            }
            Conic::Hyperbolic {
                semi_major_axis,
                eccentricity,
            } => {
                let hyp_anom =
                    solve_hyperbolic_kepler_with(eccentricity, mean_anomaly, &self.solver).anomaly;
                (
                    hyp_anom,
                    hyperbolic_perifocal(semi_major_axis, eccentricity, hyp_anom, mu),
                )
            }
            Conic::Parabolic { semi_latus_rectum } => {
                let par_anom = solve_barker(mean_anomaly);
                (
                    par_anom,
                    parabolic_perifocal(semi_latus_rectum, par_anom, mu),
                )
            }
        };

        tracing::trace!(
            conic = ?elements.conic,
            mean_anomaly,
            anomaly = solved_anomaly,
            "propagated orbital elements"
        );

        let state = StateVectors {
            position: orbital_plane_to_inertial(
                pqw_position,
                elements.long_asc_node,
                elements.arg_pe,
                elements.inclination,
            ),
            velocity: orbital_plane_to_inertial(
                pqw_velocity,
                elements.long_asc_node,
                elements.arg_pe,
                elements.inclination,
            ),
        };

        if !state.is_finite() {
            return Err(OrbitError::DegenerateOrbit(
                "state is not representable at this time",
            ));
        }

        Ok(state)
    }

    /// Recovers the orbital elements of a body from its position and
    /// velocity at time `t`.
    ///
    /// The returned elements are referenced to epoch `t`: their mean
    /// anomaly is the mean anomaly at `t`, so passing them back to
    /// [`state_at`][Self::state_at] at `t` reproduces the state.
    /// Use [`OrbitalElements::with_epoch`] to re-reference them.
    ///
    /// The conic is chosen from the recovered eccentricity: within 1e-12
    /// of 1 it is parabolic, below that elliptic, above it hyperbolic.
    ///
    /// # Degenerate Geometry
    /// - Equatorial orbits have no ascending node. The longitude of
    ///   ascending node is set to zero, making the argument of periapsis
    ///   the longitude of periapsis.
    /// - Circular orbits have no periapsis. The true anomaly is set to
    ///   zero, placing periapsis at the current position.
    ///
    /// # Errors
    /// - [`OrbitError::NonFiniteInput`] for NaN or infinite inputs.
    /// - [`OrbitError::DegenerateOrbit`] if the position is at the origin,
    ///   or the angular momentum vanishes (radial or stationary motion).
    pub fn elements_at(&self, state: &StateVectors, t: f64) -> Result<OrbitalElements> {
        if !state.is_finite() {
            return Err(OrbitError::NonFiniteInput("state vectors"));
        }
        if !t.is_finite() {
            return Err(OrbitError::NonFiniteInput("time"));
        }

        let mu = self.gravitational_parameter;
        let position = state.position;
        let velocity = state.velocity;

        let altitude = position.length();
        if altitude == 0.0 {
            return Err(OrbitError::DegenerateOrbit("position is at the origin"));
        }

        // Orbital angular momentum
        let angular_momentum = position.cross(velocity);
        let angular_momentum_len = angular_momentum.length();
        if angular_momentum_len <= RADIAL_TOLERANCE * altitude * velocity.length() {
            return Err(OrbitError::DegenerateOrbit("angular momentum is zero"));
        }

        // Orientation of the orbital plane
        let node_len = angular_momentum.x.hypot(angular_momentum.y);
        let long_asc_node = if node_len <= EQUATORIAL_TOLERANCE * angular_momentum_len {
            tracing::debug!("equatorial orbit, placing the ascending node at zero");
            0.0
        } else {
            angular_momentum.x.atan2(-angular_momentum.y)
        };
        let inclination = node_len.atan2(angular_momentum.z);

        // Shape
        let semi_latus_rectum = angular_momentum.dot(angular_momentum) / mu;
        let radial = position.dot(velocity);
        let eccentricity = ((semi_latus_rectum / mu) * (radial / altitude).powi(2)
            + (semi_latus_rectum / altitude - 1.0).powi(2))
        .sqrt();

        let circular = eccentricity <= CIRCULAR_TOLERANCE;
        let geometric_true_anomaly = if circular {
            tracing::debug!("circular orbit, placing periapsis at the current position");
            0.0
        } else {
            ((semi_latus_rectum / mu).sqrt() * radial).atan2(semi_latus_rectum - altitude)
        };

        let branch = ConicBranch::from_eccentricity(eccentricity);
        tracing::trace!(?branch, eccentricity, "recovering orbital elements");

        // With `e` close to 1, `1 + e cos ν` cancels far from periapsis, and
        // `p / |1 - e²|` inherits the rounding of `e`. Out there the state is
        // mostly fixed by the energy, so it takes over.
        let far = |semi_major_axis: f64| {
            !circular
                && altitude * altitude
                    > FAR_RADIUS_RATIO * FAR_RADIUS_RATIO * semi_latus_rectum * semi_major_axis
        };
        let inverse_axis = 2.0 / altitude - velocity.length_squared() / mu;

        let (conic, mean_anomaly, true_anomaly) = match branch {
            ConicBranch::Elliptic => {
                let from_shape = semi_latus_rectum / ((1.0 - eccentricity) * (1.0 + eccentricity));

                let (semi_major_axis, ecc_anom, true_anomaly) =
                    if far(from_shape) && inverse_axis > 0.0 {
                        let semi_major_axis = inverse_axis.recip();
                        // e sin E = r . v / sqrt(mu a), e cos E = 1 - r / a
                        let ecc_anom = (radial / (mu * semi_major_axis).sqrt())
                            .atan2(1.0 - altitude / semi_major_axis);
                        let true_anomaly = anomaly::true_from_eccentric(eccentricity, ecc_anom);
                        (semi_major_axis, ecc_anom, true_anomaly)
                    } else {
                        let ecc_anom =
                            anomaly::eccentric_from_true(eccentricity, geometric_true_anomaly);
                        (from_shape, ecc_anom, geometric_true_anomaly)
                    };

                (
                    Conic::Elliptic {
                        semi_major_axis,
                        eccentricity,
                    },
                    anomaly::mean_from_eccentric(eccentricity, ecc_anom).rem_euclid(TAU),
                    true_anomaly,
                )
            }
            ConicBranch::Hyperbolic => {
                let from_shape = semi_latus_rectum / ((eccentricity - 1.0) * (eccentricity + 1.0));

                let (semi_axis_len, hyp_anom, true_anomaly) =
                    if far(from_shape) && inverse_axis < 0.0 {
                        let semi_axis_len = -inverse_axis.recip();
                        // e sinh H = r . v / sqrt(mu |a|)
                        let hyp_anom =
                            (radial / (eccentricity * (mu * semi_axis_len).sqrt())).asinh();
                        let true_anomaly = anomaly::true_from_hyperbolic(eccentricity, hyp_anom);
                        (semi_axis_len, hyp_anom, true_anomaly)
                    } else {
                        let hyp_anom =
                            anomaly::hyperbolic_from_true(eccentricity, geometric_true_anomaly);
                        (from_shape, hyp_anom, geometric_true_anomaly)
                    };

                (
                    Conic::Hyperbolic {
                        semi_major_axis: -semi_axis_len,
                        eccentricity,
                    },
                    anomaly::mean_from_hyperbolic(eccentricity, hyp_anom),
                    true_anomaly,
                )
            }
            ConicBranch::Parabolic => {
                // r . v = sqrt(mu p) D
                let par_anom = radial / (mu * semi_latus_rectum).sqrt();
                (
                    Conic::Parabolic { semi_latus_rectum },
                    anomaly::mean_from_parabolic(par_anom),
                    anomaly::true_from_parabolic(par_anom),
                )
            }
        };

        // Argument of latitude, measured in the plane from the ascending node
        let in_plane = Matrix3::rotation_about(Axis::X, inclination)
            * Matrix3::rotation_about(Axis::Z, long_asc_node)
            * position;
        let arg_pe = (in_plane.y.atan2(in_plane.x) - true_anomaly).rem_euclid(TAU);

        OrbitalElements::with_conic(
            conic,
            inclination,
            long_asc_node.rem_euclid(TAU),
            arg_pe,
            mean_anomaly,
            t,
        )
    }
}

/// Perifocal position and velocity on an ellipse at eccentric anomaly `E`.
///
/// Uses `1 - cos E = 2 sin²(E / 2)` so that nothing cancels when `e` is
/// close to 1.
fn elliptic_perifocal(
    semi_major_axis: f64,
    eccentricity: f64,
    ecc_anom: f64,
    mu: f64,
) -> (DVec3, DVec3) {
    let (sin, cos) = ecc_anom.sin_cos();
    let half_sin = (ecc_anom * 0.5).sin();
    let versine = 2.0 * half_sin * half_sin;
    let one_minus_e = 1.0 - eccentricity;
    let axis_ratio = (one_minus_e * (1.0 + eccentricity)).sqrt();

    // r = a (1 - e cos E)
    let altitude = semi_major_axis * (versine + one_minus_e * cos);
    let speed_scale = (mu * semi_major_axis).sqrt() / altitude;

    (
        DVec3::new(
            semi_major_axis * (one_minus_e - versine),
            semi_major_axis * axis_ratio * sin,
            0.0,
        ),
        DVec3::new(-speed_scale * sin, speed_scale * axis_ratio * cos, 0.0),
    )
}

/// Perifocal position and velocity on a hyperbola at hyperbolic anomaly `H`.
fn hyperbolic_perifocal(
    semi_major_axis: f64,
    eccentricity: f64,
    hyp_anom: f64,
    mu: f64,
) -> (DVec3, DVec3) {
    let semi_axis_len = -semi_major_axis;
    let (sinh, cosh) = sinhcosh(hyp_anom);
    let half_sinh = (hyp_anom * 0.5).sinh();
    let cosh_minus_one = 2.0 * half_sinh * half_sinh;
    let e_minus_one = eccentricity - 1.0;
    let axis_ratio = (e_minus_one * (eccentricity + 1.0)).sqrt();

    // r = |a| (e cosh H - 1)
    let altitude = semi_axis_len * (e_minus_one * cosh + cosh_minus_one);
    let speed_scale = (mu * semi_axis_len).sqrt() / altitude;

    (
        DVec3::new(
            semi_axis_len * (e_minus_one - cosh_minus_one),
            semi_axis_len * axis_ratio * sinh,
            0.0,
        ),
        DVec3::new(-speed_scale * sinh, speed_scale * axis_ratio * cosh, 0.0),
    )
}

/// Perifocal position and velocity on a parabola at parabolic anomaly `D`.
fn parabolic_perifocal(semi_latus_rectum: f64, par_anom: f64, mu: f64) -> (DVec3, DVec3) {
    let par_anom_sq = par_anom * par_anom;
    let speed_scale = 2.0 * (mu / semi_latus_rectum).sqrt() / (1.0 + par_anom_sq);

    (
        DVec3::new(
            0.5 * semi_latus_rectum * (1.0 - par_anom_sq),
            semi_latus_rectum * par_anom,
            0.0,
        ),
        DVec3::new(-speed_scale * par_anom, speed_scale, 0.0),
    )
}

/// Gets the position and velocity at time `t` of a body moving along
/// `elements` around a companion, given the masses of both bodies in
/// kilograms.
///
/// See [`TwoBody::state_at`].
pub fn to_state(
    elements: &OrbitalElements,
    t: f64,
    mass1: f64,
    mass2: f64,
) -> Result<StateVectors> {
    TwoBody::from_masses(mass1, mass2)?.state_at(elements, t)
}

/// Recovers the orbital elements from a position and velocity at time `t`,
/// given the masses of both bodies in kilograms.
///
/// See [`TwoBody::elements_at`].
pub fn to_orbital_elements(
    state: &StateVectors,
    t: f64,
    mass1: f64,
    mass2: f64,
) -> Result<OrbitalElements> {
    TwoBody::from_masses(mass1, mass2)?.elements_at(state, t)
}

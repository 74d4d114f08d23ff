use core::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{OrbitError, Result};

/// The size and shape of a Keplerian trajectory.
///
/// Each kind of conic section has its own algorithmic branch in the
/// conversions, so it is kept as a separate variant:
/// e < 1: ellipse
/// e = 1: parabola
/// e > 1: hyperbola
///
/// See more: <https://en.wikipedia.org/wiki/Orbital_eccentricity>
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Conic {
    /// A closed orbit, `0 <= e < 1`, with a positive semi-major axis in meters.
    Elliptic {
        /// The semi-major axis, in meters.
        semi_major_axis: f64,
        /// The eccentricity.
        eccentricity: f64,
    },

    /// An escape trajectory with `e = 1` exactly.
    ///
    /// The semi-major axis is infinite, so the size is described by the
    /// semi-latus rectum instead.
    Parabolic {
        /// The semi-latus rectum, in meters.
        semi_latus_rectum: f64,
    },

    /// An escape trajectory, `e > 1`, with a negative semi-major axis in meters.
    Hyperbolic {
        /// The semi-major axis, in meters. Negative by convention.
        semi_major_axis: f64,
        /// The eccentricity.
        eccentricity: f64,
    },
}

impl Conic {
    /// Picks the conic for a semi-major axis and an eccentricity.
    ///
    /// # Errors
    /// - [`OrbitError::InvalidEccentricity`] if `e` is negative or not finite.
    /// - [`OrbitError::NonFiniteInput`] if `a` is not finite.
    /// - [`OrbitError::InvalidSemiMajorAxis`] if `a <= 0` for an ellipse,
    ///   `a >= 0` for a hyperbola, or if `e == 1` (use [`Conic::parabolic`]).
    pub fn new(semi_major_axis: f64, eccentricity: f64) -> Result<Conic> {
        let conic = if eccentricity < 1.0 {
            Conic::Elliptic {
                semi_major_axis,
                eccentricity,
            }
        } else if eccentricity == 1.0 {
            return Err(OrbitError::InvalidSemiMajorAxis {
                semi_major_axis,
                eccentricity,
            });
        } else {
            Conic::Hyperbolic {
                semi_major_axis,
                eccentricity,
            }
        };

        conic.validate()?;
        Ok(conic)
    }

    /// Creates a parabolic conic from its semi-latus rectum.
    ///
    /// # Errors
    /// [`OrbitError::InvalidSemiLatusRectum`] if `p` is not finite and positive.
    pub fn parabolic(semi_latus_rectum: f64) -> Result<Conic> {
        let conic = Conic::Parabolic { semi_latus_rectum };
        conic.validate()?;
        Ok(conic)
    }

    /// Checks the invariants of the variant.
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Conic::Elliptic {
                semi_major_axis,
                eccentricity,
            } => {
                check_eccentricity(eccentricity)?;
                check_finite(semi_major_axis, "semi-major axis")?;
                if eccentricity >= 1.0 || semi_major_axis <= 0.0 {
                    return Err(OrbitError::InvalidSemiMajorAxis {
                        semi_major_axis,
                        eccentricity,
                    });
                }
            }
            Conic::Parabolic { semi_latus_rectum } => {
                if !(semi_latus_rectum.is_finite() && semi_latus_rectum > 0.0) {
                    return Err(OrbitError::InvalidSemiLatusRectum(semi_latus_rectum));
                }
            }
            Conic::Hyperbolic {
                semi_major_axis,
                eccentricity,
            } => {
                check_eccentricity(eccentricity)?;
                check_finite(semi_major_axis, "semi-major axis")?;
                if eccentricity <= 1.0 || semi_major_axis >= 0.0 {
                    return Err(OrbitError::InvalidSemiMajorAxis {
                        semi_major_axis,
                        eccentricity,
                    });
                }
            }
        }

        Ok(())
    }

    /// Gets the eccentricity of the conic.
    pub fn eccentricity(&self) -> f64 {
        match *self {
            Conic::Elliptic { eccentricity, .. } | Conic::Hyperbolic { eccentricity, .. } => {
                eccentricity
            }
            Conic::Parabolic { .. } => 1.0,
        }
    }

    /// Gets the semi-major axis of the conic, in meters.
    ///
    /// This function returns infinity for parabolic trajectories,
    /// and negative values for hyperbolic trajectories.
    pub fn semi_major_axis(&self) -> f64 {
        match *self {
            Conic::Elliptic {
                semi_major_axis, ..
            }
            | Conic::Hyperbolic {
                semi_major_axis, ..
            } => semi_major_axis,
            Conic::Parabolic { .. } => f64::INFINITY,
        }
    }

    /// Gets the semi-latus rectum `p = a(1 - e²)` of the conic, in meters.
    ///
    /// Learn more: <https://en.wikipedia.org/wiki/Conic_section#Conic_parameters>
    pub fn semi_latus_rectum(&self) -> f64 {
        match *self {
            Conic::Elliptic {
                semi_major_axis,
                eccentricity,
            }
            | Conic::Hyperbolic {
                semi_major_axis,
                eccentricity,
            } => semi_major_axis * (1.0 - eccentricity) * (1.0 + eccentricity),
            Conic::Parabolic { semi_latus_rectum } => semi_latus_rectum,
        }
    }

    /// Gets the periapsis distance `p / (1 + e)`, in meters.
    pub fn periapsis(&self) -> f64 {
        self.semi_latus_rectum() / (1.0 + self.eccentricity())
    }

    /// Gets the apoapsis distance, in meters.
    /// Returns infinity for parabolic and hyperbolic trajectories.
    pub fn apoapsis(&self) -> f64 {
        match *self {
            Conic::Elliptic {
                semi_major_axis,
                eccentricity,
            } => semi_major_axis * (1.0 + eccentricity),
            _ => f64::INFINITY,
        }
    }

    /// Gets the rate at which the mean anomaly advances, in radians per second.
    ///
    /// - Elliptic: `sqrt(GM / a³)`
    /// - Hyperbolic: `sqrt(GM / (-a)³)`
    /// - Parabolic: `2 sqrt(GM / p³)`, matching Barker's equation.
    pub fn mean_motion(&self, gravitational_parameter: f64) -> f64 {
        match *self {
            Conic::Elliptic {
                semi_major_axis, ..
            } => (gravitational_parameter / semi_major_axis.powi(3)).sqrt(),
            Conic::Hyperbolic {
                semi_major_axis, ..
            } => (gravitational_parameter / (-semi_major_axis).powi(3)).sqrt(),
            Conic::Parabolic { semi_latus_rectum } => {
                2.0 * (gravitational_parameter / semi_latus_rectum.powi(3)).sqrt()
            }
        }
    }

    /// Whether the conic is a closed orbit.
    pub fn is_closed(&self) -> bool {
        matches!(self, Conic::Elliptic { .. })
    }
}

fn check_eccentricity(eccentricity: f64) -> Result<()> {
    if eccentricity.is_finite() && eccentricity >= 0.0 {
        Ok(())
    } else {
        Err(OrbitError::InvalidEccentricity(eccentricity))
    }
}

fn check_finite(value: f64, what: &'static str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::NonFiniteInput(what))
    }
}

/// The classical orbital elements of a Keplerian trajectory.
///
/// # Example
/// ```
/// use keplerian_state::{Conic, OrbitalElements, OrbitError};
///
/// let orbit = OrbitalElements::new(
///     // Semi-major axis, in meters
///     7.0e6,
///
///     // Eccentricity
///     0.1,
///
///     // Inclination
///     0.5,
///
///     // Longitude of ascending node
///     1.0,
///
///     // Argument of periapsis
///     2.0,
///
///     // Mean anomaly at epoch
///     0.0,
///
///     // Epoch, in seconds
///     0.0,
/// ).unwrap();
///
/// assert!(matches!(orbit.conic, Conic::Elliptic { .. }));
/// assert!((orbit.periapsis() - 6.3e6).abs() < 1e-6);
///
/// // A parabola cannot be described by its semi-major axis
/// assert!(matches!(
///     OrbitalElements::new(7.0e6, 1.0, 0.5, 1.0, 2.0, 0.0, 0.0),
///     Err(OrbitError::InvalidSemiMajorAxis { .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElements {
    /// The size and shape of the trajectory.
    pub conic: Conic,

    /// The inclination of the orbit, in radians.
    /// The inclination of an orbit is the angle between the plane of the
    /// orbit and the reference plane.
    ///
    /// In simple terms, it tells you how "tilted" the orbit is.
    pub inclination: f64,

    /// The longitude (right ascension) of ascending node of the orbit, in radians.
    ///
    /// Wikipedia:
    /// The longitude of ascending node is the angle from a specified
    /// reference direction, called the origin of longitude, to the direction
    /// of the ascending node, as measured in a specified reference plane.
    /// <https://en.wikipedia.org/wiki/Longitude_of_the_ascending_node>
    pub long_asc_node: f64,

    /// The argument of periapsis of the orbit, in radians.
    ///
    /// Wikipedia:
    /// The argument of periapsis is the angle from the body's
    /// ascending node to its periapsis, measured in the direction of
    /// motion.
    /// <https://en.wikipedia.org/wiki/Argument_of_periapsis>
    pub arg_pe: f64,

    /// The mean anomaly at [`epoch`][Self::epoch], in radians.
    ///
    /// For elliptic orbits, it's an angle and anything out of range wraps
    /// around. For open trajectories, it's unbounded, and negative before
    /// periapsis passage.
    pub mean_anomaly: f64,

    /// The time at which the body had [`mean_anomaly`][Self::mean_anomaly],
    /// in seconds.
    pub epoch: f64,
}

impl OrbitalElements {
    /// Creates a new `OrbitalElements` instance from a semi-major axis and
    /// an eccentricity.
    ///
    /// ### Parameters
    /// - `semi_major_axis`: in meters; positive for ellipses, negative for hyperbolas.
    /// - `eccentricity`: any non-negative value except exactly 1.
    /// - `inclination`: The inclination of the orbit, in radians.
    /// - `long_asc_node`: The longitude of ascending node of the orbit, in radians.
    /// - `arg_pe`: The argument of periapsis of the orbit, in radians.
    /// - `mean_anomaly`: The mean anomaly at epoch, in radians.
    /// - `epoch`: The epoch of the mean anomaly, in seconds.
    ///
    /// # Errors
    /// See [`Conic::new`]. Non-finite angles or epochs give
    /// [`OrbitError::NonFiniteInput`].
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        long_asc_node: f64,
        arg_pe: f64,
        mean_anomaly: f64,
        epoch: f64,
    ) -> Result<OrbitalElements> {
        let conic = Conic::new(semi_major_axis, eccentricity)?;
        Self::with_conic(conic, inclination, long_asc_node, arg_pe, mean_anomaly, epoch)
    }

    /// Creates a new parabolic `OrbitalElements` instance.
    ///
    /// The `mean_anomaly` is the parabolic mean anomaly of Barker's equation,
    /// see [`Conic::mean_motion`].
    pub fn parabolic(
        semi_latus_rectum: f64,
        inclination: f64,
        long_asc_node: f64,
        arg_pe: f64,
        mean_anomaly: f64,
        epoch: f64,
    ) -> Result<OrbitalElements> {
        let conic = Conic::parabolic(semi_latus_rectum)?;
        Self::with_conic(conic, inclination, long_asc_node, arg_pe, mean_anomaly, epoch)
    }

    /// Creates a new `OrbitalElements` instance from an already-built conic.
    pub fn with_conic(
        conic: Conic,
        inclination: f64,
        long_asc_node: f64,
        arg_pe: f64,
        mean_anomaly: f64,
        epoch: f64,
    ) -> Result<OrbitalElements> {
        let elements = OrbitalElements {
            conic,
            inclination,
            long_asc_node,
            arg_pe,
            mean_anomaly,
            epoch,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Checks every invariant, for elements whose public fields may have
    /// been edited after construction.
    pub(crate) fn validate(&self) -> Result<()> {
        self.conic.validate()?;

        let angles = [
            self.inclination,
            self.long_asc_node,
            self.arg_pe,
            self.mean_anomaly,
            self.epoch,
        ];
        if angles.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(OrbitError::NonFiniteInput("orbital elements"))
        }
    }

    /// Gets the eccentricity of the orbit.
    pub fn eccentricity(&self) -> f64 {
        self.conic.eccentricity()
    }

    /// Gets the semi-major axis of the orbit, in meters.
    ///
    /// This function returns infinity for parabolic trajectories,
    /// and negative values for hyperbolic trajectories.
    pub fn semi_major_axis(&self) -> f64 {
        self.conic.semi_major_axis()
    }

    /// Gets the semi-latus rectum of the orbit, in meters.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.conic.semi_latus_rectum()
    }

    /// Gets the periapsis distance of the orbit, in meters.
    pub fn periapsis(&self) -> f64 {
        self.conic.periapsis()
    }

    /// Gets the apoapsis distance of the orbit, in meters.
    /// Returns infinity for open trajectories.
    pub fn apoapsis(&self) -> f64 {
        self.conic.apoapsis()
    }

    /// Gets the mean motion, in radians per second.
    pub fn mean_motion(&self, gravitational_parameter: f64) -> f64 {
        self.conic.mean_motion(gravitational_parameter)
    }

    /// Gets the time it takes to complete one revolution of the orbit,
    /// in seconds.
    ///
    /// This function returns infinity for open trajectories.
    pub fn orbital_period(&self, gravitational_parameter: f64) -> f64 {
        if self.conic.is_closed() {
            // T = 2pi * sqrt(a^3 / GM)
            TAU / self.mean_motion(gravitational_parameter)
        } else {
            f64::INFINITY
        }
    }

    /// Gets the mean anomaly at a given time, `M0 + n (t - t0)`.
    ///
    /// The result is not wrapped.
    pub fn mean_anomaly_at(&self, t: f64, gravitational_parameter: f64) -> f64 {
        self.mean_anomaly + self.mean_motion(gravitational_parameter) * (t - self.epoch)
    }

    /// Gets the time of periapsis passage, in seconds.
    ///
    /// For elliptic orbits this is the passage closest to the epoch that
    /// is not after it, assuming a mean anomaly in `[0, 2π)`.
    pub fn time_of_periapsis(&self, gravitational_parameter: f64) -> f64 {
        let mean_anomaly = if self.conic.is_closed() {
            self.mean_anomaly.rem_euclid(TAU)
        } else {
            self.mean_anomaly
        };

        self.epoch - mean_anomaly / self.mean_motion(gravitational_parameter)
    }

    /// Returns the same trajectory referenced to a different epoch.
    ///
    /// Elliptic mean anomalies are wrapped into `[0, 2π)`.
    pub fn with_epoch(&self, epoch: f64, gravitational_parameter: f64) -> OrbitalElements {
        let mut mean_anomaly = self.mean_anomaly_at(epoch, gravitational_parameter);

        if self.conic.is_closed() {
            mean_anomaly = mean_anomaly.rem_euclid(TAU);
        }

        OrbitalElements {
            mean_anomaly,
            epoch,
            ..*self
        }
    }
}

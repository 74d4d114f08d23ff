use thiserror::Error;

/// Shorthand for results produced by this crate.
pub type Result<T> = core::result::Result<T, OrbitError>;

/// An error to describe why a conversion or a construction failed.
///
/// Every fallible operation in this crate either returns a fully
/// populated value or one of these errors, never a partial result.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum OrbitError {
    /// ### Attempt to use an axis selector other than 1, 2 or 3.
    /// Rotation and reflection matrices are only defined about the
    /// x (1), y (2) and z (3) axes.
    #[error("axis selector must be 1, 2 or 3, got {0}")]
    InvalidAxis(u8),

    /// ### Attempt to use a negative or non-finite eccentricity.
    #[error("eccentricity must be finite and non-negative, got {0}")]
    InvalidEccentricity(f64),

    /// ### The semi-major axis does not fit the conic section.
    /// Ellipses need a positive semi-major axis, hyperbolas a negative one.
    /// A parabola has no finite semi-major axis; use
    /// [`OrbitalElements::parabolic`][crate::OrbitalElements::parabolic] instead.
    #[error("semi-major axis {semi_major_axis} is invalid for eccentricity {eccentricity}")]
    InvalidSemiMajorAxis {
        /// The offending semi-major axis.
        semi_major_axis: f64,
        /// The eccentricity it was paired with.
        eccentricity: f64,
    },

    /// ### Attempt to use a non-positive semi-latus rectum.
    #[error("semi-latus rectum must be positive, got {0}")]
    InvalidSemiLatusRectum(f64),

    /// ### Attempt to use a non-positive or non-finite gravitational parameter.
    #[error("gravitational parameter must be finite and positive, got {0}")]
    InvalidGravitationalParameter(f64),

    /// ### An input contained NaN or infinity.
    #[error("non-finite value in {0}")]
    NonFiniteInput(&'static str),

    /// ### The geometry does not describe a conic orbit.
    /// This happens for a body sitting at the origin, or for radial and
    /// stationary trajectories where the angular momentum vanishes.
    #[error("degenerate orbit: {0}")]
    DegenerateOrbit(&'static str),
}

//! Moving vectors between the orbital plane and the inertial frame.
//!
//! # Perifocal Coordinate (PQW) System
//! The perifocal coordinate (PQW) system is a frame of reference using
//! the basis vectors p-hat, q-hat, and w-hat, where p-hat points to the
//! periapsis, q-hat has a true anomaly 90 degrees more than p-hat, and
//! w-hat points perpendicular to the orbital plane.
//!
//! Learn more: <https://en.wikipedia.org/wiki/Perifocal_coordinate_system>

use glam::DVec3;

use crate::{Axis, Matrix3};

/// Transforms a vector from the orbital-plane (perifocal) frame into
/// the inertial frame.
///
/// The rotations are applied one at a time, in this order:
/// `R3(-ω)`, then `R1(-i)`, then `R3(-Ω)`, so the result is
/// `R3(-Ω) · R1(-i) · R3(-ω) · v`.
///
/// # Example
/// ```
/// use glam::DVec3;
///
/// use keplerian_state::orbital_plane_to_inertial;
///
/// let v = DVec3::new(1.0, 2.0, 0.0);
///
/// // With every angle at zero, the frames coincide.
/// assert_eq!(orbital_plane_to_inertial(v, 0.0, 0.0, 0.0), v);
/// ```
pub fn orbital_plane_to_inertial(
    vector: DVec3,
    long_asc_node: f64,
    arg_pe: f64,
    inclination: f64,
) -> DVec3 {
    let r1 = Matrix3::rotation_about(Axis::Z, -arg_pe).dot_vec(vector);
    let r2 = Matrix3::rotation_about(Axis::X, -inclination).dot_vec(r1);
    Matrix3::rotation_about(Axis::Z, -long_asc_node).dot_vec(r2)
}

/// Transforms a vector from the inertial frame into the orbital-plane
/// (perifocal) frame.
///
/// This undoes [`orbital_plane_to_inertial`] by applying the opposite
/// rotations in reverse order: `R3(ω) · R1(i) · R3(Ω) · v`.
pub fn inertial_to_orbital_plane(
    vector: DVec3,
    long_asc_node: f64,
    arg_pe: f64,
    inclination: f64,
) -> DVec3 {
    let r1 = Matrix3::rotation_about(Axis::Z, long_asc_node).dot_vec(vector);
    let r2 = Matrix3::rotation_about(Axis::X, inclination).dot_vec(r1);
    Matrix3::rotation_about(Axis::Z, arg_pe).dot_vec(r2)
}

/// Gets the composed matrix that tilts perifocal vectors into the
/// inertial frame, `R3(-Ω) · R1(-i) · R3(-ω)`.
///
/// Its first and second columns are the p-hat and q-hat basis vectors
/// expressed in the inertial frame, and its third column is the orbit
/// normal.
///
/// # Performance
/// Prefer this over [`orbital_plane_to_inertial`] when the same orbit
/// transforms many vectors, since the trigonometry is done once.
pub fn perifocal_matrix(long_asc_node: f64, arg_pe: f64, inclination: f64) -> Matrix3 {
    Matrix3::rotation_about(Axis::Z, -long_asc_node)
        * Matrix3::rotation_about(Axis::X, -inclination)
        * Matrix3::rotation_about(Axis::Z, -arg_pe)
}

use core::f64::consts::{FRAC_PI_2, PI, TAU};
use core::ops::Mul;

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{OrbitError, Result};

/// Absolute tolerance under which a reduced angle is treated as one of
/// the exact axis-aligned angles.
const SNAP_TOLERANCE: f64 = 1e-7;

/// Axis-aligned angles and their exact (sine, cosine) pairs.
///
/// The reduced angle lies in (-2π, 2π), so the three-quarter turns and
/// the full turns need entries as well.
const SNAPPED_ANGLES: [(f64, f64, f64); 9] = [
    (0.0, 0.0, 1.0),
    (FRAC_PI_2, 1.0, 0.0),
    (-FRAC_PI_2, -1.0, 0.0),
    (PI, 0.0, -1.0),
    (-PI, 0.0, -1.0),
    (3.0 * FRAC_PI_2, -1.0, 0.0),
    (-3.0 * FRAC_PI_2, 1.0, 0.0),
    (TAU, 0.0, 1.0),
    (-TAU, 0.0, 1.0),
];

/// A coordinate axis to rotate about or mirror along.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The first axis (x).
    X,
    /// The second axis (y).
    Y,
    /// The third axis (z).
    Z,
}

impl TryFrom<u8> for Axis {
    type Error = OrbitError;

    /// Maps the selectors 1, 2 and 3 onto x, y and z.
    fn try_from(axis: u8) -> Result<Self> {
        match axis {
            1 => Ok(Axis::X),
            2 => Ok(Axis::Y),
            3 => Ok(Axis::Z),
            other => Err(OrbitError::InvalidAxis(other)),
        }
    }
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A struct representing a 3x3 matrix.
///
/// This struct is used for the rotations and reflections that move
/// vectors between the orbital plane and the inertial frame.
/// In valid use it is always orthonormal, but this is never asserted.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::DVec3;
///
/// use keplerian_state::Matrix3;
///
/// let matrix = Matrix3 {
///     e11: 1.0, e12: 2.0, e13: 3.0,
///     e21: 4.0, e22: 5.0, e23: 6.0,
///     e31: 7.0, e32: 8.0, e33: 9.0,
/// };
///
/// let result = matrix.dot_vec(DVec3::new(0.0, 1.0, 2.0));
///
/// assert_eq!(result, DVec3::new(8.0, 17.0, 26.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e13: f64,
    pub e21: f64,
    pub e22: f64,
    pub e23: f64,
    pub e31: f64,
    pub e32: f64,
    pub e33: f64,
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Matrix3 =
        Matrix3::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Builds a matrix from its rows.
    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Matrix3 {
        Matrix3 {
            e11: rows[0][0],
            e12: rows[0][1],
            e13: rows[0][2],
            e21: rows[1][0],
            e22: rows[1][1],
            e23: rows[1][2],
            e31: rows[2][0],
            e32: rows[2][1],
            e33: rows[2][2],
        }
    }

    /// Returns the rows of this matrix.
    pub const fn to_rows(&self) -> [[f64; 3]; 3] {
        [
            [self.e11, self.e12, self.e13],
            [self.e21, self.e22, self.e23],
            [self.e31, self.e32, self.e33],
        ]
    }

    /// Computes a dot product between this matrix and a 3D vector.
    pub fn dot_vec(&self, vec: DVec3) -> DVec3 {
        DVec3::new(
            self.e11 * vec.x + self.e12 * vec.y + self.e13 * vec.z,
            self.e21 * vec.x + self.e22 * vec.y + self.e23 * vec.z,
            self.e31 * vec.x + self.e32 * vec.y + self.e33 * vec.z,
        )
    }

    /// Computes the matrix product `self · other`.
    ///
    /// # Example
    /// ```
    /// use keplerian_state::Matrix3;
    ///
    /// let a = Matrix3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
    /// let b = Matrix3::from_rows([[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]]);
    ///
    /// assert_eq!(
    ///     a.multiply(&b).to_rows(),
    ///     [[24.0, 30.0, 36.0], [51.0, 66.0, 81.0], [78.0, 102.0, 126.0]],
    /// );
    /// ```
    pub fn multiply(&self, other: &Matrix3) -> Matrix3 {
        let a = self.to_rows();
        let b = other.to_rows();
        let mut out = [[0.0; 3]; 3];

        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = a[row][0] * b[0][col] + a[row][1] * b[1][col] + a[row][2] * b[2][col];
            }
        }

        Matrix3::from_rows(out)
    }

    /// Returns the transpose of this matrix.
    ///
    /// For the rotation matrices built by this crate, this is also the inverse.
    pub const fn transpose(&self) -> Matrix3 {
        Matrix3 {
            e11: self.e11,
            e12: self.e21,
            e13: self.e31,
            e21: self.e12,
            e22: self.e22,
            e23: self.e32,
            e31: self.e13,
            e32: self.e23,
            e33: self.e33,
        }
    }

    /// Builds the matrix for a coordinate-system (passive) rotation of
    /// `angle` radians about the given axis selector: 1 (x), 2 (y) or 3 (z).
    ///
    /// These rotation matrices are for frame transformations, not for
    /// geometric point rotations.
    ///
    /// # Errors
    /// Returns [`OrbitError::InvalidAxis`] if `axis` is not 1, 2 or 3.
    ///
    /// # Example
    /// ```
    /// use keplerian_state::{Matrix3, OrbitError};
    ///
    /// let r = Matrix3::rotation(3, std::f64::consts::FRAC_PI_2).unwrap();
    /// assert_eq!(r.to_rows(), [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    ///
    /// assert_eq!(Matrix3::rotation(4, 0.0), Err(OrbitError::InvalidAxis(4)));
    /// ```
    pub fn rotation(axis: u8, angle: f64) -> Result<Matrix3> {
        Ok(Self::rotation_about(Axis::try_from(axis)?, angle))
    }

    /// Builds the matrix for a coordinate-system (passive) rotation of
    /// `angle` radians about `axis`.
    ///
    /// The angle is reduced modulo 2π first. Angles within 1e-7 of a
    /// multiple of π/2 use exact sines and cosines.
    pub fn rotation_about(axis: Axis, angle: f64) -> Matrix3 {
        let (s, c) = snapped_sin_cos(angle % TAU);

        match axis {
            Axis::X => Matrix3::from_rows([[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]),
            Axis::Y => Matrix3::from_rows([[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]]),
            Axis::Z => Matrix3::from_rows([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]]),
        }
    }

    /// Builds the mirror matrix along the given axis selector: the identity
    /// with the diagonal entry of that axis negated.
    ///
    /// # Errors
    /// Returns [`OrbitError::InvalidAxis`] if `axis` is not 1, 2 or 3.
    pub fn reflection(axis: u8) -> Result<Matrix3> {
        Ok(Self::reflection_about(Axis::try_from(axis)?))
    }

    /// Builds the mirror matrix along `axis`.
    pub fn reflection_about(axis: Axis) -> Matrix3 {
        let mut rows = Self::IDENTITY.to_rows();
        let i = axis.index();
        rows[i][i] = -rows[i][i];
        Matrix3::from_rows(rows)
    }
}

/// Sine and cosine of an already-reduced angle, with the axis-aligned
/// angles replaced by exact values.
fn snapped_sin_cos(alpha: f64) -> (f64, f64) {
    SNAPPED_ANGLES
        .iter()
        .find(|(exact, _, _)| (alpha - exact).abs() <= SNAP_TOLERANCE)
        .map(|&(_, s, c)| (s, c))
        .unwrap_or_else(|| alpha.sin_cos())
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.multiply(&rhs)
    }
}

impl Mul<DVec3> for Matrix3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> DVec3 {
        self.dot_vec(rhs)
    }
}

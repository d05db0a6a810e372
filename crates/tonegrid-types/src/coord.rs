//! Tone grid coordinates.
//!
//! The grid is 3×3: each axis takes one of `-1`, `0`, `1`. The x axis selects
//! formality, the y axis selects voice. [`RawCoords`] is what arrives on the
//! wire (any integers); [`Coordinate`] is the validated value the rest of the
//! system works with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest valid value on either axis.
pub const COORD_MIN: i8 = -1;

/// Highest valid value on either axis.
pub const COORD_MAX: i8 = 1;

/// Which axis a coordinate error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors constructing a [`Coordinate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// Component outside `[COORD_MIN, COORD_MAX]`.
    #[error("{axis} must be between {min} and {max}, got {value}")]
    OutOfRange {
        axis: Axis,
        value: i64,
        min: i8,
        max: i8,
    },
}

/// Unvalidated coordinate pair as supplied by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoords {
    pub x: i64,
    pub y: i64,
}

impl RawCoords {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for RawCoords {
    fn from(c: Coordinate) -> Self {
        Self {
            x: c.x as i64,
            y: c.y as i64,
        }
    }
}

/// A validated cell in the tone grid.
///
/// Immutable value type. Deserialization goes through [`RawCoords`] and
/// rejects out-of-range components, so a `Coordinate` is always in bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCoords", into = "RawCoords")]
pub struct Coordinate {
    x: i8,
    y: i8,
}

impl Coordinate {
    /// The neutral/neutral center cell.
    pub const CENTER: Coordinate = Coordinate { x: 0, y: 0 };

    /// Validate and build a coordinate.
    pub fn new(x: i64, y: i64) -> Result<Self, CoordError> {
        Ok(Self {
            x: check_axis(Axis::X, x)?,
            y: check_axis(Axis::Y, y)?,
        })
    }

    /// Formality axis value.
    pub fn x(&self) -> i8 {
        self.x
    }

    /// Voice axis value.
    pub fn y(&self) -> i8 {
        self.y
    }

    /// Zero-based level indices `(x + 1, y + 1)`, each in `0..3`.
    pub fn level_indices(&self) -> (usize, usize) {
        ((self.x - COORD_MIN) as usize, (self.y - COORD_MIN) as usize)
    }

    /// All nine grid cells, row-major by y then x.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (COORD_MIN..=COORD_MAX)
            .flat_map(|y| (COORD_MIN..=COORD_MAX).map(move |x| Coordinate { x, y }))
    }
}

impl TryFrom<RawCoords> for Coordinate {
    type Error = CoordError;

    fn try_from(raw: RawCoords) -> Result<Self, Self::Error> {
        Coordinate::new(raw.x, raw.y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn check_axis(axis: Axis, value: i64) -> Result<i8, CoordError> {
    if (COORD_MIN as i64..=COORD_MAX as i64).contains(&value) {
        Ok(value as i8)
    } else {
        Err(CoordError::OutOfRange {
            axis,
            value,
            min: COORD_MIN,
            max: COORD_MAX,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Surface Geometry
//!
//! Plain 2D value types in surface-local units. The terminal surface uses
//! character cells; other surfaces may use pixels. The engine never cares.

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// A point or vector in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Vec2 {
    /// The origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector of the given length pointing at `angle` radians
    #[must_use]
    pub fn from_polar(length: f64, angle: f64) -> Self {
        Self::new(length * angle.cos(), length * angle.sin())
    }

    /// Euclidean length
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height of a container or a rendered card
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    /// Horizontal size
    pub width: f64,
    /// Vertical size
    pub height: f64,
}

impl Extent {
    /// Create an extent
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest top-left coordinate at which `item` still fits inside `self`
    ///
    /// Never negative: an item larger than the container pins to the origin.
    #[must_use]
    pub fn max_offset(self, item: Extent) -> Vec2 {
        Vec2::new(
            (self.width - item.width).max(0.0),
            (self.height - item.height).max(0.0),
        )
    }

    /// Top-left coordinate that centers `item` inside `self`
    #[must_use]
    pub fn centered(self, item: Extent) -> Vec2 {
        let max = self.max_offset(item);
        Vec2::new(max.x / 2.0, max.y / 2.0)
    }

    /// Clamp a top-left coordinate so `item` stays inside `self`
    #[must_use]
    pub fn clamp(self, item: Extent, pos: Vec2) -> Vec2 {
        let max = self.max_offset(item);
        Vec2::new(pos.x.clamp(0.0, max.x), pos.y.clamp(0.0, max.y))
    }
}

use crate::physics::math::Vector;
use bevy::prelude::*;

/// One positioned mark left behind by a moving body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stamp {
    pub position: Vector,
    pub color: Color,
    pub size: Vector,
}

impl Stamp {
    pub fn at(mut self, position: Vector) -> Self {
        self.position = position;
        self
    }
}

/// Colored unit-square prototype that bodies copy into their trails.
///
/// A trail is immutable once built; every call to [`Trail::stamp`] hands out
/// an independent copy that the caller is free to reposition.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    color: Color,
    prototype: Stamp,
}

impl Trail {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            prototype: Stamp {
                position: Vector::ZERO,
                color,
                size: Vector::ONE,
            },
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn stamp(&self) -> Stamp {
        self.prototype
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

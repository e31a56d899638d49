/// Scalar type for physics calculations (f32 to match window coordinates)
pub type Scalar = f32;

/// 2D vector type for positions, velocities, and forces
pub type Vector = bevy::math::Vec2;

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics when `min > max`; the lower bound wins.
#[inline]
pub fn constrain(value: Scalar, min: Scalar, max: Scalar) -> Scalar {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Euclidean length of `v`, computed with `libm` so results match across platforms.
#[inline]
pub fn magnitude(v: Vector) -> Scalar {
    libm::sqrtf(v.x * v.x + v.y * v.y)
}

/// Distance between two points.
#[inline]
pub fn distance(a: Vector, b: Vector) -> Scalar {
    magnitude(b - a)
}

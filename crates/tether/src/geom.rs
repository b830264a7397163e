//! Small vector kernel shared by layout and physics.
//!
//! Everything here is total: degenerate inputs (zero vectors, non-positive grid sizes) resolve to
//! a safe value instead of producing NaN.

pub type Unit = euclid::UnknownUnit;

pub type Vec2 = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;

pub fn vec2(x: f64, y: f64) -> Vec2 {
    euclid::vec2(x, y)
}

pub fn clamp(v: f64, min: f64, max: f64) -> f64 {
    // `f64::clamp` panics when `min > max`; callers pass user-configured bounds.
    if min > max {
        return min;
    }
    v.max(min).min(max)
}

/// Rounds a scalar to the nearest multiple of `size`.
///
/// A non-positive or non-finite `size` leaves `v` unchanged.
pub fn snap_scalar(v: f64, size: f64) -> f64 {
    if !(size.is_finite() && size > 0.0) {
        return v;
    }
    // `+ 0.0` folds `-0.0` into `0.0` so snapped output compares cleanly.
    (v / size).round() * size + 0.0
}

pub fn snap_to_grid(v: Vec2, size: f64) -> Vec2 {
    vec2(snap_scalar(v.x, size), snap_scalar(v.y, size))
}

pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

pub fn subtract(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

pub fn scale(v: Vec2, factor: f64) -> Vec2 {
    v * factor
}

pub fn length(v: Vec2) -> f64 {
    v.length()
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (a - b).length()
}

pub fn distance_squared(a: Vec2, b: Vec2) -> f64 {
    (a - b).square_length()
}

/// Unit vector in the direction of `v`; the zero vector maps to itself.
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len == 0.0 || !len.is_finite() {
        return Vec2::zero();
    }
    v / len
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_vec(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a.lerp(b, t)
}

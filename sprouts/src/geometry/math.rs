use super::tolerance::{clamp01, EPS_LEN};
use crate::model::Vec2;

#[inline] pub fn dot(a: Vec2, b: Vec2) -> f64 { a.x * b.x + a.y * b.y }

/// Scalar z-component of the 2D cross product.
#[inline] pub fn cross(a: Vec2, b: Vec2) -> f64 { a.x * b.y - a.y * b.x }

#[inline] pub fn length_sq(v: Vec2) -> f64 { dot(v, v) }
#[inline] pub fn length(v: Vec2) -> f64 { length_sq(v).sqrt() }

#[inline] pub fn dist_sq(a: Vec2, b: Vec2) -> f64 { length_sq(b - a) }
#[inline] pub fn dist(a: Vec2, b: Vec2) -> f64 { dist_sq(a, b).sqrt() }

#[inline] pub fn add(a: Vec2, b: Vec2) -> Vec2 { a + b }
#[inline] pub fn sub(a: Vec2, b: Vec2) -> Vec2 { a - b }
#[inline] pub fn scale(v: Vec2, s: f64) -> Vec2 { v * s }

#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    Vec2::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
}

#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 { lerp(a, b, 0.5) }

/// Unit vector in the direction of `v`; the zero vector maps to zero.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = length(v);
    if len > EPS_LEN { v * (1.0 / len) } else { Vec2::ZERO }
}

/// Counter-clockwise perpendicular.
#[inline] pub fn perp(v: Vec2) -> Vec2 { Vec2::new(-v.y, v.x) }

#[inline]
pub fn rotate(v: Vec2, radians: f64) -> Vec2 {
    let (s, c) = radians.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// True when `p` lies inside or on the circle.
#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f64) -> bool {
    dist_sq(p, center) <= radius * radius
}

/// Clamped projection of `p` onto segment `a..b`. Returns the closest point and its
/// parameter along the segment.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f64) {
    let v = b - a;
    let vv = length_sq(v);
    let t = if vv > EPS_LEN { clamp01(dot(p - a, v) / vv) } else { 0.0 };
    (a + v * t, t)
}

#[inline]
pub fn seg_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let (q, _) = closest_point_on_segment(p, a, b);
    dist_sq(p, q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
        let n = normalize(v(3.0, 4.0));
        assert!((n.x - 0.6).abs() < 1e-12 && (n.y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn closest_point_clamps_to_segment() {
        let (q, t) = closest_point_on_segment(v(-5.0, 2.0), v(0.0, 0.0), v(10.0, 0.0));
        assert_eq!(q, v(0.0, 0.0));
        assert_eq!(t, 0.0);
        let (q, t) = closest_point_on_segment(v(4.0, 3.0), v(0.0, 0.0), v(10.0, 0.0));
        assert_eq!(q, v(4.0, 0.0));
        assert!((t - 0.4).abs() < 1e-12);
        assert!((seg_distance_sq(v(4.0, 3.0), v(0.0, 0.0), v(10.0, 0.0)) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn circle_membership_includes_boundary() {
        assert!(point_in_circle(v(3.0, 4.0), v(0.0, 0.0), 5.0));
        assert!(!point_in_circle(v(3.0, 4.1), v(0.0, 0.0), 5.0));
    }

    #[test]
    fn cross_sign_follows_orientation() {
        assert!(cross(v(1.0, 0.0), v(0.0, 1.0)) > 0.0);
        assert!(cross(v(0.0, 1.0), v(1.0, 0.0)) < 0.0);
        let r = rotate(v(1.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!(r.x.abs() < 1e-12 && (r.y - 1.0).abs() < 1e-12);
    }
}

// Centralized tolerances for board geometry. All distances are canvas units (px).
//
// Two categories: "exact" coincidence (shared endpoints, loop closure) and
// pixel-scale proximity. Everything else is derived from the pixel scale.

pub const EPS_EXACT: f64 = 1e-6;          // shared endpoint / coincident samples
pub const EPS_PARALLEL: f64 = 1e-9;       // relative cross-product guard
pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold
pub const EPS_COLLINEAR: f64 = 1e-3;      // sine of the angle treated as parallel for overlap

pub const PIXEL_TOL: f64 = 1.0;           // collinear overlap length, general proximity
pub const POINT_CLEARANCE: f64 = 6.0 * PIXEL_TOL;       // curve vs non-endpoint point
pub const PLACEMENT_TOL: f64 = 2.0 * PIXEL_TOL;         // new point vs sampled path
pub const MIN_POINT_SEPARATION: f64 = 12.0 * PIXEL_TOL; // new point vs existing points

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }

pub mod outline;
pub mod polygon;
pub mod transform;
pub mod triangulate;

pub use outline::Outline;
pub use transform::FrameTransform;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 rotation matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for frame-transform round trips, relative to the scene's unit scale.
pub const TRANSFORM_TOLERANCE: f64 = 1e-6;

/// Minimum volume (document-unit³) below which a body is treated as degenerate.
pub const MIN_SOLID_VOLUME: f64 = 1e-4;

/// Overlap depth (document units) two outlines must exceed to count as intersecting.
pub const OUTLINE_EPSILON: f64 = 0.01;

/// Maximum distance between a point and its face projection for anchoring.
pub const FACE_PROJECTION_TOLERANCE: f64 = 1e-3;

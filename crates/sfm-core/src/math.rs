use nalgebra::{Matrix3, Point3, Vector2, Vector3};

/// Solver working precision.
pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;

// The upstream pipeline stores poses, points, and measurements in single
// precision; these aliases mark that storage side of the boundary.
pub type Vec2f = Vector2<f32>;
pub type Vec3f = Vector3<f32>;
pub type Pt3f = Point3<f32>;
pub type Mat3f = Matrix3<f32>;

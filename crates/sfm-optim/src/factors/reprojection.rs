//! Reprojection residual with an optional depth-consistency term.

use crate::math::projection::project_pinhole;
use crate::math::rotation::rotate_angle_axis;
use nalgebra::{DVector, RealField, Vector3};
use sfm_core::{Intrinsics, Vec2f};
use tiny_solver::factors::Factor;

/// Per-observation residual over a 6D camera block `[r; t]` (rotation
/// vector plus translation) and a 3D point block.
///
/// The camera model composes translation before rotation, `R(p + t)`,
/// matching the pose convention produced by the upstream pipeline. The
/// residual is `[predicted_u - observed_u, predicted_v - observed_v]`, with
/// a third component `(p.z - depth) / depth` when the depth term is
/// enabled. The factor holds only per-observation scalars and the shared
/// intrinsics, so the solver can evaluate it concurrently.
#[derive(Debug, Clone)]
pub struct ReprojectionFactor {
    observed_x: f64,
    observed_y: f64,
    observed_depth: f64,
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
    use_depth: bool,
}

impl ReprojectionFactor {
    /// Camera parameter block size: rotation vector + translation.
    pub const CAMERA_DIM: usize = 6;
    /// Point parameter block size.
    pub const POINT_DIM: usize = 3;

    /// Bind a factor to one observation, widening pipeline measurements to
    /// solver precision.
    pub fn new(keypoint: Vec2f, depth: f32, intrinsics: &Intrinsics, use_depth: bool) -> Self {
        Self {
            observed_x: f64::from(keypoint.x),
            observed_y: f64::from(keypoint.y),
            observed_depth: f64::from(depth),
            fx: f64::from(intrinsics.fx),
            fy: f64::from(intrinsics.fy),
            cx: f64::from(intrinsics.cx),
            cy: f64::from(intrinsics.cy),
            use_depth,
        }
    }

    /// Residual length: `[du, dv]`, plus the depth term when enabled.
    pub fn residual_dim(&self) -> usize {
        if self.use_depth {
            3
        } else {
            2
        }
    }

    fn residual_generic<T: RealField>(&self, cam: &DVector<T>, point: &DVector<T>) -> DVector<T> {
        debug_assert_eq!(cam.len(), Self::CAMERA_DIM, "camera block must be [r; t]");
        debug_assert_eq!(point.len(), Self::POINT_DIM, "point block must be 3D");

        let rvec = Vector3::new(cam[0].clone(), cam[1].clone(), cam[2].clone());
        let t = Vector3::new(cam[3].clone(), cam[4].clone(), cam[5].clone());
        let p = Vector3::new(point[0].clone(), point[1].clone(), point[2].clone());

        // Translation is applied before rotation in this pose convention.
        let shifted = p.clone() + t;
        let pc = rotate_angle_axis(&rvec, &shifted);

        let proj = project_pinhole(
            T::from_f64(self.fx).unwrap(),
            T::from_f64(self.fy).unwrap(),
            T::from_f64(self.cx).unwrap(),
            T::from_f64(self.cy).unwrap(),
            pc,
        );
        let du = proj.x.clone() - T::from_f64(self.observed_x).unwrap();
        let dv = proj.y.clone() - T::from_f64(self.observed_y).unwrap();

        if self.use_depth {
            // Depth consistency against the point's world z (not the
            // camera-space depth), normalized by the measurement.
            let depth_obs = T::from_f64(self.observed_depth).unwrap();
            let ddepth = (p.z.clone() - depth_obs.clone()) / depth_obs;
            nalgebra::dvector![du, dv, ddepth]
        } else {
            nalgebra::dvector![du, dv]
        }
    }
}

impl<T: RealField> Factor<T> for ReprojectionFactor {
    fn residual_func(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 2, "expected [camera, point] parameter blocks");
        self.residual_generic(&params[0], &params[1])
    }
}

//! Camera pose and point parameter conversions.
//!
//! This is the only code that reads or writes between the solver's flat
//! parameter vectors and the pipeline's pose/point structures. The flat
//! blocks are transient: created at problem-build time, written back once
//! the solve completes.

use anyhow::{ensure, Result};
use nalgebra::{DVector, DVectorView, Rotation3, Vector3};
use sfm_core::{CameraPose, Pt3f};

/// Convert a pose into the 6D camera block `[r; t]`: rotation matrix to
/// rotation vector via the SO(3) log map, widened to solver precision.
pub fn pose_to_camera_dvec(pose: &CameraPose) -> DVector<f64> {
    let r = Rotation3::from_matrix_unchecked(pose.r.cast::<f64>());
    let rvec = r.scaled_axis();
    let t = pose.t.cast::<f64>();
    nalgebra::dvector![rvec.x, rvec.y, rvec.z, t.x, t.y, t.z]
}

/// Convert a solved 6D camera block back into a pose: exp map for the
/// rotation, narrowed to pipeline precision.
pub fn camera_dvec_to_pose(v: DVectorView<'_, f64>) -> Result<CameraPose> {
    ensure!(
        v.len() == 6,
        "expected camera vector of length 6, got {}",
        v.len()
    );
    let r = Rotation3::from_scaled_axis(Vector3::new(v[0], v[1], v[2]));
    Ok(CameraPose {
        r: r.into_inner().cast::<f32>(),
        t: Vector3::new(v[3], v[4], v[5]).cast::<f32>(),
    })
}

/// Widen a world point into its 3D parameter block.
pub fn point_to_dvec(p: &Pt3f) -> DVector<f64> {
    nalgebra::dvector![f64::from(p.x), f64::from(p.y), f64::from(p.z)]
}

/// Narrow a solved 3D block back into a pipeline point.
pub fn dvec_to_point(v: DVectorView<'_, f64>) -> Result<Pt3f> {
    ensure!(
        v.len() == 3,
        "expected point vector of length 3, got {}",
        v.len()
    );
    Ok(Pt3f::new(v[0] as f32, v[1] as f32, v[2] as f32))
}

//! Pipeline-owned data refined in place by bundle adjustment.

use crate::{Mat3f, Pt3f, Vec2f, Vec3f};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Rigid camera pose in pipeline storage precision.
///
/// `r` is an orthonormal rotation matrix; the optimizer converts it to a
/// rotation vector for the duration of a solve and back afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub r: Mat3f,
    pub t: Vec3f,
}

impl CameraPose {
    pub fn new(r: Mat3f, t: Vec3f) -> Self {
        Self { r, t }
    }

    /// Pose at the world origin with no rotation.
    pub fn identity() -> Self {
        Self {
            r: Mat3f::identity(),
            t: Vec3f::zeros(),
        }
    }
}

/// Pose sequence indexed by camera; `None` marks a camera reduced by an
/// earlier pipeline stage and excluded from optimization.
pub type CameraPoses = Vec<Option<CameraPose>>;

/// Sparse world points indexed by the observation graph.
pub type PointCloud = Vec<Pt3f>;

/// Per-camera keypoint pixels and their observed depths.
///
/// The two sequences are parallel: `depths[i]` belongs to `keypoints[i]`.
#[derive(Debug, Clone, Default)]
pub struct CamFrame {
    pub keypoints: Vec<Vec2f>,
    pub depths: Vec<f32>,
}

impl CamFrame {
    /// Construct a frame, checking the keypoint/depth sequences match.
    pub fn new(keypoints: Vec<Vec2f>, depths: Vec<f32>) -> Result<Self> {
        ensure!(
            keypoints.len() == depths.len(),
            "keypoint / depth counts must match: {} vs {}",
            keypoints.len(),
            depths.len()
        );
        Ok(Self { keypoints, depths })
    }

    /// Number of keypoints in this frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Shared pinhole calibration, constant across all cameras.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl Intrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Extract focal lengths and principal point from a 3x3 calibration
    /// matrix.
    pub fn from_matrix(k: &Mat3f) -> Self {
        Self {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cam_frame_rejects_length_mismatch() {
        let kps = vec![Vec2f::new(1.0, 2.0), Vec2f::new(3.0, 4.0)];
        let depths = vec![1.0];
        assert!(CamFrame::new(kps, depths).is_err());
    }

    #[test]
    fn cam_frame_len() {
        let frame = CamFrame::new(vec![Vec2f::new(1.0, 2.0)], vec![5.0]).unwrap();
        assert_eq!(frame.len(), 1);
        assert!(!frame.is_empty());
    }

    #[test]
    fn intrinsics_from_matrix() {
        let k = Mat3f::new(
            500.0, 0.0, 320.0, //
            0.0, 510.0, 240.0, //
            0.0, 0.0, 1.0,
        );
        let intr = Intrinsics::from_matrix(&k);
        assert_eq!(intr.fx, 500.0);
        assert_eq!(intr.fy, 510.0);
        assert_eq!(intr.cx, 320.0);
        assert_eq!(intr.cy, 240.0);
    }

    #[test]
    fn intrinsics_serde_roundtrip() {
        let intr = Intrinsics::new(500.0, 510.0, 320.0, 240.0);
        let json = serde_json::to_string(&intr).unwrap();
        let restored: Intrinsics = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, intr);
    }

    #[test]
    fn identity_pose() {
        let pose = CameraPose::identity();
        assert_eq!(pose.r, Mat3f::identity());
        assert_eq!(pose.t, Vec3f::zeros());
    }
}

//! Core data model for the bundle-adjustment refinement step of a
//! structure-from-motion pipeline.
//!
//! This crate contains:
//! - linear algebra type aliases in solver (`f64`) and pipeline (`f32`)
//!   precision,
//! - the pipeline-owned structures refined in place (camera poses, point
//!   cloud, per-camera frames),
//! - the observation graph linking cameras to the points they observe.
//!
//! The optimization itself lives in `sfm-optim`; nothing here depends on a
//! solver.

/// Linear algebra type aliases.
pub mod math;
/// Pipeline-owned pose, point, frame, and calibration types.
pub mod types;
/// Bipartite camera/point observation graph.
pub mod graph;

pub use graph::ObservationGraph;
pub use math::*;
pub use types::{CamFrame, CameraPose, CameraPoses, Intrinsics, PointCloud};

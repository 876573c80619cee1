//! Joint refinement of camera poses and sparse world points.
//!
//! Builds one residual block per observation in the graph, shares the
//! camera and point parameter blocks across every observation that touches
//! them, runs the external minimizer, and writes the solved values back
//! into the pipeline structures.

use crate::factors::ReprojectionFactor;
use crate::params::pose::{
    camera_dvec_to_pose, dvec_to_point, point_to_dvec, pose_to_camera_dvec,
};
use crate::robust::RobustLoss;
use crate::solver::tiny::{evaluate_cost, solve, SolveOptions};
use anyhow::{ensure, Result};
use log::{debug, info};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use sfm_core::{CamFrame, CameraPoses, Intrinsics, ObservationGraph, PointCloud};
use std::collections::HashMap;
use tiny_solver::problem::Problem;

/// Options for one refinement pass.
#[derive(Debug, Clone, Default)]
pub struct BundleAdjustmentOptions {
    /// Robust loss attached to every residual block.
    pub loss: RobustLoss,
    /// Camera indices whose pose blocks stay fixed during the solve, e.g.
    /// the first camera to pin gauge freedom.
    pub fixed_cameras: Vec<usize>,
    /// Underlying solver configuration.
    pub solver: SolveOptions,
}

/// Summary of a refinement pass. Diagnostic only: the refined poses and
/// points are written back in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BundleAdjustmentReport {
    /// Cameras that contributed at least one residual.
    pub num_cameras: usize,
    /// Points that contributed at least one residual.
    pub num_points: usize,
    pub num_residuals: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
}

/// An assembled problem plus the statistics needed to reason about it.
pub struct BundleProblem {
    pub problem: Problem,
    /// Initial parameter values keyed by block name; exactly one entry per
    /// participating camera (`cam/{i}`) and point (`pt/{j}`).
    pub initial: HashMap<String, DVector<f64>>,
    pub num_residuals: usize,
    pub num_cameras: usize,
    pub num_points: usize,
}

fn camera_key(idx: usize) -> String {
    format!("cam/{idx}")
}

fn point_key(idx: usize) -> String {
    format!("pt/{idx}")
}

/// Assemble the joint problem: one residual block per observation whose
/// camera survived the earlier pipeline stages.
///
/// Parameter blocks are registered lazily on first use and shared by name,
/// which is what couples all cameras and points into a single
/// optimization. Observations referencing a reduced camera are skipped
/// silently; out-of-range indices are rejected before any block is
/// created.
pub fn build_bundle_problem(
    graph: &ObservationGraph,
    frames: &[CamFrame],
    use_depth: bool,
    intrinsics: &Intrinsics,
    poses: &CameraPoses,
    cloud: &PointCloud,
    opts: &BundleAdjustmentOptions,
) -> Result<BundleProblem> {
    ensure!(
        frames.len() == poses.len(),
        "frame count {} does not match pose count {}",
        frames.len(),
        poses.len()
    );
    graph.validate(frames, cloud.len())?;

    let mut problem = Problem::new();
    let mut initial: HashMap<String, DVector<f64>> = HashMap::new();
    let mut num_residuals = 0;
    let mut num_cameras = 0;
    let mut num_points = 0;

    for (cam_idx, kp_idx, point_idx) in graph.iter() {
        // Cameras dropped earlier in the pipeline contribute nothing.
        let Some(pose) = &poses[cam_idx] else {
            debug!("observation ({cam_idx}, {kp_idx}): camera reduced, skipping");
            continue;
        };

        let cam_name = camera_key(cam_idx);
        if !initial.contains_key(&cam_name) {
            initial.insert(cam_name.clone(), pose_to_camera_dvec(pose));
            num_cameras += 1;
            if opts.fixed_cameras.contains(&cam_idx) {
                for i in 0..ReprojectionFactor::CAMERA_DIM {
                    problem.fix_variable(&cam_name, i);
                }
            }
        }

        let pt_name = point_key(point_idx);
        if !initial.contains_key(&pt_name) {
            initial.insert(pt_name.clone(), point_to_dvec(&cloud[point_idx]));
            num_points += 1;
        }

        let frame = &frames[cam_idx];
        let depth = frame.depths[kp_idx];
        // A zero or non-finite measurement cannot support the normalized
        // depth term; the observation degrades to reprojection only.
        let with_depth = use_depth && depth.is_finite() && depth != 0.0;
        if use_depth && !with_depth {
            debug!("observation ({cam_idx}, {kp_idx}): unusable depth {depth}, dropping depth term");
        }

        let factor =
            ReprojectionFactor::new(frame.keypoints[kp_idx], depth, intrinsics, with_depth);
        problem.add_residual_block(
            factor.residual_dim(),
            &[cam_name.as_str(), pt_name.as_str()],
            Box::new(factor),
            opts.loss.to_tiny_loss()?,
        );
        num_residuals += 1;
    }

    Ok(BundleProblem {
        problem,
        initial,
        num_residuals,
        num_cameras,
        num_points,
    })
}

/// Jointly refine all camera poses and world points against the
/// observation graph, in place.
///
/// Reduced cameras are excluded; points that participate in no residual
/// keep their current value. Hitting the iteration cap is not a failure:
/// the best parameters reached are written back and the costs in the
/// report tell the story. An error is returned only for invalid input or
/// when the solver fails outright (in which case nothing is written back).
pub fn refine_bundle(
    graph: &ObservationGraph,
    frames: &[CamFrame],
    use_depth: bool,
    intrinsics: &Intrinsics,
    poses: &mut CameraPoses,
    cloud: &mut PointCloud,
    opts: &BundleAdjustmentOptions,
) -> Result<BundleAdjustmentReport> {
    let bundle = build_bundle_problem(graph, frames, use_depth, intrinsics, poses, cloud, opts)?;

    if bundle.num_residuals == 0 {
        info!("bundle adjustment: no usable observations, nothing to refine");
        return Ok(BundleAdjustmentReport {
            num_cameras: 0,
            num_points: 0,
            num_residuals: 0,
            initial_cost: 0.0,
            final_cost: 0.0,
        });
    }

    info!(
        "bundle adjustment: {} residuals over {} cameras and {} points",
        bundle.num_residuals, bundle.num_cameras, bundle.num_points
    );

    let initial_cost = evaluate_cost(&bundle.problem, &bundle.initial);
    let solution = solve(&bundle.problem, bundle.initial, &opts.solver)?;
    let final_cost = evaluate_cost(&bundle.problem, &solution);

    for (cam_idx, pose) in poses.iter_mut().enumerate() {
        let Some(pose) = pose else { continue };
        if let Some(v) = solution.get(&camera_key(cam_idx)) {
            *pose = camera_dvec_to_pose(v.as_view())?;
        }
    }
    for (point_idx, point) in cloud.iter_mut().enumerate() {
        if let Some(v) = solution.get(&point_key(point_idx)) {
            *point = dvec_to_point(v.as_view())?;
        }
    }

    info!("bundle adjustment: cost {initial_cost:.6e} -> {final_cost:.6e}");

    Ok(BundleAdjustmentReport {
        num_cameras: bundle.num_cameras,
        num_points: bundle.num_points,
        num_residuals: bundle.num_residuals,
        initial_cost,
        final_cost,
    })
}

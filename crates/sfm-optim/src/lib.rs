//! Bundle-adjustment refinement built on tiny-solver.
//!
//! Given camera poses, a sparse point cloud, and the observation graph
//! produced by earlier structure-from-motion stages, [`refine_bundle`]
//! jointly refines every pose and point by minimizing reprojection error,
//! optionally combined with a depth-consistency term.
//!
//! The crate is organised the same way the problem decomposes: residual
//! [`factors`], parameter [`params`] conversions, [`problems`] assembly,
//! and a thin [`solver`] wrapper over the external minimizer.

pub mod factors;
pub mod math;
pub mod params;
pub mod problems;
pub mod robust;
pub mod solver;

pub use crate::problems::bundle::{
    build_bundle_problem, refine_bundle, BundleAdjustmentOptions, BundleAdjustmentReport,
    BundleProblem,
};
pub use crate::robust::RobustLoss;
pub use crate::solver::tiny::SolveOptions;

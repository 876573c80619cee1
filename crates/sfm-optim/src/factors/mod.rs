//! Residual factors, one per observation.

pub mod reprojection;

pub use reprojection::ReprojectionFactor;

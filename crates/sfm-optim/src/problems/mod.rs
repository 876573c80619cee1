//! Optimization problems assembled from pipeline data.

pub mod bundle;

//! Thin boundary to the external minimizer.

pub mod tiny;

//! Conversions between pipeline representations and flat parameter blocks.

pub mod pose;

//! Math helpers shared by factors.

pub mod projection;
pub mod rotation;

//! Observation graph: which camera saw which world point, and through
//! which keypoint.

use crate::CamFrame;
use anyhow::{ensure, Result};
use std::collections::BTreeMap;

/// Maps `(camera_index, keypoint_index)` to the index of the world point
/// that keypoint observes.
///
/// The map is ordered, so iteration (and therefore problem assembly) is
/// deterministic run to run. The graph is the sole source of residual
/// blocks: every entry contributes one residual unless its camera was
/// reduced earlier in the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ObservationGraph {
    map: BTreeMap<(usize, usize), usize>,
}

impl ObservationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observation. Returns the point index it replaces, if a
    /// previous entry existed for the same camera/keypoint pair.
    pub fn insert(&mut self, camera: usize, keypoint: usize, point: usize) -> Option<usize> {
        self.map.insert((camera, keypoint), point)
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate observations as `(camera_index, keypoint_index, point_index)`
    /// in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.map.iter().map(|(&(cam, kp), &point)| (cam, kp, point))
    }

    /// Range-check every observation against the per-camera frames and the
    /// point cloud size, before any state is mutated.
    pub fn validate(&self, frames: &[CamFrame], num_points: usize) -> Result<()> {
        for (cam, kp, point) in self.iter() {
            ensure!(
                cam < frames.len(),
                "observation ({}, {}) references camera {} out of {}",
                cam,
                kp,
                cam,
                frames.len()
            );
            ensure!(
                kp < frames[cam].len(),
                "observation ({}, {}) references keypoint {} out of {} in camera {}",
                cam,
                kp,
                kp,
                frames[cam].len(),
                cam
            );
            ensure!(
                point < num_points,
                "observation ({}, {}) references point {} out of {}",
                cam,
                kp,
                point,
                num_points
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec2f;

    fn frame(n: usize) -> CamFrame {
        CamFrame::new(vec![Vec2f::zeros(); n], vec![1.0; n]).unwrap()
    }

    #[test]
    fn insert_and_iterate_in_order() {
        let mut graph = ObservationGraph::new();
        graph.insert(1, 0, 7);
        graph.insert(0, 2, 3);
        graph.insert(0, 1, 5);

        let obs: Vec<_> = graph.iter().collect();
        assert_eq!(obs, vec![(0, 1, 5), (0, 2, 3), (1, 0, 7)]);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut graph = ObservationGraph::new();
        assert_eq!(graph.insert(0, 0, 1), None);
        assert_eq!(graph.insert(0, 0, 2), Some(1));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn validate_accepts_in_range_indices() {
        let mut graph = ObservationGraph::new();
        graph.insert(0, 1, 0);
        graph.insert(1, 0, 1);
        assert!(graph.validate(&[frame(2), frame(1)], 2).is_ok());
    }

    #[test]
    fn validate_rejects_camera_out_of_range() {
        let mut graph = ObservationGraph::new();
        graph.insert(2, 0, 0);
        assert!(graph.validate(&[frame(1), frame(1)], 1).is_err());
    }

    #[test]
    fn validate_rejects_keypoint_out_of_range() {
        let mut graph = ObservationGraph::new();
        graph.insert(0, 3, 0);
        assert!(graph.validate(&[frame(2)], 1).is_err());
    }

    #[test]
    fn validate_rejects_point_out_of_range() {
        let mut graph = ObservationGraph::new();
        graph.insert(0, 0, 9);
        assert!(graph.validate(&[frame(1)], 3).is_err());
    }
}

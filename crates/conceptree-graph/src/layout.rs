use crate::grouping::DepthGroups;
use crate::settings::LayoutSettings;
use conceptree_core::NodeIndex;
use glam::{Quat, Vec3};
use std::collections::HashMap;
use std::f32::consts::TAU;

pub trait Layouter {
    /// Rest position for every grouped node.
    fn execute(&self, groups: &DepthGroups<'_>) -> HashMap<NodeIndex, Vec3>;
}

/// Places each depth on its own horizontal ring around the vertical axis.
///
/// The root sits at the origin. Depth `d` sits at `y = -d * depth_spacing` on a ring of
/// radius `base_ring_radius + (d - 1) * ring_radius_step`, its nodes evenly spaced in
/// pre-order starting at angle 0. Ring membership depends on depth only, never on parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialLayouter {
    pub base_ring_radius: f32,
    pub ring_radius_step: f32,
    pub depth_spacing: f32,
}

impl Default for RadialLayouter {
    fn default() -> Self {
        Self::new(&LayoutSettings::default())
    }
}

impl RadialLayouter {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            base_ring_radius: settings.base_ring_radius,
            ring_radius_step: settings.ring_radius_step,
            depth_spacing: settings.depth_spacing,
        }
    }

    /// Radius of the ring at `depth`; `0` for the root.
    pub fn ring_radius(&self, depth: u32) -> f32 {
        if depth == 0 {
            return 0.0;
        }
        self.base_ring_radius + (depth - 1) as f32 * self.ring_radius_step
    }

    pub fn depth_y(&self, depth: u32) -> f32 {
        -(depth as f32) * self.depth_spacing
    }

    /// Angle of slot `index` on a ring holding `count` nodes.
    pub fn ring_angle(index: usize, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        index as f32 * TAU / count as f32
    }

    pub fn position(&self, depth: u32, index: usize, count: usize) -> Vec3 {
        if depth == 0 {
            return Vec3::ZERO;
        }
        let angle = Self::ring_angle(index, count);
        let radius = self.ring_radius(depth);
        Vec3::new(angle.cos() * radius, self.depth_y(depth), angle.sin() * radius)
    }

    /// Start of the connector for a node at `depth`: the vertical axis at its parent's height.
    pub fn parent_anchor(&self, depth: u32) -> Vec3 {
        Vec3::new(0.0, self.depth_y(depth.saturating_sub(1)), 0.0)
    }

    /// Lowest camera height allowed for a tree `max_depth` deep.
    pub fn camera_floor(&self, max_depth: u32, margin: f32) -> f32 {
        -(max_depth as f32 * self.depth_spacing + margin)
    }
}

impl Layouter for RadialLayouter {
    fn execute(&self, groups: &DepthGroups<'_>) -> HashMap<NodeIndex, Vec3> {
        let mut positions = HashMap::with_capacity(groups.node_count());
        for (depth, nodes) in groups.iter() {
            let count = nodes.len();
            for (i, grouped) in nodes.iter().enumerate() {
                positions.insert(grouped.index, self.position(depth, i, count));
            }
        }
        positions
    }
}

/// Rotate `point` about the world Y axis by `angle` radians.
pub fn rotate_around_vertical_axis(point: Vec3, angle: f32) -> Vec3 {
    Quat::from_rotation_y(angle) * point
}

#[cfg(test)]
mod tests {
    use super::*;
    use conceptree_core::TreeNode;
    use std::f32::consts::PI;

    const EPS: f32 = 1e-5;

    fn bridge() -> TreeNode {
        TreeNode::new("bridge", 0)
            .with_child(TreeNode::new("beam", 1).with_child(TreeNode::new("steel", 2)))
            .with_child(TreeNode::new("truss", 1))
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, EPS), "{a:?} != {b:?}");
    }

    #[test]
    fn test_bridge_positions() {
        let tree = bridge();
        let groups = DepthGroups::from_tree(&tree);
        let positions = RadialLayouter::default().execute(&groups);

        assert_eq!(positions.len(), 4);
        // Pre-order: bridge 0, beam 1, steel 2, truss 3.
        assert_close(positions[&NodeIndex(0)], Vec3::ZERO);
        assert_close(positions[&NodeIndex(1)], Vec3::new(2.0, -4.0, 0.0));
        assert_close(positions[&NodeIndex(3)], Vec3::new(-2.0, -4.0, 0.0));
        assert_close(positions[&NodeIndex(2)], Vec3::new(2.5, -8.0, 0.0));
    }

    #[test]
    fn test_connector_anchor_is_on_axis() {
        let layouter = RadialLayouter::default();
        assert_close(layouter.parent_anchor(2), Vec3::new(0.0, -4.0, 0.0));
        assert_close(layouter.parent_anchor(1), Vec3::ZERO);
    }

    #[test]
    fn test_ring_radius_and_depth() {
        let layouter = RadialLayouter::default();
        assert_eq!(layouter.ring_radius(0), 0.0);
        assert_eq!(layouter.ring_radius(1), 2.0);
        assert_eq!(layouter.ring_radius(3), 3.0);
        assert_eq!(layouter.depth_y(3), -12.0);
        assert_eq!(layouter.camera_floor(3, 2.0), -14.0);
    }

    #[test]
    fn test_ring_angles() {
        assert_eq!(RadialLayouter::ring_angle(0, 4), 0.0);
        assert!((RadialLayouter::ring_angle(2, 4) - PI).abs() < EPS);
        assert_eq!(RadialLayouter::ring_angle(0, 0), 0.0);
    }

    #[test]
    fn test_empty_groups_yield_no_positions() {
        assert!(RadialLayouter::default().execute(&DepthGroups::empty()).is_empty());
    }

    #[test]
    fn test_custom_settings() {
        let layouter = RadialLayouter::new(&LayoutSettings {
            base_ring_radius: 3.0,
            ring_radius_step: 1.0,
            depth_spacing: 2.0,
        });
        assert_close(layouter.position(2, 0, 1), Vec3::new(4.0, -4.0, 0.0));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        // Right-handed rotation about +Y takes +X to -Z.
        let rotated = rotate_around_vertical_axis(Vec3::new(2.0, -4.0, 0.0), PI / 2.0);
        assert_close(rotated, Vec3::new(0.0, -4.0, -2.0));
    }
}

//! Scene composition
//!
//! Turns a concept tree into host primitives: one marker and one label per node,
//! and a line plus a glowing tube per parent connector. Primitives are built once
//! per tree and only repositioned afterwards.

use crate::curve::{ConnectorRouter, QuadraticBezier};
use crate::error::ViewError;
use crate::grouping::{DepthGroups, SkippedNode};
use crate::host::{
    CurveDesc, CurveStyle, LabelDesc, MarkerDesc, PrimitiveId, RenderHost, SurfaceInfo, Transform,
};
use crate::layout::{Layouter, RadialLayouter, rotate_around_vertical_axis};
use crate::settings::{ConnectorSettings, LabelSettings, MarkerSettings, ViewSettings};
use crate::style::{COLOR_LABEL_BACKGROUND, COLOR_LABEL_TEXT, Color, ConfidenceTier};
use conceptree_core::{NodeIndex, TreeNode};
use conceptree_events::SceneId;
use glam::Vec3;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const SCENE_TARGET: &str = "conceptree::graph::scene";

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub index: NodeIndex,
    pub parent: Option<NodeIndex>,
    pub depth: u32,
    pub source: TreeNode,
    pub tier: ConfidenceTier,
    pub marker: PrimitiveId,
    pub label: PrimitiveId,
    pub marker_radius: f32,
    /// Height of the label centre above the marker centre at scale 1.
    pub label_offset: f32,
    pub rest_position: Vec3,
    pub current_position: Vec3,
    /// Marker and label scale; raised while the node is emphasised.
    pub scale: f32,
    pub emphasized: bool,
}

impl SceneNode {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn label_position(&self) -> Vec3 {
        self.current_position + Vec3::Y * self.label_offset * self.scale
    }
}

/// Curve from the parent anchor down to a node.
#[derive(Debug, Clone)]
pub struct Connector {
    pub node: NodeIndex,
    pub curve: QuadraticBezier,
    pub line: PrimitiveId,
    pub tube: PrimitiveId,
}

/// Everything built for one tree.
///
/// Nodes are stored by [`NodeIndex`]. Once torn down the handle holds nothing and
/// every mutating call is a no-op.
#[derive(Debug)]
pub struct SceneHandle {
    id: SceneId,
    nodes: Vec<SceneNode>,
    connectors: Vec<Connector>,
    markers: HashMap<PrimitiveId, NodeIndex>,
    max_depth: u32,
    skipped: Vec<SkippedNode>,
    rotation_y: f32,
    released: bool,
}

impl SceneHandle {
    /// A scene with nothing in it, e.g. for an empty or fully malformed tree.
    pub fn empty(id: SceneId) -> Self {
        Self {
            id,
            nodes: Vec::new(),
            connectors: Vec::new(),
            markers: HashMap::new(),
            max_depth: 0,
            skipped: Vec::new(),
            rotation_y: 0.0,
            released: false,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.nodes.get(index.0)
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn connector_for(&self, index: NodeIndex) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.node == index)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn skipped(&self) -> &[SkippedNode] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn node_for_marker(&self, marker: PrimitiveId) -> Option<NodeIndex> {
        self.markers.get(&marker).copied()
    }

    pub fn marker_ids(&self) -> Vec<PrimitiveId> {
        self.nodes.iter().map(|n| n.marker).collect()
    }

    pub fn primitive_count(&self) -> usize {
        self.nodes.len() * 2 + self.connectors.len() * 2
    }

    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.nodes.iter().filter(move |n| n.source.name == name)
    }

    /// Reposition every primitive for the given rotation about the vertical axis.
    pub fn apply_rotation<H: RenderHost + ?Sized>(&mut self, host: &mut H, rotation_y: f32) {
        if self.released {
            return;
        }
        self.rotation_y = rotation_y;
        for node in &mut self.nodes {
            node.current_position = rotate_around_vertical_axis(node.rest_position, rotation_y);
            Self::place_node(host, node);
        }
        let whole = Transform {
            translation: Vec3::ZERO,
            rotation_y,
            scale: 1.0,
        };
        for connector in &self.connectors {
            host.set_transform(connector.line, whole);
            host.set_transform(connector.tube, whole);
        }
    }

    /// Set or clear emphasis on one node and push the change to the host at once.
    pub fn set_emphasis<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        index: NodeIndex,
        tint: Option<Color>,
        scale: f32,
    ) {
        if self.released {
            return;
        }
        let Some(node) = self.nodes.get_mut(index.0) else {
            return;
        };
        node.emphasized = tint.is_some();
        node.scale = scale;
        host.set_emphasis(node.marker, tint);
        host.set_emphasis(node.label, tint);
        Self::place_node(host, node);
    }

    fn place_node<H: RenderHost + ?Sized>(host: &mut H, node: &SceneNode) {
        host.set_transform(
            node.marker,
            Transform {
                translation: node.current_position,
                rotation_y: 0.0,
                scale: node.scale,
            },
        );
        host.set_transform(
            node.label,
            Transform {
                translation: node.label_position(),
                rotation_y: 0.0,
                scale: node.scale,
            },
        );
    }

    /// Release every primitive. Returns how many were released; `0` on repeat calls.
    pub fn teardown<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> usize {
        if self.released {
            return 0;
        }
        self.released = true;

        let mut released = 0;
        for connector in self.connectors.drain(..) {
            host.release(connector.tube);
            host.release(connector.line);
            released += 2;
        }
        for node in self.nodes.drain(..).rev() {
            host.release(node.label);
            host.release(node.marker);
            released += 2;
        }
        self.markers.clear();

        info!(target: SCENE_TARGET, scene = %self.id, released, "Scene torn down");
        released
    }
}

/// Releases whatever it acquired unless the build commits.
struct PrimitiveGuard<'h, H: RenderHost + ?Sized> {
    host: &'h mut H,
    acquired: Vec<PrimitiveId>,
    committed: bool,
}

impl<'h, H: RenderHost + ?Sized> PrimitiveGuard<'h, H> {
    fn new(host: &'h mut H) -> Self {
        Self {
            host,
            acquired: Vec::new(),
            committed: false,
        }
    }

    fn marker(&mut self, desc: &MarkerDesc) -> Result<PrimitiveId, ViewError> {
        let id = self.host.create_marker(desc)?;
        self.acquired.push(id);
        Ok(id)
    }

    fn label(&mut self, desc: &LabelDesc) -> Result<PrimitiveId, ViewError> {
        let id = self.host.create_label(desc)?;
        self.acquired.push(id);
        Ok(id)
    }

    fn curve(&mut self, desc: &CurveDesc) -> Result<PrimitiveId, ViewError> {
        let id = self.host.create_curve(desc)?;
        self.acquired.push(id);
        Ok(id)
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl<H: RenderHost + ?Sized> Drop for PrimitiveGuard<'_, H> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        warn!(
            target: SCENE_TARGET,
            count = self.acquired.len(),
            "Scene build aborted, releasing partial primitives"
        );
        for id in self.acquired.drain(..).rev() {
            self.host.release(id);
        }
    }
}

/// Builds [`SceneHandle`]s from trees.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    layouter: RadialLayouter,
    router: ConnectorRouter,
    markers: MarkerSettings,
    labels: LabelSettings,
    connectors: ConnectorSettings,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new(&ViewSettings::default())
    }
}

impl SceneComposer {
    pub fn new(settings: &ViewSettings) -> Self {
        Self {
            layouter: RadialLayouter::new(&settings.layout),
            router: ConnectorRouter::new(&settings.connectors),
            markers: settings.markers.clone(),
            labels: settings.labels.clone(),
            connectors: settings.connectors.clone(),
        }
    }

    pub fn layouter(&self) -> &RadialLayouter {
        &self.layouter
    }

    /// Lay out `tree` and request its primitives from `host`.
    ///
    /// Fails with [`ViewError::GraphicsContextUnavailable`] when the host has no surface,
    /// or with the host's error if a primitive is refused; in both cases nothing stays
    /// allocated. Malformed nodes are skipped with their subtrees.
    pub fn build<H, R>(
        &self,
        host: &mut H,
        tree: &TreeNode,
        id: SceneId,
        rng: &mut R,
    ) -> Result<SceneHandle, ViewError>
    where
        H: RenderHost + ?Sized,
        R: Rng + ?Sized,
    {
        let surface = host.surface().ok_or(ViewError::GraphicsContextUnavailable)?;

        let groups = DepthGroups::from_tree(tree);
        let mut handle = SceneHandle::empty(id);
        handle.skipped = groups.skipped().to_vec();
        if groups.is_empty() {
            info!(target: SCENE_TARGET, scene = %id, "Tree has no renderable nodes");
            return Ok(handle);
        }

        let positions = self.layouter.execute(&groups);
        let mut guard = PrimitiveGuard::new(host);

        for grouped in groups.nodes() {
            let rest = positions.get(&grouped.index).copied().unwrap_or_default();
            let node = grouped.node;
            let tier = ConfidenceTier::from_principles(&node.principles);
            let is_root = grouped.depth == 0;

            let (radius, segments) = if is_root {
                (
                    self.markers.node_radius * self.markers.root_scale,
                    self.markers.root_segments,
                )
            } else {
                (self.markers.node_radius, self.markers.node_segments)
            };
            let marker = guard.marker(&MarkerDesc {
                position: rest,
                radius,
                segments,
                color: tier.color(),
                emissive_intensity: self.markers.emissive_per_tier * tier.weight(),
            })?;

            let label_scale = if is_root {
                self.labels.root_scale
            } else {
                self.labels.node_scale
            };
            let world_height = self.labels.world_height * label_scale;
            let label_offset = radius + self.labels.gap + world_height * 0.5;
            let (texture_width, texture_height) = self.label_texture_size(&node.name, surface);
            let label = guard.label(&LabelDesc {
                text: node.name.clone(),
                position: rest + Vec3::Y * label_offset,
                world_height,
                font_px: self.labels.font_px,
                texture_width,
                texture_height,
                color: COLOR_LABEL_TEXT,
                background: COLOR_LABEL_BACKGROUND,
            })?;

            if !is_root {
                let start = self.layouter.parent_anchor(grouped.depth);
                let ring_radius = self.layouter.ring_radius(grouped.depth);
                let curve = self.router.route(start, rest, ring_radius, rng);
                let points = curve.points(self.connectors.segments);

                let line = guard.curve(&CurveDesc {
                    points: points.clone(),
                    color: self.connectors.color,
                    style: CurveStyle::Line {
                        width: self.connectors.line_width,
                        opacity: self.connectors.line_opacity,
                    },
                })?;
                let tube = guard.curve(&CurveDesc {
                    points,
                    color: self.connectors.color,
                    style: CurveStyle::Tube {
                        radius: self.connectors.tube_radius,
                        radial_segments: self.connectors.tube_radial_segments,
                        opacity: self.connectors.glow_opacity,
                        glow: true,
                    },
                })?;
                handle.connectors.push(Connector {
                    node: grouped.index,
                    curve,
                    line,
                    tube,
                });
            }

            debug!(
                target: SCENE_TARGET,
                index = %grouped.index,
                name = %node.name,
                tier = tier.label(),
                "Node placed at {rest}"
            );

            handle.markers.insert(marker, grouped.index);
            handle.nodes.push(SceneNode {
                index: grouped.index,
                parent: grouped.parent,
                depth: grouped.depth,
                source: node.clone(),
                tier,
                marker,
                label,
                marker_radius: radius,
                label_offset,
                rest_position: rest,
                current_position: rest,
                scale: 1.0,
                emphasized: false,
            });
        }

        guard.commit();
        handle.max_depth = groups.max_depth();

        info!(
            target: SCENE_TARGET,
            scene = %id,
            nodes = handle.nodes.len(),
            connectors = handle.connectors.len(),
            skipped = handle.skipped.len(),
            max_depth = handle.max_depth,
            "Scene built"
        );
        Ok(handle)
    }

    /// Label texture size in physical pixels for `text` on `surface`.
    pub fn label_texture_size(&self, text: &str, surface: SurfaceInfo) -> (u32, u32) {
        let font = self.labels.font_px as f32;
        let padding = 2.0 * self.labels.padding_px as f32;
        let chars = text.chars().count().max(1) as f32;
        let ratio = if surface.pixel_ratio > 0.0 {
            surface.pixel_ratio
        } else {
            1.0
        };
        let width = ((chars * font * GLYPH_ADVANCE + padding) * ratio).ceil();
        let height = ((font + padding) * ratio).ceil();
        (width.max(1.0) as u32, height.max(1.0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordedPrimitive, RecordingHost};
    use conceptree_core::{Principle, PrincipleCategory};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bridge() -> TreeNode {
        TreeNode::new("bridge", 0)
            .with_principles(vec![Principle::new("load", PrincipleCategory::Structural, 0.9)])
            .with_child(
                TreeNode::new("beam", 1)
                    .with_principles(vec![Principle::new("bend", PrincipleCategory::Mechanical, 0.7)])
                    .with_child(TreeNode::new("steel", 2)),
            )
            .with_child(TreeNode::new("truss", 1))
    }

    fn build(host: &mut RecordingHost, tree: &TreeNode) -> Result<SceneHandle, ViewError> {
        SceneComposer::default().build(host, tree, SceneId::new(), &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_build_creates_marker_label_and_connectors() {
        let mut host = RecordingHost::new(800, 600, 2.0);
        let scene = build(&mut host, &bridge()).unwrap();

        assert_eq!(scene.nodes().len(), 4);
        assert_eq!(scene.connectors().len(), 3);
        assert_eq!(host.live_count(), 4 * 2 + 3 * 2);
        assert_eq!(scene.primitive_count(), host.live_count());
        assert_eq!(scene.max_depth(), 2);
    }

    #[test]
    fn test_root_marker_is_larger_and_finer() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let scene = build(&mut host, &bridge()).unwrap();

        let root = &scene.nodes()[0];
        let Some(RecordedPrimitive::Marker(desc)) = host.primitive(root.marker).map(|p| &p.primitive)
        else {
            panic!("root marker missing");
        };
        assert!((desc.radius - 0.9).abs() < 1e-6);
        assert_eq!(desc.segments, 32);
        assert_eq!(desc.color, ConfidenceTier::High.color());

        let beam = &scene.nodes()[1];
        assert_eq!(beam.tier, ConfidenceTier::Medium);
        assert_eq!(beam.marker_radius, 0.5);
        assert_eq!(scene.nodes()[3].tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_emissive_scales_with_tier() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let scene = build(&mut host, &bridge()).unwrap();
        let emissive = |index: usize| match host.primitive(scene.nodes()[index].marker) {
            Some(live) => match &live.primitive {
                RecordedPrimitive::Marker(desc) => desc.emissive_intensity,
                _ => panic!("not a marker"),
            },
            None => panic!("marker missing"),
        };
        assert!(emissive(0) > emissive(1));
        assert!(emissive(1) > emissive(3));
    }

    #[test]
    fn test_labels_sit_above_markers_and_scale_with_pixel_ratio() {
        let mut host = RecordingHost::new(800, 600, 2.0);
        let scene = build(&mut host, &bridge()).unwrap();
        let composer = SceneComposer::default();

        for node in scene.nodes() {
            let Some(RecordedPrimitive::Label(label)) = host.primitive(node.label).map(|p| &p.primitive)
            else {
                panic!("label missing");
            };
            assert!(label.position.y > node.rest_position.y + node.marker_radius);
            assert_eq!(label.text, node.source.name);
        }

        let one_x = composer.label_texture_size(
            "steel",
            SurfaceInfo {
                width: 800,
                height: 600,
                pixel_ratio: 1.0,
            },
        );
        let two_x = composer.label_texture_size(
            "steel",
            SurfaceInfo {
                width: 800,
                height: 600,
                pixel_ratio: 2.0,
            },
        );
        assert_eq!(two_x.0, one_x.0 * 2);
        assert_eq!(two_x.1, one_x.1 * 2);
    }

    #[test]
    fn test_connector_starts_on_axis_at_parent_height() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let scene = build(&mut host, &bridge()).unwrap();

        let steel = scene.connector_for(NodeIndex(2)).unwrap();
        assert!(steel.curve.start.abs_diff_eq(Vec3::new(0.0, -4.0, 0.0), 1e-6));
        assert!(steel.curve.end.abs_diff_eq(Vec3::new(2.5, -8.0, 0.0), 1e-5));
        assert!(scene.connector_for(NodeIndex(0)).is_none());
    }

    #[test]
    fn test_headless_host_fails_without_allocating() {
        let mut host = RecordingHost::headless();
        assert!(matches!(
            build(&mut host, &bridge()),
            Err(ViewError::GraphicsContextUnavailable)
        ));
        assert_eq!(host.created_count(), 0);
    }

    #[test]
    fn test_failed_build_releases_partial_primitives() {
        let mut host = RecordingHost::new(800, 600, 1.0).failing_after(5);
        let result = build(&mut host, &bridge());

        assert!(matches!(result, Err(ViewError::Host(_))));
        assert_eq!(host.live_count(), 0);
        assert_eq!(host.released().len(), 5);
    }

    #[test]
    fn test_surface_lost_mid_build_is_context_unavailable() {
        let mut host = RecordingHost::new(800, 600, 1.0).losing_surface_after(3);
        let result = build(&mut host, &bridge());

        assert!(matches!(result, Err(ViewError::GraphicsContextUnavailable)));
        assert_eq!(host.live_count(), 0);
        assert_eq!(host.released().len(), 3);
    }

    #[test]
    fn test_empty_tree_builds_empty_scene() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let scene = build(&mut host, &TreeNode::new("", 0)).unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.skipped().len(), 1);
        assert_eq!(host.live_count(), 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = build(&mut host, &bridge()).unwrap();

        assert_eq!(scene.teardown(&mut host), 14);
        assert_eq!(scene.teardown(&mut host), 0);
        assert!(scene.is_released());
        assert_eq!(host.live_count(), 0);

        scene.apply_rotation(&mut host, 1.0);
        assert_eq!(scene.rotation_y(), 0.0);
    }

    #[test]
    fn test_apply_rotation_moves_markers_and_rotates_connectors() {
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut scene = build(&mut host, &bridge()).unwrap();
        scene.apply_rotation(&mut host, std::f32::consts::PI);

        let beam = &scene.nodes()[1];
        assert!(beam.current_position.abs_diff_eq(Vec3::new(-2.0, -4.0, 0.0), 1e-5));
        let marker = host.primitive(beam.marker).unwrap();
        assert_eq!(marker.transform.translation, beam.current_position);
        let label = host.primitive(beam.label).unwrap();
        assert!((label.transform.translation.y - beam.current_position.y - beam.label_offset).abs() < 1e-6);

        let connector = &scene.connectors()[0];
        assert_eq!(
            host.primitive(connector.tube).unwrap().transform.rotation_y,
            std::f32::consts::PI
        );
    }

    #[test]
    fn test_rebuild_yields_identical_rest_positions() {
        let tree = bridge();
        let mut host = RecordingHost::new(800, 600, 1.0);
        let mut first = build(&mut host, &tree).unwrap();
        let rest: Vec<Vec3> = first.nodes().iter().map(|n| n.rest_position).collect();
        first.teardown(&mut host);

        let second = build(&mut host, &tree).unwrap();
        let again: Vec<Vec3> = second.nodes().iter().map(|n| n.rest_position).collect();
        assert_eq!(rest, again);
    }
}

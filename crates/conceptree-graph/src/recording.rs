use crate::error::HostError;
use crate::hit_tester::{HitTester, Intersection, Ray, Sphere};
use crate::host::{
    CameraPose, CurveDesc, LabelDesc, MarkerDesc, PrimitiveId, RenderHost, SurfaceInfo, Transform,
};
use crate::style::Color;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordedPrimitive {
    Marker(MarkerDesc),
    Label(LabelDesc),
    Curve(CurveDesc),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivePrimitive {
    pub primitive: RecordedPrimitive,
    pub transform: Transform,
    pub emphasis: Option<Color>,
}

/// In-memory [`RenderHost`] that records every call.
///
/// Backs the headless CLI and the tests. Marker picking intersects spheres at each
/// marker's current translation, with its radius multiplied by its current scale.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    surface: Option<SurfaceInfo>,
    next_id: u64,
    live: BTreeMap<PrimitiveId, LivePrimitive>,
    released: Vec<PrimitiveId>,
    camera: Option<CameraPose>,
    fail_after: Option<usize>,
    lose_surface_after: Option<usize>,
    created: usize,
}

impl RecordingHost {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self::with_surface(Some(SurfaceInfo {
            width,
            height,
            pixel_ratio,
        }))
    }

    /// A host with no rendering context.
    pub fn headless() -> Self {
        Self::with_surface(None)
    }

    fn with_surface(surface: Option<SurfaceInfo>) -> Self {
        Self {
            surface,
            next_id: 1,
            live: BTreeMap::new(),
            released: Vec::new(),
            camera: None,
            fail_after: None,
            lose_surface_after: None,
            created: 0,
        }
    }

    /// Reject every creation after the first `count` succeed.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Drop the surface once `count` creations have succeeded, as a host would when its
    /// context is lost mid-frame.
    pub fn losing_surface_after(mut self, count: usize) -> Self {
        self.lose_surface_after = Some(count);
        self
    }

    pub fn set_surface(&mut self, surface: Option<SurfaceInfo>) {
        self.surface = surface;
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&LivePrimitive> {
        self.live.get(&id)
    }

    pub fn live(&self) -> impl Iterator<Item = (PrimitiveId, &LivePrimitive)> {
        self.live.iter().map(|(id, p)| (*id, p))
    }

    pub fn released(&self) -> &[PrimitiveId] {
        &self.released
    }

    pub fn camera(&self) -> Option<&CameraPose> {
        self.camera.as_ref()
    }

    /// Total successful creations over the host's lifetime.
    pub fn created_count(&self) -> usize {
        self.created
    }

    fn insert(
        &mut self,
        primitive: RecordedPrimitive,
        transform: Transform,
    ) -> Result<PrimitiveId, HostError> {
        if self.lose_surface_after.is_some_and(|limit| self.created >= limit) {
            self.surface = None;
        }
        if self.surface.is_none() {
            return Err(HostError::SurfaceLost);
        }
        if self.fail_after.is_some_and(|limit| self.created >= limit) {
            return Err(HostError::Rejected(format!(
                "creation limit of {} reached",
                self.created
            )));
        }
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            id,
            LivePrimitive {
                primitive,
                transform,
                emphasis: None,
            },
        );
        Ok(id)
    }
}

impl RenderHost for RecordingHost {
    fn surface(&self) -> Option<SurfaceInfo> {
        self.surface
    }

    fn create_marker(&mut self, desc: &MarkerDesc) -> Result<PrimitiveId, HostError> {
        self.insert(RecordedPrimitive::Marker(desc.clone()), Transform::at(desc.position))
    }

    fn create_label(&mut self, desc: &LabelDesc) -> Result<PrimitiveId, HostError> {
        self.insert(RecordedPrimitive::Label(desc.clone()), Transform::at(desc.position))
    }

    fn create_curve(&mut self, desc: &CurveDesc) -> Result<PrimitiveId, HostError> {
        self.insert(RecordedPrimitive::Curve(desc.clone()), Transform::default())
    }

    fn set_transform(&mut self, id: PrimitiveId, transform: Transform) {
        if let Some(live) = self.live.get_mut(&id) {
            live.transform = transform;
        }
    }

    fn set_emphasis(&mut self, id: PrimitiveId, tint: Option<Color>) {
        if let Some(live) = self.live.get_mut(&id) {
            live.emphasis = tint;
        }
    }

    fn set_camera(&mut self, pose: &CameraPose) {
        self.camera = Some(*pose);
    }

    fn intersect(&self, ray: &Ray, candidates: &[PrimitiveId]) -> Vec<Intersection> {
        let mut tester = HitTester::new();
        for id in candidates {
            if let Some(LivePrimitive {
                primitive: RecordedPrimitive::Marker(desc),
                transform,
                ..
            }) = self.live.get(id)
            {
                tester.update(
                    *id,
                    Sphere {
                        center: transform.translation,
                        radius: desc.radius * transform.scale,
                    },
                );
            }
        }
        tester.hit_all(ray)
    }

    fn release(&mut self, id: PrimitiveId) {
        if self.live.remove(&id).is_some() {
            self.released.push(id);
        }
    }
}

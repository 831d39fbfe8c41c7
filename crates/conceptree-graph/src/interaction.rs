//! Pointer and wheel handling.
//!
//! The controller owns the camera and the single rotation/pan state the frame loop
//! reads. It never raises: non-finite input is ignored and a miss is simply no pick.

use crate::camera::Camera;
use crate::hit_tester::Ray;
use crate::host::SurfaceInfo;
use crate::settings::{InteractionSettings, ViewSettings};
use conceptree_core::NodeIndex;
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionState {
    pub drag: DragState,
    pub last_pointer: Vec2,
    pub rotation_y: f32,
    pub camera_y: f32,
}

impl InteractionState {
    fn initial(camera_y: f32) -> Self {
        Self {
            drag: DragState::Idle,
            last_pointer: Vec2::ZERO,
            rotation_y: 0.0,
            camera_y,
        }
    }

    pub fn dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }
}

/// Resolves a world-space ray to the nearest marker's node.
pub trait MarkerPicker {
    fn pick(&self, ray: &Ray) -> Option<NodeIndex>;
}

impl<F> MarkerPicker for F
where
    F: Fn(&Ray) -> Option<NodeIndex>,
{
    fn pick(&self, ray: &Ray) -> Option<NodeIndex> {
        self(ray)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// The ray hit a marker; no drag starts.
    Picked(NodeIndex),
    DragStarted,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelOutcome {
    /// The host should suppress its own scrolling.
    pub prevent_default: bool,
    pub camera_y: f32,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    settings: InteractionSettings,
    depth_spacing: f32,
    initial_camera_y: f32,
    max_depth: u32,
    camera: Camera,
    state: InteractionState,
}

impl InteractionController {
    pub fn new(settings: &ViewSettings, surface: SurfaceInfo) -> Self {
        let camera = Camera::new(&settings.camera, surface);
        Self {
            settings: settings.interaction.clone(),
            depth_spacing: settings.layout.depth_spacing,
            initial_camera_y: settings.camera.initial_y,
            max_depth: 0,
            state: InteractionState::initial(camera.y),
            camera,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    /// `(floor, ceiling)` for wheel-driven camera height.
    pub fn camera_bounds(&self) -> (f32, f32) {
        let floor = -(self.max_depth as f32 * self.depth_spacing + self.settings.floor_margin);
        (floor, self.settings.camera_ceiling)
    }

    /// Back to the initial pose: idle, unrotated, camera at its starting height.
    pub fn reset(&mut self) {
        self.state = InteractionState::initial(self.initial_camera_y);
        self.camera.y = self.state.camera_y;
    }

    /// Set the rotation directly, e.g. to restore a saved view.
    pub fn set_rotation(&mut self, rotation_y: f32) {
        if rotation_y.is_finite() {
            self.state.rotation_y = rotation_y;
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let resized = self.camera.resize(width, height);
        if !resized {
            debug!(width, height, "Ignoring resize to an empty surface");
        }
        resized
    }

    pub fn pointer_down(&mut self, screen: Vec2, picker: &dyn MarkerPicker) -> PointerDownOutcome {
        if !screen.is_finite() {
            return PointerDownOutcome::Ignored;
        }
        let ray = self.camera.ray_from_screen(screen);
        if let Some(index) = picker.pick(&ray) {
            debug!(%index, "Pointer picked node");
            return PointerDownOutcome::Picked(index);
        }
        self.state.drag = DragState::Dragging;
        self.state.last_pointer = screen;
        debug!("Drag started");
        PointerDownOutcome::DragStarted
    }

    /// Returns `true` when the move changed rotation or camera height.
    pub fn pointer_move(&mut self, screen: Vec2) -> bool {
        if !self.state.dragging() || !screen.is_finite() {
            return false;
        }
        let delta = screen - self.state.last_pointer;
        self.state.rotation_y += delta.x * self.settings.rotation_sensitivity;
        self.state.camera_y += delta.y * self.settings.pan_sensitivity;
        self.state.last_pointer = screen;
        self.camera.y = self.state.camera_y;
        trace!(
            rotation_y = self.state.rotation_y,
            camera_y = self.state.camera_y,
            "Drag moved"
        );
        delta != Vec2::ZERO
    }

    /// Returns `true` when a drag ended.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.state.dragging();
        self.state.drag = DragState::Idle;
        if was_dragging {
            debug!("Drag ended");
        }
        was_dragging
    }

    pub fn wheel(&mut self, delta: f32) -> WheelOutcome {
        if delta.is_finite() {
            let (floor, ceiling) = self.camera_bounds();
            let moved = self.state.camera_y - delta * self.settings.wheel_sensitivity;
            self.state.camera_y = moved.max(floor).min(ceiling);
            self.camera.y = self.state.camera_y;
            trace!(camera_y = self.state.camera_y, "Wheel moved camera");
        }
        WheelOutcome {
            prevent_default: true,
            camera_y: self.state.camera_y,
        }
    }
}

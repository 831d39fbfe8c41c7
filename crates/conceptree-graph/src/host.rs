//! Capability boundary to the 3D engine that owns meshes, sprites and textures.
//!
//! The scene composer only ever talks to a [`RenderHost`]; it never sees GPU
//! objects. Hosts hand out opaque [`PrimitiveId`]s and must accept `release`
//! for every id they issued.

use crate::error::HostError;
use crate::hit_tester::{Intersection, Ray};
use crate::style::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a host-side primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The drawing surface as the host currently sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInfo {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDesc {
    pub position: Vec3,
    pub radius: f32,
    /// Tessellation along both sphere axes.
    pub segments: u32,
    pub color: Color,
    pub emissive_intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDesc {
    pub text: String,
    pub position: Vec3,
    /// World-space height of the sprite; width follows the texture aspect.
    pub world_height: f32,
    pub font_px: u32,
    /// Texture size in physical pixels.
    pub texture_width: u32,
    pub texture_height: u32,
    pub color: Color,
    pub background: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CurveStyle {
    Line {
        width: f32,
        opacity: f32,
    },
    Tube {
        radius: f32,
        radial_segments: u32,
        opacity: f32,
        glow: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveDesc {
    /// Polyline samples of the curve in rest space.
    pub points: Vec<Vec3>,
    pub color: Color,
    pub style: CurveStyle,
}

/// Placement applied to a primitive each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translation: Vec3,
    /// Whole-object rotation about the world Y axis.
    pub rotation_y: f32,
    pub scale: f32,
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// What the scene needs from the rendering engine.
pub trait RenderHost {
    /// `None` when no rendering context exists.
    fn surface(&self) -> Option<SurfaceInfo>;

    fn create_marker(&mut self, desc: &MarkerDesc) -> Result<PrimitiveId, HostError>;
    fn create_label(&mut self, desc: &LabelDesc) -> Result<PrimitiveId, HostError>;
    fn create_curve(&mut self, desc: &CurveDesc) -> Result<PrimitiveId, HostError>;

    fn set_transform(&mut self, id: PrimitiveId, transform: Transform);
    /// `None` restores the primitive's own colouring.
    fn set_emphasis(&mut self, id: PrimitiveId, tint: Option<Color>);
    fn set_camera(&mut self, pose: &CameraPose);

    /// Markers among `candidates` crossed by `ray`, nearest first.
    fn intersect(&self, ray: &Ray, candidates: &[PrimitiveId]) -> Vec<Intersection>;

    fn release(&mut self, id: PrimitiveId);
}

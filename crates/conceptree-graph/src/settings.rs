use crate::error::ViewError;
use crate::style::{COLOR_CONNECTOR, COLOR_EMPHASIS, Color};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for layout, scene composition and interaction.
///
/// Every section is `#[serde(default)]`, so a settings file only needs the
/// fields it wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewSettings {
    pub layout: LayoutSettings,
    pub markers: MarkerSettings,
    pub labels: LabelSettings,
    pub connectors: ConnectorSettings,
    pub interaction: InteractionSettings,
    pub camera: CameraSettings,
    pub selection: SelectionSettings,
}

impl ViewSettings {
    /// Parse and [`validate`](ViewSettings::validate) a settings document.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ViewError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Like [`ViewSettings::load`], but an unreadable or invalid file falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load view settings from {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

impl ViewSettings {
    /// Reject values the layout and camera cannot work with: non-finite numbers,
    /// negative sizes or sensitivities, opacities outside `[0, 1]` and degenerate
    /// camera frusta.
    pub fn validate(&self) -> Result<(), ViewError> {
        let layout = &self.layout;
        non_negative("layout.base_ring_radius", layout.base_ring_radius)?;
        non_negative("layout.ring_radius_step", layout.ring_radius_step)?;
        positive("layout.depth_spacing", layout.depth_spacing)?;

        let markers = &self.markers;
        positive("markers.node_radius", markers.node_radius)?;
        positive("markers.root_scale", markers.root_scale)?;
        non_negative("markers.emissive_per_tier", markers.emissive_per_tier)?;

        let labels = &self.labels;
        positive("labels.world_height", labels.world_height)?;
        non_negative("labels.gap", labels.gap)?;
        positive("labels.root_scale", labels.root_scale)?;
        positive("labels.node_scale", labels.node_scale)?;

        let connectors = &self.connectors;
        non_negative("connectors.jitter_amplitude", connectors.jitter_amplitude)?;
        non_negative("connectors.sag", connectors.sag)?;
        non_negative("connectors.line_width", connectors.line_width)?;
        unit("connectors.line_opacity", connectors.line_opacity)?;
        non_negative("connectors.tube_radius", connectors.tube_radius)?;
        unit("connectors.glow_opacity", connectors.glow_opacity)?;

        let interaction = &self.interaction;
        non_negative("interaction.rotation_sensitivity", interaction.rotation_sensitivity)?;
        non_negative("interaction.pan_sensitivity", interaction.pan_sensitivity)?;
        non_negative("interaction.wheel_sensitivity", interaction.wheel_sensitivity)?;
        finite("interaction.camera_ceiling", interaction.camera_ceiling)?;
        non_negative("interaction.floor_margin", interaction.floor_margin)?;

        let camera = &self.camera;
        positive("camera.distance", camera.distance)?;
        finite("camera.initial_y", camera.initial_y)?;
        positive("camera.fov_y_degrees", camera.fov_y_degrees)?;
        if camera.fov_y_degrees >= 180.0 {
            return Err(invalid("camera.fov_y_degrees", "must be below 180"));
        }
        positive("camera.near", camera.near)?;
        finite("camera.far", camera.far)?;
        if camera.far <= camera.near {
            return Err(invalid("camera.far", "must exceed camera.near"));
        }

        positive("selection.emphasis_scale", self.selection.emphasis_scale)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ViewError {
    ViewError::InvalidSetting {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ViewError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not finite")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ViewError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ViewError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, format!("{value} is not positive")));
    }
    Ok(())
}

fn unit(field: &'static str, value: f32) -> Result<(), ViewError> {
    non_negative(field, value)?;
    if value > 1.0 {
        return Err(invalid(field, format!("{value} is above 1")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Ring radius at depth 1.
    pub base_ring_radius: f32,
    /// Added to the ring radius for every depth below 1.
    pub ring_radius_step: f32,
    /// Vertical distance between depths.
    pub depth_spacing: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            base_ring_radius: 2.0,
            ring_radius_step: 0.5,
            depth_spacing: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    pub node_radius: f32,
    pub root_scale: f32,
    pub root_segments: u32,
    pub node_segments: u32,
    /// Self-illumination per unit of tier weight.
    pub emissive_per_tier: f32,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            node_radius: 0.5,
            root_scale: 1.8,
            root_segments: 32,
            node_segments: 16,
            emissive_per_tier: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub font_px: u32,
    /// World-space height of a label at scale 1.
    pub world_height: f32,
    /// World-space gap between the top of a marker and its label.
    pub gap: f32,
    pub root_scale: f32,
    pub node_scale: f32,
    pub padding_px: u32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            font_px: 48,
            world_height: 0.5,
            gap: 0.4,
            root_scale: 1.5,
            node_scale: 1.0,
            padding_px: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorSettings {
    /// Lateral jitter bound as a fraction of ring radius.
    pub jitter_amplitude: f32,
    /// Downward displacement of the control point as a fraction of ring radius.
    pub sag: f32,
    pub segments: usize,
    pub line_width: f32,
    pub line_opacity: f32,
    pub tube_radius: f32,
    pub tube_radial_segments: u32,
    pub glow_opacity: f32,
    pub color: Color,
    /// Fixed jitter seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            jitter_amplitude: 0.3,
            sag: 0.5,
            segments: 32,
            line_width: 1.0,
            line_opacity: 0.35,
            tube_radius: 0.03,
            tube_radial_segments: 8,
            glow_opacity: 0.25,
            color: COLOR_CONNECTOR,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Radians per horizontal drag pixel.
    pub rotation_sensitivity: f32,
    /// World units per vertical drag pixel.
    pub pan_sensitivity: f32,
    /// World units per wheel delta unit.
    pub wheel_sensitivity: f32,
    pub camera_ceiling: f32,
    /// Extra room below the deepest ring.
    pub floor_margin: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.01,
            pan_sensitivity: 0.02,
            wheel_sensitivity: 0.01,
            camera_ceiling: 5.0,
            floor_margin: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Horizontal distance from the vertical axis.
    pub distance: f32,
    pub initial_y: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 15.0,
            initial_y: 2.0,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub emphasis_color: Color,
    pub emphasis_scale: f32,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            emphasis_color: COLOR_EMPHASIS,
            emphasis_scale: 1.5,
        }
    }
}

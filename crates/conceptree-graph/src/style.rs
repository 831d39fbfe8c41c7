//! Scene Style System
//!
//! Maps principle confidence to display tiers and provides the colour palette
//! used for markers, labels, connectors and selection emphasis.

use conceptree_core::{Principle, average_confidence};
use serde::{Deserialize, Serialize};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn hex(value: u32) -> Self {
        Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

// ============================================================================
// Color Constants
// ============================================================================

// Confidence tiers
pub const COLOR_TIER_HIGH: Color = Color::hex(0x10b981);
pub const COLOR_TIER_MEDIUM: Color = Color::hex(0xf59e0b);
pub const COLOR_TIER_LOW: Color = Color::hex(0xef4444);

// Labels
pub const COLOR_LABEL_TEXT: Color = Color::hex(0xffffff);
pub const COLOR_LABEL_BACKGROUND: Color = Color::rgba(15, 23, 42, 200);

// Connectors
pub const COLOR_CONNECTOR: Color = Color::hex(0x60a5fa);

// Selection
pub const COLOR_EMPHASIS: Color = Color::hex(0xfbbf24);

// ============================================================================
// Confidence Tiers
// ============================================================================

/// Discrete confidence bucket driving a node's colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Inclusive lower bound of `High`.
    pub const HIGH_THRESHOLD: f32 = 0.8;
    /// Inclusive lower bound of `Medium`.
    pub const MEDIUM_THRESHOLD: f32 = 0.6;

    /// NaN falls through to `Low`.
    pub fn from_average(average: f32) -> Self {
        if average >= Self::HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if average >= Self::MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn from_principles(principles: &[Principle]) -> Self {
        Self::from_average(average_confidence(principles))
    }

    pub fn color(&self) -> Color {
        match self {
            ConfidenceTier::High => COLOR_TIER_HIGH,
            ConfidenceTier::Medium => COLOR_TIER_MEDIUM,
            ConfidenceTier::Low => COLOR_TIER_LOW,
        }
    }

    /// Relative weight used to scale self-illumination: low 1, medium 2, high 3.
    pub fn weight(&self) -> f32 {
        match self {
            ConfidenceTier::High => 3.0,
            ConfidenceTier::Medium => 2.0,
            ConfidenceTier::Low => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

use glam::Vec3;
use rand::Rng;

use crate::settings::ConnectorSettings;

/// A quadratic bezier curve segment defined by three control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier {
    /// Sample the curve at parameter t [0, 1]
    pub fn sample(&self, t: f32) -> Vec3 {
        let mt = 1.0 - t;
        self.start * (mt * mt) + self.control * (2.0 * mt * t) + self.end * (t * t)
    }

    /// `segments + 1` evenly spaced samples from start to end inclusive.
    pub fn points(&self, segments: usize) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.sample(i as f32 / segments as f32))
            .collect()
    }
}

/// Routes connector curves from a parent anchor down to a ring position.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorRouter {
    /// Jitter bound as a fraction of ring radius
    pub jitter_amplitude: f32,
    /// Downward sag of the control point as a fraction of ring radius
    pub sag: f32,
}

impl Default for ConnectorRouter {
    fn default() -> Self {
        Self::new(&ConnectorSettings::default())
    }
}

impl ConnectorRouter {
    pub fn new(settings: &ConnectorSettings) -> Self {
        Self {
            jitter_amplitude: settings.jitter_amplitude,
            sag: settings.sag,
        }
    }

    /// Control point is the chord midpoint pushed down by `sag * ring_radius` plus up to
    /// one jitter bound, and sideways by at most one jitter bound on x and z. A bound or
    /// sag that overflows is treated as zero.
    pub fn route<R: Rng + ?Sized>(
        &self,
        start: Vec3,
        end: Vec3,
        ring_radius: f32,
        rng: &mut R,
    ) -> QuadraticBezier {
        let bound = finite_or_zero((self.jitter_amplitude * ring_radius).abs());
        let sag = finite_or_zero((self.sag * ring_radius).abs());

        let jitter_x = rng.gen_range(-bound..=bound);
        let drop = sag + rng.gen_range(0.0..=bound);
        let jitter_z = rng.gen_range(-bound..=bound);

        let mid = (start + end) * 0.5;
        QuadraticBezier {
            start,
            control: mid + Vec3::new(jitter_x, -drop, jitter_z),
            end,
        }
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

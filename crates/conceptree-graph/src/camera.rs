use crate::hit_tester::Ray;
use crate::host::{CameraPose, SurfaceInfo};
use crate::settings::CameraSettings;
use glam::{Mat4, Vec2, Vec3};

/// Perspective camera on the +Z side of the tree, always aimed at the origin.
///
/// Only its height changes during interaction; the tree rotates, the camera does not.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub distance: f32,
    pub y: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Logical viewport size in pixels.
    viewport: Vec2,
}

impl Camera {
    pub fn new(settings: &CameraSettings, surface: SurfaceInfo) -> Self {
        Self {
            distance: settings.distance,
            y: settings.initial_y,
            fov_y: settings.fov_y_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            viewport: Vec2::new(surface.width.max(1) as f32, surface.height.max(1) as f32),
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// Returns `false` and leaves the camera untouched for a zero-sized surface.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        true
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.y, self.distance)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Pixel coordinates (origin top-left) to normalised device coordinates.
    pub fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.y * 2.0,
        )
    }

    pub fn ndc_to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        )
    }

    /// World-space ray through `ndc`, starting on the near plane.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    pub fn ray_from_screen(&self, screen: Vec2) -> Ray {
        self.ray_from_ndc(self.screen_to_ndc(screen))
    }

    /// Pixel position of `world`, or `None` when it is behind the camera.
    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(self.ndc_to_screen(ndc.truncate()))
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position(),
            target: Vec3::ZERO,
            fov_y: self.fov_y,
            aspect: self.aspect(),
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(
            &CameraSettings::default(),
            SurfaceInfo {
                width: 800,
                height: 600,
                pixel_ratio: 2.0,
            },
        )
    }

    #[test]
    fn test_center_ray_points_at_origin() {
        let camera = camera();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let to_origin = (Vec3::ZERO - camera.position()).normalize();
        assert!(ray.direction.abs_diff_eq(to_origin, 1e-4));
    }

    #[test]
    fn test_world_to_screen_round_trips_through_ray() {
        let camera = camera();
        let target = Vec3::new(2.0, -4.0, 0.0);
        let screen = camera.world_to_screen(target).unwrap();
        let ray = camera.ray_from_screen(screen);

        let along = (target - ray.origin).dot(ray.direction);
        assert!(ray.at(along).abs_diff_eq(target, 1e-2));
    }

    #[test]
    fn test_screen_ndc_conversion() {
        let camera = camera();
        assert_eq!(camera.screen_to_ndc(Vec2::new(400.0, 300.0)), Vec2::ZERO);
        assert_eq!(camera.screen_to_ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(camera.ndc_to_screen(Vec2::new(1.0, -1.0)), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut camera = camera();
        assert!(!camera.resize(0, 600));
        assert!(!camera.resize(800, 0));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);

        assert!(camera.resize(1000, 500));
        assert_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_point_behind_camera_has_no_screen_position() {
        let camera = camera();
        assert_eq!(camera.world_to_screen(Vec3::new(0.0, 2.0, 40.0)), None);
    }

    #[test]
    fn test_pose_tracks_height() {
        let mut camera = camera();
        camera.y = -6.0;
        let pose = camera.pose();
        assert_eq!(pose.position, Vec3::new(0.0, -6.0, 15.0));
        assert_eq!(pose.target, Vec3::ZERO);
    }
}

use crate::host::PrimitiveId;
use glam::Vec3;
use serde::Serialize;
use std::collections::BTreeMap;

/// A half-line in world space. `direction` is kept normalised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Distance along `ray` to the first surface crossing in front of the origin.
    ///
    /// A ray starting inside the sphere reports the exit point.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if self.radius <= 0.0 || ray.direction == Vec3::ZERO {
            return None;
        }
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

/// One primitive crossed by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub id: PrimitiveId,
    pub distance: f32,
}

/// Ray tester over a set of bounding spheres.
///
/// Ties on distance resolve to the lower id so results are stable.
#[derive(Debug, Clone, Default)]
pub struct HitTester {
    spheres: BTreeMap<PrimitiveId, Sphere>,
}

impl HitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, id: PrimitiveId, sphere: Sphere) {
        self.spheres.insert(id, sphere);
    }

    /// Every sphere crossed by `ray`, nearest first.
    pub fn hit_all(&self, ray: &Ray) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = self
            .spheres
            .iter()
            .filter_map(|(id, sphere)| {
                sphere.intersect(ray).map(|distance| Intersection {
                    id: *id,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_z() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_sphere_hit_distance() {
        let sphere = Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let distance = sphere.intersect(&down_z()).unwrap();
        assert!((distance - 9.0).abs() < 1e-5);
        assert!(down_z().at(distance).abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn test_sphere_behind_ray_is_missed() {
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, 20.0),
            radius: 1.0,
        };
        assert_eq!(sphere.intersect(&down_z()), None);
    }

    #[test]
    fn test_ray_from_inside_hits_exit() {
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, 10.0),
            radius: 2.0,
        };
        assert!((sphere.intersect(&down_z()).unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_marker_first() {
        let mut tester = HitTester::new();
        tester.update(
            PrimitiveId(1),
            Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            },
        );
        tester.update(
            PrimitiveId(2),
            Sphere {
                center: Vec3::new(0.0, 0.0, 5.0),
                radius: 1.0,
            },
        );

        let hits = tester.hit_all(&down_z());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, PrimitiveId(2));
        assert!((hits[0].distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_returns_nothing() {
        let mut tester = HitTester::new();
        tester.update(
            PrimitiveId(7),
            Sphere {
                center: Vec3::new(5.0, 0.0, 0.0),
                radius: 1.0,
            },
        );
        assert!(tester.hit_all(&down_z()).is_empty());
    }

    #[test]
    fn test_equal_distances_break_ties_by_id() {
        let mut tester = HitTester::new();
        for id in [9, 4] {
            tester.update(
                PrimitiveId(id),
                Sphere {
                    center: Vec3::ZERO,
                    radius: 1.0,
                },
            );
        }
        let ids: Vec<PrimitiveId> = tester.hit_all(&down_z()).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![PrimitiveId(4), PrimitiveId(9)]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_ray_through_center_always_hits(
            cx in -50.0f32..50.0,
            cy in -50.0f32..50.0,
            cz in -50.0f32..50.0,
            radius in 0.1f32..5.0,
        ) {
            let center = Vec3::new(cx, cy, cz);
            let origin = center + Vec3::new(0.0, 0.0, 100.0);
            let ray = Ray::new(origin, center - origin);
            let sphere = Sphere { center, radius };
            let distance = sphere.intersect(&ray);
            prop_assert!(distance.is_some());
            prop_assert!((distance.unwrap() - (100.0 - radius)).abs() < 1e-2);
        }

        #[test]
        fn prop_hit_all_sorted_by_distance(
            zs in prop::collection::vec(-40.0f32..-1.0, 1..12),
        ) {
            let mut tester = HitTester::new();
            for (i, z) in zs.iter().enumerate() {
                tester.update(PrimitiveId(i as u64), Sphere { center: Vec3::new(0.0, 0.0, *z), radius: 0.5 });
            }
            let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
            let hits = tester.hit_all(&ray);
            prop_assert_eq!(hits.len(), zs.len());
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }

        #[test]
        fn prop_parallel_offset_ray_misses(
            offset in 1.01f32..50.0,
            radius in 0.1f32..1.0,
        ) {
            let sphere = Sphere { center: Vec3::ZERO, radius };
            let ray = Ray::new(Vec3::new(offset, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));
            prop_assert_eq!(sphere.intersect(&ray), None);
        }
    }
}

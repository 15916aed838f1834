use crate::prelude_crate::*;
use nalgebra::Vector3;

// ------------------------------------------------------------------- STRUCT: BoundingBox

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<Float>,
    pub max: Vector3<Float>,
}

impl BoundingBox {
    pub fn new(min: Vector3<Float>, max: Vector3<Float>) -> Self {
        BoundingBox { min, max }
    }

    pub fn get_extent(&self) -> Vector3<Float> {
        self.max - self.min
    }

    pub fn contains(&self, point: &Vector3<Float>) -> bool {
        (0..3).all(|x| point[x] >= self.min[x] && point[x] <= self.max[x])
    }

    pub fn dilate(&self, distance: Float) -> Self {
        let offset = Vector3::repeat(distance);
        BoundingBox::new(self.min - offset, self.max + offset)
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        (0..3).all(|x| self.min[x] <= other.max[x] && other.min[x] <= self.max[x])
    }
}

// ---------------------------------------------------------------------- TRAIT: Indicator

/// Inside/outside test over physical space.
pub trait Indicator: Send + Sync {
    fn contains(&self, point: &Vector3<Float>) -> bool;

    fn get_bounding_box(&self) -> BoundingBox;

    /// Fraction `t` in `[0, 1]` of the segment `origin + t * direction` where
    /// it first crosses the surface of the indicated region, if the shape can
    /// compute it.
    fn distance_along(&self, _origin: &Vector3<Float>, _direction: &Vector3<Float>) -> Option<Float> {
        None
    }
}

// ---------------------------------------------------------------------- STRUCT: Cylinder

/// Solid cylinder between the centers of its two end faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    start: Vector3<Float>,
    end: Vector3<Float>,
    radius: Float,
}

impl Cylinder {
    pub fn new(start: Vector3<Float>, end: Vector3<Float>, radius: Float) -> Self {
        Cylinder { start, end, radius }
    }
}

impl Indicator for Cylinder {
    fn contains(&self, point: &Vector3<Float>) -> bool {
        let axis = self.end - self.start;
        let length_2 = axis.norm_squared();
        if length_2 == 0.0 {
            return false;
        }
        let relative = point - self.start;
        let t = relative.dot(&axis) / length_2;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let radial = relative - axis * t;
        radial.norm_squared() <= self.radius * self.radius
    }

    fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.start.inf(&self.end), self.start.sup(&self.end)).dilate(self.radius)
    }
}

// ------------------------------------------------------------------------ STRUCT: Cuboid

#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    origin: Vector3<Float>,
    extent: Vector3<Float>,
}

impl Cuboid {
    pub fn new(origin: Vector3<Float>, extent: Vector3<Float>) -> Self {
        Cuboid { origin, extent }
    }
}

impl Indicator for Cuboid {
    fn contains(&self, point: &Vector3<Float>) -> bool {
        self.get_bounding_box().contains(point)
    }

    fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.origin, self.origin + self.extent)
    }
}

// ---------------------------------------------------------------- STRUCT: LayerIndicator

/// The region of `inner` dilated by one layer of thickness `thickness`: a
/// point is inside when any of its 27 neighbors at that distance is.
pub struct LayerIndicator<'a> {
    inner: &'a dyn Indicator,
    thickness: Float,
}

impl<'a> LayerIndicator<'a> {
    pub fn new(inner: &'a dyn Indicator, thickness: Float) -> Self {
        LayerIndicator { inner, thickness }
    }
}

impl Indicator for LayerIndicator<'_> {
    fn contains(&self, point: &Vector3<Float>) -> bool {
        if !self.get_bounding_box().contains(point) {
            return false;
        }
        (-1..=1).any(|i: i32| {
            (-1..=1).any(|j: i32| {
                (-1..=1).any(|k: i32| {
                    let offset =
                        Vector3::new(i as Float, j as Float, k as Float) * self.thickness;
                    self.inner.contains(&(point + offset))
                })
            })
        })
    }

    fn get_bounding_box(&self) -> BoundingBox {
        self.inner.get_bounding_box().dilate(self.thickness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_contains() {
        let cylinder = Cylinder::new(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 0.5);
        assert!(cylinder.contains(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(cylinder.contains(&Vector3::new(1.0, 0.3, 0.3)));
        assert!(!cylinder.contains(&Vector3::new(1.1, 0.0, 0.0)));
        assert!(!cylinder.contains(&Vector3::new(0.0, 0.4, 0.4)));
    }

    #[test]
    fn test_cuboid_contains() {
        let cuboid = Cuboid::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
        assert!(cuboid.contains(&Vector3::new(1.0, 2.0, 3.0)));
        assert!(cuboid.contains(&Vector3::new(0.5, 0.5, 0.5)));
        assert!(!cuboid.contains(&Vector3::new(-0.1, 0.5, 0.5)));
    }

    #[test]
    fn test_layer_indicator_dilates_by_thickness() {
        let cuboid = Cuboid::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let layer = LayerIndicator::new(&cuboid, 0.25);
        assert!(layer.contains(&Vector3::new(-0.2, 0.5, 0.5)));
        assert!(layer.contains(&Vector3::new(1.2, 1.2, 1.2)));
        assert!(!layer.contains(&Vector3::new(-0.3, 0.5, 0.5)));
        assert_eq!(layer.get_bounding_box().min, Vector3::new(-0.25, -0.25, -0.25));
    }
}

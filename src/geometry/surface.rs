use super::indicator::{BoundingBox, Indicator};
use crate::prelude_crate::*;
use nalgebra::Vector3;
use std::f64::consts::PI;

const RAY_BINS: usize = 32;

/// Transverse slope of the parity rays. Rays run almost along the axes but
/// never exactly through the shared edges and vertices of a tessellation.
const RAY_TILT: [Float; 2] = [1.3e-4, 0.7e-4];

// ---------------------------------------------------------------------- STRUCT: Triangle

#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3<Float>; 3],
}

impl Triangle {
    pub fn new(a: Vector3<Float>, b: Vector3<Float>, c: Vector3<Float>) -> Self {
        Triangle {
            vertices: [a, b, c],
        }
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        let [a, b, c] = &self.vertices;
        BoundingBox::new(a.inf(b).inf(c), a.sup(b).sup(c))
    }

    /// Möller-Trumbore intersection of the ray `origin + t * direction`.
    /// Returns the ray parameter `t` of the hit, which may be negative.
    pub fn intersect(&self, origin: &Vector3<Float>, direction: &Vector3<Float>) -> Option<Float> {
        let [a, b, c] = &self.vertices;
        let edge_1 = b - a;
        let edge_2 = c - a;
        let h = direction.cross(&edge_2);
        let det = edge_1.dot(&h);
        let scale = edge_1.norm() * edge_2.norm() * direction.norm();
        if det.abs() <= 1e-12 * scale {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = origin - a;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&edge_1);
        let v = inv_det * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        Some(inv_det * edge_2.dot(&q))
    }
}

// --------------------------------------------------------------------- STRUCT: RayBins

/// Triangles sorted by their footprint on the plane normal to one axis, so a
/// parity ray along that axis only visits the triangles it can hit.
#[derive(Debug, Clone)]
struct RayBins {
    axis: usize,
    plane: [usize; 2],
    min: [Float; 2],
    size: [Float; 2],
    bins: Vec<Vec<usize>>,
}

impl RayBins {
    fn new(axis: usize, triangles: &[Triangle], bounding_box: &BoundingBox) -> Self {
        let plane = [(axis + 1) % 3, (axis + 2) % 3];
        let min = [bounding_box.min[plane[0]], bounding_box.min[plane[1]]];
        let size = plane.map(|x| {
            let extent = bounding_box.max[x] - bounding_box.min[x];
            if extent > 0.0 {
                extent / RAY_BINS as Float
            } else {
                1.0
            }
        });
        let axis_extent = bounding_box.max[axis] - bounding_box.min[axis];
        let drift = RAY_TILT.map(|tilt| tilt * axis_extent);
        let mut bins = vec![Vec::new(); RAY_BINS * RAY_BINS];
        triangles.iter().enumerate().for_each(|(t, triangle)| {
            let triangle_box = triangle.get_bounding_box();
            let lower = [0, 1].map(|k| {
                Self::bin_of(triangle_box.min[plane[k]] - drift[k], min[k], size[k])
            });
            let upper = [0, 1].map(|k| Self::bin_of(triangle_box.max[plane[k]], min[k], size[k]));
            (lower[1]..=upper[1]).for_each(|j| {
                (lower[0]..=upper[0]).for_each(|i| bins[i + RAY_BINS * j].push(t));
            });
        });
        RayBins {
            axis,
            plane,
            min,
            size,
            bins,
        }
    }

    fn bin_of(coordinate: Float, min: Float, size: Float) -> usize {
        let bin = ((coordinate - min) / size).floor();
        bin.clamp(0.0, (RAY_BINS - 1) as Float) as usize
    }

    fn get_direction(&self) -> Vector3<Float> {
        let mut direction = Vector3::ith(self.axis, 1.0);
        direction[self.plane[0]] = RAY_TILT[0];
        direction[self.plane[1]] = RAY_TILT[1];
        direction
    }

    fn get_candidates(&self, point: &Vector3<Float>) -> &[usize] {
        let i = Self::bin_of(point[self.plane[0]], self.min[0], self.size[0]);
        let j = Self::bin_of(point[self.plane[1]], self.min[1], self.size[1]);
        &self.bins[i + RAY_BINS * j]
    }
}

// --------------------------------------------------------------- STRUCT: TriangleSurface

/// Closed triangulated surface. Points are classified by ray parity along the
/// three coordinate axes and the majority of the three votes wins.
#[derive(Debug, Clone)]
pub struct TriangleSurface {
    triangles: Vec<Triangle>,
    bounding_box: BoundingBox,
    ray_bins: [RayBins; 3],
}

impl TriangleSurface {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounding_box = triangles
            .iter()
            .map(|triangle| triangle.get_bounding_box())
            .reduce(|a, b| BoundingBox::new(a.min.inf(&b.min), a.max.sup(&b.max)))
            .unwrap_or(BoundingBox::new(Vector3::zeros(), Vector3::zeros()));
        let ray_bins = [0, 1, 2].map(|axis| RayBins::new(axis, &triangles, &bounding_box));
        TriangleSurface {
            triangles,
            bounding_box,
            ray_bins,
        }
    }

    /// Closed cylinder between the centers `start` and `end`, with `segments`
    /// facets around the circumference and triangle fans on both end caps.
    pub fn cylinder(
        start: Vector3<Float>,
        end: Vector3<Float>,
        radius: Float,
        segments: usize,
    ) -> Self {
        let axis = (end - start).normalize();
        let helper = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = axis.cross(&helper).normalize();
        let v = axis.cross(&u);
        let segments = segments.max(3);
        // Half-segment rotation keeps the vertices off the coordinate planes.
        let ring = |center: &Vector3<Float>, k: usize| {
            let angle = 2.0 * PI * (k as Float + 0.5) / segments as Float;
            center + (u * angle.cos() + v * angle.sin()) * radius
        };
        let mut triangles = Vec::with_capacity(4 * segments);
        (0..segments).for_each(|k| {
            let k_next = (k + 1) % segments;
            let (a0, a1) = (ring(&start, k), ring(&start, k_next));
            let (b0, b1) = (ring(&end, k), ring(&end, k_next));
            triangles.push(Triangle::new(a0, b0, b1));
            triangles.push(Triangle::new(a0, b1, a1));
            triangles.push(Triangle::new(start, a1, a0));
            triangles.push(Triangle::new(end, b0, b1));
        });
        TriangleSurface::new(triangles)
    }

    pub fn get_triangles(&self) -> &Vec<Triangle> {
        &self.triangles
    }

    fn count_crossings(&self, point: &Vector3<Float>, axis: usize) -> usize {
        let bins = &self.ray_bins[axis];
        let direction = bins.get_direction();
        bins.get_candidates(point)
            .iter()
            .filter_map(|&t| self.triangles[t].intersect(point, &direction))
            .filter(|&t| t > 0.0)
            .count()
    }
}

impl Indicator for TriangleSurface {
    fn contains(&self, point: &Vector3<Float>) -> bool {
        if !self.bounding_box.contains(point) {
            return false;
        }
        let votes = (0..3)
            .filter(|&axis| self.count_crossings(point, axis) % 2 == 1)
            .count();
        votes >= 2
    }

    fn get_bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    fn distance_along(&self, origin: &Vector3<Float>, direction: &Vector3<Float>) -> Option<Float> {
        let end = origin + direction;
        let segment_box = BoundingBox::new(origin.inf(&end), origin.sup(&end));
        self.triangles
            .iter()
            .filter(|triangle| triangle.get_bounding_box().overlaps(&segment_box))
            .filter_map(|triangle| triangle.intersect(origin, direction))
            .filter(|t| (0.0..=1.0).contains(t))
            .reduce(Float::min)
    }
}

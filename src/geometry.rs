// ------------------------------------------------------------------------------- MODULES

pub mod indicator;
pub mod surface;

// ------------------------------------------------------------------------------- IMPORTS

use crate::error::SetupError;
use crate::prelude_crate::*;
use colored::*;
use indicator::{BoundingBox, Indicator};
use nalgebra::Vector3;
use rayon::prelude::*;

// ----------------------------------------------------------------------- ENUM: Material

/// Material ids partitioning the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Material {
    Inert = 0,
    Fluid = 1,
    Wall = 2,
    Inlet = 3,
    Outlet = 4,
    CooledWall = 5,
}

impl Material {
    pub const ALL: [Material; NUMBER_OF_MATERIALS] = [
        Material::Inert,
        Material::Fluid,
        Material::Wall,
        Material::Inlet,
        Material::Outlet,
        Material::CooledWall,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Material> {
        Material::ALL.get(id as usize).copied()
    }

    /// Cells that carry the flow: bulk, inlet and outlet.
    pub fn is_fluid(self) -> bool {
        matches!(self, Material::Fluid | Material::Inlet | Material::Outlet)
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Material::Wall | Material::CooledWall)
    }
}

// ------------------------------------------------------------------ STRUCT: MaterialGrid

/// Material id of every voxel of a structured grid. Voxel `[i, j, k]` sits at
/// `origin + [i, j, k] * delta_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGrid {
    origin: Vector3<Float>,
    delta_x: Float,
    n: [usize; 3],
    materials: Vec<u8>,
}

impl MaterialGrid {
    pub fn new(origin: Vector3<Float>, delta_x: Float, n: [usize; 3]) -> Self {
        MaterialGrid {
            origin,
            delta_x,
            n,
            materials: vec![Material::Inert.id(); n.iter().product()],
        }
    }

    /// Grid covering `bounding_box` plus one inert margin layer on every side.
    pub fn from_bounding_box(bounding_box: &BoundingBox, delta_x: Float) -> Self {
        let origin = bounding_box.min - Vector3::repeat(delta_x);
        let extent = bounding_box.get_extent();
        let n = [0, 1, 2].map(|x| (extent[x] / delta_x).ceil() as usize + 3);
        MaterialGrid::new(origin, delta_x, n)
    }
}

impl MaterialGrid {
    pub fn get_origin(&self) -> &Vector3<Float> {
        &self.origin
    }

    pub fn get_delta_x(&self) -> Float {
        self.delta_x
    }

    pub fn get_n(&self) -> [usize; 3] {
        self.n
    }

    pub fn get_number_of_voxels(&self) -> usize {
        self.materials.len()
    }

    pub fn get_materials(&self) -> &Vec<u8> {
        &self.materials
    }

    pub fn get_linear_index(&self, index: [usize; 3]) -> usize {
        index[0] + self.n[0] * (index[1] + self.n[1] * index[2])
    }

    pub fn get_index(&self, linear_index: usize) -> [usize; 3] {
        let x = linear_index % self.n[0];
        let y = (linear_index / self.n[0]) % self.n[1];
        let z = linear_index / (self.n[0] * self.n[1]);
        [x, y, z]
    }

    pub fn get_position(&self, index: [usize; 3]) -> Vector3<Float> {
        self.origin + Vector3::new(index[0] as Float, index[1] as Float, index[2] as Float) * self.delta_x
    }

    pub fn get_material(&self, index: [usize; 3]) -> u8 {
        self.materials[self.get_linear_index(index)]
    }

    pub fn set_material(&mut self, index: [usize; 3], material: u8) {
        let i = self.get_linear_index(index);
        self.materials[i] = material;
    }

    /// Material at a signed index; voxels beyond the grid are inert.
    pub fn get_material_or_inert(&self, index: [isize; 3]) -> u8 {
        if (0..3).all(|x| index[x] >= 0 && (index[x] as usize) < self.n[x]) {
            self.get_material(index.map(|i| i as usize))
        } else {
            Material::Inert.id()
        }
    }

    /// Voxel index closest to a physical point, if it lies on the grid.
    pub fn get_nearest_index(&self, point: &Vector3<Float>) -> Option<[usize; 3]> {
        let relative = (point - self.origin) / self.delta_x;
        let mut index = [0; 3];
        for x in 0..3 {
            let i = relative[x].round();
            if i < 0.0 || i >= self.n[x] as Float {
                return None;
            }
            index[x] = i as usize;
        }
        Some(index)
    }

    pub fn count(&self, material: Material) -> usize {
        self.materials
            .par_iter()
            .filter(|&&m| m == material.id())
            .count()
    }

    pub fn print(&self) {
        println!(
            "Material grid {} x {} x {} (delta x = {:.4e})",
            self.n[0], self.n[1], self.n[2], self.delta_x
        );
        Material::ALL.iter().for_each(|&material| {
            println!(
                "  material {} ({:?}): {} voxels",
                material.id().to_string().yellow().bold(),
                material,
                self.count(material)
            );
        });
        println!();
    }
}

// ------------------------------------------------------------------- STRUCT: RenameRule

/// Voxels inside `indicator` that currently hold `source` become `target`.
pub struct RenameRule<'a> {
    pub indicator: &'a dyn Indicator,
    pub source: u8,
    pub target: u8,
}

impl<'a> RenameRule<'a> {
    pub fn new(indicator: &'a dyn Indicator, source: Material, target: Material) -> Self {
        RenameRule {
            indicator,
            source: source.id(),
            target: target.id(),
        }
    }
}

/// Applies `rules` in order; each rule only sees the ids left by the rules
/// before it.
pub fn apply_rules(mut grid: MaterialGrid, rules: &[RenameRule]) -> MaterialGrid {
    let n = grid.n;
    let origin = grid.origin;
    let delta_x = grid.delta_x;
    rules.iter().for_each(|rule| {
        grid.materials
            .par_iter_mut()
            .enumerate()
            .filter(|(_, material)| **material == rule.source)
            .for_each(|(i, material)| {
                let index = [i % n[0], (i / n[0]) % n[1], i / (n[0] * n[1])];
                let position = origin
                    + Vector3::new(index[0] as Float, index[1] as Float, index[2] as Float)
                        * delta_x;
                if rule.indicator.contains(&position) {
                    *material = rule.target;
                }
            });
    });
    grid
}

/// Every voxel must hold a known id, fluid voxels may only border voxels with
/// a boundary treatment, and at least one fluid voxel must exist.
pub fn check_for_errors(grid: &MaterialGrid) -> Result<(), SetupError> {
    if let Some((i, &material)) = grid
        .materials
        .iter()
        .enumerate()
        .find(|(_, &m)| Material::from_id(m).is_none())
    {
        return Err(SetupError::UnresolvedMaterial {
            voxel: grid.get_index(i),
            material,
        });
    }
    let c = velocity_set::D3Q19.get_c();
    let mut fluid_voxels = 0;
    for (i, &material) in grid.materials.iter().enumerate() {
        let is_fluid = Material::from_id(material).is_some_and(|m| m.is_fluid());
        if !is_fluid {
            continue;
        }
        fluid_voxels += 1;
        let index = grid.get_index(i);
        for c_i in c.iter().skip(1) {
            let neighbor = [0, 1, 2].map(|x| index[x] as isize + c_i[x] as isize);
            if grid.get_material_or_inert(neighbor) == Material::Inert.id() {
                return Err(SetupError::MissingBoundaryNeighbor {
                    voxel: index,
                    neighbor,
                    material,
                });
            }
        }
    }
    if fluid_voxels == 0 {
        return Err(SetupError::EmptyDomain);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::indicator::Cuboid;
    use super::*;

    fn cuboid(min: [Float; 3], max: [Float; 3]) -> Cuboid {
        let min = Vector3::from(min);
        Cuboid::new(min, Vector3::from(max) - min)
    }

    #[test]
    fn test_from_bounding_box_adds_margin() {
        let bounding_box = BoundingBox::new(Vector3::zeros(), Vector3::new(1.0, 0.5, 0.5));
        let grid = MaterialGrid::from_bounding_box(&bounding_box, 0.1);
        assert_eq!(grid.get_n(), [13, 8, 8]);
        assert!((grid.get_position([0, 0, 0]) - Vector3::repeat(-0.1)).norm() < 1e-12);
    }

    #[test]
    fn test_rules_are_restricted_to_source() {
        let grid = MaterialGrid::new(Vector3::zeros(), 1.0, [6, 6, 6]);
        let outer = cuboid([0.0; 3], [5.0; 3]);
        let inner = cuboid([1.0; 3], [4.0; 3]);
        let left = cuboid([0.0; 3], [1.0, 5.0, 5.0]);
        let grid = apply_rules(
            grid,
            &[
                RenameRule::new(&outer, Material::Inert, Material::Wall),
                RenameRule::new(&inner, Material::Wall, Material::Fluid),
                RenameRule::new(&left, Material::Fluid, Material::Inlet),
            ],
        );
        assert_eq!(grid.get_material([0, 2, 2]), Material::Wall.id());
        assert_eq!(grid.get_material([1, 2, 2]), Material::Inlet.id());
        assert_eq!(grid.get_material([2, 2, 2]), Material::Fluid.id());
        assert_eq!(grid.get_material([5, 5, 5]), Material::Wall.id());
        assert_eq!(grid.count(Material::Inlet), 16);
        assert_eq!(grid.count(Material::Fluid), 48);
    }

    #[test]
    fn test_rule_order_matters() {
        let grid = MaterialGrid::new(Vector3::zeros(), 1.0, [4, 4, 4]);
        let all = cuboid([0.0; 3], [3.0; 3]);
        let first = apply_rules(
            grid.clone(),
            &[
                RenameRule::new(&all, Material::Inert, Material::Wall),
                RenameRule::new(&all, Material::Inert, Material::Fluid),
            ],
        );
        let second = apply_rules(
            grid,
            &[
                RenameRule::new(&all, Material::Inert, Material::Fluid),
                RenameRule::new(&all, Material::Inert, Material::Wall),
            ],
        );
        assert_eq!(first.count(Material::Wall), 64);
        assert_eq!(second.count(Material::Fluid), 64);
    }

    #[test]
    fn test_check_for_errors() {
        let mut grid = MaterialGrid::new(Vector3::zeros(), 1.0, [5, 5, 5]);
        assert_eq!(check_for_errors(&grid), Err(SetupError::EmptyDomain));

        (0..125).for_each(|i| {
            let index = grid.get_index(i);
            let interior = index.iter().all(|&x| (1..4).contains(&x));
            let material = if interior { Material::Fluid } else { Material::Wall };
            grid.set_material(index, material.id());
        });
        assert_eq!(check_for_errors(&grid), Ok(()));

        grid.set_material([0, 2, 2], Material::Inert.id());
        assert_eq!(
            check_for_errors(&grid),
            Err(SetupError::MissingBoundaryNeighbor {
                voxel: [1, 2, 1],
                neighbor: [0, 2, 2],
                material: Material::Fluid.id(),
            })
        );

        grid.set_material([4, 4, 4], 9);
        assert_eq!(
            check_for_errors(&grid),
            Err(SetupError::UnresolvedMaterial {
                voxel: [4, 4, 4],
                material: 9,
            })
        );
    }

    #[test]
    fn test_nearest_index() {
        let grid = MaterialGrid::new(Vector3::new(-1.0, -1.0, -1.0), 0.5, [5, 5, 5]);
        assert_eq!(grid.get_nearest_index(&Vector3::new(0.1, -0.9, 1.0)), Some([2, 0, 4]));
        assert_eq!(grid.get_nearest_index(&Vector3::new(2.0, 0.0, 0.0)), None);
    }
}

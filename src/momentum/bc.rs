use super::Node;
use crate::geometry::{Material, MaterialGrid};
use crate::prelude_crate::*;
use crate::velocity_set::D3Q19;

pub use BoundaryCondition::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    VelocityInlet { velocity: [Float; 3] },
    PressureOutlet { density: Float },
}

// -------------------------------------------------------------------- STRUCT: BouzidiLink

/// Link from the fluid cell `cell` along the direction `direction` into a
/// wall cell. The wall surface cuts the link at the fraction `distance` of
/// its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BouzidiLink {
    pub cell: usize,
    pub direction: usize,
    pub distance: Float,
}

// ------------------------------------------------------------------- STRUCT: OpenBoundary

/// Open boundary cell together with the interior cell its missing moments are
/// extrapolated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenBoundary {
    pub cell: usize,
    pub neighbor: usize,
    pub condition: BoundaryCondition,
}

// ----------------------------------------------------------------------------- FUNCTIONS

/// Interpolated bounce-back of Bouzidi, Firdaouss and Lallemand for a wall at
/// rest. `upstream` is the post-collision population `i` of the fluid cell
/// behind the boundary cell, if that cell is fluid.
pub(crate) fn bouzidi_population(
    distance: Float,
    f_star_i: Float,
    f_star_i_bar: Float,
    upstream: Option<Float>,
) -> Float {
    if distance < 0.5 {
        match upstream {
            Some(f_star_i_upstream) => {
                2.0 * distance * f_star_i + (1.0 - 2.0 * distance) * f_star_i_upstream
            }
            None => f_star_i,
        }
    } else {
        f_star_i / (2.0 * distance) + (2.0 * distance - 1.0) / (2.0 * distance) * f_star_i_bar
    }
}

const AXES: [[i32; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

/// Outward normal of the open boundary cell at `index`. Walking against the
/// normal crosses only cells of the same material before it reaches bulk
/// fluid, and the shortest such walk wins. Inside a cap layer seen sideways
/// the walk ends on a wall, so a cap cell touching the curved wall still gets
/// the axis of the pipe.
pub(crate) fn find_outward_normal(grid: &MaterialGrid, index: [usize; 3]) -> Option<[i32; 3]> {
    let material = grid.get_material(index);
    let max_steps = grid.get_n().into_iter().max().unwrap_or(0);
    AXES.iter()
        .filter_map(|normal| {
            let steps = (1..=max_steps).find_map(|step| {
                let upstream = [0, 1, 2].map(|x| index[x] as isize - (step as isize) * normal[x] as isize);
                match grid.get_material_or_inert(upstream) {
                    id if id == material => None,
                    id if id == Material::Fluid.id() => Some(Some(step)),
                    _ => Some(None),
                }
            })??;
            Some((steps, *normal))
        })
        .min_by_key(|&(steps, _)| steps)
        .map(|(_, normal)| normal)
}

impl Node {
    pub(crate) fn compute_bouzidi_bc(&mut self, link: &BouzidiLink, upstream: Option<Float>) {
        let i = link.direction;
        let i_bar = D3Q19.get_opposite_direction(i);
        let f_star = self.get_f_star();
        let population = bouzidi_population(link.distance, f_star[i], f_star[i_bar], upstream);
        let mut f = *self.get_f();
        f[i_bar] = population;
        self.set_f(f);
    }

    /// Regularized open boundary: the populations are rebuilt from the
    /// prescribed and the extrapolated moments plus the non-equilibrium stress
    /// of the interior neighbor.
    pub(crate) fn compute_regularized_bc(&mut self, condition: &BoundaryCondition, neighbor: &Node) {
        let (density, velocity) = match condition {
            VelocityInlet { velocity } => (neighbor.get_density(), *velocity),
            PressureOutlet { density } => (*density, *neighbor.get_velocity()),
        };
        let f = kernel::regularized_populations(density, &velocity, neighbor.get_pi_neq(), &D3Q19);
        self.set_f(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Material;
    use crate::momentum::dynamics::Dynamics;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_bouzidi_half_way_is_bounce_back() {
        assert_relative_eq!(bouzidi_population(0.5, 0.3, 0.1, Some(0.7)), 0.3);
    }

    #[test]
    fn test_bouzidi_branches() {
        assert_relative_eq!(bouzidi_population(0.25, 0.3, 0.1, Some(0.7)), 0.5 * 0.3 + 0.5 * 0.7);
        assert_relative_eq!(bouzidi_population(0.25, 0.3, 0.1, None), 0.3);
        assert_relative_eq!(bouzidi_population(1.0, 0.3, 0.1, None), 0.15 + 0.05);
    }

    /// Pipe of square section along x with two inlet layers and two outlet
    /// layers. Cap cells next to the side walls see walls in two directions.
    fn capped_channel() -> MaterialGrid {
        let n = [10, 6, 6];
        let mut grid = MaterialGrid::new(Vector3::zeros(), 1.0, n);
        (0..grid.get_number_of_voxels()).for_each(|i| {
            let [x, y, z] = grid.get_index(i);
            let side = y == 0 || z == 0 || y == n[1] - 1 || z == n[2] - 1;
            let material = match x {
                _ if side || x == 0 || x == n[0] - 1 => Material::Wall,
                1 | 2 => Material::Inlet,
                7 | 8 => Material::Outlet,
                _ => Material::Fluid,
            };
            grid.set_material([x, y, z], material.id());
        });
        grid
    }

    #[test]
    fn test_find_outward_normal_follows_the_pipe_axis() {
        let grid = capped_channel();
        [[1, 1, 1], [1, 2, 3], [2, 1, 4], [2, 4, 4]]
            .iter()
            .for_each(|&index| assert_eq!(find_outward_normal(&grid, index), Some([-1, 0, 0])));
        [[8, 1, 1], [7, 4, 1], [8, 2, 3]]
            .iter()
            .for_each(|&index| assert_eq!(find_outward_normal(&grid, index), Some([1, 0, 0])));
    }

    #[test]
    fn test_find_outward_normal_without_bulk_fluid() {
        let mut grid = capped_channel();
        (3..7).for_each(|x| {
            (1..5).for_each(|y| (1..5).for_each(|z| grid.set_material([x, y, z], Material::Wall.id())))
        });
        assert_eq!(find_outward_normal(&grid, [1, 1, 1]), None);
    }

    #[test]
    fn test_compute_bouzidi_bc_sets_opposite_population() {
        let mut node = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        node.initialize(1.0, [0.0; 3]);
        let mut f_star = *node.get_f_star();
        f_star[1] = 0.2;
        node.set_f_star(f_star);
        let link = BouzidiLink {
            cell: 0,
            direction: 1,
            distance: 0.5,
        };
        node.compute_bouzidi_bc(&link, None);
        assert_relative_eq!(node.get_f()[D3Q19.get_opposite_direction(1)], 0.2);
    }

    #[test]
    fn test_regularized_inlet_imposes_velocity() {
        let mut neighbor = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        neighbor.initialize(1.01, [0.0; 3]);
        let mut node = Node::new(Material::Inlet, Dynamics::PartiallySaturatedBgk);
        let condition = VelocityInlet {
            velocity: [0.03, 0.0, 0.0],
        };
        node.compute_regularized_bc(&condition, &neighbor);
        let density = node.compute_density();
        let velocity = node.compute_velocity(density);
        assert_relative_eq!(density, 1.01, epsilon = 1e-14);
        assert_relative_eq!(velocity[0], 0.03, epsilon = 1e-14);
    }

    #[test]
    fn test_regularized_outlet_imposes_density() {
        let mut neighbor = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        neighbor.initialize(1.03, [0.01, 0.0, 0.0]);
        let mut node = Node::new(Material::Outlet, Dynamics::PartiallySaturatedBgk);
        node.compute_regularized_bc(&PressureOutlet { density: 1.0 }, &neighbor);
        let density = node.compute_density();
        assert_relative_eq!(density, 1.0, epsilon = 1e-14);
        assert_relative_eq!(node.compute_velocity(density)[0], 0.01, epsilon = 1e-14);
    }
}

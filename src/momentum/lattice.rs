use super::bc::{self, BoundaryCondition, BouzidiLink, OpenBoundary};
use super::{Dynamics, Node, Parameters};
use crate::block::{self, Block};
use crate::decomposition::Decomposition;
use crate::error::SetupError;
use crate::geometry::indicator::Indicator;
use crate::geometry::{Material, MaterialGrid};
use crate::post::Statistics;
use crate::prelude_crate::*;
use crate::velocity_set::{Q19, D3Q19};
use nalgebra::Vector3;
use rayon::prelude::*;
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq)]
struct BlockBoundaries {
    bouzidi: Vec<BouzidiLink>,
    open: Vec<OpenBoundary>,
}

// ----------------------------------------------------------------------- STRUCT: Lattice

/// Hydrodynamic D3Q19 lattice distributed over the blocks of a decomposition.
#[derive(Debug, Clone)]
pub struct Lattice {
    blocks: Vec<Block<Node>>,
    boundaries: Vec<BlockBoundaries>,
    decomposition: Decomposition,
    omega: Float,
    initial_density: Float,
    initial_velocity: [Float; 3],
    statistics: Statistics,
}

impl Lattice {
    /// Builds the lattice on the material grid. The wall distances of the
    /// Bouzidi links are measured on `surface` when given, otherwise every
    /// link is cut half-way.
    pub fn new(
        grid: &MaterialGrid,
        decomposition: &Decomposition,
        params: &Parameters,
        surface: Option<&dyn Indicator>,
    ) -> Result<Self, SetupError> {
        params.validate()?;
        let n = grid.get_n();
        let blocks = decomposition
            .get_blocks()
            .iter()
            .enumerate()
            .map(|(b, geometry)| {
                Block::new(geometry, n, decomposition.compute_halo_links(b), |global| {
                    global
                        .and_then(|index| Material::from_id(grid.get_material(index)))
                        .map_or_else(Node::inert, |material| {
                            Node::new(material, params.dynamics.resolve(material))
                        })
                })
            })
            .collect::<Vec<Block<Node>>>();

        let boundaries = blocks
            .par_iter()
            .map(|block| Self::find_boundaries(block, grid, params, surface))
            .collect::<Vec<BlockBoundaries>>();

        Ok(Lattice {
            blocks,
            boundaries,
            decomposition: decomposition.clone(),
            omega: params.omega,
            initial_density: params.initial_density,
            initial_velocity: params.initial_velocity,
            statistics: Statistics::default(),
        })
    }

    fn find_boundaries(
        block: &Block<Node>,
        grid: &MaterialGrid,
        params: &Parameters,
        surface: Option<&dyn Indicator>,
    ) -> BlockBoundaries {
        let c = D3Q19.get_c();
        let delta_x = grid.get_delta_x();
        let mut boundaries = BlockBoundaries::default();
        for &local in block.get_interior() {
            let node = block.get_cell(local);
            if !node.get_dynamics().is_emitter() {
                continue;
            }
            let Some(index) = block.get_global_index(local) else {
                continue;
            };
            let position = grid.get_position(index);
            for (i, c_i) in c.iter().enumerate().skip(1) {
                let neighbor = block.get_cell(block.get_neighbor(local, c_i));
                if !neighbor.get_material().is_wall() {
                    continue;
                }
                let link = Vector3::new(c_i[0] as Float, c_i[1] as Float, c_i[2] as Float) * delta_x;
                let distance = surface
                    .and_then(|surface| surface.distance_along(&position, &link))
                    .unwrap_or(DEFAULT_WALL_DISTANCE)
                    .clamp(0.0, 1.0);
                boundaries.bouzidi.push(BouzidiLink {
                    cell: local,
                    direction: i,
                    distance,
                });
            }

            let condition = match node.get_material() {
                Material::Inlet => BoundaryCondition::VelocityInlet {
                    velocity: params.inlet_velocity,
                },
                Material::Outlet => BoundaryCondition::PressureOutlet {
                    density: params.outlet_density,
                },
                _ => continue,
            };
            // inner cap layers stream like bulk cells
            let normal = bc::find_outward_normal(grid, index).filter(|normal| {
                !block
                    .get_cell(block.get_neighbor(local, normal))
                    .get_dynamics()
                    .is_emitter()
            });
            if let Some(normal) = normal {
                boundaries.open.push(OpenBoundary {
                    cell: local,
                    neighbor: block.get_neighbor(local, &normal.map(|x| -x)),
                    condition,
                });
            }
        }
        boundaries
    }
}

impl Lattice {
    pub fn get_omega(&self) -> Float {
        self.omega
    }

    pub fn get_statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn get_n(&self) -> [usize; 3] {
        self.decomposition.get_n()
    }

    pub fn get_number_of_bouzidi_links(&self) -> usize {
        self.boundaries.iter().map(|b| b.bouzidi.len()).sum()
    }

    pub fn get_number_of_open_boundaries(&self) -> usize {
        self.boundaries.iter().map(|b| b.open.len()).sum()
    }

    pub(crate) fn get_blocks(&self) -> &Vec<Block<Node>> {
        &self.blocks
    }

    pub(crate) fn get_blocks_mut(&mut self) -> &mut Vec<Block<Node>> {
        &mut self.blocks
    }

    pub fn get_node(&self, index: [usize; 3]) -> Option<&Node> {
        let b = self.decomposition.find_owner(index)?;
        let block = &self.blocks[b];
        block.get_local_index(index).map(|local| block.get_cell(local))
    }

    /// Overwrites the populations of the cell at `index`. Returns `false` when
    /// no block owns the voxel.
    pub fn set_populations(&mut self, index: [usize; 3], f: [Float; Q19]) -> bool {
        let Some(b) = self.decomposition.find_owner(index) else {
            return false;
        };
        let block = &mut self.blocks[b];
        match block.get_local_index(index) {
            Some(local) => {
                block.get_cell_mut(local).set_f(f);
                true
            }
            None => false,
        }
    }

    pub fn set_inlet_velocity(&mut self, velocity: [Float; 3]) {
        self.set_open_boundary_values(|condition| {
            if let BoundaryCondition::VelocityInlet { velocity: v } = condition {
                *v = velocity;
            }
        });
    }

    pub fn set_outlet_density(&mut self, density: Float) {
        self.set_open_boundary_values(|condition| {
            if let BoundaryCondition::PressureOutlet { density: rho } = condition {
                *rho = density;
            }
        });
    }

    fn set_open_boundary_values<F: Fn(&mut BoundaryCondition)>(&mut self, update: F) {
        self.boundaries
            .iter_mut()
            .flat_map(|boundaries| boundaries.open.iter_mut())
            .for_each(|open| update(&mut open.condition));
    }

    pub(crate) fn collect<T, F>(&self, value: F) -> Vec<T>
    where
        T: Copy + Default + Send,
        F: Fn(&Node) -> T + Sync,
    {
        block::gather(&self.blocks, self.get_n(), value)
    }
}

impl Lattice {
    /// Equilibrium populations from the initial density and velocity; walls
    /// start at rest.
    pub fn initialize(&mut self) {
        let density = self.initial_density;
        let velocity = self.initial_velocity;
        self.blocks.par_iter_mut().for_each(|block| {
            block.get_cells_mut().iter_mut().for_each(|node| match node.get_dynamics() {
                Dynamics::Inert => {}
                Dynamics::NoDynamics => node.initialize(density, [0.0; 3]),
                Dynamics::PartiallySaturatedBgk => node.initialize(density, velocity),
            });
        });
        self.compute_statistics();
    }

    pub fn collision_step(&mut self) {
        let omega = self.omega;
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |_, block| block.for_each_interior_mut(|_, node| node.compute_collision(omega)),
        );
    }

    pub fn exchange(&mut self) {
        block::exchange_halos(&mut self.blocks);
    }

    /// Pull streaming. Populations that would come from a cell that does not
    /// stream are bounced back from the cell itself.
    pub fn streaming_step(&mut self) {
        let c = D3Q19.get_c();
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |_, block| {
                let streamed = block
                    .get_interior()
                    .iter()
                    .filter(|&&local| block.get_cell(local).get_dynamics().is_emitter())
                    .map(|&local| {
                        let own = block.get_cell(local).get_f_star();
                        let mut f = [0.0; Q19];
                        (0..Q19).for_each(|i| {
                            let i_bar = D3Q19.get_opposite_direction(i);
                            let source = block.get_cell(block.get_neighbor(local, &c[i_bar]));
                            f[i] = if source.get_dynamics().is_emitter() {
                                source.get_f_star()[i]
                            } else {
                                own[i_bar]
                            };
                        });
                        (local, f)
                    })
                    .collect::<Vec<(usize, [Float; Q19])>>();
                streamed
                    .into_iter()
                    .for_each(|(local, f)| block.get_cell_mut(local).set_f(f));
            },
        );
    }

    pub fn boundary_conditions_step(&mut self) {
        let c = D3Q19.get_c();
        let boundaries = &self.boundaries;
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |b, block| {
                boundaries[b].bouzidi.iter().for_each(|link| {
                    let i = link.direction;
                    let i_bar = D3Q19.get_opposite_direction(i);
                    let upstream = block.get_cell(block.get_neighbor(link.cell, &c[i_bar]));
                    let upstream = upstream
                        .get_dynamics()
                        .is_emitter()
                        .then(|| upstream.get_f_star()[i]);
                    block.get_cell_mut(link.cell).compute_bouzidi_bc(link, upstream);
                });
                boundaries[b].open.iter().for_each(|open| {
                    let neighbor = block.get_cell(open.neighbor).clone();
                    block
                        .get_cell_mut(open.cell)
                        .compute_regularized_bc(&open.condition, &neighbor);
                });
            },
        );
    }

    pub fn compute_statistics(&mut self) {
        self.statistics = self
            .blocks
            .par_iter()
            .map(|block| {
                Statistics::from_cells(
                    block
                        .get_interior()
                        .iter()
                        .map(|&local| block.get_cell(local))
                        .filter(|node| node.get_dynamics().is_emitter())
                        .map(|node| {
                            let u = node.get_velocity();
                            let speed = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
                            (node.get_density(), speed, node.get_solid_fraction())
                        }),
                )
            })
            .reduce(Statistics::default, Statistics::merge);
    }

    /// One collide-and-stream update.
    pub fn step(&mut self) {
        self.collision_step();
        self.exchange();
        self.streaming_step();
        self.boundary_conditions_step();
        self.compute_statistics();
    }

    pub fn get_rank_ranges(&self) -> &Vec<Range<usize>> {
        self.decomposition.get_rank_ranges()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::check_for_errors;
    use approx::assert_relative_eq;

    /// Box channel along x: walls around, inlet and outlet layers at the ends.
    fn channel(n: [usize; 3]) -> MaterialGrid {
        let mut grid = MaterialGrid::new(Vector3::zeros(), 1.0, n);
        (0..grid.get_number_of_voxels()).for_each(|i| {
            let [x, y, z] = grid.get_index(i);
            let on_side = y == 0 || z == 0 || y == n[1] - 1 || z == n[2] - 1;
            let material = if on_side || x == 0 || x == n[0] - 1 {
                Material::Wall
            } else if x == 1 {
                Material::Inlet
            } else if x == n[0] - 2 {
                Material::Outlet
            } else {
                Material::Fluid
            };
            grid.set_material([x, y, z], material.id());
        });
        grid
    }

    fn lattice(grid: &MaterialGrid, number_of_blocks: usize, params: &Parameters) -> Lattice {
        let decomposition = Decomposition::new(grid, number_of_blocks, 2);
        Lattice::new(grid, &decomposition, params, None).unwrap()
    }

    #[test]
    fn test_invalid_omega_is_rejected() {
        let grid = channel([8, 5, 5]);
        let decomposition = Decomposition::new(&grid, 1, 1);
        let params = Parameters {
            omega: 2.5,
            ..Default::default()
        };
        let result = Lattice::new(&grid, &decomposition, &params, None);
        assert!(matches!(result, Err(SetupError::InvalidParameter { name: "omega", .. })));
    }

    #[test]
    fn test_boundaries_are_found() {
        let grid = channel([8, 5, 5]);
        check_for_errors(&grid).unwrap();
        let lattice = lattice(&grid, 2, &Parameters::default());
        // 3 x 3 inlet cells and 3 x 3 outlet cells
        assert_eq!(lattice.get_number_of_open_boundaries(), 18);
        assert!(lattice.get_number_of_bouzidi_links() > 0);
    }

    #[test]
    fn test_open_boundaries_take_the_axial_neighbor() {
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
        let lattice = lattice(&grid, 3, &Parameters::default());
        // only the outer cap layers, 4 x 4 cells each
        assert_eq!(lattice.get_number_of_open_boundaries(), 32);
        lattice
            .get_blocks()
            .iter()
            .zip(lattice.boundaries.iter())
            .for_each(|(block, boundaries)| {
                boundaries.open.iter().for_each(|open| {
                    let [x, y, z] = block.get_global_index(open.cell).unwrap();
                    let expected = match open.condition {
                        BoundaryCondition::VelocityInlet { .. } => [x + 1, y, z],
                        BoundaryCondition::PressureOutlet { .. } => [x - 1, y, z],
                    };
                    assert!([1, 8].contains(&x));
                    assert_eq!(block.get_global_index(open.neighbor), Some(expected));
                });
            });
    }

    #[test]
    fn test_fluid_at_rest_stays_at_rest() {
        let grid = channel([10, 5, 5]);
        let mut lattice = lattice(&grid, 3, &Parameters::default());
        lattice.initialize();
        (0..20).for_each(|_| lattice.step());
        let statistics = lattice.get_statistics();
        assert_relative_eq!(statistics.average_density, 1.0, epsilon = 1e-12);
        assert!(statistics.maximum_velocity < 1e-12);
        assert_eq!(statistics.number_of_cells, 8 * 3 * 3);
    }

    #[test]
    fn test_decomposition_does_not_change_results() {
        let grid = channel([12, 6, 5]);
        let params = Parameters {
            omega: 1.0 / 0.8,
            inlet_velocity: [0.02, 0.0, 0.0],
            ..Default::default()
        };
        let mut single = lattice(&grid, 1, &params);
        let mut split = lattice(&grid, 4, &params);
        single.initialize();
        split.initialize();
        (0..15).for_each(|_| {
            single.step();
            split.step();
        });
        let a = single.collect(|node| node.get_f()[3]);
        let b = split.collect(|node| node.get_f()[3]);
        a.iter()
            .zip(b.iter())
            .for_each(|(x, y)| assert_relative_eq!(x, y, epsilon = 1e-14));
    }

    #[test]
    fn test_inlet_drives_flow() {
        let grid = channel([12, 5, 5]);
        let params = Parameters {
            omega: 1.0 / 0.8,
            inlet_velocity: [0.02, 0.0, 0.0],
            ..Default::default()
        };
        let mut lattice = lattice(&grid, 2, &params);
        lattice.initialize();
        (0..200).for_each(|_| lattice.step());
        let node = lattice.get_node([6, 2, 2]).unwrap();
        assert!(node.get_velocity()[0] > 0.0);
        assert!(!lattice.get_statistics().has_diverged());
    }

    #[test]
    fn test_nan_population_shows_in_statistics() {
        let grid = channel([8, 5, 5]);
        let mut lattice = lattice(&grid, 2, &Parameters::default());
        lattice.initialize();
        assert!(lattice.set_populations([4, 2, 2], [Float::NAN; Q19]));
        lattice.step();
        assert!(lattice.get_statistics().has_diverged());
    }
}

use super::bc::{BoundaryCondition, ThermalBoundary};
use super::{Dynamics, InitialCondition, Node, Parameters, PhaseChange};
use crate::block::{self, Block};
use crate::decomposition::Decomposition;
use crate::error::SetupError;
use crate::geometry::{Material, MaterialGrid};
use crate::momentum::bc::find_outward_normal;
use crate::post::Statistics;
use crate::prelude_crate::*;
use crate::velocity_set::{Q7, D3Q7};
use rayon::prelude::*;

// ----------------------------------------------------------------------- STRUCT: Lattice

/// Thermal D3Q7 lattice on the same decomposition as the hydrodynamic one, so
/// that block `b` and local index `i` refer to the same voxel in both.
#[derive(Debug, Clone)]
pub struct Lattice {
    blocks: Vec<Block<Node>>,
    boundaries: Vec<Vec<ThermalBoundary>>,
    decomposition: Decomposition,
    phase_change: PhaseChange,
    initial_conditions: [InitialCondition; NUMBER_OF_MATERIALS],
    statistics: Statistics,
}

impl Lattice {
    pub fn new(
        grid: &MaterialGrid,
        decomposition: &Decomposition,
        params: &Parameters,
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
            .map(|block| Self::find_boundaries(block, grid, params))
            .collect::<Vec<Vec<ThermalBoundary>>>();
        Ok(Lattice {
            blocks,
            boundaries,
            decomposition: decomposition.clone(),
            phase_change: params.phase_change,
            initial_conditions: params.initial_conditions,
            statistics: Statistics::default(),
        })
    }

    /// Every outlet cell copies from its neighbor against the outward normal,
    /// so stacked outlet layers are fed from the bulk one after another.
    fn find_boundaries(block: &Block<Node>, grid: &MaterialGrid, params: &Parameters) -> Vec<ThermalBoundary> {
        block
            .get_interior()
            .iter()
            .filter_map(|&local| {
                let node = block.get_cell(local);
                if !node.is_active() {
                    return None;
                }
                match node.get_material() {
                    Material::Inlet => Some(ThermalBoundary {
                        cell: local,
                        neighbor: None,
                        condition: BoundaryCondition::Dirichlet {
                            enthalpy: params.inlet_enthalpy,
                            velocity: params.inlet_velocity,
                        },
                    }),
                    Material::CooledWall => Some(ThermalBoundary {
                        cell: local,
                        neighbor: None,
                        condition: BoundaryCondition::Dirichlet {
                            enthalpy: params.cooled_wall_enthalpy,
                            velocity: [0.0; 3],
                        },
                    }),
                    Material::Outlet => {
                        let normal = find_outward_normal(grid, block.get_global_index(local)?)?;
                        Some(ThermalBoundary {
                            cell: local,
                            neighbor: Some(block.get_neighbor(local, &normal.map(|x| -x))),
                            condition: BoundaryCondition::ConvectiveOutflow,
                        })
                    }
                    _ => None,
                }
            })
            .collect()
    }
}

impl Lattice {
    pub fn get_phase_change(&self) -> &PhaseChange {
        &self.phase_change
    }

    pub fn get_statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn get_n(&self) -> [usize; 3] {
        self.decomposition.get_n()
    }

    pub fn get_number_of_boundary_cells(&self) -> usize {
        self.boundaries.iter().map(Vec::len).sum()
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

    pub fn set_inlet_enthalpy(&mut self, enthalpy: Float) {
        self.blocks
            .iter()
            .zip(self.boundaries.iter_mut())
            .for_each(|(block, boundaries)| {
                boundaries
                    .iter_mut()
                    .filter(|boundary| block.get_cell(boundary.cell).get_material() == Material::Inlet)
                    .for_each(|boundary| {
                        if let BoundaryCondition::Dirichlet { enthalpy: h, .. } = &mut boundary.condition {
                            *h = enthalpy;
                        }
                    });
            });
    }

    /// Overwrites the populations of the cell at `index`. Returns `false` when
    /// no block owns the voxel.
    pub fn set_populations(&mut self, index: [usize; 3], g: [Float; Q7]) -> bool {
        let Some(b) = self.decomposition.find_owner(index) else {
            return false;
        };
        let block = &mut self.blocks[b];
        match block.get_local_index(index) {
            Some(local) => {
                block.get_cell_mut(local).set_g(g);
                true
            }
            None => false,
        }
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
    pub fn initialize(&mut self) {
        let phase_change = self.phase_change;
        let initial_conditions = self.initial_conditions;
        self.blocks.par_iter_mut().for_each(|block| {
            block
                .get_cells_mut()
                .iter_mut()
                .filter(|node| node.is_active())
                .for_each(|node| {
                    let ic = initial_conditions[node.get_material().id() as usize];
                    node.initialize(ic.enthalpy, ic.velocity, &phase_change);
                });
        });
        self.compute_statistics();
    }

    pub fn collision_step(&mut self) {
        let phase_change = self.phase_change;
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |_, block| block.for_each_interior_mut(|_, node| node.compute_collision(&phase_change)),
        );
    }

    pub fn exchange(&mut self) {
        block::exchange_halos(&mut self.blocks);
    }

    pub fn streaming_step(&mut self) {
        let c = D3Q7.get_c();
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |_, block| {
                let streamed = block
                    .get_interior()
                    .iter()
                    .filter(|&&local| block.get_cell(local).is_active())
                    .map(|&local| {
                        let own = block.get_cell(local).get_g_star();
                        let mut g = [0.0; Q7];
                        (0..Q7).for_each(|i| {
                            let i_bar = D3Q7.get_opposite_direction(i);
                            let source = block.get_cell(block.get_neighbor(local, &c[i_bar]));
                            g[i] = if source.get_dynamics().is_emitter() {
                                source.get_g_star()[i]
                            } else {
                                own[i_bar]
                            };
                        });
                        (local, g)
                    })
                    .collect::<Vec<(usize, [Float; Q7])>>();
                streamed
                    .into_iter()
                    .for_each(|(local, g)| block.get_cell_mut(local).set_g(g));
            },
        );
    }

    pub fn boundary_conditions_step(&mut self) {
        let phase_change = self.phase_change;
        let boundaries = &self.boundaries;
        block::for_each_rank(
            &mut self.blocks,
            self.decomposition.get_rank_ranges(),
            |b, block| {
                boundaries[b].iter().for_each(|boundary| match boundary.condition {
                    BoundaryCondition::Dirichlet { enthalpy, velocity } => block
                        .get_cell_mut(boundary.cell)
                        .compute_dirichlet_bc(enthalpy, &velocity, &phase_change),
                    BoundaryCondition::ConvectiveOutflow => {
                        if let Some(neighbor) = boundary.neighbor {
                            let neighbor = block.get_cell(neighbor).clone();
                            block.get_cell_mut(boundary.cell).compute_outflow_bc(&neighbor);
                        }
                    }
                });
            },
        );
    }

    /// Averages over the cells relaxed by the enthalpy TRT rule.
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
                        .filter(|node| node.get_dynamics() == Dynamics::TotalEnthalpyTrt)
                        .map(|node| {
                            let u = node.get_velocity();
                            let speed = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
                            (node.get_enthalpy(), speed, 1.0 - node.get_liquid_fraction())
                        }),
                )
            })
            .reduce(Statistics::default, Statistics::merge);
    }

    pub fn step(&mut self) {
        self.collision_step();
        self.exchange();
        self.streaming_step();
        self.boundary_conditions_step();
        self.compute_statistics();
    }
}

use crate::error::SetupError;
use crate::geometry::{Material, MaterialGrid};
use crate::prelude_crate::*;
use crate::{momentum, thermal};
use nalgebra::Vector3;
use rayon::prelude::*;

// ---------------------------------------------------------------- STRUCT: CouplingRegion

/// Axis-aligned box, in physical coordinates, where the thermal state acts on
/// the flow. `materials` restricts the region to cells of the given ids.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingRegion {
    pub min: Vector3<Float>,
    pub max: Vector3<Float>,
    pub materials: Option<Vec<Material>>,
}

impl CouplingRegion {
    /// Inclusive voxel index bounds of the region on `grid`.
    pub fn get_index_bounds(&self, grid: &MaterialGrid) -> Result<([usize; 3], [usize; 3]), SetupError> {
        let n = grid.get_n();
        let origin = grid.get_origin();
        let delta_x = grid.get_delta_x();
        let mut lower = [0; 3];
        let mut upper = [0; 3];
        for x in 0..3 {
            let first = ((self.min[x] - origin[x]) / delta_x).ceil().max(0.0);
            let last = ((self.max[x] - origin[x]) / delta_x)
                .floor()
                .min(n[x] as Float - 1.0);
            if !(first <= last) {
                return Err(SetupError::RegionOutsideDomain {
                    min: [self.min[0], self.min[1], self.min[2]],
                    max: [self.max[0], self.max[1], self.max[2]],
                });
            }
            lower[x] = first as usize;
            upper[x] = last as usize;
        }
        Ok((lower, upper))
    }

    fn accepts(&self, material: Material) -> bool {
        self.materials
            .as_ref()
            .map_or(true, |materials| materials.contains(&material))
    }
}

// -------------------------------------------------------------------- STRUCT: Parameters

/// Boussinesq force `prefactor * rho * (T - T_ref) / dT` along `direction`;
/// a zero prefactor leaves only the porosity coupling.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub region: CouplingRegion,
    pub direction: [Float; 3],
    pub reference_temperature: Float,
    pub temperature_difference: Float,
    pub prefactor: Float,
}

// ----------------------------------------------------------- STRUCT: PhaseChangeCoupling

#[derive(Debug, Clone)]
pub struct PhaseChangeCoupling {
    cells: Vec<Vec<usize>>,
    phase_change: thermal::PhaseChange,
    direction: [Float; 3],
    reference_temperature: Float,
    temperature_difference: Float,
    prefactor: Float,
}

impl PhaseChangeCoupling {
    /// Resolves the region to the owned cells of every block. Both lattices
    /// must share the decomposition.
    pub fn new(
        grid: &MaterialGrid,
        momentum: &momentum::Lattice,
        thermal: &thermal::Lattice,
        params: &Parameters,
    ) -> Result<Self, SetupError> {
        if !(params.temperature_difference.abs() > 0.0) {
            return Err(SetupError::InvalidParameter {
                name: "temperature_difference",
                reason: "must not be zero".to_string(),
            });
        }
        let (lower, upper) = params.region.get_index_bounds(grid)?;
        let inside = |index: [usize; 3]| (0..3).all(|x| index[x] >= lower[x] && index[x] <= upper[x]);
        let cells = momentum
            .get_blocks()
            .par_iter()
            .map(|block| {
                block
                    .get_interior()
                    .iter()
                    .copied()
                    .filter(|&local| {
                        let node = block.get_cell(local);
                        node.is_active()
                            && params.region.accepts(node.get_material())
                            && block.get_global_index(local).is_some_and(inside)
                    })
                    .collect::<Vec<usize>>()
            })
            .collect::<Vec<Vec<usize>>>();
        Ok(PhaseChangeCoupling {
            cells,
            phase_change: *thermal.get_phase_change(),
            direction: params.direction,
            reference_temperature: params.reference_temperature,
            temperature_difference: params.temperature_difference,
            prefactor: params.prefactor,
        })
    }
}

impl PhaseChangeCoupling {
    pub fn get_number_of_cells(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Porosity, solid velocity and buoyancy from the current enthalpy, and
    /// the current flow velocity for the next advection step.
    pub fn execute(&self, momentum: &mut momentum::Lattice, thermal: &mut thermal::Lattice) {
        let phase_change = &self.phase_change;
        momentum
            .get_blocks_mut()
            .par_iter_mut()
            .zip(thermal.get_blocks_mut().par_iter_mut())
            .zip(self.cells.par_iter())
            .for_each(|((m_block, t_block), cells)| {
                cells.iter().for_each(|&local| {
                    let t_node = t_block.get_cell_mut(local);
                    let enthalpy = t_node.compute_enthalpy();
                    let liquid_fraction = phase_change.compute_liquid_fraction(enthalpy);
                    let temperature = phase_change.compute_temperature(enthalpy);

                    let m_node = m_block.get_cell_mut(local);
                    m_node.set_solid_fraction(1.0 - liquid_fraction);
                    m_node.set_solid_velocity([0.0; 3]);
                    let magnitude = self.prefactor
                        * m_node.get_density()
                        * (temperature - self.reference_temperature)
                        / self.temperature_difference;
                    m_node.set_force(self.direction.map(|d| magnitude * d));
                    let velocity = *m_node.get_velocity();

                    t_block.get_cell_mut(local).set_velocity(velocity);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::Decomposition;
    use crate::dynamics::DynamicsAssignment;
    use crate::thermal::{InitialCondition, PhaseChange};
    use approx::assert_relative_eq;

    fn grid(n: [usize; 3]) -> MaterialGrid {
        let mut grid = MaterialGrid::new(Vector3::zeros(), 1.0, n);
        (0..grid.get_number_of_voxels()).for_each(|i| {
            let [x, y, z] = grid.get_index(i);
            let side = x == 0 || y == 0 || z == 0 || x == n[0] - 1 || y == n[1] - 1 || z == n[2] - 1;
            let material = if side { Material::Wall } else { Material::Fluid };
            grid.set_material([x, y, z], material.id());
        });
        grid
    }

    fn thermal_params(enthalpy: Float) -> thermal::Parameters {
        thermal::Parameters {
            phase_change: PhaseChange {
                solidus_temperature: 1.0,
                liquidus_temperature: 1.0,
                solid_specific_heat: 1.0,
                liquid_specific_heat: 1.0,
                latent_heat: 1.0,
                solid_conductivity: 0.1,
                liquid_conductivity: 0.1,
            },
            dynamics: DynamicsAssignment::default(),
            inlet_enthalpy: enthalpy,
            inlet_velocity: [0.0; 3],
            cooled_wall_enthalpy: enthalpy,
            initial_conditions: [InitialCondition {
                enthalpy,
                velocity: [0.0; 3],
            }; NUMBER_OF_MATERIALS],
        }
    }

    fn lattices(grid: &MaterialGrid, enthalpy: Float) -> (momentum::Lattice, thermal::Lattice) {
        let decomposition = Decomposition::new(grid, 2, 2);
        let params = momentum::Parameters {
            initial_velocity: [0.01, 0.0, 0.0],
            ..Default::default()
        };
        let mut m_lat = momentum::Lattice::new(grid, &decomposition, &params, None).unwrap();
        let mut t_lat = thermal::Lattice::new(grid, &decomposition, &thermal_params(enthalpy)).unwrap();
        m_lat.initialize();
        t_lat.initialize();
        (m_lat, t_lat)
    }

    fn whole_domain(grid: &MaterialGrid) -> Parameters {
        let n = grid.get_n();
        Parameters {
            region: CouplingRegion {
                min: Vector3::zeros(),
                max: Vector3::new(n[0] as Float, n[1] as Float, n[2] as Float),
                materials: Some(vec![Material::Fluid]),
            },
            direction: [0.0, 1.0, 0.0],
            reference_temperature: 0.0,
            temperature_difference: 1.0,
            prefactor: 0.0,
        }
    }

    #[test]
    fn test_region_outside_domain() {
        let grid = grid([6, 5, 5]);
        let region = CouplingRegion {
            min: Vector3::new(10.0, 0.0, 0.0),
            max: Vector3::new(12.0, 4.0, 4.0),
            materials: None,
        };
        assert!(matches!(
            region.get_index_bounds(&grid),
            Err(SetupError::RegionOutsideDomain { .. })
        ));
    }

    #[test]
    fn test_solid_enthalpy_gives_full_porosity() {
        let grid = grid([6, 5, 5]);
        let (mut m_lat, mut t_lat) = lattices(&grid, 0.5);
        let coupling = PhaseChangeCoupling::new(&grid, &m_lat, &t_lat, &whole_domain(&grid)).unwrap();
        assert_eq!(coupling.get_number_of_cells(), 4 * 3 * 3);
        coupling.execute(&mut m_lat, &mut t_lat);
        let m_node = m_lat.get_node([2, 2, 2]).unwrap();
        assert_eq!(m_node.get_solid_fraction(), 1.0);
        assert_eq!(m_node.get_solid_velocity(), &[0.0; 3]);
        let t_node = t_lat.get_node([2, 2, 2]).unwrap();
        assert_relative_eq!(t_node.get_velocity()[0], 0.01, epsilon = 1e-14);
    }

    #[test]
    fn test_cells_outside_region_stay_fluid() {
        let grid = grid([8, 5, 5]);
        let (mut m_lat, mut t_lat) = lattices(&grid, 0.5);
        let mut params = whole_domain(&grid);
        params.region.max[0] = 3.0;
        let coupling = PhaseChangeCoupling::new(&grid, &m_lat, &t_lat, &params).unwrap();
        coupling.execute(&mut m_lat, &mut t_lat);
        assert_eq!(m_lat.get_node([3, 2, 2]).unwrap().get_solid_fraction(), 1.0);
        assert_eq!(m_lat.get_node([4, 2, 2]).unwrap().get_solid_fraction(), 0.0);
        assert_eq!(t_lat.get_node([4, 2, 2]).unwrap().get_velocity(), &[0.0; 3]);
    }

    #[test]
    fn test_buoyancy_force() {
        let grid = grid([6, 5, 5]);
        // liquid at T = 2.0
        let (mut m_lat, mut t_lat) = lattices(&grid, 3.0);
        let params = Parameters {
            prefactor: 1e-3,
            reference_temperature: 1.5,
            temperature_difference: 0.5,
            ..whole_domain(&grid)
        };
        let coupling = PhaseChangeCoupling::new(&grid, &m_lat, &t_lat, &params).unwrap();
        coupling.execute(&mut m_lat, &mut t_lat);
        let m_node = m_lat.get_node([2, 2, 2]).unwrap();
        assert_eq!(m_node.get_solid_fraction(), 0.0);
        assert_relative_eq!(m_node.get_force()[1], 1e-3, epsilon = 1e-15);
        assert_eq!(m_node.get_force()[0], 0.0);
    }
}

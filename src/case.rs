use crate::cli::Config;
use crate::coupling::{self, CouplingRegion};
use crate::dynamics::DynamicsAssignment;
use crate::error::SetupError;
use crate::geometry::indicator::{Cuboid, Cylinder, Indicator, LayerIndicator};
use crate::geometry::surface::TriangleSurface;
use crate::geometry::{self, Material, MaterialGrid, RenameRule};
use crate::io::{self, ConsoleReporter, CsvWriter};
use crate::prelude_crate::*;
use crate::simulation::{self, Diagnostics, RunOutcome, Simulation};
use crate::thermal::{InitialCondition, PhaseChange};
use crate::units::{PhysicalParameters, UnitConverter};
use crate::{momentum, thermal};
use colored::*;
use nalgebra::Vector3;

// -------------------------------------------------------------------- STRUCT: Parameters

/// Solidification of a liquid metal flowing through a pipe whose middle
/// section is cooled from the wall. Physical quantities are in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub length: Float,
    pub diameter: Float,
    pub entrance_length: Float,
    pub exit_length: Float,
    /// Voxels across the diameter.
    pub resolution: usize,
    pub tau: Float,
    pub inlet_velocity: Float,
    pub density: Float,
    pub dynamic_viscosity: Float,
    pub solid_conductivity: Float,
    pub liquid_conductivity: Float,
    pub specific_heat: Float,
    pub latent_heat: Float,
    pub cold_temperature: Float,
    pub melting_temperature: Float,
    pub hot_temperature: Float,
    pub lattice_solid_specific_heat: Float,
    pub lattice_liquid_specific_heat: Float,
    pub boussinesq_prefactor: Float,
    pub max_physical_time: Float,
    pub output_interval: Float,
    pub surface_segments: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            length: 0.5,
            diameter: 0.2,
            entrance_length: 0.1,
            exit_length: 0.1,
            resolution: 100,
            tau: 0.51,
            inlet_velocity: 1.058e-3,
            density: 11000.0,
            dynamic_viscosity: 2.22e-3,
            solid_conductivity: 16.6,
            liquid_conductivity: 16.6,
            specific_heat: 138.8,
            latent_heat: 23648.6,
            cold_temperature: 591.38,
            melting_temperature: 600.6,
            hot_temperature: 693.8,
            lattice_solid_specific_heat: 1.0,
            lattice_liquid_specific_heat: 1.0,
            boussinesq_prefactor: 0.0,
            max_physical_time: 4000.0,
            output_interval: 400.0,
            surface_segments: 64,
        }
    }
}

impl Parameters {
    /// Default case with the resolution and times given on the command line.
    pub fn from_config(config: &Config) -> Self {
        let default = Parameters::default();
        Parameters {
            resolution: config.resolution,
            tau: config.tau.unwrap_or(default.tau),
            inlet_velocity: config.inlet_velocity.unwrap_or(default.inlet_velocity),
            max_physical_time: config.max_physical_time.unwrap_or(default.max_physical_time),
            output_interval: config.output_interval.unwrap_or(default.output_interval),
            ..default
        }
    }

    pub fn get_radius(&self) -> Float {
        0.5 * self.diameter
    }

    pub fn get_delta_x(&self) -> Float {
        self.diameter / self.resolution as Float
    }

    pub fn get_kinematic_viscosity(&self) -> Float {
        self.dynamic_viscosity / self.density
    }

    pub fn get_reynolds_number(&self) -> Float {
        self.inlet_velocity * self.diameter / self.get_kinematic_viscosity()
    }

    pub fn get_stefan_number(&self) -> Float {
        self.specific_heat * (self.hot_temperature - self.melting_temperature) / self.latent_heat
    }

    pub fn create_converter(&self) -> UnitConverter {
        UnitConverter::from_relaxation_time(
            self.get_delta_x(),
            self.tau,
            PhysicalParameters {
                characteristic_length: self.diameter,
                characteristic_velocity: self.inlet_velocity,
                viscosity: self.get_kinematic_viscosity(),
                density: self.density,
                thermal_conductivity: self.liquid_conductivity,
                specific_heat_capacity: self.specific_heat,
                low_temperature: self.cold_temperature,
                high_temperature: self.hot_temperature,
            },
        )
    }

    /// Lattice phase-change model. The latent heat keeps the Stefan number
    /// of the physical case between the lattice temperatures 0.5 and 1.5, and
    /// the liquid conductivity matches the thermal relaxation time.
    pub fn create_phase_change(&self, converter: &UnitConverter) -> PhaseChange {
        let melting_temperature = converter.get_lattice_temperature(self.melting_temperature);
        let cold = converter.get_lattice_temperature(self.cold_temperature);
        let hot = converter.get_lattice_temperature(self.hot_temperature);
        let cp_s = self.lattice_solid_specific_heat;
        let cp_l = self.lattice_liquid_specific_heat;
        let cp_ref = 2.0 * cp_s * cp_l / (cp_s + cp_l);
        let liquid_conductivity = cp_ref * THERMAL_CS_2 * (converter.get_thermal_tau() - 0.5);
        PhaseChange {
            solidus_temperature: melting_temperature,
            liquidus_temperature: melting_temperature,
            solid_specific_heat: cp_s,
            liquid_specific_heat: cp_l,
            latent_heat: cp_s * (hot - cold) / self.get_stefan_number(),
            solid_conductivity: liquid_conductivity * self.solid_conductivity / self.liquid_conductivity,
            liquid_conductivity,
        }
    }

    /// Closed pipe along x from 0 to `length`.
    pub fn create_surface(&self) -> TriangleSurface {
        TriangleSurface::cylinder(
            Vector3::zeros(),
            Vector3::new(self.length, 0.0, 0.0),
            self.get_radius(),
            self.surface_segments,
        )
    }

    /// Material grid of the pipe: walls one voxel around the surface, the
    /// inlet and outlet caps, and the cooled wall section.
    pub fn prepare_geometry(&self, surface: &TriangleSurface) -> Result<MaterialGrid, SetupError> {
        let delta_x = self.get_delta_x();
        let radius = self.get_radius();
        let extended_domain = LayerIndicator::new(surface, delta_x);
        let grid = MaterialGrid::from_bounding_box(&extended_domain.get_bounding_box(), delta_x);

        // caps are one or two voxel layers deep, depending on whether the end
        // planes of the surface fall inside; only the outer layer is open
        let inflow = Cylinder::new(
            Vector3::new(-delta_x, 0.0, 0.0),
            Vector3::new(1.5 * delta_x, 0.0, 0.0),
            radius,
        );
        let outflow = Cylinder::new(
            Vector3::new(self.length - 1.5 * delta_x, 0.0, 0.0),
            Vector3::new(self.length + delta_x, 0.0, 0.0),
            radius,
        );
        let cooled_section = Cuboid::new(
            Vector3::new(
                self.entrance_length - delta_x,
                -radius - 0.5 * delta_x,
                -radius - 0.5 * delta_x,
            ),
            Vector3::new(
                self.length - self.exit_length - self.entrance_length + delta_x,
                self.diameter + delta_x,
                self.diameter + delta_x,
            ),
        );

        let rules = [
            RenameRule::new(&extended_domain, Material::Inert, Material::Wall),
            RenameRule::new(surface, Material::Wall, Material::Fluid),
            RenameRule::new(&inflow, Material::Fluid, Material::Inlet),
            RenameRule::new(&outflow, Material::Fluid, Material::Outlet),
            RenameRule::new(&cooled_section, Material::Wall, Material::CooledWall),
        ];
        let grid = geometry::apply_rules(grid, &rules);
        geometry::check_for_errors(&grid)?;
        Ok(grid)
    }

    pub fn create_simulation_parameters(
        &self,
        converter: &UnitConverter,
        number_of_blocks: usize,
        number_of_ranks: usize,
    ) -> simulation::Parameters {
        let u = [converter.get_characteristic_lattice_velocity(), 0.0, 0.0];
        let phase_change = self.create_phase_change(converter);
        let hot_enthalpy = phase_change.liquid_specific_heat
            * converter.get_lattice_temperature(self.hot_temperature)
            + phase_change.latent_heat;
        let cold_enthalpy =
            phase_change.solid_specific_heat * converter.get_lattice_temperature(self.cold_temperature);
        let hot = InitialCondition {
            enthalpy: hot_enthalpy,
            velocity: u,
        };
        let mut initial_conditions = [hot; NUMBER_OF_MATERIALS];
        initial_conditions[Material::Inert.id() as usize] = InitialCondition {
            enthalpy: 0.0,
            velocity: [0.0; 3],
        };
        initial_conditions[Material::Wall.id() as usize] = InitialCondition {
            enthalpy: hot_enthalpy,
            velocity: [0.0; 3],
        };
        initial_conditions[Material::CooledWall.id() as usize] = InitialCondition {
            enthalpy: cold_enthalpy,
            velocity: [0.0; 3],
        };

        let radius = self.get_radius();
        simulation::Parameters {
            momentum: momentum::Parameters {
                omega: converter.get_omega(),
                dynamics: DynamicsAssignment::default(),
                inlet_velocity: u,
                outlet_density: LATTICE_DENSITY,
                initial_density: LATTICE_DENSITY,
                initial_velocity: u,
            },
            thermal: thermal::Parameters {
                phase_change,
                dynamics: DynamicsAssignment::default(),
                inlet_enthalpy: hot_enthalpy,
                inlet_velocity: u,
                cooled_wall_enthalpy: cold_enthalpy,
                initial_conditions,
            },
            coupling: Some(coupling::Parameters {
                region: CouplingRegion {
                    min: Vector3::new(0.0, -radius, -radius),
                    max: Vector3::new(self.length, radius, radius),
                    materials: Some(vec![Material::Fluid, Material::Inlet]),
                },
                direction: [0.0, 1.0, 0.0],
                reference_temperature: 0.0,
                temperature_difference: 1.0,
                prefactor: self.boussinesq_prefactor,
            }),
            number_of_blocks,
            number_of_ranks,
            max_physical_time: self.max_physical_time,
        }
    }

    pub fn print(&self, phase_change: &PhaseChange) {
        println!("{}", "Solidification case".yellow().bold());
        println!("  pipe length x diameter [m]:   {} x {}", self.length, self.diameter);
        println!("  Reynolds number:              {:.4}", self.get_reynolds_number());
        println!("  Stefan number:                {:.6}", self.get_stefan_number());
        println!("  lattice melting temperature:  {:.6}", phase_change.solidus_temperature);
        println!("  lattice latent heat:          {:.6}", phase_change.latent_heat);
        println!("  lattice liquid conductivity:  {:.6e}", phase_change.liquid_conductivity);
        println!();
    }
}

// ----------------------------------------------------------------------------- FUNCTIONS

/// Prepares and runs the case with console output and, unless disabled, CSV
/// output every `output_interval` seconds of physical time.
pub fn run(config: &Config, case: &Parameters) -> LbResult<RunOutcome> {
    let converter = case.create_converter();
    converter.print();
    let params = case.create_simulation_parameters(
        &converter,
        config.get_number_of_blocks(),
        config.get_number_of_threads(),
    );
    case.print(&params.thermal.phase_change);

    io::print_stage("Prepare Geometry");
    let surface = case.create_surface();
    let grid = case.prepare_geometry(&surface)?;
    io::print_ok();
    grid.print();

    io::print_stage("Prepare Lattice");
    let mut simulation = Simulation::new(converter, grid, Some(&surface as &dyn Indicator), &params)?;
    io::print_ok();
    simulation.get_decomposition().print();

    let interval = simulation
        .get_converter()
        .physical_time_to_steps(case.output_interval)
        .max(1);
    let mut diagnostics: Vec<Box<dyn Diagnostics>> = vec![Box::new(ConsoleReporter::new(interval, true))];
    if config.write_output {
        diagnostics.push(Box::new(CsvWriter::new(&config.output_dir, interval)?));
    }
    println!(
        "Running {} iterations.\n",
        (simulation.get_max_iterations() + 1).to_string().yellow().bold()
    );
    simulation.run(|_, _| {}, &mut diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lattice_phase_change_of_default_case() {
        let case = Parameters::default();
        let converter = case.create_converter();
        let phase_change = case.create_phase_change(&converter);
        let melting = (600.6 - 591.38) / (693.8 - 591.38) + 0.5;
        assert_relative_eq!(phase_change.solidus_temperature, melting, epsilon = 1e-12);
        assert_relative_eq!(phase_change.liquidus_temperature, melting, epsilon = 1e-12);
        let stefan = 138.8 * (693.8 - 600.6) / 23648.6;
        assert_relative_eq!(phase_change.latent_heat, 1.0 / stefan, epsilon = 1e-12);
        assert_relative_eq!(phase_change.get_reference_specific_heat(), 1.0);
        assert!(phase_change.liquid_conductivity > 0.0);
    }

    #[test]
    fn test_command_line_overrides() {
        let config = Config {
            resolution: 20,
            tau: Some(0.8),
            inlet_velocity: Some(2e-6),
            ..Default::default()
        };
        let case = Parameters::from_config(&config);
        assert_eq!(case.resolution, 20);
        assert_relative_eq!(case.tau, 0.8);
        assert_relative_eq!(case.inlet_velocity, 2e-6);
        assert_relative_eq!(case.max_physical_time, Parameters::default().max_physical_time);
    }

    #[test]
    fn test_default_case_constants() {
        let case = Parameters::default();
        assert_relative_eq!(case.get_delta_x(), 0.002, epsilon = 1e-15);
        assert_relative_eq!(case.get_reynolds_number(), 1.058e-3 * 0.2 * 11000.0 / 2.22e-3, epsilon = 1e-9);
        let converter = case.create_converter();
        assert_relative_eq!(converter.get_tau(), 0.51, epsilon = 1e-12);
        assert_eq!(converter.physical_time_to_steps(0.0), 0);
    }

    #[test]
    fn test_simulation_parameters() {
        let case = Parameters::default();
        let converter = case.create_converter();
        let params = case.create_simulation_parameters(&converter, 2, 1);
        let thermal = &params.thermal;
        let hot = 1.5 + thermal.phase_change.latent_heat;
        assert_relative_eq!(thermal.inlet_enthalpy, hot, epsilon = 1e-12);
        assert_relative_eq!(thermal.cooled_wall_enthalpy, 0.5, epsilon = 1e-12);
        assert_eq!(thermal.initial_conditions[Material::Wall.id() as usize].velocity, [0.0; 3]);
        assert_eq!(
            thermal.initial_conditions[Material::Fluid.id() as usize].velocity,
            params.momentum.inlet_velocity
        );
        assert_relative_eq!(params.momentum.omega, 1.0 / 0.51, epsilon = 1e-12);
        assert!(params.coupling.is_some());
    }

    #[test]
    fn test_geometry_of_coarse_pipe() {
        let case = Parameters {
            resolution: 8,
            length: 0.4,
            entrance_length: 0.1,
            exit_length: 0.1,
            surface_segments: 48,
            ..Default::default()
        };
        let surface = case.create_surface();
        let grid = case.prepare_geometry(&surface).unwrap();
        [
            Material::Fluid,
            Material::Wall,
            Material::Inlet,
            Material::Outlet,
            Material::CooledWall,
        ]
        .iter()
        .for_each(|&material| assert!(grid.count(material) > 0, "no {material:?} voxel"));
        let center = grid
            .get_nearest_index(&Vector3::new(0.2, 0.0, 0.0))
            .unwrap();
        assert_eq!(grid.get_material(center), Material::Fluid.id());
    }
}

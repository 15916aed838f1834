use crate::prelude_crate::*;
use colored::*;

// ------------------------------------------------------------ STRUCT: PhysicalParameters

/// Physical description of the case, in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalParameters {
    pub characteristic_length: Float,
    pub characteristic_velocity: Float,
    pub viscosity: Float,
    pub density: Float,
    pub thermal_conductivity: Float,
    pub specific_heat_capacity: Float,
    pub low_temperature: Float,
    pub high_temperature: Float,
}

// ----------------------------------------------------------------- STRUCT: UnitConverter

/// Conversion between physical and lattice units for the coupled flow and
/// heat transfer problem. All factors convert a lattice value into its
/// physical counterpart by multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConverter {
    physical: PhysicalParameters,
    delta_x: Float,
    delta_t: Float,
    tau: Float,
    thermal_tau: Float,
    length_conversion_factor: Float,
    time_conversion_factor: Float,
    velocity_conversion_factor: Float,
    density_conversion_factor: Float,
    mass_conversion_factor: Float,
    viscosity_conversion_factor: Float,
    force_conversion_factor: Float,
    pressure_conversion_factor: Float,
    temperature_conversion_factor: Float,
    thermal_diffusivity_conversion_factor: Float,
    specific_heat_conversion_factor: Float,
    thermal_conductivity_conversion_factor: Float,
}

impl UnitConverter {
    pub fn new(delta_x: Float, delta_t: Float, physical: PhysicalParameters) -> Self {
        let length_conversion_factor = delta_x;
        let time_conversion_factor = delta_t;
        let velocity_conversion_factor = delta_x / delta_t;
        let density_conversion_factor = physical.density;
        let mass_conversion_factor = density_conversion_factor * delta_x.powi(3);
        let viscosity_conversion_factor = delta_x * delta_x / delta_t;
        let force_conversion_factor = mass_conversion_factor * delta_x / (delta_t * delta_t);
        let pressure_conversion_factor =
            density_conversion_factor * velocity_conversion_factor * velocity_conversion_factor;
        let temperature_conversion_factor = physical.high_temperature - physical.low_temperature;
        let thermal_diffusivity_conversion_factor = viscosity_conversion_factor;
        let specific_heat_conversion_factor =
            velocity_conversion_factor * velocity_conversion_factor / temperature_conversion_factor;
        let thermal_conductivity_conversion_factor =
            force_conversion_factor / time_conversion_factor / temperature_conversion_factor;

        let lattice_viscosity = physical.viscosity / viscosity_conversion_factor;
        let tau = lattice_viscosity * CS_2_INV + 0.5;
        let physical_thermal_diffusivity = physical.thermal_conductivity
            / (physical.density * physical.specific_heat_capacity);
        let lattice_thermal_diffusivity =
            physical_thermal_diffusivity / thermal_diffusivity_conversion_factor;
        let thermal_tau = lattice_thermal_diffusivity * THERMAL_CS_2_INV + 0.5;

        UnitConverter {
            physical,
            delta_x,
            delta_t,
            tau,
            thermal_tau,
            length_conversion_factor,
            time_conversion_factor,
            velocity_conversion_factor,
            density_conversion_factor,
            mass_conversion_factor,
            viscosity_conversion_factor,
            force_conversion_factor,
            pressure_conversion_factor,
            temperature_conversion_factor,
            thermal_diffusivity_conversion_factor,
            specific_heat_conversion_factor,
            thermal_conductivity_conversion_factor,
        }
    }

    /// Chooses the time step that gives the hydrodynamic lattice the
    /// relaxation time `tau` at spacing `delta_x`.
    pub fn from_relaxation_time(delta_x: Float, tau: Float, physical: PhysicalParameters) -> Self {
        let delta_t = (tau - 0.5) * delta_x * delta_x / (physical.viscosity * CS_2_INV);
        UnitConverter::new(delta_x, delta_t, physical)
    }
}

impl UnitConverter {
    pub fn get_physical_parameters(&self) -> &PhysicalParameters {
        &self.physical
    }

    pub fn get_delta_x(&self) -> Float {
        self.delta_x
    }

    pub fn get_delta_t(&self) -> Float {
        self.delta_t
    }

    pub fn get_tau(&self) -> Float {
        self.tau
    }

    pub fn get_omega(&self) -> Float {
        1.0 / self.tau
    }

    pub fn get_thermal_tau(&self) -> Float {
        self.thermal_tau
    }

    pub fn get_thermal_omega(&self) -> Float {
        1.0 / self.thermal_tau
    }

    pub fn get_length_conversion_factor(&self) -> Float {
        self.length_conversion_factor
    }

    pub fn get_time_conversion_factor(&self) -> Float {
        self.time_conversion_factor
    }

    pub fn get_velocity_conversion_factor(&self) -> Float {
        self.velocity_conversion_factor
    }

    pub fn get_density_conversion_factor(&self) -> Float {
        self.density_conversion_factor
    }

    pub fn get_mass_conversion_factor(&self) -> Float {
        self.mass_conversion_factor
    }

    pub fn get_viscosity_conversion_factor(&self) -> Float {
        self.viscosity_conversion_factor
    }

    pub fn get_force_conversion_factor(&self) -> Float {
        self.force_conversion_factor
    }

    pub fn get_pressure_conversion_factor(&self) -> Float {
        self.pressure_conversion_factor
    }

    pub fn get_temperature_conversion_factor(&self) -> Float {
        self.temperature_conversion_factor
    }

    pub fn get_thermal_diffusivity_conversion_factor(&self) -> Float {
        self.thermal_diffusivity_conversion_factor
    }

    pub fn get_specific_heat_conversion_factor(&self) -> Float {
        self.specific_heat_conversion_factor
    }

    pub fn get_thermal_conductivity_conversion_factor(&self) -> Float {
        self.thermal_conductivity_conversion_factor
    }
}

impl UnitConverter {
    pub fn get_lattice_length(&self, physical_length: Float) -> Float {
        physical_length / self.length_conversion_factor
    }

    pub fn get_characteristic_lattice_velocity(&self) -> Float {
        self.physical.characteristic_velocity / self.velocity_conversion_factor
    }

    pub fn get_lattice_specific_heat_capacity(&self, specific_heat_capacity: Float) -> Float {
        specific_heat_capacity / self.specific_heat_conversion_factor
    }

    pub fn get_lattice_thermal_conductivity(&self, thermal_conductivity: Float) -> Float {
        thermal_conductivity / self.thermal_conductivity_conversion_factor
    }

    pub fn get_reynolds_number(&self) -> Float {
        self.physical.characteristic_velocity * self.physical.characteristic_length
            / self.physical.viscosity
    }

    pub fn get_prandtl_number(&self) -> Float {
        self.physical.viscosity * self.physical.density * self.physical.specific_heat_capacity
            / self.physical.thermal_conductivity
    }

    /// Nearest non-negative number of time steps covering `physical_time`.
    pub fn physical_time_to_steps(&self, physical_time: Float) -> usize {
        let steps = (physical_time / self.time_conversion_factor + 0.5).floor();
        if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        }
    }

    pub fn steps_to_physical_time(&self, steps: usize) -> Float {
        steps as Float * self.time_conversion_factor
    }

    pub fn get_physical_velocity(&self, lattice_velocity: Float) -> Float {
        lattice_velocity * self.velocity_conversion_factor
    }

    pub fn get_physical_pressure(&self, lattice_density: Float) -> Float {
        (lattice_density - LATTICE_DENSITY) * CS_2 * self.pressure_conversion_factor
    }

    pub fn get_physical_force(&self, lattice_force: Float) -> Float {
        lattice_force * self.force_conversion_factor
    }

    /// Lattice temperatures map `0.5` to the low and `1.5` to the high
    /// characteristic temperature.
    pub fn get_physical_temperature(&self, lattice_temperature: Float) -> Float {
        (lattice_temperature - 0.5) * self.temperature_conversion_factor
            + self.physical.low_temperature
    }

    pub fn get_lattice_temperature(&self, physical_temperature: Float) -> Float {
        (physical_temperature - self.physical.low_temperature) / self.temperature_conversion_factor
            + 0.5
    }
}

impl UnitConverter {
    pub fn print(&self) {
        println!("{}", "Unit conversion".yellow().bold());
        println!("  Reynolds number:              {:.6e}", self.get_reynolds_number());
        println!("  Prandtl number:               {:.6e}", self.get_prandtl_number());
        println!("  delta x [m]:                  {:.6e}", self.delta_x);
        println!("  delta t [s]:                  {:.6e}", self.delta_t);
        println!("  relaxation time:              {:.6}", self.tau);
        println!("  thermal relaxation time:      {:.6}", self.thermal_tau);
        println!(
            "  characteristic lattice speed: {:.6e}",
            self.get_characteristic_lattice_velocity()
        );
        println!("  velocity factor:              {:.6e}", self.velocity_conversion_factor);
        println!("  pressure factor:              {:.6e}", self.pressure_conversion_factor);
        println!("  force factor:                 {:.6e}", self.force_conversion_factor);
        println!("  temperature factor:           {:.6e}", self.temperature_conversion_factor);
        println!(
            "  specific heat factor:         {:.6e}",
            self.specific_heat_conversion_factor
        );
        println!();
    }
}

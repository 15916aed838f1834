// ------------------------------------------------------------------------------- MODULES

pub mod bc;
pub mod dynamics;
mod lattice;
mod node;

// ------------------------------------------------------------------------------- IMPORTS

use crate::dynamics::DynamicsAssignment;
use crate::error::SetupError;
use crate::prelude_crate::*;
pub use dynamics::Dynamics;
pub use lattice::Lattice;
pub use node::Node;

// -------------------------------------------------------------------- STRUCT: Parameters

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub omega: Float,
    pub dynamics: DynamicsAssignment<Dynamics>,
    pub inlet_velocity: [Float; 3],
    pub outlet_density: Float,
    pub initial_density: Float,
    pub initial_velocity: [Float; 3],
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            omega: 1.0,
            dynamics: DynamicsAssignment::default(),
            inlet_velocity: [0.0; 3],
            outlet_density: LATTICE_DENSITY,
            initial_density: LATTICE_DENSITY,
            initial_velocity: [0.0; 3],
        }
    }
}

impl Parameters {
    pub(crate) fn validate(&self) -> Result<(), SetupError> {
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(SetupError::InvalidParameter {
                name: "omega",
                reason: format!("{} is outside (0, 2)", self.omega),
            });
        }
        if !(self.initial_density > 0.0 && self.outlet_density > 0.0) {
            return Err(SetupError::InvalidParameter {
                name: "density",
                reason: "initial and outlet densities must be positive".to_string(),
            });
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------- MODULES

pub mod bc;
pub mod dynamics;
pub mod enthalpy;
mod lattice;
mod node;

// ------------------------------------------------------------------------------- IMPORTS

use crate::dynamics::DynamicsAssignment;
use crate::error::SetupError;
use crate::prelude_crate::*;
pub use dynamics::Dynamics;
pub use enthalpy::PhaseChange;
pub use lattice::Lattice;
pub use node::Node;

// -------------------------------------------------------------- STRUCT: InitialCondition

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCondition {
    pub enthalpy: Float,
    pub velocity: [Float; 3],
}

// -------------------------------------------------------------------- STRUCT: Parameters

/// Thermal lattice setup. `initial_conditions` is indexed by material id.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub phase_change: PhaseChange,
    pub dynamics: DynamicsAssignment<Dynamics>,
    pub inlet_enthalpy: Float,
    pub inlet_velocity: [Float; 3],
    pub cooled_wall_enthalpy: Float,
    pub initial_conditions: [InitialCondition; NUMBER_OF_MATERIALS],
}

impl Parameters {
    pub(crate) fn validate(&self) -> Result<(), SetupError> {
        self.phase_change.validate()?;
        let all_finite = self
            .initial_conditions
            .iter()
            .all(|ic| ic.enthalpy.is_finite() && ic.velocity.iter().all(|u| u.is_finite()));
        if !all_finite || !self.inlet_enthalpy.is_finite() || !self.cooled_wall_enthalpy.is_finite() {
            return Err(SetupError::InvalidParameter {
                name: "enthalpy",
                reason: "initial and boundary values must be finite".to_string(),
            });
        }
        Ok(())
    }
}

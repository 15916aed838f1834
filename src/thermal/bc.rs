use super::enthalpy::PhaseChange;
use super::Node;
use crate::prelude_crate::*;
use crate::velocity_set::D3Q7;

pub use BoundaryCondition::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    /// Fixed enthalpy advected with a fixed velocity.
    Dirichlet { enthalpy: Float, velocity: [Float; 3] },
    /// Zero gradient along the outward normal.
    ConvectiveOutflow,
}

// ---------------------------------------------------------------- STRUCT: ThermalBoundary

/// Boundary cell and the interior cell it copies from, when the condition
/// needs one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalBoundary {
    pub cell: usize,
    pub neighbor: Option<usize>,
    pub condition: BoundaryCondition,
}

impl Node {
    /// Replaces the populations by the equilibrium of the wall state, so the
    /// wall temperature is the one the bulk phase-change model assigns to
    /// `enthalpy`.
    pub(crate) fn compute_dirichlet_bc(
        &mut self,
        enthalpy: Float,
        velocity: &[Float; 3],
        phase_change: &PhaseChange,
    ) {
        let g = kernel::total_enthalpy_equilibrium(
            enthalpy,
            phase_change.compute_temperature(enthalpy),
            phase_change.get_reference_specific_heat(),
            velocity,
            &D3Q7,
        );
        self.set_velocity(*velocity);
        self.set_g(g);
    }

    pub(crate) fn compute_outflow_bc(&mut self, neighbor: &Node) {
        self.set_g(*neighbor.get_g_star());
    }
}

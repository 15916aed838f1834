use super::enthalpy::PhaseChange;
use super::Node;
use crate::dynamics::DynamicsAssignment;
use crate::geometry::Material;
use crate::prelude_crate::*;
use crate::velocity_set::{Q7, D3Q7};

// ----------------------------------------------------------------------- ENUM: Dynamics

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dynamics {
    Inert,
    /// Two-relaxation-time advection-diffusion of the total enthalpy.
    TotalEnthalpyTrt,
    /// Full-way bounce-back: an adiabatic wall.
    BounceBack,
    /// Populations pass through unchanged; their values are set by a
    /// boundary rule after streaming.
    NoDynamics,
}

impl Dynamics {
    pub fn is_active(self) -> bool {
        !matches!(self, Dynamics::Inert)
    }

    pub fn is_emitter(self) -> bool {
        self.is_active()
    }
}

impl Default for DynamicsAssignment<Dynamics> {
    fn default() -> Self {
        DynamicsAssignment::new([Dynamics::Inert; NUMBER_OF_MATERIALS])
            .with(Material::Fluid, Dynamics::TotalEnthalpyTrt)
            .with(Material::Inlet, Dynamics::TotalEnthalpyTrt)
            .with(Material::CooledWall, Dynamics::TotalEnthalpyTrt)
            .with(Material::Wall, Dynamics::BounceBack)
            .with(Material::Outlet, Dynamics::NoDynamics)
    }
}

impl Node {
    pub(crate) fn compute_collision(&mut self, phase_change: &PhaseChange) {
        if !self.get_dynamics().is_active() {
            return;
        }
        let enthalpy = self.compute_enthalpy();
        self.update_phase_state(enthalpy, phase_change);
        let g = self.get_g();
        let g_star = match self.get_dynamics() {
            Dynamics::Inert => return,
            Dynamics::NoDynamics => *g,
            Dynamics::BounceBack => {
                let mut g_star = [0.0; Q7];
                (0..Q7).for_each(|i| g_star[i] = g[D3Q7.get_opposite_direction(i)]);
                g_star
            }
            Dynamics::TotalEnthalpyTrt => {
                let omega_minus = phase_change.compute_omega_minus(self.get_liquid_fraction());
                let omega_plus = phase_change.compute_omega_plus(omega_minus);
                let g_eq = kernel::total_enthalpy_equilibrium(
                    enthalpy,
                    self.get_temperature(),
                    phase_change.get_reference_specific_heat(),
                    self.get_velocity(),
                    &D3Q7,
                );
                kernel::trt_collision(g, &g_eq, omega_plus, omega_minus, &D3Q7)
            }
        };
        self.set_g_star(g_star);
    }
}

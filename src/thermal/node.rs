use super::dynamics::Dynamics;
use super::enthalpy::PhaseChange;
use crate::geometry::Material;
use crate::prelude_crate::*;
use crate::velocity_set::{Q7, D3Q7};

// -------------------------------------------------------------------------- STRUCT: Node

/// Thermal lattice cell. The enthalpy is the zeroth moment of `g`; the
/// temperature and the liquid fraction follow from it at every collision.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    material: Material,
    dynamics: Dynamics,
    g: [Float; Q7],
    g_star: [Float; Q7],
    enthalpy: Float,
    temperature: Float,
    liquid_fraction: Float,
    velocity: [Float; 3],
}

impl Node {
    pub fn new(material: Material, dynamics: Dynamics) -> Self {
        Node {
            material,
            dynamics,
            g: [0.0; Q7],
            g_star: [0.0; Q7],
            enthalpy: 0.0,
            temperature: 0.0,
            liquid_fraction: 0.0,
            velocity: [0.0; 3],
        }
    }

    pub fn inert() -> Self {
        Node::new(Material::Inert, Dynamics::Inert)
    }
}

impl Node {
    pub fn get_material(&self) -> Material {
        self.material
    }

    pub fn get_dynamics(&self) -> Dynamics {
        self.dynamics
    }

    pub fn get_g(&self) -> &[Float; Q7] {
        &self.g
    }

    pub(crate) fn set_g(&mut self, g: [Float; Q7]) {
        self.g = g;
    }

    pub fn get_g_star(&self) -> &[Float; Q7] {
        &self.g_star
    }

    pub(crate) fn set_g_star(&mut self, g_star: [Float; Q7]) {
        self.g_star = g_star;
    }

    pub fn get_enthalpy(&self) -> Float {
        self.enthalpy
    }

    pub fn get_temperature(&self) -> Float {
        self.temperature
    }

    pub fn get_liquid_fraction(&self) -> Float {
        self.liquid_fraction
    }

    pub fn get_velocity(&self) -> &[Float; 3] {
        &self.velocity
    }

    pub(crate) fn set_velocity(&mut self, velocity: [Float; 3]) {
        self.velocity = velocity;
    }

    pub fn is_active(&self) -> bool {
        self.dynamics.is_active()
    }
}

impl Node {
    pub(crate) fn compute_enthalpy(&self) -> Float {
        self.g.iter().sum::<Float>()
    }

    pub(crate) fn update_phase_state(&mut self, enthalpy: Float, phase_change: &PhaseChange) {
        self.enthalpy = enthalpy;
        self.temperature = phase_change.compute_temperature(enthalpy);
        self.liquid_fraction = phase_change.compute_liquid_fraction(enthalpy);
    }

    /// Equilibrium populations of the given enthalpy, advected with `velocity`.
    pub(crate) fn initialize(&mut self, enthalpy: Float, velocity: [Float; 3], phase_change: &PhaseChange) {
        self.velocity = velocity;
        self.update_phase_state(enthalpy, phase_change);
        self.g = kernel::total_enthalpy_equilibrium(
            enthalpy,
            self.temperature,
            phase_change.get_reference_specific_heat(),
            &velocity,
            &D3Q7,
        );
        self.g_star = self.g;
    }
}

use super::dynamics::Dynamics;
use crate::geometry::Material;
use crate::prelude_crate::*;
use crate::velocity_set::{Q19, D3Q19};

// -------------------------------------------------------------------------- STRUCT: Node

/// Hydrodynamic lattice cell.
///
/// Besides the populations the cell stores the moments of its last collision
/// (density, velocity and non-equilibrium stress), which the open boundaries
/// of neighboring cells read, and the fields written by the phase-change
/// coupling.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    material: Material,
    dynamics: Dynamics,
    f: [Float; Q19],
    f_star: [Float; Q19],
    density: Float,
    velocity: [Float; 3],
    pi_neq: [Float; 6],
    solid_fraction: Float,
    solid_velocity: [Float; 3],
    force: [Float; 3],
    penalization_force: [Float; 3],
}

impl Node {
    pub fn new(material: Material, dynamics: Dynamics) -> Self {
        Node {
            material,
            dynamics,
            f: [0.0; Q19],
            f_star: [0.0; Q19],
            density: LATTICE_DENSITY,
            velocity: [0.0; 3],
            pi_neq: [0.0; 6],
            solid_fraction: 0.0,
            solid_velocity: [0.0; 3],
            force: [0.0; 3],
            penalization_force: [0.0; 3],
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

    pub fn get_f(&self) -> &[Float; Q19] {
        &self.f
    }

    pub(crate) fn set_f(&mut self, f: [Float; Q19]) {
        self.f = f;
    }

    pub fn get_f_star(&self) -> &[Float; Q19] {
        &self.f_star
    }

    pub(crate) fn set_f_star(&mut self, f_star: [Float; Q19]) {
        self.f_star = f_star;
    }

    pub fn get_density(&self) -> Float {
        self.density
    }

    pub fn get_velocity(&self) -> &[Float; 3] {
        &self.velocity
    }

    pub fn get_pi_neq(&self) -> &[Float; 6] {
        &self.pi_neq
    }

    pub fn get_solid_fraction(&self) -> Float {
        self.solid_fraction
    }

    pub(crate) fn set_solid_fraction(&mut self, solid_fraction: Float) {
        self.solid_fraction = solid_fraction.clamp(0.0, 1.0);
    }

    pub fn get_solid_velocity(&self) -> &[Float; 3] {
        &self.solid_velocity
    }

    pub(crate) fn set_solid_velocity(&mut self, solid_velocity: [Float; 3]) {
        self.solid_velocity = solid_velocity;
    }

    pub fn get_force(&self) -> &[Float; 3] {
        &self.force
    }

    pub(crate) fn set_force(&mut self, force: [Float; 3]) {
        self.force = force;
    }

    /// Momentum exchanged with the solid phase during the last collision,
    /// `B rho (u_s - u)`. The solid collision operator already applies it
    /// through the blended equilibrium, so the value is only reported and
    /// never fed back into a collision.
    pub fn get_penalization_force(&self) -> &[Float; 3] {
        &self.penalization_force
    }

    /// Body force plus the penalization force of the last collision.
    pub fn get_total_force(&self) -> [Float; 3] {
        [0, 1, 2].map(|x| self.force[x] + self.penalization_force[x])
    }

    pub fn is_active(&self) -> bool {
        self.dynamics.is_active()
    }
}

impl Node {
    /// Sets the populations to the equilibrium of the given state.
    pub(crate) fn initialize(&mut self, density: Float, velocity: [Float; 3]) {
        self.density = density;
        self.velocity = velocity;
        self.f = kernel::equilibrium(density, &velocity, &D3Q19);
        self.f_star = self.f;
        self.pi_neq = [0.0; 6];
    }

    pub(crate) fn compute_density(&self) -> Float {
        self.f.iter().sum::<Float>()
    }

    /// Velocity of the populations, shifted by half the body force.
    pub(crate) fn compute_velocity(&self, density: Float) -> [Float; 3] {
        let c = D3Q19.get_c();
        let mut momentum = [0.0; 3];
        self.f.iter().zip(c.iter()).for_each(|(f_i, c_i)| {
            (0..3).for_each(|x| momentum[x] += f_i * c_i[x] as Float);
        });
        [0, 1, 2].map(|x| (momentum[x] + 0.5 * self.force[x] * DELTA_T) / density)
    }

    pub(crate) fn set_moments(&mut self, density: Float, velocity: [Float; 3], pi_neq: [Float; 6]) {
        self.density = density;
        self.velocity = velocity;
        self.pi_neq = pi_neq;
    }

    pub(crate) fn set_penalization_force(&mut self, penalization_force: [Float; 3]) {
        self.penalization_force = penalization_force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initialize_recovers_moments() {
        let mut node = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        node.initialize(1.02, [0.01, -0.02, 0.005]);
        let density = node.compute_density();
        let velocity = node.compute_velocity(density);
        assert_relative_eq!(density, 1.02, epsilon = 1e-14);
        assert_relative_eq!(velocity[0], 0.01, epsilon = 1e-14);
        assert_relative_eq!(velocity[1], -0.02, epsilon = 1e-14);
        assert_relative_eq!(velocity[2], 0.005, epsilon = 1e-14);
        assert_eq!(node.get_f(), node.get_f_star());
    }

    #[test]
    fn test_velocity_includes_half_force() {
        let mut node = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        node.initialize(1.0, [0.0; 3]);
        node.set_force([2e-4, 0.0, 0.0]);
        let velocity = node.compute_velocity(1.0);
        assert_relative_eq!(velocity[0], 1e-4, epsilon = 1e-16);
    }

    #[test]
    fn test_solid_fraction_is_clamped() {
        let mut node = Node::new(Material::Fluid, Dynamics::PartiallySaturatedBgk);
        node.set_solid_fraction(1.3);
        assert_eq!(node.get_solid_fraction(), 1.0);
        node.set_solid_fraction(-0.1);
        assert_eq!(node.get_solid_fraction(), 0.0);
    }
}

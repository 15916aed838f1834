use super::Node;
use crate::dynamics::DynamicsAssignment;
use crate::geometry::Material;
use crate::prelude_crate::*;
use crate::velocity_set::D3Q19;

// ----------------------------------------------------------------------- ENUM: Dynamics

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dynamics {
    /// Outside the computational domain: never touched.
    Inert,
    /// Populations are kept as they are; wall cells whose missing links are
    /// rebuilt by their fluid neighbors.
    NoDynamics,
    /// Forced partially saturated BGK.
    PartiallySaturatedBgk,
}

impl Dynamics {
    pub fn is_active(self) -> bool {
        !matches!(self, Dynamics::Inert)
    }

    /// Cells that stream their populations to their neighbors.
    pub fn is_emitter(self) -> bool {
        matches!(self, Dynamics::PartiallySaturatedBgk)
    }
}

impl Default for DynamicsAssignment<Dynamics> {
    fn default() -> Self {
        DynamicsAssignment::new([Dynamics::Inert; NUMBER_OF_MATERIALS])
            .with(Material::Fluid, Dynamics::PartiallySaturatedBgk)
            .with(Material::Inlet, Dynamics::PartiallySaturatedBgk)
            .with(Material::Outlet, Dynamics::PartiallySaturatedBgk)
            .with(Material::Wall, Dynamics::NoDynamics)
            .with(Material::CooledWall, Dynamics::NoDynamics)
    }
}

impl Node {
    pub(crate) fn compute_collision(&mut self, omega: Float) {
        match self.get_dynamics() {
            Dynamics::Inert => {}
            Dynamics::NoDynamics => {
                let density = self.compute_density();
                self.set_moments(density, [0.0; 3], [0.0; 6]);
                self.set_f_star(*self.get_f());
            }
            Dynamics::PartiallySaturatedBgk => self.compute_psm_collision(omega),
        }
    }

    fn compute_psm_collision(&mut self, omega: Float) {
        let f = self.get_f();
        let density = self.compute_density();
        let velocity = self.compute_velocity(density);
        let f_eq = kernel::equilibrium(density, &velocity, &D3Q19);
        let pi_neq = kernel::non_equilibrium_stress(f, &f_eq, &D3Q19);
        let source = kernel::momentum_source_term(&velocity, self.get_force(), omega, &D3Q19);
        let solid_fraction = self.get_solid_fraction();

        let (mut f_star, weight) = if solid_fraction < SOLID_FRACTION_THRESHOLD {
            (kernel::bgk_collision(f, &f_eq, omega), 0.0)
        } else {
            let f_eq_solid = kernel::equilibrium(density, self.get_solid_velocity(), &D3Q19);
            let f_star = kernel::psm_collision(f, &f_eq, &f_eq_solid, solid_fraction, omega);
            (f_star, kernel::psm_weight(solid_fraction, omega))
        };
        f_star
            .iter_mut()
            .zip(source.iter())
            .for_each(|(f_i, s_i)| *f_i += (1.0 - weight) * s_i * DELTA_T);

        let solid_velocity = *self.get_solid_velocity();
        let penalization_force =
            [0, 1, 2].map(|x| weight * density * (solid_velocity[x] - velocity[x]));
        self.set_moments(density, velocity, pi_neq);
        self.set_penalization_force(penalization_force);
        self.set_f_star(f_star);
    }
}

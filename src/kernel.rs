use crate::prelude_crate::*;

/// Second-order Maxwell-Boltzmann equilibrium of the hydrodynamic lattice.
pub(crate) fn equilibrium<const Q: usize>(
    density: Float,
    velocity: &[Float; 3],
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; Q] {
    let w = vel_set_params.get_w();
    let cs_2_inv = vel_set_params.get_cs_2_inv();
    let cs_4_inv = cs_2_inv * cs_2_inv;
    let u_dot_u = velocity.iter().map(|u_x| u_x * u_x).sum::<Float>();
    let mut f_eq = [0.0; Q];
    (0..Q).for_each(|i| {
        let u_dot_c = vel_set_params.c_dot(i, velocity);
        f_eq[i] = w[i]
            * density
            * (1.0 + u_dot_c * cs_2_inv + 0.5 * u_dot_c * u_dot_c * cs_4_inv
                - 0.5 * u_dot_u * cs_2_inv);
    });
    f_eq
}

/// Equilibrium of the total-enthalpy advection-diffusion scheme. The rest
/// population carries the latent part `H - cp_ref T` so that the zeroth
/// moment is the enthalpy while the gradient part diffuses `cp_ref T`.
pub(crate) fn total_enthalpy_equilibrium<const Q: usize>(
    enthalpy: Float,
    temperature: Float,
    cp_ref: Float,
    velocity: &[Float; 3],
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; Q] {
    let w = vel_set_params.get_w();
    let cs_2_inv = vel_set_params.get_cs_2_inv();
    let sensible = cp_ref * temperature;
    let mut g_eq = [0.0; Q];
    (0..Q).for_each(|i| {
        let u_dot_c = vel_set_params.c_dot(i, velocity);
        g_eq[i] = w[i] * sensible * (1.0 + u_dot_c * cs_2_inv);
    });
    g_eq[0] += enthalpy - sensible;
    g_eq
}

pub(crate) fn bgk_collision<const Q: usize>(
    f: &[Float; Q],
    f_eq: &[Float; Q],
    omega: Float,
) -> [Float; Q] {
    let omega_prime = 1.0 - omega * DELTA_T;
    let mut f_star = [0.0; Q];
    (0..Q).for_each(|i| {
        f_star[i] = omega_prime * f[i] + omega * DELTA_T * f_eq[i];
    });
    f_star
}

pub(crate) fn trt_collision<const Q: usize>(
    f: &[Float; Q],
    f_eq: &[Float; Q],
    omega_plus: Float,
    omega_minus: Float,
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; Q] {
    let mut f_star = [0.0; Q];
    (0..Q).for_each(|i| {
        let i_bar = vel_set_params.get_opposite_direction(i);
        let f_plus = 0.5 * (f[i] + f[i_bar]);
        let f_eq_plus = 0.5 * (f_eq[i] + f_eq[i_bar]);
        let f_minus = 0.5 * (f[i] - f[i_bar]);
        let f_eq_minus = 0.5 * (f_eq[i] - f_eq[i_bar]);
        f_star[i] = f[i]
            - omega_plus * DELTA_T * (f_plus - f_eq_plus)
            - omega_minus * DELTA_T * (f_minus - f_eq_minus);
    });
    f_star
}

/// Weight of the solid collision operator of the partially saturated
/// method for a cell with solid fraction `solid_fraction`.
pub(crate) fn psm_weight(solid_fraction: Float, omega: Float) -> Float {
    let tau_shifted = 1.0 / omega - 0.5;
    solid_fraction * tau_shifted / ((1.0 - solid_fraction) + tau_shifted)
}

/// Partially saturated BGK collision.
///
/// The fluid part relaxes towards `f_eq(rho, u)` at rate `omega`, the solid
/// part applies the superposition operator towards `f_eq(rho, u_s)`. With a
/// solid fraction of one the post-collision momentum is exactly `rho u_s`,
/// with zero the operator is the plain BGK rule.
pub(crate) fn psm_collision<const Q: usize>(
    f: &[Float; Q],
    f_eq: &[Float; Q],
    f_eq_solid: &[Float; Q],
    solid_fraction: Float,
    omega: Float,
) -> [Float; Q] {
    let weight = psm_weight(solid_fraction, omega);
    let mut f_star = [0.0; Q];
    (0..Q).for_each(|i| {
        let non_equilibrium = f[i] - f_eq[i];
        let omega_solid = f_eq_solid[i] - f[i] + (1.0 - omega * DELTA_T) * non_equilibrium;
        f_star[i] = f[i] - (1.0 - weight) * omega * DELTA_T * non_equilibrium + weight * omega_solid;
    });
    f_star
}

/// Guo forcing term.
pub(crate) fn momentum_source_term<const Q: usize>(
    velocity: &[Float; 3],
    force: &[Float; 3],
    omega: Float,
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; Q] {
    let c = vel_set_params.get_c();
    let w = vel_set_params.get_w();
    let cs_2_inv = vel_set_params.get_cs_2_inv();
    let cs_4_inv = cs_2_inv * cs_2_inv;
    let coeff_b = 1.0 - 0.5 * omega * DELTA_T;
    let mut source_term = [0.0; Q];
    (0..Q).for_each(|i| {
        let u_dot_c = vel_set_params.c_dot(i, velocity);
        source_term[i] = coeff_b
            * w[i]
            * (0..3)
                .map(|x| {
                    let c_ix = c[i][x] as Float;
                    (cs_2_inv * (c_ix - velocity[x]) + cs_4_inv * u_dot_c * c_ix) * force[x]
                })
                .sum::<Float>();
    });
    source_term
}

/// Components of a symmetric 3x3 tensor stored as `[xx, yy, zz, xy, xz, yz]`.
pub(crate) const TENSOR_INDICES: [(usize, usize); 6] =
    [(0, 0), (1, 1), (2, 2), (0, 1), (0, 2), (1, 2)];

pub(crate) fn non_equilibrium_stress<const Q: usize>(
    f: &[Float; Q],
    f_eq: &[Float; Q],
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; 6] {
    let c = vel_set_params.get_c();
    let mut pi_neq = [0.0; 6];
    TENSOR_INDICES
        .iter()
        .enumerate()
        .for_each(|(k, &(a, b))| {
            pi_neq[k] = (0..Q)
                .map(|i| (c[i][a] * c[i][b]) as Float * (f[i] - f_eq[i]))
                .sum::<Float>();
        });
    pi_neq
}

/// Populations rebuilt from an equilibrium state and a non-equilibrium stress.
pub(crate) fn regularized_populations<const Q: usize>(
    density: Float,
    velocity: &[Float; 3],
    pi_neq: &[Float; 6],
    vel_set_params: &velocity_set::Parameters<Q>,
) -> [Float; Q] {
    let c = vel_set_params.get_c();
    let w = vel_set_params.get_w();
    let cs_2 = 1.0 / vel_set_params.get_cs_2_inv();
    let cs_4_inv = vel_set_params.get_cs_2_inv() * vel_set_params.get_cs_2_inv();
    let mut f = equilibrium(density, velocity, vel_set_params);
    (0..Q).for_each(|i| {
        let q_dot_pi = TENSOR_INDICES
            .iter()
            .zip(pi_neq.iter())
            .map(|(&(a, b), pi_ab)| {
                let delta = if a == b { cs_2 } else { 0.0 };
                let multiplicity = if a == b { 1.0 } else { 2.0 };
                multiplicity * ((c[i][a] * c[i][b]) as Float - delta) * pi_ab
            })
            .sum::<Float>();
        f[i] += 0.5 * w[i] * cs_4_inv * q_dot_pi;
    });
    f
}

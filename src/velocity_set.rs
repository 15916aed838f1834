// ------------------------------------------------------------------------------- MODULES

mod d3q19;
mod d3q7;

// ------------------------------------------------------------------------------- IMPORTS

use crate::constants::*;

pub const Q19: usize = d3q19::Q;

pub const Q7: usize = d3q7::Q;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocitySet {
    D3Q19 = 0,
    D3Q7 = 1,
}

// -------------------------------------------------------------------- STRUCT: Parameters

#[derive(Debug, PartialEq)]
pub struct Parameters<const Q: usize> {
    pub(crate) velocity_set: VelocitySet,
    pub(crate) c: [[i32; 3]; Q],
    pub(crate) w: [Float; Q],
    pub(crate) q_bar: [usize; Q],
    pub(crate) cs_2_inv: Float,
}

pub const D3Q19: Parameters<Q19> = Parameters {
    velocity_set: VelocitySet::D3Q19,
    c: d3q19::C,
    w: d3q19::W,
    q_bar: d3q19::Q_BAR,
    cs_2_inv: CS_2_INV,
};

pub const D3Q7: Parameters<Q7> = Parameters {
    velocity_set: VelocitySet::D3Q7,
    c: d3q7::C,
    w: d3q7::W,
    q_bar: d3q7::Q_BAR,
    cs_2_inv: THERMAL_CS_2_INV,
};

impl<const Q: usize> Parameters<Q> {
    pub fn get_velocity_set(&self) -> VelocitySet {
        self.velocity_set
    }

    pub fn get_q(&self) -> usize {
        Q
    }

    pub fn get_c(&self) -> &[[i32; 3]; Q] {
        &self.c
    }

    pub fn get_w(&self) -> &[Float; Q] {
        &self.w
    }

    pub fn get_q_bar(&self) -> &[usize; Q] {
        &self.q_bar
    }

    pub fn get_cs_2_inv(&self) -> Float {
        self.cs_2_inv
    }

    pub fn get_opposite_direction(&self, direction: usize) -> usize {
        self.q_bar[direction]
    }

    /// Euclidean length of the discrete velocity `i`.
    pub fn get_c_norm(&self, i: usize) -> Float {
        let c_i = self.c[i];
        ((c_i[0] * c_i[0] + c_i[1] * c_i[1] + c_i[2] * c_i[2]) as Float).sqrt()
    }

    pub(crate) fn c_dot(&self, i: usize, vector: &[Float; 3]) -> Float {
        let c_i = self.c[i];
        c_i[0] as Float * vector[0] + c_i[1] as Float * vector[1] + c_i[2] as Float * vector[2]
    }
}

pub type Float = f64;

pub const DELTA_T: Float = 1.0;

pub const DELTA_X: Float = 1.0;

pub const LATTICE_DENSITY: Float = 1.0;

pub const CS_2: Float = 1.0 / 3.0 * DELTA_X * DELTA_X / DELTA_T / DELTA_T;

pub const CS_2_INV: Float = 3.0;

pub const CS_4_INV: Float = 9.0;

/// Speed of sound squared of the D3Q7 advection-diffusion stencil.
pub const THERMAL_CS_2: Float = 0.25;

pub const THERMAL_CS_2_INV: Float = 4.0;

/// TRT magic parameter of the thermal lattice.
pub const MAGIC_PARAMETER: Float = 0.25;

/// Below this solid fraction the PSM collision falls back to plain BGK.
pub(crate) const SOLID_FRACTION_THRESHOLD: Float = 1e-5;

/// Bouzidi links without a surface intercept fall back to half-way bounce-back.
pub(crate) const DEFAULT_WALL_DISTANCE: Float = 0.5;

pub const NUMBER_OF_MATERIALS: usize = 6;

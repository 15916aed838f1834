use crate::error::SetupError;
use crate::prelude_crate::*;

// ------------------------------------------------------------------- STRUCT: PhaseChange

/// Enthalpy method for a material melting between `solidus_temperature` and
/// `liquidus_temperature`, in lattice units.
///
/// The total enthalpy is `H = cp_s T` in the solid, `H = cp_l T + L` in the
/// liquid, and the liquid fraction grows linearly with `H` across the mushy
/// zone. With equal solidus and liquidus temperatures the mushy zone is an
/// isothermal plateau of width `L`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub solidus_temperature: Float,
    pub liquidus_temperature: Float,
    pub solid_specific_heat: Float,
    pub liquid_specific_heat: Float,
    pub latent_heat: Float,
    pub solid_conductivity: Float,
    pub liquid_conductivity: Float,
}

impl PhaseChange {
    pub(crate) fn validate(&self) -> Result<(), SetupError> {
        let invalid = |name, reason: &str| {
            Err(SetupError::InvalidParameter {
                name,
                reason: reason.to_string(),
            })
        };
        if self.liquidus_temperature < self.solidus_temperature {
            return invalid("liquidus_temperature", "below the solidus temperature");
        }
        if !(self.solid_specific_heat > 0.0 && self.liquid_specific_heat > 0.0) {
            return invalid("specific_heat", "must be positive");
        }
        if self.latent_heat < 0.0 {
            return invalid("latent_heat", "must not be negative");
        }
        if !(self.solid_conductivity > 0.0 && self.liquid_conductivity > 0.0) {
            return invalid("conductivity", "must be positive");
        }
        if self.get_solidus_enthalpy() >= self.get_liquidus_enthalpy() {
            return invalid("latent_heat", "the mushy zone has no enthalpy range");
        }
        Ok(())
    }

    /// Harmonic mean of the solid and liquid specific heats.
    pub fn get_reference_specific_heat(&self) -> Float {
        2.0 * self.solid_specific_heat * self.liquid_specific_heat
            / (self.solid_specific_heat + self.liquid_specific_heat)
    }

    pub fn get_solidus_enthalpy(&self) -> Float {
        self.solid_specific_heat * self.solidus_temperature
    }

    pub fn get_liquidus_enthalpy(&self) -> Float {
        self.liquid_specific_heat * self.liquidus_temperature + self.latent_heat
    }

    pub fn compute_liquid_fraction(&self, enthalpy: Float) -> Float {
        let h_s = self.get_solidus_enthalpy();
        let h_l = self.get_liquidus_enthalpy();
        if enthalpy <= h_s {
            0.0
        } else if enthalpy >= h_l {
            1.0
        } else {
            (enthalpy - h_s) / (h_l - h_s)
        }
    }

    /// Temperature consistent with `enthalpy`. Negative enthalpies are clamped
    /// to zero.
    pub fn compute_temperature(&self, enthalpy: Float) -> Float {
        let enthalpy = enthalpy.max(0.0);
        let h_s = self.get_solidus_enthalpy();
        let h_l = self.get_liquidus_enthalpy();
        if enthalpy <= h_s {
            enthalpy / self.solid_specific_heat
        } else if enthalpy >= h_l {
            (enthalpy - self.latent_heat) / self.liquid_specific_heat
        } else {
            let fraction = (enthalpy - h_s) / (h_l - h_s);
            self.solidus_temperature
                + fraction * (self.liquidus_temperature - self.solidus_temperature)
        }
    }

    /// Inverse of [`PhaseChange::compute_temperature`] outside the mushy zone.
    /// Temperatures inside the melting interval map onto the linear branch.
    pub fn compute_enthalpy(&self, temperature: Float) -> Float {
        if temperature <= self.solidus_temperature {
            self.solid_specific_heat * temperature
        } else if temperature >= self.liquidus_temperature {
            self.liquid_specific_heat * temperature + self.latent_heat
        } else {
            let fraction = (temperature - self.solidus_temperature)
                / (self.liquidus_temperature - self.solidus_temperature);
            let h_s = self.get_solidus_enthalpy();
            h_s + fraction * (self.get_liquidus_enthalpy() - h_s)
        }
    }

    pub fn compute_conductivity(&self, liquid_fraction: Float) -> Float {
        self.solid_conductivity + liquid_fraction * (self.liquid_conductivity - self.solid_conductivity)
    }

    /// Antisymmetric relaxation frequency carrying the local conductivity.
    pub fn compute_omega_minus(&self, liquid_fraction: Float) -> Float {
        let diffusivity = self.compute_conductivity(liquid_fraction) / self.get_reference_specific_heat();
        1.0 / (diffusivity * THERMAL_CS_2_INV + 0.5)
    }

    /// Symmetric relaxation frequency for the magic parameter
    /// `(1/omega_plus - 1/2)(1/omega_minus - 1/2)`.
    pub fn compute_omega_plus(&self, omega_minus: Float) -> Float {
        1.0 / (MAGIC_PARAMETER / (1.0 / omega_minus - 0.5) + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn phase_change() -> PhaseChange {
        PhaseChange {
            solidus_temperature: 0.59,
            liquidus_temperature: 0.59,
            solid_specific_heat: 1.0,
            liquid_specific_heat: 1.0,
            latent_heat: 1.83,
            solid_conductivity: 0.01,
            liquid_conductivity: 0.02,
        }
    }

    fn mushy() -> PhaseChange {
        PhaseChange {
            solidus_temperature: 0.5,
            liquidus_temperature: 0.7,
            solid_specific_heat: 1.0,
            liquid_specific_heat: 2.0,
            latent_heat: 1.0,
            ..phase_change()
        }
    }

    #[test]
    fn test_liquid_fraction_limits() {
        let pc = phase_change();
        assert_eq!(pc.compute_liquid_fraction(pc.get_solidus_enthalpy()), 0.0);
        assert_eq!(pc.compute_liquid_fraction(0.2), 0.0);
        assert_eq!(pc.compute_liquid_fraction(pc.get_liquidus_enthalpy()), 1.0);
        assert_eq!(pc.compute_liquid_fraction(10.0), 1.0);
        assert_relative_eq!(pc.compute_liquid_fraction(0.59 + 0.915), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_temperature_at_phase_limits() {
        let pc = mushy();
        assert_relative_eq!(pc.compute_temperature(pc.get_solidus_enthalpy()), 0.5, epsilon = 1e-14);
        assert_relative_eq!(pc.compute_temperature(pc.get_liquidus_enthalpy()), 0.7, epsilon = 1e-14);
        assert_relative_eq!(pc.compute_temperature(-1.0), 0.0);
    }

    #[test]
    fn test_monotonic_in_mushy_zone() {
        let pc = mushy();
        let h_s = pc.get_solidus_enthalpy();
        let h_l = pc.get_liquidus_enthalpy();
        let samples = (1..100)
            .map(|k| h_s + (h_l - h_s) * k as Float / 100.0)
            .collect::<Vec<Float>>();
        samples.windows(2).for_each(|pair| {
            assert!(pc.compute_liquid_fraction(pair[1]) > pc.compute_liquid_fraction(pair[0]));
            assert!(pc.compute_temperature(pair[1]) >= pc.compute_temperature(pair[0]));
        });
    }

    #[test]
    fn test_enthalpy_inverts_temperature() {
        let pc = mushy();
        [0.1, 0.5, 0.6, 0.7, 1.5].iter().for_each(|&t| {
            assert_relative_eq!(pc.compute_temperature(pc.compute_enthalpy(t)), t, epsilon = 1e-12);
        });
        assert_relative_eq!(phase_change().compute_enthalpy(1.5), 1.5 + 1.83);
    }

    #[test]
    fn test_relaxation_frequencies() {
        let pc = phase_change();
        let tau = 0.8;
        let liquid = PhaseChange {
            liquid_conductivity: pc.get_reference_specific_heat() / THERMAL_CS_2_INV * (tau - 0.5),
            ..pc
        };
        let omega_minus = liquid.compute_omega_minus(1.0);
        assert_relative_eq!(omega_minus, 1.0 / tau, epsilon = 1e-12);
        let omega_plus = liquid.compute_omega_plus(omega_minus);
        assert_relative_eq!((1.0 / omega_plus - 0.5) * (tau - 0.5), MAGIC_PARAMETER, epsilon = 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(phase_change().validate().is_ok());
        let inverted = PhaseChange {
            liquidus_temperature: 0.4,
            ..mushy()
        };
        assert!(inverted.validate().is_err());
        let no_range = PhaseChange {
            latent_heat: 0.0,
            ..phase_change()
        };
        assert!(no_range.validate().is_err());
    }
}

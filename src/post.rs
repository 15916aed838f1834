use crate::prelude_crate::*;

// -------------------------------------------------------------------- STRUCT: Statistics

/// Averages over the active cells of one lattice, taken at collision time.
/// For the thermal lattice `average_density` is the average enthalpy and
/// `average_solid_fraction` is `1 - f_l` averaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub average_density: Float,
    pub maximum_velocity: Float,
    pub number_of_cells: usize,
    pub average_solid_fraction: Float,
}

impl Default for Statistics {
    fn default() -> Self {
        Statistics {
            average_density: LATTICE_DENSITY,
            maximum_velocity: 0.0,
            number_of_cells: 0,
            average_solid_fraction: 0.0,
        }
    }
}

impl Statistics {
    /// `cells` yields `(density, |u|, solid fraction)` for every active cell.
    pub(crate) fn from_cells<I>(cells: I) -> Self
    where
        I: Iterator<Item = (Float, Float, Float)>,
    {
        let mut statistics = Statistics {
            average_density: 0.0,
            ..Default::default()
        };
        let mut solid = 0.0;
        cells.for_each(|(density, speed, solid_fraction)| {
            statistics.average_density += density;
            // NaN must not be hidden by max
            if speed.is_nan() || speed > statistics.maximum_velocity {
                statistics.maximum_velocity = speed;
            }
            solid += solid_fraction;
            statistics.number_of_cells += 1;
        });
        if statistics.number_of_cells > 0 {
            let n = statistics.number_of_cells as Float;
            statistics.average_density /= n;
            statistics.average_solid_fraction = solid / n;
        }
        statistics
    }

    /// Merges the statistics of disjoint sets of cells.
    pub(crate) fn merge(self, other: Statistics) -> Statistics {
        let number_of_cells = self.number_of_cells + other.number_of_cells;
        if number_of_cells == 0 {
            return self;
        }
        let weight = |s: &Statistics| s.number_of_cells as Float / number_of_cells as Float;
        let maximum_velocity = if self.maximum_velocity.is_nan() || other.maximum_velocity.is_nan() {
            Float::NAN
        } else {
            self.maximum_velocity.max(other.maximum_velocity)
        };
        Statistics {
            average_density: weight(&self) * self.average_density
                + weight(&other) * other.average_density,
            maximum_velocity,
            number_of_cells,
            average_solid_fraction: weight(&self) * self.average_solid_fraction
                + weight(&other) * other.average_solid_fraction,
        }
    }

    pub fn has_diverged(&self) -> bool {
        !self.average_density.is_finite()
    }
}

// ------------------------------------------------------------------------- STRUCT: Field

/// Named per-cell field over the whole grid, `components` values per voxel in
/// the linear order of the material grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub components: usize,
    pub values: Vec<Float>,
}

impl Field {
    pub fn scalar(name: &'static str, values: Vec<Float>) -> Self {
        Field {
            name,
            components: 1,
            values,
        }
    }

    pub fn vector(name: &'static str, values: Vec<[Float; 3]>) -> Self {
        Field {
            name,
            components: 3,
            values: values.into_iter().flatten().collect(),
        }
    }

    pub fn get(&self, linear_index: usize) -> &[Float] {
        &self.values[linear_index * self.components..(linear_index + 1) * self.components]
    }
}

// ---------------------------------------------------------------------- STRUCT: FieldSet

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    pub n: [usize; 3],
    pub fields: Vec<Field>,
}

impl FieldSet {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn get_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }
}

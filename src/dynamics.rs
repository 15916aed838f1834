use crate::geometry::Material;
use crate::prelude_crate::*;

// ---------------------------------------------------------- STRUCT: DynamicsAssignment

/// Lookup table from material id to the collision rule of a lattice. It is
/// resolved once per cell when the lattice is built and the result is stored
/// in the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsAssignment<D: Copy> {
    table: [D; NUMBER_OF_MATERIALS],
}

impl<D: Copy> DynamicsAssignment<D> {
    pub fn new(table: [D; NUMBER_OF_MATERIALS]) -> Self {
        DynamicsAssignment { table }
    }

    pub fn with(mut self, material: Material, dynamics: D) -> Self {
        self.table[material.id() as usize] = dynamics;
        self
    }

    pub fn resolve(&self, material: Material) -> D {
        self.table[material.id() as usize]
    }

    pub fn get_table(&self) -> &[D; NUMBER_OF_MATERIALS] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Rule {
        Skip,
        Relax,
    }

    #[test]
    fn test_resolve_and_override() {
        let assignment = DynamicsAssignment::new([Rule::Skip; NUMBER_OF_MATERIALS])
            .with(Material::Fluid, Rule::Relax);
        assert_eq!(assignment.resolve(Material::Fluid), Rule::Relax);
        assert_eq!(assignment.resolve(Material::Wall), Rule::Skip);
        assert_eq!(assignment.resolve(Material::Inert), Rule::Skip);
    }
}

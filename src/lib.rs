pub mod block;
pub mod case;
pub mod cli;
pub mod constants;
pub mod coupling;
pub mod decomposition;
pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod io;
mod kernel;
pub mod momentum;
pub mod post;
mod prelude_crate;
pub mod simulation;
pub mod thermal;
pub mod units;
pub mod velocity_set;

pub mod prelude {
    pub use crate::case;
    pub use crate::cli::{self, Config, LbResult};
    pub use crate::constants::*;
    pub use crate::coupling::{self, CouplingRegion, PhaseChangeCoupling};
    pub use crate::decomposition::Decomposition;
    pub use crate::dynamics::DynamicsAssignment;
    pub use crate::error::SetupError;
    pub use crate::geometry::indicator::{BoundingBox, Cuboid, Cylinder, Indicator, LayerIndicator};
    pub use crate::geometry::surface::TriangleSurface;
    pub use crate::geometry::{self, Material, MaterialGrid, RenameRule};
    pub use crate::io::{ConsoleReporter, CsvWriter};
    pub use crate::momentum;
    pub use crate::post::{Field, FieldSet, Statistics};
    pub use crate::simulation::{self, Diagnostics, RunOutcome, Simulation, State, Termination};
    pub use crate::thermal::{self, InitialCondition, PhaseChange};
    pub use crate::units::{PhysicalParameters, UnitConverter};
    pub use crate::velocity_set::{D3Q19, D3Q7, Q19, Q7};
}

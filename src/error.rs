use crate::prelude_crate::*;
use thiserror::Error;

/// Fatal errors raised while the geometry and the lattices are prepared.
#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("voxel {voxel:?} holds the unresolved material id {material}")]
    UnresolvedMaterial { voxel: [usize; 3], material: u8 },
    #[error(
        "voxel {voxel:?} (material {material}) borders the inert voxel {neighbor:?} without a boundary treatment"
    )]
    MissingBoundaryNeighbor {
        voxel: [usize; 3],
        neighbor: [isize; 3],
        material: u8,
    },
    #[error("the material grid contains no fluid voxel")]
    EmptyDomain,
    #[error("the coupling region {min:?}..{max:?} does not intersect the domain")]
    RegionOutsideDomain { min: [Float; 3], max: [Float; 3] },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

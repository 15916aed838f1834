pub(crate) use crate::cli::LbResult;
pub(crate) use crate::constants::*;

pub(crate) use crate::kernel;
pub(crate) use crate::velocity_set;

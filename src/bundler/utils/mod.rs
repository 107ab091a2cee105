//! Filesystem and process helpers shared by every pipeline step.

pub mod fs;
pub mod process;

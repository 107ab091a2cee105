//! Resource preparation shared by the Apple pipelines.

pub mod icons;

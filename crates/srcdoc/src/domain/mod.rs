//! Document model and domain errors, independent of any output format.

pub mod errors;
pub mod model;

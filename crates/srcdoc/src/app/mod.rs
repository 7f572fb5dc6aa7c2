//! Application layer orchestrating domain logic and infrastructure.

pub mod assemble;
pub mod export;
pub mod format;

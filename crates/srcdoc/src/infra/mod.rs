//! Infrastructure adapters for configuration and document encoding.

pub mod config;
pub mod docx;

//! Shared rule model, pattern syntax and field validation.

pub mod pattern;
pub mod types;
pub mod validation;

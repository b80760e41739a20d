pub mod project;
pub mod rule;

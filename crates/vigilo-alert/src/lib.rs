//! In-memory state shared with the metric evaluation path.
//!
//! [`cache::RuleCache`] holds committed rules keyed by id for fast lookup
//! while metrics are evaluated. [`index::MetricIndex`] answers how many
//! known metric names a rule pattern currently matches.

pub mod cache;
pub mod index;

//! Persistent storage for projects and alerting rules.
//!
//! [`store::AdminStore`] is the SeaORM + SQLite implementation of
//! [`RuleStore`]. Schema migrations are applied on connect.

pub mod entities;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use vigilo_common::types::{NewRule, Project, Rule};

pub use error::{Constraint, Result, StorageError};
pub use store::AdminStore;

/// Transactional CRUD over rule rows, plus the project lookups rules need.
///
/// Every operation is atomic with respect to a single row. Constraint
/// violations come back as [`StorageError::Constraint`], missing rows as
/// [`StorageError::NotFound`].
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Inserts a rule and returns it with its assigned id.
    async fn create_rule(&self, rule: &NewRule) -> Result<Rule>;

    async fn find_rule(&self, id: i64) -> Result<Rule>;

    /// Writes every field of `rule` to the row with the same id and returns
    /// the stored value. Fails with `NotFound` if the row is gone and
    /// `UpdateFailed` for any other error.
    async fn update_rule(&self, rule: &Rule) -> Result<Rule>;

    async fn delete_rule(&self, id: i64) -> Result<()>;

    /// All rules, ordered by id. Used to warm the rule cache.
    async fn list_rules(&self) -> Result<Vec<Rule>>;

    async fn list_project_rules(&self, project_id: i64) -> Result<Vec<Rule>>;

    async fn create_project(&self, name: &str) -> Result<Project>;

    async fn find_project(&self, id: i64) -> Result<Project>;
}

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;
use vigilo_common::types::{NewRule, Project, Rule};

use crate::error::Result;
use crate::RuleStore;

pub mod project;
pub mod rule;

/// Admin database access layer (`vigilo.db`).
///
/// All methods are `async fn` on top of SeaORM + SQLite.
pub struct AdminStore {
    db: DatabaseConnection,
}

impl AdminStore {
    /// Connects to the admin database and runs pending migrations.
    ///
    /// `db_url` example: `sqlite:///data/vigilo.db?mode=rwc`.
    pub async fn connect(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        if db_url.starts_with("sqlite:") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;
        tracing::info!(db_url = %db_url, "Initialized admin store");

        Ok(Self { db })
    }

    /// Opens `vigilo.db` inside `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let url = format!("sqlite://{}?mode=rwc", data_dir.join("vigilo.db").display());
        Self::connect(&url).await
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl RuleStore for AdminStore {
    async fn create_rule(&self, rule: &NewRule) -> Result<Rule> {
        self.insert_rule(rule).await
    }

    async fn find_rule(&self, id: i64) -> Result<Rule> {
        self.get_rule_by_id(id).await
    }

    async fn update_rule(&self, rule: &Rule) -> Result<Rule> {
        self.save_rule(rule).await
    }

    async fn delete_rule(&self, id: i64) -> Result<()> {
        self.delete_rule_by_id(id).await
    }

    async fn list_rules(&self) -> Result<Vec<Rule>> {
        self.list_all_rules().await
    }

    async fn list_project_rules(&self, project_id: i64) -> Result<Vec<Rule>> {
        self.list_rules_by_project(project_id).await
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        self.insert_project(name).await
    }

    async fn find_project(&self, id: i64) -> Result<Project> {
        self.get_project_by_id(id).await
    }
}

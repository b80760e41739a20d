use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // projects first, rules reference them
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id),
    pattern TEXT NOT NULL UNIQUE,
    trend_up INTEGER NOT NULL DEFAULT 0,
    trend_down INTEGER NOT NULL DEFAULT 0,
    threshold_max REAL NOT NULL DEFAULT 0,
    threshold_min REAL NOT NULL DEFAULT 0,
    comment TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 0,
    disabled INTEGER NOT NULL DEFAULT 0,
    disabled_for INTEGER NOT NULL DEFAULT 0,
    disabled_at TEXT NOT NULL,
    track_idle INTEGER NOT NULL DEFAULT 0,
    never_fill_zero INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rules_project_id ON rules(project_id);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS rules;
DROP TABLE IF EXISTS projects;
";

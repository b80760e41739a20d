use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use vigilo_common::types::Project;

use crate::entities::project::{self, Entity};
use crate::error::{Result, StorageError};
use crate::store::AdminStore;

fn to_project(m: project::Model) -> Project {
    Project {
        id: m.id,
        name: m.name,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl AdminStore {
    pub async fn insert_project(&self, name: &str) -> Result<Project> {
        let now = Utc::now().fixed_offset();
        let am = project::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = am.insert(self.db()).await.map_err(StorageError::from_insert)?;
        Ok(to_project(model))
    }

    pub async fn get_project_by_id(&self, id: i64) -> Result<Project> {
        Entity::find_by_id(id)
            .one(self.db())
            .await?
            .map(to_project)
            .ok_or(StorageError::NotFound {
                entity: "project",
                id,
            })
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ActiveValue::Unchanged, ColumnTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use vigilo_common::types::{NewRule, Rule, RuleLevel};

use crate::entities::rule::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::AdminStore;

fn to_rule(m: rule::Model) -> Rule {
    Rule {
        id: m.id,
        project_id: m.project_id,
        pattern: m.pattern,
        trend_up: m.trend_up,
        trend_down: m.trend_down,
        threshold_max: m.threshold_max,
        threshold_min: m.threshold_min,
        comment: m.comment,
        level: RuleLevel::try_from(m.level).unwrap_or_default(),
        disabled: m.disabled,
        disabled_for: m.disabled_for,
        disabled_at: m.disabled_at.with_timezone(&Utc),
        track_idle: m.track_idle,
        never_fill_zero: m.never_fill_zero,
    }
}

impl AdminStore {
    pub async fn insert_rule(&self, new: &NewRule) -> Result<Rule> {
        let now = Utc::now().fixed_offset();
        let am = rule::ActiveModel {
            project_id: Set(new.project_id),
            pattern: Set(new.pattern.clone()),
            trend_up: Set(new.trend_up),
            trend_down: Set(new.trend_down),
            threshold_max: Set(new.threshold_max),
            threshold_min: Set(new.threshold_min),
            comment: Set(new.comment.clone()),
            level: Set(new.level.into()),
            disabled: Set(new.disabled),
            disabled_for: Set(new.disabled_for),
            disabled_at: Set(new.disabled_at.fixed_offset()),
            track_idle: Set(new.track_idle),
            never_fill_zero: Set(new.never_fill_zero),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = am.insert(self.db()).await.map_err(StorageError::from_insert)?;
        Ok(to_rule(model))
    }

    pub async fn get_rule_by_id(&self, id: i64) -> Result<Rule> {
        Entity::find_by_id(id)
            .one(self.db())
            .await?
            .map(to_rule)
            .ok_or(StorageError::NotFound { entity: "rule", id })
    }

    pub async fn save_rule(&self, r: &Rule) -> Result<Rule> {
        let am = rule::ActiveModel {
            id: Unchanged(r.id),
            project_id: Set(r.project_id),
            pattern: Set(r.pattern.clone()),
            trend_up: Set(r.trend_up),
            trend_down: Set(r.trend_down),
            threshold_max: Set(r.threshold_max),
            threshold_min: Set(r.threshold_min),
            comment: Set(r.comment.clone()),
            level: Set(r.level.into()),
            disabled: Set(r.disabled),
            disabled_for: Set(r.disabled_for),
            disabled_at: Set(r.disabled_at.fixed_offset()),
            track_idle: Set(r.track_idle),
            never_fill_zero: Set(r.never_fill_zero),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        match am.update(self.db()).await {
            Ok(model) => Ok(to_rule(model)),
            Err(DbErr::RecordNotUpdated) => Err(StorageError::NotFound {
                entity: "rule",
                id: r.id,
            }),
            Err(e) => Err(StorageError::UpdateFailed(e)),
        }
    }

    pub async fn delete_rule_by_id(&self, id: i64) -> Result<()> {
        let res = Entity::delete_by_id(id).exec(self.db()).await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound { entity: "rule", id });
        }
        Ok(())
    }

    pub async fn list_all_rules(&self) -> Result<Vec<Rule>> {
        let rows = Entity::find().order_by_asc(Column::Id).all(self.db()).await?;
        Ok(rows.into_iter().map(to_rule).collect())
    }

    pub async fn list_rules_by_project(&self, project_id: i64) -> Result<Vec<Rule>> {
        let rows = Entity::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::Id)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_rule).collect())
    }
}

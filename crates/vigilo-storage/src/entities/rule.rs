use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    #[sea_orm(unique)]
    pub pattern: String,
    pub trend_up: bool,
    pub trend_down: bool,
    pub threshold_max: f64,
    pub threshold_min: f64,
    pub comment: String,
    pub level: i32,
    pub disabled: bool,
    pub disabled_for: i64,
    pub disabled_at: DateTimeWithTimeZone,
    pub track_idle: bool,
    pub never_fill_zero: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use crate::config::ServerConfig;
use crate::lifecycle::RuleService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleService>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}

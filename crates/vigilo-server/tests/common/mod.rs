#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::util::ServiceExt;
use vigilo_alert::cache::RuleCache;
use vigilo_alert::index::{MemoryMetricIndex, MetricIndex};
use vigilo_common::types::{NewRule, Project, Rule, RuleFields};
use vigilo_server::app;
use vigilo_server::config::ServerConfig;
use vigilo_server::lifecycle::{RuleService, ServiceOptions};
use vigilo_server::state::AppState;
use vigilo_storage::{AdminStore, RuleStore};

pub const LATENCY_METRICS: [&str; 3] = ["svc.api.latency", "svc.db.latency", "svc.cache.latency"];

pub struct TestContext {
    pub temp_dir: TempDir,
    pub store: Arc<CountingStore>,
    pub cache: Arc<RuleCache>,
    pub index: Arc<MemoryMetricIndex>,
    pub service: Arc<RuleService>,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a project and returns its id.
    pub async fn project(&self, name: &str) -> i64 {
        self.service
            .create_project(name)
            .await
            .expect("project should be created")
            .id
    }
}

pub async fn build_test_context() -> Result<TestContext> {
    let index = Arc::new(MemoryMetricIndex::with_names(
        LATENCY_METRICS.iter().copied().chain(["svc.api.errors", "host.cpu.usage"]),
    ));
    build_test_context_with(index.clone(), index, ServiceOptions::default()).await
}

/// Builds a context whose service queries `metric_index` instead of the
/// in-memory index exposed on the context.
pub async fn build_test_context_with(
    index: Arc<MemoryMetricIndex>,
    metric_index: Arc<dyn MetricIndex>,
    options: ServiceOptions,
) -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let store = Arc::new(CountingStore::new(AdminStore::open(temp_dir.path()).await?));
    let cache = Arc::new(RuleCache::new());

    let service = Arc::new(RuleService::new(
        store.clone(),
        cache.clone(),
        metric_index,
        options,
    ));

    let config = ServerConfig {
        data_dir: temp_dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let state = AppState {
        rules: service.clone(),
        config: Arc::new(config),
        start_time: Utc::now(),
    };
    let app = app::build_http_app(state);

    Ok(TestContext {
        temp_dir,
        store,
        cache,
        index,
        service,
        app,
    })
}

/// Valid rule fields with a single max-threshold condition.
pub fn rule_fields(pattern: &str) -> RuleFields {
    RuleFields {
        pattern: pattern.to_string(),
        threshold_max: 500.0,
        comment: "latency above 500ms".to_string(),
        level: 1,
        ..Default::default()
    }
}

/// Store wrapper counting write calls that reach the database.
pub struct CountingStore {
    inner: AdminStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: AdminStore) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RuleStore for CountingStore {
    async fn create_rule(&self, rule: &NewRule) -> vigilo_storage::Result<Rule> {
        self.record_write();
        self.inner.create_rule(rule).await
    }

    async fn find_rule(&self, id: i64) -> vigilo_storage::Result<Rule> {
        self.inner.find_rule(id).await
    }

    async fn update_rule(&self, rule: &Rule) -> vigilo_storage::Result<Rule> {
        self.record_write();
        self.inner.update_rule(rule).await
    }

    async fn delete_rule(&self, id: i64) -> vigilo_storage::Result<()> {
        self.record_write();
        self.inner.delete_rule(id).await
    }

    async fn list_rules(&self) -> vigilo_storage::Result<Vec<Rule>> {
        self.inner.list_rules().await
    }

    async fn list_project_rules(&self, project_id: i64) -> vigilo_storage::Result<Vec<Rule>> {
        self.inner.list_project_rules(project_id).await
    }

    async fn create_project(&self, name: &str) -> vigilo_storage::Result<Project> {
        self.inner.create_project(name).await
    }

    async fn find_project(&self, id: i64) -> vigilo_storage::Result<Project> {
        self.inner.find_project(id).await
    }
}

/// Store that holds `create_rule` open after the insert has committed until
/// the test releases it.
pub struct PausingStore {
    inner: AdminStore,
    pub inserted: Notify,
    pub release: Notify,
}

impl PausingStore {
    pub fn new(inner: AdminStore) -> Self {
        Self {
            inner,
            inserted: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl RuleStore for PausingStore {
    async fn create_rule(&self, rule: &NewRule) -> vigilo_storage::Result<Rule> {
        let created = self.inner.create_rule(rule).await;
        self.inserted.notify_one();
        self.release.notified().await;
        created
    }

    async fn find_rule(&self, id: i64) -> vigilo_storage::Result<Rule> {
        self.inner.find_rule(id).await
    }

    async fn update_rule(&self, rule: &Rule) -> vigilo_storage::Result<Rule> {
        self.inner.update_rule(rule).await
    }

    async fn delete_rule(&self, id: i64) -> vigilo_storage::Result<()> {
        self.inner.delete_rule(id).await
    }

    async fn list_rules(&self) -> vigilo_storage::Result<Vec<Rule>> {
        self.inner.list_rules().await
    }

    async fn list_project_rules(&self, project_id: i64) -> vigilo_storage::Result<Vec<Rule>> {
        self.inner.list_project_rules(project_id).await
    }

    async fn create_project(&self, name: &str) -> vigilo_storage::Result<Project> {
        self.inner.create_project(name).await
    }

    async fn find_project(&self, id: i64) -> vigilo_storage::Result<Project> {
        self.inner.find_project(id).await
    }
}

/// A service over a [`PausingStore`] in a fresh temp dir.
pub async fn build_pausing_service() -> Result<(TempDir, Arc<PausingStore>, Arc<RuleCache>, Arc<RuleService>)> {
    let temp_dir = tempfile::tempdir()?;
    let store = Arc::new(PausingStore::new(AdminStore::open(temp_dir.path()).await?));
    let cache = Arc::new(RuleCache::new());
    let service = Arc::new(RuleService::new(
        store.clone(),
        cache.clone(),
        Arc::new(MemoryMetricIndex::with_names(LATENCY_METRICS)),
        ServiceOptions::default(),
    ));
    Ok((temp_dir, store, cache, service))
}

/// Index whose every query fails.
pub struct FailingIndex;

#[async_trait]
impl MetricIndex for FailingIndex {
    async fn count_matches(&self, _pattern: &str) -> Result<u64> {
        anyhow::bail!("metric index unavailable")
    }
}

/// Index that answers only after `delay`.
pub struct SlowIndex {
    pub delay: Duration,
}

#[async_trait]
impl MetricIndex for SlowIndex {
    async fn count_matches(&self, _pattern: &str) -> Result<u64> {
        tokio::time::sleep(self.delay).await;
        Ok(99)
    }
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(req_body)
        .expect("request should build");

    send(app, req).await
}

pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");

    send(app, req).await
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

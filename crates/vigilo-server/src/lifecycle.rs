//! Rule lifecycle coordination: validation, persistence, cache and enrichment.
//!
//! Every write follows the same order: the store operation commits first,
//! then the cache is updated with the value the store returned, then the
//! metric index is asked for `num_metrics`. Nothing touches the cache before
//! the store has accepted the write.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use vigilo_alert::cache::RuleCache;
use vigilo_alert::index::MetricIndex;
use vigilo_common::types::{NewRule, Project, Rule, RuleFields, RuleView};
use vigilo_common::validation::{validate_create, validate_edit};
use vigilo_storage::{Constraint, RuleStore, StorageError};

use crate::error::RuleError;

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Upper bound for a single metric index query.
    pub index_timeout: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            index_timeout: Duration::from_millis(200),
        }
    }
}

/// Coordinates rule create, edit and delete across store, cache and index.
pub struct RuleService {
    store: Arc<dyn RuleStore>,
    cache: Arc<RuleCache>,
    index: Arc<dyn MetricIndex>,
    locks: RowLocks,
    options: ServiceOptions,
}

impl RuleService {
    pub fn new(
        store: Arc<dyn RuleStore>,
        cache: Arc<RuleCache>,
        index: Arc<dyn MetricIndex>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            cache,
            index,
            locks: RowLocks::default(),
            options,
        }
    }

    pub fn cache(&self) -> &Arc<RuleCache> {
        &self.cache
    }

    /// Loads every stored rule into the cache. Returns the number loaded.
    pub async fn warm_cache(&self) -> Result<usize, RuleError> {
        let rules = self.store.list_rules().await.map_err(RuleError::Unexpected)?;
        let count = rules.len();
        self.cache.replace_all(rules);
        tracing::info!(rule_count = count, "Rule cache loaded from store");
        Ok(count)
    }

    pub async fn create(&self, project_id: i64, fields: &RuleFields) -> Result<RuleView, RuleError> {
        let level = validate_create(project_id, fields)?;

        match self.store.find_project(project_id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Err(RuleError::ProjectNotFound),
            Err(e) => return Err(RuleError::Unexpected(e)),
        }

        let new = NewRule::from_fields(project_id, fields, level, Utc::now());
        let created = self
            .store
            .create_rule(&new)
            .await
            .map_err(create_error)?;
        let rule_id = created.id;

        // the id is visible to edit and delete as soon as the insert commits
        let _row = self.locks.lock(rule_id).await;
        let rule = match self.store.find_rule(rule_id).await {
            Ok(current) => {
                self.cache.put(current.clone());
                current
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(rule_id, "Rule deleted before it was cached");
                created
            }
            Err(e) => {
                self.cache.delete(rule_id);
                return Err(RuleError::Unexpected(e));
            }
        };
        tracing::info!(
            rule_id,
            project_id,
            pattern = %rule.pattern,
            "Rule created"
        );

        Ok(self.enrich(rule).await)
    }

    pub async fn edit(&self, rule_id: i64, fields: &RuleFields) -> Result<RuleView, RuleError> {
        let level = validate_edit(fields)?;

        let _row = self.locks.lock(rule_id).await;

        let mut rule = match self.store.find_rule(rule_id).await {
            Ok(rule) => rule,
            Err(e) if e.is_not_found() => return Err(RuleError::RuleNotFound),
            Err(e) => return Err(RuleError::Unexpected(e)),
        };
        rule.apply(fields, level, Utc::now());

        let saved = match self.store.update_rule(&rule).await {
            Ok(saved) => saved,
            Err(e) if e.is_not_found() => return Err(RuleError::RuleNotFound),
            Err(e) => {
                tracing::error!(rule_id, error = %e, "Failed to update rule");
                return Err(RuleError::UpdateFailed(e));
            }
        };

        // evict first so readers see either the old rule, nothing, or the new rule
        self.cache.delete(rule_id);
        self.cache.put(saved.clone());
        tracing::info!(rule_id, pattern = %saved.pattern, "Rule updated");

        Ok(self.enrich(saved).await)
    }

    pub async fn delete(&self, rule_id: i64) -> Result<(), RuleError> {
        let _row = self.locks.lock(rule_id).await;

        match self.store.delete_rule(rule_id).await {
            Ok(()) => {
                self.cache.delete(rule_id);
                tracing::info!(rule_id, "Rule deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                // the row is gone either way
                self.cache.delete(rule_id);
                Err(RuleError::RuleNotFound)
            }
            Err(e) => Err(RuleError::Unexpected(e)),
        }
    }

    pub async fn get(&self, rule_id: i64) -> Result<RuleView, RuleError> {
        let rule = match self.store.find_rule(rule_id).await {
            Ok(rule) => rule,
            Err(e) if e.is_not_found() => return Err(RuleError::RuleNotFound),
            Err(e) => return Err(RuleError::Unexpected(e)),
        };
        Ok(self.enrich(rule).await)
    }

    pub async fn list_project(&self, project_id: i64) -> Result<Vec<RuleView>, RuleError> {
        if project_id <= 0 {
            return Err(RuleError::InvalidProjectId);
        }
        match self.store.find_project(project_id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Err(RuleError::ProjectNotFound),
            Err(e) => return Err(RuleError::Unexpected(e)),
        }

        let rules = self
            .store
            .list_project_rules(project_id)
            .await
            .map_err(RuleError::Unexpected)?;
        let mut views = Vec::with_capacity(rules.len());
        for rule in rules {
            views.push(self.enrich(rule).await);
        }
        Ok(views)
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, RuleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RuleError::BadRequest("project name is required".to_string()));
        }
        match self.store.create_project(name).await {
            Ok(project) => {
                tracing::info!(project_id = project.id, name = %project.name, "Project created");
                Ok(project)
            }
            Err(e) if e.constraint() == Some(Constraint::Unique) => {
                Err(RuleError::DuplicateProjectName)
            }
            Err(e) => Err(RuleError::Unexpected(e)),
        }
    }

    async fn enrich(&self, rule: Rule) -> RuleView {
        let num_metrics = self.num_metrics(&rule.pattern).await;
        RuleView { rule, num_metrics }
    }

    /// Best-effort match count; index failures and timeouts report zero.
    async fn num_metrics(&self, pattern: &str) -> u64 {
        match tokio::time::timeout(self.options.index_timeout, self.index.count_matches(pattern)).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                tracing::warn!(pattern, error = %e, "Metric index query failed");
                0
            }
            Err(_) => {
                tracing::warn!(
                    pattern,
                    timeout_ms = self.options.index_timeout.as_millis() as u64,
                    "Metric index query timed out"
                );
                0
            }
        }
    }
}

fn create_error(err: StorageError) -> RuleError {
    match err.constraint() {
        Some(Constraint::NotNull) => RuleError::RequiredFieldMissing,
        Some(Constraint::Unique) => RuleError::DuplicatePattern,
        Some(Constraint::PrimaryKey) => RuleError::PrimaryKeyConflict,
        None => {
            tracing::error!(error = %err, "Failed to create rule");
            RuleError::Unexpected(err)
        }
    }
}

/// Per-rule-id async locks.
///
/// Create, edit and delete hold the lock for their id across the store
/// access and the cache write, so the cache ends up with the last committed
/// value. A caller counts as a user of an entry from the moment it starts
/// waiting; the entry is dropped when the last user leaves, including one
/// whose wait was cancelled.
#[derive(Default)]
struct RowLocks {
    locks: Mutex<HashMap<i64, RowEntry>>,
}

struct RowEntry {
    mutex: Arc<tokio::sync::Mutex<()>>,
    users: usize,
}

impl RowLocks {
    async fn lock(&self, id: i64) -> RowGuard<'_> {
        let (lease, mutex) = self.lease(id);
        let guard = mutex.lock_owned().await;
        RowGuard {
            _guard: guard,
            _lease: lease,
        }
    }

    fn lease(&self, id: i64) -> (RowLease<'_>, Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.entries();
        let entry = locks.entry(id).or_insert_with(|| RowEntry {
            mutex: Arc::default(),
            users: 0,
        });
        entry.users += 1;
        let mutex = Arc::clone(&entry.mutex);
        (RowLease { locks: self, id }, mutex)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<i64, RowEntry>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct RowLease<'a> {
    locks: &'a RowLocks,
    id: i64,
}

impl Drop for RowLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.entries();
        if let Some(entry) = locks.get_mut(&self.id) {
            entry.users -= 1;
            if entry.users == 0 {
                locks.remove(&self.id);
            }
        }
    }
}

/// Fields drop in order: the row mutex is released before the lease.
struct RowGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _lease: RowLease<'a>,
}

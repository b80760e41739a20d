use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use vigilo_common::pattern;
use vigilo_common::types::Rule;

/// Rule id -> committed rule.
///
/// Entries are stored as `Arc<Rule>` and swapped whole, so a reader holding
/// an entry never observes a partially updated rule. The cache does not
/// validate anything; callers only write values the store has committed.
#[derive(Default)]
pub struct RuleCache {
    rules: RwLock<HashMap<i64, Arc<Rule>>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `rule.id`.
    pub fn put(&self, rule: Rule) {
        let id = rule.id;
        self.rules
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, Arc::new(rule));
        tracing::debug!(rule_id = id, "Rule cached");
    }

    /// Evicts the entry for `id`. Returns false if there was none.
    pub fn delete(&self, id: i64) -> bool {
        let removed = self
            .rules
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
            .is_some();
        if removed {
            tracing::debug!(rule_id = id, "Rule evicted from cache");
        }
        removed
    }

    pub fn get(&self, id: i64) -> Option<Arc<Rule>> {
        self.rules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached rule ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .rules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Replace all entries, e.g. when loading rules from the store at startup.
    pub fn replace_all(&self, rules: Vec<Rule>) {
        let fresh: HashMap<i64, Arc<Rule>> =
            rules.into_iter().map(|r| (r.id, Arc::new(r))).collect();
        *self
            .rules
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
    }

    /// Rules whose pattern matches `metric`, ordered by id.
    pub fn matching(&self, metric: &str) -> Vec<Arc<Rule>> {
        let mut matched: Vec<Arc<Rule>> = self
            .rules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|r| pattern::matches(&r.pattern, metric))
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.id);
        matched
    }
}

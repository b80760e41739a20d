use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::RwLock;
use vigilo_common::pattern;

/// Read-only oracle over the metric names currently known to the system.
#[async_trait]
pub trait MetricIndex: Send + Sync {
    /// Number of known metric names matching `pattern`.
    async fn count_matches(&self, pattern: &str) -> Result<u64>;
}

/// In-process metric name index, fed by the ingestion path.
#[derive(Default)]
pub struct MemoryMetricIndex {
    names: RwLock<BTreeSet<String>>,
}

impl MemoryMetricIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Records a metric name. Returns true if it was not known before.
    pub fn observe(&self, name: &str) -> bool {
        self.names
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string())
    }

    pub fn forget(&self, name: &str) -> bool {
        self.names
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
    }

    pub fn len(&self) -> usize {
        self.names
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count(&self, pattern: &str) -> u64 {
        self.names
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|name| pattern::matches(pattern, name))
            .count() as u64
    }
}

#[async_trait]
impl MetricIndex for MemoryMetricIndex {
    async fn count_matches(&self, pattern: &str) -> Result<u64> {
        Ok(self.count(pattern))
    }
}

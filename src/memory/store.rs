//! Shared memory store - tagged key-value storage with conjunctive tag search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

/// Memory entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Value,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Create a new memory entry.
    pub fn new<I, S>(key: &str, value: Value, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            value,
            tags: tags.into_iter().map(Into::into).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this entry carries every one of `tags`.
    pub fn has_all_tags(&self, tags: &BTreeSet<String>) -> bool {
        tags.is_subset(&self.tags)
    }
}

/// Memory statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub entries: usize,
    pub distinct_tags: usize,
}

impl std::fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Memory Stats:")?;
        writeln!(f, "  Entries: {}", self.entries)?;
        write!(f, "  Tags:    {}", self.distinct_tags)
    }
}

/// Tagged key-value store shared by the orchestrator and every agent.
///
/// Writers (`store`, `delete`) hold the lock exclusively; readers
/// (`retrieve`, `search`) share it.
#[derive(Debug, Default)]
pub struct SharedMemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl SharedMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry. An overwrite replaces value and tag set
    /// and keeps the original creation time.
    pub async fn store<I, S>(&self, key: &str, value: Value, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entry = MemoryEntry::new(key, value, tags);
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(key) {
            entry.created_at = existing.created_at;
        }
        tracing::debug!(key, tags = ?entry.tags, "Stored memory entry");
        entries.insert(key.to_string(), entry);
    }

    /// Value stored under `key`, or `None` when absent.
    pub async fn retrieve(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    /// Full entry stored under `key`.
    pub async fn get(&self, key: &str) -> Option<MemoryEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Entries carrying all of `tags`, sorted by key. Searching with no tags
    /// matches nothing.
    pub async fn search<I, S>(&self, tags: I) -> Vec<MemoryEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let wanted: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<MemoryEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.has_all_tags(&wanted))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
    }

    /// Remove an entry. Returns whether anything was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            tracing::debug!(key, "Deleted memory entry");
        }
        removed
    }

    /// All keys, sorted.
    pub async fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> MemoryStats {
        let entries = self.entries.read().await;
        let tags: BTreeSet<&String> = entries.values().flat_map(|e| e.tags.iter()).collect();
        MemoryStats {
            entries: entries.len(),
            distinct_tags: tags.len(),
        }
    }
}

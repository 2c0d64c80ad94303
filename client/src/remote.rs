// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{bail, Result};
use common::{Task, TaskPatch};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// The remote relational store holding every task row.
///
/// All four commands fail with a single, undifferentiated error kind
/// (`anyhow::Error`): connectivity, permission and constraint problems
/// look the same to the caller.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Every row whose `sync_key` equals `sync_key`, ordered by `created_at` ascending.
    async fn select_by_sync_key(&self, sync_key: &str) -> Result<Vec<Task>>;

    /// Inserts a complete row.
    async fn insert(&self, task: &Task) -> Result<()>;

    /// Writes the present fields of `patch` to the row with `id`.
    /// Matching no row is not an error.
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<()>;

    /// Deletes the row with `id`. Matching no row is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// One of the four remote commands, used to inject failures and record calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Task>,
    failing: HashSet<RemoteOp>,
    calls: Vec<RemoteOp>,
}

/// An in-memory `RemoteStore`.
///
/// Clones share the same rows, so a test can hand one clone to a
/// `TaskStore` and keep another to inspect or sabotage the "remote" side.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `rows`.
    pub fn with_rows(rows: Vec<Task>) -> Self {
        let store = Self::default();
        store.state.write().rows = rows;
        store
    }

    /// Makes every subsequent `op` fail until `recover` is called.
    pub fn fail(&self, op: RemoteOp) {
        self.state.write().failing.insert(op);
    }

    pub fn recover(&self, op: RemoteOp) {
        self.state.write().failing.remove(&op);
    }

    /// A snapshot of all rows, in insertion order.
    pub fn rows(&self) -> Vec<Task> {
        self.state.read().rows.clone()
    }

    /// Every command issued so far, including failed ones.
    pub fn calls(&self) -> Vec<RemoteOp> {
        self.state.read().calls.clone()
    }

    // Records the call and reports whether it should fail.
    fn begin(&self, op: RemoteOp) -> Result<()> {
        let mut state = self.state.write();
        state.calls.push(op);
        if state.failing.contains(&op) {
            bail!("remote {:?} failed: store unavailable", op);
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    async fn select_by_sync_key(&self, sync_key: &str) -> Result<Vec<Task>> {
        self.begin(RemoteOp::Select)?;
        let mut rows: Vec<Task> = self
            .state
            .read()
            .rows
            .iter()
            .filter(|t| t.sync_key == sync_key)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        debug!("Memory store selected {} rows.", rows.len());
        Ok(rows)
    }

    async fn insert(&self, task: &Task) -> Result<()> {
        self.begin(RemoteOp::Insert)?;
        let mut state = self.state.write();
        if state.rows.iter().any(|t| t.id == task.id) {
            bail!("duplicate key value violates unique constraint (id = {})", task.id);
        }
        state.rows.push(task.clone());
        Ok(())
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<()> {
        self.begin(RemoteOp::Update)?;
        if let Some(row) = self.state.write().rows.iter_mut().find(|t| t.id == id) {
            patch.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.begin(RemoteOp::Delete)?;
        self.state.write().rows.retain(|t| t.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::TaskDraft;

    fn row(id: &str, key: &str, minute: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        Task::from_draft(
            id.to_string(),
            TaskDraft {
                title: format!("Task {id}"),
                ..TaskDraft::default()
            },
            key,
            base + Duration::minutes(minute),
        )
    }

    #[tokio::test]
    async fn test_select_filters_by_key_and_orders_by_creation() {
        let store = MemoryStore::with_rows(vec![
            row("late", "k1", 30),
            row("other", "k2", 0),
            row("early", "k1", 5),
        ]);

        let rows = store.select_by_sync_key("k1").await.unwrap();

        let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryStore::new();
        store.insert(&row("a", "k1", 0)).await.unwrap();

        let result = store.insert(&row("a", "k1", 1)).await;

        assert!(result.is_err());
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded_and_recoverable() {
        let store = MemoryStore::with_rows(vec![row("a", "k1", 0)]);
        store.fail(RemoteOp::Delete);

        assert!(store.delete("a").await.is_err());
        assert_eq!(store.rows().len(), 1);

        store.recover(RemoteOp::Delete);
        store.delete("a").await.unwrap();

        assert!(store.rows().is_empty());
        assert_eq!(store.calls(), vec![RemoteOp::Delete, RemoteOp::Delete]);
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_an_error() {
        let store = MemoryStore::new();

        store.update("ghost", &TaskPatch::completed(true)).await.unwrap();

        assert!(store.rows().is_empty());
    }
}

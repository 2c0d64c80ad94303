// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::remote::RemoteStore;
use crate::session::Session;

use chrono::Utc;
use common::{Filter, Task, TaskDraft, TaskPatch, Theme};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What an operation on the `TaskStore` ended up doing.
///
/// Remote failures never escape the store: they are logged and turned
/// into `Reverted` or `Stale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened: no active sync key, empty key, or unknown task.
    Skipped,
    /// The local change was made and the remote accepted it.
    Applied,
    /// The remote refused the change; the local list was re-fetched from it.
    Reverted,
    /// The remote could not be reached even to re-fetch; local state is
    /// whatever it was before the failed fetch.
    Stale,
}

/// The single in-memory view of the tasks for the active sync key,
/// together with the session state (key, filter, search query, theme).
///
/// Every mutator is optimistic: it changes the local list first, then
/// issues the remote command, and on failure re-synchronizes from the
/// remote store, which is always treated as ground truth.
pub struct TaskStore<S> {
    remote: S,
    tasks: Vec<Task>,
    session: Session,
    session_path: Option<PathBuf>,
}

impl<S: RemoteStore> TaskStore<S> {
    /// Creates a store with an empty task list. Call `sync_tasks` to load
    /// the rows for the session's key.
    pub fn new(remote: S, session: Session) -> Self {
        Self {
            remote,
            tasks: Vec::new(),
            session,
            session_path: None,
        }
    }

    /// Persists the session to `path` after every change to it.
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    /// The active sync key, if one is set.
    pub fn sync_key(&self) -> Option<&str> {
        self.session.active_key()
    }

    /// Replaces the active key and loads its task set.
    /// Surrounding whitespace is trimmed; an empty key is ignored.
    pub async fn set_sync_key(&mut self, key: &str) -> Outcome {
        let key = key.trim();
        if key.is_empty() {
            debug!("Ignoring empty sync key.");
            return Outcome::Skipped;
        }

        self.session.sync_key = key.to_string();
        self.persist_session();
        info!("Sync key changed, synchronizing.");
        self.sync_tasks().await
    }

    /// Replaces the whole local list with the remote rows for the active key.
    /// On failure the local list is left untouched.
    pub async fn sync_tasks(&mut self) -> Outcome {
        let Some(key) = self.session.active_key() else {
            return Outcome::Skipped;
        };

        match self.remote.select_by_sync_key(key).await {
            Ok(rows) => {
                debug!("Synchronized {} tasks.", rows.len());
                self.tasks = rows;
                Outcome::Applied
            }
            Err(e) => {
                error!("Error syncing tasks: {:?}", e);
                Outcome::Stale
            }
        }
    }

    /// Creates a task under the active key. Without a key nothing happens,
    /// locally or remotely.
    pub async fn add_task(&mut self, draft: TaskDraft) -> Outcome {
        let Some(key) = self.session.active_key() else {
            debug!("No sync key set, ignoring new task '{}'.", draft.title);
            return Outcome::Skipped;
        };

        let task = Task::from_draft(Uuid::new_v4().to_string(), draft, key, Utc::now());
        self.tasks.push(task.clone());

        match self.remote.insert(&task).await {
            Ok(()) => {
                info!("Task created successfully with ID: {}", task.id);
                Outcome::Applied
            }
            Err(e) => {
                error!("Error adding task: {:?}", e);
                self.reconcile().await
            }
        }
    }

    /// Flips `completed` for the task with `id`.
    pub async fn toggle_task(&mut self, id: &str) -> Outcome {
        if self.session.active_key().is_none() {
            return Outcome::Skipped;
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("Toggle of unknown task {}.", id);
            return Outcome::Skipped;
        };

        let completed = !task.completed;
        task.completed = completed;

        let patch = TaskPatch::completed(completed);
        match self.remote.update(id, &patch).await {
            Ok(()) => {
                info!("Task {} marked completed={}.", id, completed);
                Outcome::Applied
            }
            Err(e) => {
                error!("Error toggling task: {:?}", e);
                self.reconcile().await
            }
        }
    }

    /// Merges `patch` into the task with `id` and writes the same fields remotely.
    /// The remote command is issued even if the task is not in the local list.
    pub async fn update_task(&mut self, id: &str, patch: TaskPatch) -> Outcome {
        if self.session.active_key().is_none() {
            return Outcome::Skipped;
        }
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            patch.apply_to(task);
        }

        match self.remote.update(id, &patch).await {
            Ok(()) => {
                info!("Task {} updated.", id);
                Outcome::Applied
            }
            Err(e) => {
                error!("Error updating task: {:?}", e);
                self.reconcile().await
            }
        }
    }

    /// Removes the task with `id` locally and remotely.
    pub async fn delete_task(&mut self, id: &str) -> Outcome {
        if self.session.active_key().is_none() {
            return Outcome::Skipped;
        }
        self.tasks.retain(|t| t.id != id);

        match self.remote.delete(id).await {
            Ok(()) => {
                info!("Task with ID {} deleted successfully.", id);
                Outcome::Applied
            }
            Err(e) => {
                error!("Error deleting task: {:?}", e);
                self.reconcile().await
            }
        }
    }

    /// Moves the element at `from` to `to` in the local list.
    ///
    /// Purely local: the next `sync_tasks` restores creation order.
    /// An out-of-range `from` is ignored; `to` is clamped to the list end.
    pub fn reorder_tasks(&mut self, from: usize, to: usize) {
        if from >= self.tasks.len() {
            debug!("Reorder from {} is out of range, ignoring.", from);
            return;
        }
        let task = self.tasks.remove(from);
        let to = to.min(self.tasks.len());
        self.tasks.insert(to, task);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.session.theme = theme;
        self.persist_session();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.session.filter = filter;
        self.persist_session();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.session.search_query = query.to_string();
        self.persist_session();
    }

    // Discards optimistic state by re-fetching everything from the remote.
    async fn reconcile(&mut self) -> Outcome {
        warn!("Reverting local changes from the remote store.");
        match self.sync_tasks().await {
            Outcome::Applied => Outcome::Reverted,
            _ => Outcome::Stale,
        }
    }

    fn persist_session(&self) {
        if let Some(path) = &self.session_path {
            if let Err(e) = self.session.save(path) {
                error!("Error saving session: {:?}", e);
            }
        }
    }
}

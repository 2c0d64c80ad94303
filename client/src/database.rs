// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::remote::RemoteStore;

use anyhow::{Context, Result};
use common::{Task, TaskPatch};
use sqlx::{migrate::MigrateDatabase, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// Establishes the database connection pool.
/// If the database does not exist, it creates it (and its parent directory).
/// It also ensures the `tasks` table has the correct schema.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        if let Some(parent) = database_file_parent(database_url) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Creates the `tasks` table if it is missing.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            deadline TIMESTAMP WITH TIME ZONE NULL,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NULL,
            sync_key TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_sync_key ON tasks (sync_key, created_at);")
        .execute(pool)
        .await
        .context("Failed to create sync key index")?;

    info!("'tasks' table is ready.");
    Ok(())
}

// `sqlite://database/tasks.db` -> `database`. In-memory URLs have no file.
fn database_file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

/// A `RemoteStore` backed by a SQLite database through `sqlx`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(establish_connection_pool(database_url).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl RemoteStore for SqliteStore {
    async fn select_by_sync_key(&self, sync_key: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE sync_key = ? ORDER BY created_at ASC, rowid ASC;",
        )
        .bind(sync_key)
        .fetch_all(&self.pool)
        .await
        .context("Failed to retrieve tasks for sync key from DB")?;

        debug!("Selected {} rows for the active sync key.", tasks.len());
        Ok(tasks)
    }

    async fn insert(&self, task: &Task) -> Result<()> {
        debug!(
            "Insert values: id={}, title={}, deadline={:?}, completed={}, created_at={}",
            task.id, task.title, task.deadline, task.completed, task.created_at
        );

        sqlx::query(
            "INSERT INTO tasks (id, title, description, deadline, completed, created_at, updated_at, sync_key) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.deadline)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(&task.sync_key)
        .execute(&self.pool)
        .await
        .context("Failed to insert task into DB")?;

        Ok(())
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<()> {
        if patch.is_empty() {
            debug!("Empty patch for task {}, nothing to write.", id);
            return Ok(());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(title) = &patch.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(description) = &patch.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            if let Some(deadline) = patch.deadline {
                set.push("deadline = ").push_bind_unseparated(deadline);
            }
            if let Some(completed) = patch.completed {
                set.push("completed = ").push_bind_unseparated(completed);
            }
        }
        builder.push(" WHERE id = ").push_bind(id.to_string());

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update task with ID: {id}"))?;

        debug!("Updated {} rows for task ID: {}", result.rows_affected(), id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete task with ID: {id}"))?;

        info!("Deleted {} rows for task ID: {}", result.rows_affected(), id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::TaskDraft;

    /// Helper function to set up an in-memory SQLite database for testing.
    /// This creates a fresh, empty database for each test, ensuring they are isolated.
    async fn setup_test_store() -> SqliteStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    fn make_task(id: &str, key: &str, minute: i64) -> Task {
        let base = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        Task::from_draft(
            id.to_string(),
            TaskDraft {
                title: format!("Task {id}"),
                description: "Test the database".to_string(),
                deadline: None,
            },
            key,
            base + Duration::minutes(minute),
        )
    }

    #[test]
    fn test_database_file_parent() {
        assert_eq!(
            database_file_parent("sqlite://database/tasks.db"),
            Some(Path::new("database"))
        );
        assert_eq!(database_file_parent("sqlite::memory:"), None);
        assert_eq!(database_file_parent("sqlite://tasks.db"), None);
    }

    #[tokio::test]
    async fn test_insert_and_select_round_trip() {
        let store = setup_test_store().await;
        let mut task = make_task("a", "abc123", 0);
        task.deadline = Some(Utc.with_ymd_and_hms(2025, 6, 10, 17, 30, 0).unwrap());

        // Act
        store.insert(&task).await.unwrap();
        let rows = store.select_by_sync_key("abc123").await.unwrap();

        // Assert
        assert_eq!(rows, vec![task]);
    }

    #[tokio::test]
    async fn test_select_scopes_by_key_and_orders_by_created_at() {
        let store = setup_test_store().await;
        store.insert(&make_task("second", "k", 10)).await.unwrap();
        store.insert(&make_task("foreign", "other", 0)).await.unwrap();
        store.insert(&make_task("first", "k", 1)).await.unwrap();

        let rows = store.select_by_sync_key("k").await.unwrap();

        let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_given_fields() {
        let store = setup_test_store().await;
        store.insert(&make_task("a", "k", 0)).await.unwrap();

        store
            .update("a", &TaskPatch::completed(true))
            .await
            .unwrap();
        store
            .update(
                "a",
                &TaskPatch {
                    title: Some("Renamed".to_string()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        let rows = store.select_by_sync_key("k").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].completed);
        assert_eq!(rows[0].title, "Renamed");
        assert_eq!(rows[0].description, "Test the database");
    }

    #[tokio::test]
    async fn test_update_can_clear_deadline() {
        let store = setup_test_store().await;
        let mut task = make_task("a", "k", 0);
        task.deadline = Some(Utc.with_ymd_and_hms(2025, 6, 10, 17, 30, 0).unwrap());
        store.insert(&task).await.unwrap();

        store
            .update(
                "a",
                &TaskPatch {
                    deadline: Some(None),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        let rows = store.select_by_sync_key("k").await.unwrap();
        assert_eq!(rows[0].deadline, None);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = setup_test_store().await;
        store.insert(&make_task("a", "k", 0)).await.unwrap();

        store.delete("a").await.unwrap();
        // Deleting again matches nothing and still succeeds.
        store.delete("a").await.unwrap();

        assert!(store.select_by_sync_key("k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = setup_test_store().await;
        store.insert(&make_task("a", "k", 0)).await.unwrap();

        let result = store.insert(&make_task("a", "k", 5)).await;

        assert!(result.is_err());
    }
}

// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[allow(clippy::doc_overindented_list_items)]
/// Represents a task owned by a sync key.
///
/// Derivation attributes (derive):
/// - `Serialize`, `Deserialize`: Allows conversion to/from JSON.
/// - `Debug`, `Clone`, `PartialEq`: Debug output, copies and comparisons in tests.
/// - `sqlx::FromRow`: Allows `sqlx` to create a `Task` instance directly
///    from a row of the remote `tasks` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Task {
    /// Opaque identifier, assigned by the client at creation.
    pub id: String,

    pub title: String,

    pub description: String,

    /// `None` means "no due date".
    pub deadline: Option<DateTime<Utc>>,

    pub completed: bool,

    /// Default remote ordering key.
    pub created_at: DateTime<Utc>,

    // Never written by any mutation path; kept because the remote rows carry it.
    pub updated_at: Option<DateTime<Utc>>,

    pub sync_key: String,
}

impl Task {
    /// Builds a fresh, not yet completed task from user-supplied fields.
    pub fn from_draft(
        id: String,
        draft: TaskDraft,
        sync_key: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            deadline: draft.deadline,
            completed: false,
            created_at,
            updated_at: None,
            sync_key: sync_key.to_string(),
        }
    }
}

/// The fields a user fills in when creating a task.
/// Everything else (`id`, `created_at`, `sync_key`) is assigned by the task store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// A partial set of task fields, merged into a task by `updateTask`.
///
/// `deadline` is doubly optional: `None` leaves the deadline untouched,
/// `Some(None)` clears it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub deadline: Option<Option<DateTime<Utc>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

// A field that is present (even as `null`) deserializes to `Some(..)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// A patch that only touches the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.completed.is_none()
    }

    /// Merges the present fields into `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Display filter, applied at the category-group level.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Pending,
}

impl Filter {
    /// Whether the group for `category` is shown under this filter.
    pub fn shows(self, category: Category) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => category == Category::Completed,
            Filter::Pending => category != Category::Completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Pending => "pending",
        })
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "completed" => Ok(Filter::Completed),
            "pending" => Ok(Filter::Pending),
            other => Err(format!(
                "unknown filter '{other}' (expected all, completed or pending)"
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}' (expected dark or light)")),
        }
    }
}

/// Display grouping derived from the completion flag, the deadline and the
/// current time. It is never stored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Pending,
    Overdue,
    NoDate,
    Completed,
}

impl Category {
    /// The fixed order in which groups are displayed and flat indices are counted.
    pub const ORDER: [Category; 4] = [
        Category::Pending,
        Category::Overdue,
        Category::NoDate,
        Category::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Pending => "Pending",
            Category::Overdue => "Overdue",
            Category::NoDate => "No date",
            Category::Completed => "Completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task::from_draft(
            "t-1".to_string(),
            TaskDraft {
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
                deadline: None,
            },
            "abc123",
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_from_draft_defaults() {
        let task = sample_task();

        assert!(!task.completed);
        assert_eq!(task.sync_key, "abc123");
        assert_eq!(task.updated_at, None);
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut task = sample_task();
        let deadline = Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap();
        let patch = TaskPatch {
            title: Some("Buy oat milk".to_string()),
            deadline: Some(Some(deadline)),
            ..TaskPatch::default()
        };

        patch.apply_to(&mut task);

        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.description, "2%");
        assert_eq!(task.deadline, Some(deadline));
        assert!(!task.completed);
    }

    #[test]
    fn test_patch_can_clear_deadline() {
        let mut task = sample_task();
        task.deadline = Some(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap());

        TaskPatch {
            deadline: Some(None),
            ..TaskPatch::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.deadline, None);
    }

    #[test]
    fn test_patch_json_distinguishes_null_from_missing() {
        let cleared: TaskPatch = serde_json::from_str(r#"{"deadline": null}"#).unwrap();
        let untouched: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();

        assert_eq!(cleared.deadline, Some(None));
        assert_eq!(untouched.deadline, None);
        assert_eq!(untouched, TaskPatch::completed(true));
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn test_filter_shows_groups() {
        assert!(Filter::All.shows(Category::Completed));
        assert!(Filter::Completed.shows(Category::Completed));
        assert!(!Filter::Completed.shows(Category::Overdue));
        assert!(Filter::Pending.shows(Category::NoDate));
        assert!(Filter::Pending.shows(Category::Overdue));
        assert!(!Filter::Pending.shows(Category::Completed));
    }

    #[test]
    fn test_enums_parse_and_serialize_lowercase() {
        assert_eq!("PENDING".parse::<Filter>(), Ok(Filter::Pending));
        assert!("later".parse::<Filter>().is_err());
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(serde_json::to_string(&Filter::Completed).unwrap(), "\"completed\"");
        assert_eq!(serde_json::to_string(&Category::NoDate).unwrap(), "\"no-date\"");
    }
}

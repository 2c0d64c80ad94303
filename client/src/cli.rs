// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{bail, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use common::{Filter, Task, TaskPatch, Theme};
use std::path::PathBuf;

/// Personal tasks, synchronized across devices by a shared sync key.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version)]
pub struct Cli {
    /// Remote store location.
    #[arg(long, env = "TASKDECK_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Where the sync key, filter, search query and theme are kept.
    #[arg(long, env = "TASKDECK_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Use a throwaway in-memory store instead of the database.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print the board without ANSI colours.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the sync key and load its tasks.
    Key { key: String },
    /// Create a task.
    Add {
        #[arg(value_parser = parse_title)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// RFC 3339, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD` (local time).
        #[arg(long, value_parser = parse_deadline)]
        deadline: Option<DateTime<Utc>>,
    },
    /// Flip a task between done and not done.
    Toggle { id: String },
    /// Change some fields of a task.
    Edit {
        id: String,
        #[arg(long, value_parser = parse_title)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_deadline, conflicts_with = "clear_deadline")]
        deadline: Option<DateTime<Utc>>,
        #[arg(long)]
        clear_deadline: bool,
    },
    /// Delete a task.
    Delete { id: String },
    /// Drag the task at board position FROM onto board position TO.
    Move { from: usize, to: usize },
    /// Show the board.
    List,
    /// Switch the colour theme (toggles when no theme is given).
    Theme { theme: Option<Theme> },
    /// Choose which groups are shown.
    Filter { filter: Filter },
    /// Only show tasks whose title contains QUERY (clears when omitted).
    Search { query: Option<String> },
}

/// Rejects empty or whitespace-only titles. Surrounding whitespace is trimmed.
pub fn parse_title(input: &str) -> Result<String, String> {
    let title = input.trim();
    if title.is_empty() {
        return Err("title cannot be empty".to_string());
    }
    Ok(title.to_string())
}

/// Parses a deadline given on the command line.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid deadline '{input}'"))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("deadline '{input}' does not exist in the local time zone"))
}

/// Builds the patch for `taskdeck edit`.
pub fn edit_patch(
    title: Option<String>,
    description: Option<String>,
    deadline: Option<DateTime<Utc>>,
    clear_deadline: bool,
) -> TaskPatch {
    TaskPatch {
        title,
        description,
        deadline: if clear_deadline { Some(None) } else { deadline.map(Some) },
        completed: None,
    }
}

/// Finds the task whose id equals `prefix` or is the only one starting with it.
pub fn resolve_task_id(tasks: &[Task], prefix: &str) -> Result<String> {
    if let Some(task) = tasks.iter().find(|t| t.id == prefix) {
        return Ok(task.id.clone());
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => bail!("no task with id '{}'", prefix),
        _ => bail!("id '{}' matches {} tasks, use more characters", prefix, matches.len()),
    }
}

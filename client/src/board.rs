// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::categorize::{categorize, Categories};
use crate::remote::RemoteStore;
use crate::session::Session;
use crate::store::{Outcome, TaskStore};

use chrono::{DateTime, Utc};
use common::{Category, Task, TaskPatch};
use tracing::{debug, info};

/// The task groups as displayed: search-filtered, categorized, sorted,
/// with groups hidden by the display filter left empty.
///
/// Flat indices count through the displayed groups in `Category::ORDER`.
#[derive(Debug, Clone)]
pub struct Board<'a> {
    categories: Categories<'a>,
}

impl<'a> Board<'a> {
    pub fn build(tasks: &'a [Task], session: &Session, now: DateTime<Utc>) -> Self {
        let mut categories = categorize(tasks, &session.search_query, now);
        for category in Category::ORDER {
            if !session.filter.shows(category) {
                categories.group_mut(category).clear();
            }
        }
        Self { categories }
    }

    pub fn group(&self, category: Category) -> &[&'a Task] {
        self.categories.group(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every displayed task with its group, in flat-index order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &'a Task)> + '_ {
        self.categories.iter()
    }

    /// Maps a flat index back to its group and task.
    pub fn locate(&self, index: usize) -> Option<(Category, &'a Task)> {
        let mut remaining = index;
        for category in Category::ORDER {
            let group = self.categories.group(category);
            if remaining < group.len() {
                return Some((category, group[remaining]));
            }
            remaining -= group.len();
        }
        None
    }
}

/// What a drag-and-drop gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    /// One of the indices did not point at a displayed task.
    Ignored,
    /// Only the local list order changed.
    Reordered,
    /// The completion flag was written (with the given result), then the
    /// local list was reordered.
    Recategorized(Outcome),
}

/// Applies a drop of the task at flat index `from` onto flat index `to`.
///
/// Only crossing the completed/not-completed boundary is persisted.
/// Moves between the time-derived groups have no lasting effect, and the
/// flat reorder is cosmetic since the board is rebuilt from task data.
pub async fn drop_task<S: RemoteStore>(
    store: &mut TaskStore<S>,
    from: usize,
    to: usize,
    now: DateTime<Utc>,
) -> DropEffect {
    let (source, destination, id, completed) = {
        let board = Board::build(store.tasks(), store.session(), now);
        let (Some((source, task)), Some((destination, _))) = (board.locate(from), board.locate(to))
        else {
            debug!("Drop {} -> {} does not map to displayed tasks.", from, to);
            return DropEffect::Ignored;
        };
        (source, destination, task.id.clone(), task.completed)
    };

    let mut effect = DropEffect::Reordered;
    if source != destination {
        let target = destination == Category::Completed;
        if target != completed {
            info!(
                "Task {} dropped from {} into {}, marking completed={}.",
                id,
                source.label(),
                destination.label(),
                target
            );
            let outcome = store.update_task(&id, TaskPatch::completed(target)).await;
            effect = DropEffect::Recategorized(outcome);
        }
    }

    store.reorder_tasks(from, to);
    effect
}

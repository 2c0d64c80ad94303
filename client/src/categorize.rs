// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use common::{Category, Task};

/// A task list split into the four display groups.
///
/// Groups borrow from the task list they were built from. Every task that
/// passed the search filter lands in exactly one group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Categories<'a> {
    pub pending: Vec<&'a Task>,
    pub overdue: Vec<&'a Task>,
    pub no_date: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Categories<'a> {
    pub fn group(&self, category: Category) -> &[&'a Task] {
        match category {
            Category::Pending => &self.pending,
            Category::Overdue => &self.overdue,
            Category::NoDate => &self.no_date,
            Category::Completed => &self.completed,
        }
    }

    pub fn group_mut(&mut self, category: Category) -> &mut Vec<&'a Task> {
        match category {
            Category::Pending => &mut self.pending,
            Category::Overdue => &mut self.overdue,
            Category::NoDate => &mut self.no_date,
            Category::Completed => &mut self.completed,
        }
    }

    /// Total number of tasks across all groups.
    pub fn len(&self) -> usize {
        Category::ORDER.iter().map(|c| self.group(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tasks in display order (pending, overdue, no-date, completed).
    pub fn iter(&self) -> impl Iterator<Item = (Category, &'a Task)> + '_ {
        Category::ORDER
            .into_iter()
            .flat_map(move |c| self.group(c).iter().map(move |t| (c, *t)))
    }
}

/// Case-insensitive substring match of `query` against the title.
pub fn matches_search(task: &Task, query: &str) -> bool {
    task.title.to_lowercase().contains(&query.to_lowercase())
}

/// The group a single task belongs to at instant `now`.
pub fn categorize_task(task: &Task, now: DateTime<Utc>) -> Category {
    if task.completed {
        return Category::Completed;
    }
    match task.deadline {
        None => Category::NoDate,
        Some(deadline) if deadline < now => Category::Overdue,
        Some(_) => Category::Pending,
    }
}

/// Filters `tasks` by `query`, groups them at instant `now` and sorts the
/// dated groups by deadline.
pub fn categorize<'a>(tasks: &'a [Task], query: &str, now: DateTime<Utc>) -> Categories<'a> {
    let mut categories = Categories::default();
    for task in tasks.iter().filter(|t| matches_search(t, query)) {
        categories
            .group_mut(categorize_task(task, now))
            .push(task);
    }

    sort_by_deadline(&mut categories.pending);
    sort_by_deadline(&mut categories.overdue);
    sort_by_deadline(&mut categories.completed);
    categories
}

// Ascending deadline, undated last. `sort_by_key` is stable, so ties keep list order.
fn sort_by_deadline(group: &mut [&Task]) {
    group.sort_by_key(|t| (t.deadline.is_none(), t.deadline));
}

// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::board::{Board, DropEffect};
use crate::session::Session;
use crate::theme::{paint, palette};

use chrono::Local;
use common::{Category, Task};
use std::fmt::Write;

pub const SETUP_HINT: &str = "Set up task sync: run `taskdeck key <KEY>` with a key of your \
choice. Use the same key on every device to see the same tasks.";

const SHORT_ID_LEN: usize = 8;

/// Renders the board as text, one numbered line per task.
/// The numbers are the flat indices accepted by `taskdeck move`.
#[allow(clippy::uninlined_format_args)]
pub fn render_board(board: &Board<'_>, session: &Session, color: bool) -> String {
    let palette = palette(session.theme);
    let style = |text: &str, hex: &str| {
        if color {
            paint(text, hex)
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    if board.is_empty() {
        let _ = writeln!(out, "{}", style("No tasks.", palette.secondary));
    }

    let mut index = 0;
    for category in Category::ORDER {
        let group = board.group(category);
        if group.is_empty() {
            continue;
        }
        let heading = format!("{} ({})", category.label(), group.len());
        let _ = writeln!(out, "{}", style(&heading, palette.for_category(category)));

        for task in group {
            let mark = if task.completed { "[x]" } else { "[ ]" };
            let title_colour = if task.completed {
                palette.secondary
            } else {
                palette.primary
            };
            let title = style(&task.title, title_colour);
            let id = style(short_id(task), palette.border);
            let _ = writeln!(out, "{:>3}. {} {}  {}", index, mark, title, id);
            if !task.description.is_empty() {
                let _ = writeln!(out, "       {}", style(&task.description, palette.secondary));
            }
            if let Some(due) = task.deadline {
                let due = format!("Due: {}", due.with_timezone(&Local).format("%B %-d, %Y %H:%M"));
                let _ = writeln!(out, "       {}", style(&due, palette.accent));
            }
            index += 1;
        }
    }

    let mut footer = format!("filter: {} | theme: {}", session.filter, session.theme);
    if !session.search_query.is_empty() {
        let _ = write!(footer, " | search: \"{}\"", session.search_query);
    }
    let _ = writeln!(out, "{}", style(&footer, palette.secondary));
    out
}

/// A one-line note for drops that changed nothing.
pub fn drop_note(effect: DropEffect, from: usize, to: usize) -> Option<String> {
    match effect {
        DropEffect::Ignored => Some(format!(
            "Nothing moved: positions {from} and {to} must both be on the board."
        )),
        DropEffect::Reordered | DropEffect::Recategorized(_) => None,
    }
}

pub fn short_id(task: &Task) -> &str {
    task.id.get(..SHORT_ID_LEN).unwrap_or(&task.id)
}

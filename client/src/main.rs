// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use common::TaskDraft;
use taskdeck::board::{drop_task, Board};
use taskdeck::cli::{edit_patch, resolve_task_id, Cli, Command};
use taskdeck::config::Config;
use taskdeck::database::SqliteStore;
use taskdeck::remote::{MemoryStore, RemoteStore};
use taskdeck::render::{drop_note, render_board, SETUP_HINT};
use taskdeck::session::Session;
use taskdeck::store::{Outcome, TaskStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = Config::from_cli(&cli);
    let command = cli.command.unwrap_or(Command::List);
    let session = Session::load_or_default(&config.session_path);
    tracing::debug!("Resolved configuration: {:?}", config);

    if config.offline {
        tracing::info!("Running against an in-memory store.");
        let store = TaskStore::new(MemoryStore::new(), session)
            .with_session_file(&config.session_path);
        return run(store, command, config.color).await;
    }

    let remote = match SqliteStore::connect(&config.database_url).await {
        Ok(remote) => {
            tracing::info!("Database connection was made successfully.");
            remote
        }
        Err(e) => {
            tracing::error!("Failed to connect with the database: {:?}", e);
            return Err(e).context("The task database could not be opened");
        }
    };
    let store = TaskStore::new(remote, session).with_session_file(&config.session_path);
    run(store, command, config.color).await
}

/// Runs one command against the store and prints the resulting board.
async fn run<S: RemoteStore>(mut store: TaskStore<S>, command: Command, color: bool) -> Result<()> {
    match command {
        // Session-only commands never talk to the remote store.
        Command::Theme { theme } => {
            let theme = theme.unwrap_or_else(|| store.session().theme.toggled());
            store.set_theme(theme);
            println!("Theme set to {theme}.");
            return Ok(());
        }
        Command::Filter { filter } => {
            store.set_filter(filter);
            println!("Showing {filter} tasks.");
            return Ok(());
        }
        Command::Search { query } => {
            let query = query.unwrap_or_default();
            store.set_search_query(&query);
            if query.is_empty() {
                println!("Search cleared.");
            } else {
                println!("Searching for \"{query}\".");
            }
            return Ok(());
        }
        Command::Key { key } => {
            if store.set_sync_key(&key).await == Outcome::Skipped {
                println!("{SETUP_HINT}");
                return Ok(());
            }
        }
        command => {
            store.sync_tasks().await;
            if store.sync_key().is_none() {
                println!("{SETUP_HINT}");
                return Ok(());
            }
            apply(&mut store, command).await?;
        }
    }

    let board = Board::build(store.tasks(), store.session(), Utc::now());
    print!("{}", render_board(&board, store.session(), color));
    Ok(())
}

async fn apply<S: RemoteStore>(store: &mut TaskStore<S>, command: Command) -> Result<()> {
    let outcome = match command {
        Command::Add {
            title,
            description,
            deadline,
        } => {
            store
                .add_task(TaskDraft {
                    title,
                    description,
                    deadline,
                })
                .await
        }
        Command::Toggle { id } => {
            let id = resolve_task_id(store.tasks(), &id)?;
            store.toggle_task(&id).await
        }
        Command::Edit {
            id,
            title,
            description,
            deadline,
            clear_deadline,
        } => {
            let id = resolve_task_id(store.tasks(), &id)?;
            store
                .update_task(&id, edit_patch(title, description, deadline, clear_deadline))
                .await
        }
        Command::Delete { id } => {
            let id = resolve_task_id(store.tasks(), &id)?;
            store.delete_task(&id).await
        }
        Command::Move { from, to } => {
            let effect = drop_task(store, from, to, Utc::now()).await;
            tracing::debug!("Move {} -> {}: {:?}", from, to, effect);
            if let Some(note) = drop_note(effect, from, to) {
                println!("{note}");
            }
            return Ok(());
        }
        Command::List
        | Command::Key { .. }
        | Command::Theme { .. }
        | Command::Filter { .. }
        | Command::Search { .. } => return Ok(()),
    };
    tracing::debug!("Command finished with {:?}", outcome);
    Ok(())
}

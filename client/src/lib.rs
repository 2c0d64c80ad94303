// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Task store and synchronization layer for a personal task list shared
//! between devices through a sync key.
pub mod board;
pub mod categorize;
pub mod cli;
pub mod config;
pub mod database;
pub mod remote;
pub mod render;
pub mod session;
pub mod store;
pub mod theme;

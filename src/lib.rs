//! tasklist - terminal task list library
//!
//! This library provides the core functionality for the `tasklist` CLI: a
//! single-user to-do list persisted as one JSON document.
//!
//! # Core Concepts
//!
//! - **Task records**: id, title and completion flag, kept in insertion order
//! - **Filters**: conjunctive id/title/completion predicates
//! - **Storage adapter**: whole-document load, mutate, persist
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Application options and `config.toml` loading
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output envelopes
//! - `service`: Display-oriented task facade and stats
//! - `storage`: `Database` trait with JSON file and in-memory adapters
//! - `task`: Task records and the filter/update engine
//! - `ui`: Interactive terminal menu

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod service;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};

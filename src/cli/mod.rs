//! Command-line interface for tasklist
//!
//! This module defines the CLI structure using clap derive macros. With no
//! subcommand the interactive shell starts; the subcommands run one operation
//! and print its result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppOptions;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::ui;

mod task;

/// tasklist - a to-do list in your terminal
///
/// Tasks live in a single JSON file (default: ~/tasks.json).
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task file
    #[arg(long, global = true, env = "TASKLIST_FILE")]
    pub file: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "TASKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Start with completed tasks hidden
    #[arg(long, global = true)]
    pub hide_completed: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive menu (default)
    Ui,

    /// Add one task per title
    Add {
        /// Task titles
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// List tasks matching all given filters
    List {
        /// Only these ids (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Title contains this text
        #[arg(long, conflicts_with = "pattern")]
        title: Option<String>,

        /// Title matches this regular expression
        #[arg(long)]
        pattern: Option<String>,

        /// Only completed tasks
        #[arg(long, conflicts_with = "incomplete")]
        completed: bool,

        /// Only incomplete tasks
        #[arg(long)]
        incomplete: bool,
    },

    /// Mark tasks as completed
    Complete {
        /// Task ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark tasks as not completed
    Reopen {
        /// Task ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove tasks
    Rm {
        /// Task ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove all completed tasks
    Purge,

    /// Show task counts
    Stats,
}

impl Cli {
    /// Resolve configuration: defaults, then the config file, then flags
    pub fn options(&self) -> Result<AppOptions> {
        let mut options = AppOptions::resolve(self.config.as_deref())?;
        if let Some(file) = &self.file {
            options = options.with_storage_location(file.clone());
        }
        if self.hide_completed {
            options = options.with_show_completed(false);
        }
        options.validate()?;
        Ok(options)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let options = self.options()?;
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command.unwrap_or(Commands::Ui) {
            Commands::Ui => {
                let service = task::open_service(&options)?;
                ui::shell::run(service, options.state)
            }
            Commands::Add { titles } => task::run_add(&options, output, titles),
            Commands::List {
                ids,
                title,
                pattern,
                completed,
                incomplete,
            } => task::run_list(
                &options,
                output,
                task::ListFilters {
                    ids,
                    title,
                    pattern,
                    completed,
                    incomplete,
                },
            ),
            Commands::Complete { ids } => task::run_set_complete(&options, output, ids, true),
            Commands::Reopen { ids } => task::run_set_complete(&options, output, ids, false),
            Commands::Rm { ids } => task::run_remove(&options, output, ids),
            Commands::Purge => task::run_purge(&options, output),
            Commands::Stats => task::run_stats(&options, output),
        }
    }
}

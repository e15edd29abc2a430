//! Command-line interface for taskdeck
//!
//! This module defines the CLI structure using clap derive macros.
//! Task and category command implementations live in their own
//! submodules. Commands drive the async store through a
//! current-thread tokio runtime.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::storage::{Snapshot, Storage};
use crate::store::EntityStore;

mod category;
mod task;

const DEFAULT_DATA_DIR: &str = ".taskdeck";

/// taskdeck - personal task tracker
///
/// Tasks carry a category, priority, and optional due date. Browse them
/// with combined text search, status/priority/category filters, and
/// date buckets (today/upcoming/completed), with live counts.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding tasks.json (defaults to ./.taskdeck)
    #[arg(long, global = true, env = "TASKDECK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Category name (matched case-insensitively)
        #[arg(short, long)]
        category: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date: RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks, optionally filtered
    List {
        /// Substring match against title or description
        #[arg(short, long)]
        search: Option<String>,

        /// Status: all, pending, completed, overdue (unknown = all)
        #[arg(long, default_value = "all")]
        status: String,

        /// Priority: all, low, medium, high (unknown = all)
        #[arg(short, long, default_value = "all")]
        priority: String,

        /// Category name or "all"
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Bucket: all, today, upcoming, completed (unknown = all)
        #[arg(short, long, default_value = "all")]
        bucket: String,
    },

    /// Show one task
    Show {
        /// Task id
        id: u32,
    },

    /// Edit task fields
    Edit {
        /// Task id
        id: u32,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// New category name
        #[arg(short, long)]
        category: Option<String>,

        /// New due date: RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Mark a task completed
    Done {
        /// Task id
        id: u32,
    },

    /// Mark a completed task pending again
    Reopen {
        /// Task id
        id: u32,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: u32,
    },

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Per-category and per-bucket task counts
    Counts,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category name (unique, case-insensitive)
        name: String,

        /// Display color, e.g. "#5B4FE5"
        #[arg(long)]
        color: Option<String>,
    },

    /// List categories with refreshed task counts
    List,

    /// Edit a category
    Edit {
        /// Category id
        id: u32,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New display color
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a category (tasks keep their category string)
    Rm {
        /// Category id
        id: u32,
    },
}

/// Data directory, config, and snapshot storage for one invocation.
pub(crate) struct CliContext {
    storage: Storage,
    config: Config,
}

impl CliContext {
    pub(crate) fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let config = Config::load(&data_dir)?;
        Ok(Self {
            storage: Storage::new(data_dir),
            config,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Load the persisted snapshot into a store.
    pub(crate) fn load_store(&self) -> Result<EntityStore> {
        let snapshot = self.storage.load()?;
        Ok(
            EntityStore::from_records(snapshot.tasks, snapshot.categories)
                .with_latency(self.config.latency()),
        )
    }

    /// Persist the store back to the snapshot file.
    pub(crate) fn save_store(&self, store: EntityStore) -> Result<()> {
        let (tasks, categories) = store.into_records();
        self.storage.save(&Snapshot::new(tasks, categories))
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(self.dispatch())
    }

    async fn dispatch(self) -> Result<()> {
        let ctx = CliContext::open(self.data_dir)?;
        let opts = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add {
                title,
                category,
                description,
                priority,
                due,
            } => {
                task::add(
                    &ctx,
                    opts,
                    task::AddOptions {
                        title,
                        category,
                        description,
                        priority,
                        due,
                    },
                )
                .await
            }
            Commands::List {
                search,
                status,
                priority,
                category,
                bucket,
            } => {
                task::list(
                    &ctx,
                    opts,
                    task::ListOptions {
                        search,
                        status,
                        priority,
                        category,
                        bucket,
                    },
                )
                .await
            }
            Commands::Show { id } => task::show(&ctx, opts, id).await,
            Commands::Edit {
                id,
                title,
                description,
                priority,
                category,
                due,
                clear_due,
            } => {
                task::edit(
                    &ctx,
                    opts,
                    task::EditOptions {
                        id,
                        title,
                        description,
                        priority,
                        category,
                        due,
                        clear_due,
                    },
                )
                .await
            }
            Commands::Done { id } => task::set_completed(&ctx, opts, id, true).await,
            Commands::Reopen { id } => task::set_completed(&ctx, opts, id, false).await,
            Commands::Rm { id } => task::remove(&ctx, opts, id).await,
            Commands::Category(command) => match command {
                CategoryCommands::Add { name, color } => {
                    category::add(&ctx, opts, name, color).await
                }
                CategoryCommands::List => category::list(&ctx, opts).await,
                CategoryCommands::Edit { id, name, color } => {
                    category::edit(&ctx, opts, id, name, color).await
                }
                CategoryCommands::Rm { id } => category::remove(&ctx, opts, id).await,
            },
            Commands::Counts => task::counts(&ctx, opts).await,
        }
    }
}

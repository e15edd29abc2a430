//! taskdeck - Personal Task Tracker Library
//!
//! This library provides the core functionality for the taskdeck CLI:
//! an in-memory entity store for tasks and categories, and a pure
//! query engine for faceted filtering and aggregate counts.
//!
//! # Core Concepts
//!
//! - **Entity Store**: authoritative CRUD over tasks and categories,
//!   with max+1 id assignment and completion-timestamp invariants
//! - **Facets**: independent filter dimensions (search, status,
//!   priority, category, bucket) combined with AND; unrecognized facet
//!   values fail open to "no constraint"
//! - **Buckets**: coarse date/completion views (today/upcoming/
//!   completed) used for navigation and counts
//! - **Snapshots**: the query engine works over copies of the task
//!   collection and never mutates the store
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.taskdeck.toml`
//! - `error`: error types and result aliases
//! - `task` / `category`: record types, drafts, and patches
//! - `store`: the entity store with injectable simulated latency
//! - `query`: pure filtering and aggregation over task snapshots
//! - `storage`: JSON snapshot persistence for the CLI
//! - `output`: human/JSON output formatting

pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod query;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};

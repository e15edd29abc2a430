//! Category records and their create/update inputs.

use serde::{Deserialize, Serialize};

/// A stored category record.
///
/// `task_count` is a denormalized display cache pushed in by callers
/// via [`EntityStore::set_task_count`](crate::store::EntityStore::set_task_count).
/// It is never authoritative; the real counts come from
/// [`aggregate_counts`](crate::query::aggregate_counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    /// Presentational color, opaque to the engine (e.g. "#5B4FE5").
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub task_count: u32,
}

/// Input for creating a category. Name is required.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub color: Option<String>,
}

/// Partial update for a category. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

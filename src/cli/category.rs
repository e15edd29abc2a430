//! taskdeck category command implementations.

use chrono::Utc;

use crate::category::{Category, CategoryDraft, CategoryPatch};
use crate::cli::CliContext;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::aggregate_counts;

fn category_line(category: &Category) -> String {
    format!(
        "{:>3}  {}  ({} task(s))",
        category.id, category.name, category.task_count
    )
}

pub async fn add(
    ctx: &CliContext,
    opts: OutputOptions,
    name: String,
    color: Option<String>,
) -> Result<()> {
    let mut store = ctx.load_store()?;
    let category = store.create_category(CategoryDraft { name, color }).await?;
    ctx.save_store(store)?;

    let mut human = HumanOutput::new(format!("Created category {}", category.id));
    human.push_summary("name", &category.name);
    if !category.color.is_empty() {
        human.push_summary("color", &category.color);
    }
    emit_success(opts, "category add", &category, Some(&human))
}

/// List categories, refreshing each denormalized `task_count` from the
/// aggregation engine before display.
pub async fn list(ctx: &CliContext, opts: OutputOptions) -> Result<()> {
    let mut store = ctx.load_store()?;
    let snapshot = store.all_tasks().await;
    let categories = store.all_categories().await;
    let counts = aggregate_counts(&snapshot, &categories, Utc::now());

    for category in &categories {
        let total = counts
            .per_category
            .get(&category.name.to_lowercase())
            .map(|group| group.total as u32)
            .unwrap_or(0);
        store.set_task_count(&category.name, total).await;
    }

    let categories = store.all_categories().await;
    ctx.save_store(store)?;

    let mut human = HumanOutput::new(format!("{} categor(ies)", categories.len()));
    for category in &categories {
        human.push_detail(category_line(category));
    }
    emit_success(opts, "category list", &categories, Some(&human))
}

pub async fn edit(
    ctx: &CliContext,
    opts: OutputOptions,
    id: u32,
    name: Option<String>,
    color: Option<String>,
) -> Result<()> {
    if name.is_none() && color.is_none() {
        return Err(Error::Validation("nothing to change".into()));
    }

    let mut store = ctx.load_store()?;
    let category = store
        .update_category(id, CategoryPatch { name, color })
        .await?;
    ctx.save_store(store)?;

    let mut human = HumanOutput::new(format!("Updated category {id}"));
    human.push_summary("name", &category.name);
    emit_success(opts, "category edit", &category, Some(&human))
}

pub async fn remove(ctx: &CliContext, opts: OutputOptions, id: u32) -> Result<()> {
    let mut store = ctx.load_store()?;
    store.delete_category(id).await?;
    ctx.save_store(store)?;

    #[derive(serde::Serialize)]
    struct Deleted {
        id: u32,
    }
    emit_success(
        opts,
        "category rm",
        &Deleted { id },
        Some(&HumanOutput::new(format!("Deleted category {id}"))),
    )
}

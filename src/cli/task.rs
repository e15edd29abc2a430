//! taskdeck task command implementations.

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::CliContext;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::query::{aggregate_counts, query_tasks, BucketFacet, FacetSpec, PriorityFacet, StatusFacet};
use crate::task::{Priority, Task, TaskDraft, TaskPatch};

pub struct AddOptions {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
}

pub struct ListOptions {
    pub search: Option<String>,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub bucket: String,
}

pub struct EditOptions {
    pub id: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
}

/// Parse a due date as RFC 3339, or as YYYY-MM-DD at midnight UTC.
fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(Error::Validation(format!(
        "unrecognized due date '{raw}' (expected RFC 3339 or YYYY-MM-DD)"
    )))
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] {:>3}  ({}) {} - {}",
        task.id,
        task.priority.as_str(),
        task.title,
        task.category
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    line
}

fn task_summary(task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("title", &task.title);
    if !task.description.is_empty() {
        human.push_summary("description", &task.description);
    }
    human.push_summary("category", &task.category);
    human.push_summary("priority", task.priority.as_str());
    human.push_summary(
        "status",
        if task.completed { "completed" } else { "pending" },
    );
    if let Some(due) = task.due_date {
        human.push_summary("due", due.format("%Y-%m-%d %H:%M").to_string());
    }
    if let Some(done_at) = task.completed_at {
        human.push_summary("completed at", done_at.format("%Y-%m-%d %H:%M").to_string());
    }
    human
}

pub async fn add(ctx: &CliContext, opts: OutputOptions, options: AddOptions) -> Result<()> {
    let priority = match options.priority {
        Some(raw) => Some(raw.parse::<Priority>()?),
        None => Some(ctx.config().default_priority),
    };
    let due_date = options.due.as_deref().map(parse_due).transpose()?;

    let mut store = ctx.load_store()?;
    let task = store
        .create_task(TaskDraft {
            title: options.title,
            category: options.category,
            description: options.description,
            priority,
            due_date,
        })
        .await?;
    ctx.save_store(store)?;

    let mut human = HumanOutput::new(format!("Created task {}", task.id));
    human.push_summary("title", &task.title);
    human.push_summary("category", &task.category);
    human.push_summary("priority", task.priority.as_str());
    emit_success(opts, "add", &task, Some(&human))
}

pub async fn list(ctx: &CliContext, opts: OutputOptions, options: ListOptions) -> Result<()> {
    let spec = FacetSpec {
        search: options.search.unwrap_or_default(),
        status: StatusFacet::parse(&options.status),
        priority: PriorityFacet::parse(&options.priority),
        category: None,
        bucket: BucketFacet::parse(&options.bucket),
    }
    .with_category(&options.category);

    let store = ctx.load_store()?;
    let snapshot = store.all_tasks().await;
    let results = query_tasks(&snapshot, &spec, Utc::now());

    let mut human = HumanOutput::new(format!(
        "{} task(s) of {}",
        results.len(),
        snapshot.len()
    ));
    for task in &results {
        human.push_detail(format_task_line(task));
    }
    emit_success(opts, "list", &results, Some(&human))
}

pub async fn show(ctx: &CliContext, opts: OutputOptions, id: u32) -> Result<()> {
    let store = ctx.load_store()?;
    let task = store.task(id).await?;
    emit_success(opts, "show", &task, Some(&task_summary(&task)))
}

pub async fn edit(ctx: &CliContext, opts: OutputOptions, options: EditOptions) -> Result<()> {
    let priority = options
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;
    let due_date = if options.clear_due {
        Some(None)
    } else {
        options
            .due
            .as_deref()
            .map(parse_due)
            .transpose()?
            .map(Some)
    };

    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        completed: None,
        priority,
        category: options.category,
        due_date,
    };
    if patch.is_empty() {
        return Err(Error::Validation("nothing to change".into()));
    }

    let mut store = ctx.load_store()?;
    let task = store.update_task(options.id, patch).await?;
    ctx.save_store(store)?;
    emit_success(opts, "edit", &task, Some(&task_summary(&task)))
}

pub async fn set_completed(
    ctx: &CliContext,
    opts: OutputOptions,
    id: u32,
    completed: bool,
) -> Result<()> {
    let mut store = ctx.load_store()?;
    let task = store
        .update_task(
            id,
            TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
        .await?;
    ctx.save_store(store)?;

    let command = if completed { "done" } else { "reopen" };
    let header = if completed {
        format!("Completed task {id}")
    } else {
        format!("Reopened task {id}")
    };
    emit_success(opts, command, &task, Some(&HumanOutput::new(header)))
}

pub async fn remove(ctx: &CliContext, opts: OutputOptions, id: u32) -> Result<()> {
    let mut store = ctx.load_store()?;
    store.delete_task(id).await?;
    ctx.save_store(store)?;

    #[derive(serde::Serialize)]
    struct Deleted {
        id: u32,
    }
    emit_success(
        opts,
        "rm",
        &Deleted { id },
        Some(&HumanOutput::new(format!("Deleted task {id}"))),
    )
}

pub async fn counts(ctx: &CliContext, opts: OutputOptions) -> Result<()> {
    let store = ctx.load_store()?;
    let snapshot = store.all_tasks().await;
    let categories = store.all_categories().await;
    let counts = aggregate_counts(&snapshot, &categories, Utc::now());

    let mut human = HumanOutput::new(format!(
        "{} task(s), {} completed",
        counts.total_tasks, counts.completed_tasks
    ));
    human.push_summary(
        "today",
        format!("{}/{}", counts.today.completed, counts.today.total),
    );
    human.push_summary(
        "upcoming",
        format!("{}/{}", counts.upcoming.completed, counts.upcoming.total),
    );
    human.push_summary("completed", counts.completed.total.to_string());
    for category in &categories {
        if let Some(group) = counts.per_category.get(&category.name.to_lowercase()) {
            human.push_summary(
                &category.name,
                format!("{}/{}", group.completed, group.total),
            );
        }
    }
    emit_success(opts, "counts", &counts, Some(&human))
}

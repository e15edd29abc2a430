//! Query engine: faceted filtering and aggregate counts over a task
//! snapshot.
//!
//! Everything here is a pure function of its arguments. The current
//! time is an explicit parameter so day-bucket classification (today /
//! upcoming / overdue) is deterministic under test; callers pass
//! `Utc::now()` (or a zone-shifted now if they want local calendar
//! days).
//!
//! Facet values are closed enums with a fail-open parse: an
//! unrecognized string means "no constraint on this facet", never an
//! error. Callers holding stale facet strings still get results.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::category::Category;
use crate::task::{Priority, Task};

/// Status facet: completion/deadline oriented, finer grained than the
/// navigation bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFacet {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl StatusFacet {
    /// Parse a facet string. Unrecognized values fail open to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => StatusFacet::Pending,
            "completed" => StatusFacet::Completed,
            "overdue" => StatusFacet::Overdue,
            _ => StatusFacet::All,
        }
    }
}

/// Priority facet: exact match or unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFacet {
    #[default]
    All,
    Fixed(Priority),
}

impl PriorityFacet {
    /// Parse a facet string. Unrecognized values fail open to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => PriorityFacet::Fixed(Priority::Low),
            "medium" => PriorityFacet::Fixed(Priority::Medium),
            "high" => PriorityFacet::Fixed(Priority::High),
            _ => PriorityFacet::All,
        }
    }
}

/// Bucket facet: the coarse date/completion navigation view, distinct
/// from and composable with `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketFacet {
    #[default]
    All,
    Today,
    Upcoming,
    Completed,
}

impl BucketFacet {
    /// Parse a facet string. Unrecognized values fail open to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" => BucketFacet::Today,
            "upcoming" => BucketFacet::Upcoming,
            "completed" => BucketFacet::Completed,
            _ => BucketFacet::All,
        }
    }
}

/// A combination of active facets. All constraints AND together;
/// `Default` is fully unconstrained.
#[derive(Debug, Clone, Default)]
pub struct FacetSpec {
    /// Case-insensitive substring over title or description.
    /// Empty or whitespace-only means no constraint.
    pub search: String,
    pub status: StatusFacet,
    pub priority: PriorityFacet,
    /// Category name, matched case-insensitively. `None` means no
    /// constraint; `"all"` and blank strings are normalized to `None`
    /// by [`FacetSpec::with_category`].
    pub category: Option<String>,
    pub bucket: BucketFacet,
}

impl FacetSpec {
    /// Set the category facet, normalizing "all"/blank to unconstrained.
    pub fn with_category(mut self, raw: &str) -> Self {
        let trimmed = raw.trim();
        self.category = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

fn due_day(task: &Task) -> Option<NaiveDate> {
    task.due_date.map(|due| due.date_naive())
}

fn is_due_today(task: &Task, today: NaiveDate) -> bool {
    due_day(task) == Some(today)
}

/// Due on a later calendar day than today.
fn is_upcoming(task: &Task, today: NaiveDate) -> bool {
    due_day(task).is_some_and(|day| day > today)
}

/// Not completed and due strictly before the start of today.
fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && due_day(task).is_some_and(|day| day < today)
}

fn matches_search(task: &Task, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
}

fn matches(task: &Task, spec: &FacetSpec, today: NaiveDate) -> bool {
    let status_ok = match spec.status {
        StatusFacet::All => true,
        StatusFacet::Pending => !task.completed,
        StatusFacet::Completed => task.completed,
        StatusFacet::Overdue => is_overdue(task, today),
    };
    let priority_ok = match spec.priority {
        PriorityFacet::All => true,
        PriorityFacet::Fixed(priority) => task.priority == priority,
    };
    let category_ok = match &spec.category {
        None => true,
        Some(name) => task.category.eq_ignore_ascii_case(name),
    };
    let bucket_ok = match spec.bucket {
        BucketFacet::All => true,
        BucketFacet::Today => is_due_today(task, today),
        BucketFacet::Upcoming => is_upcoming(task, today),
        BucketFacet::Completed => task.completed,
    };

    status_ok && priority_ok && category_ok && bucket_ok && matches_search(task, &spec.search)
}

/// Filter a snapshot by a facet spec.
///
/// A single AND predicate decides membership, so the result cannot
/// depend on any facet evaluation order. The filter is stable: output
/// preserves the snapshot's relative order, with no implicit sort.
pub fn query_tasks(snapshot: &[Task], spec: &FacetSpec, now: DateTime<Utc>) -> Vec<Task> {
    let today = now.date_naive();
    snapshot
        .iter()
        .filter(|task| matches(task, spec, today))
        .cloned()
        .collect()
}

/// A total/completed pair for one grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub total: usize,
    pub completed: usize,
}

impl GroupCount {
    fn add(&mut self, completed: bool) {
        self.total += 1;
        if completed {
            self.completed += 1;
        }
    }
}

/// Aggregate counts over the full (unfiltered) snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskCounts {
    /// Keyed by lowercased category name; one entry per known category.
    /// Tasks whose category matches no known category are absent here
    /// but still counted in the buckets below.
    pub per_category: HashMap<String, GroupCount>,
    pub today: GroupCount,
    pub upcoming: GroupCount,
    pub completed: GroupCount,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}

/// Compute per-category and per-bucket counts plus grand totals.
pub fn aggregate_counts(
    snapshot: &[Task],
    categories: &[Category],
    now: DateTime<Utc>,
) -> TaskCounts {
    let today = now.date_naive();
    let mut counts = TaskCounts::default();

    for category in categories {
        counts
            .per_category
            .entry(category.name.to_lowercase())
            .or_default();
    }

    for task in snapshot {
        counts.total_tasks += 1;
        if task.completed {
            counts.completed_tasks += 1;
        }
        if let Some(group) = counts.per_category.get_mut(&task.category.to_lowercase()) {
            group.add(task.completed);
        }
        if is_due_today(task, today) {
            counts.today.add(task.completed);
        }
        if is_upcoming(task, today) {
            counts.upcoming.add(task.completed);
        }
        if task.completed {
            counts.completed.add(true);
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task(id: u32, title: &str, category: &str) -> Task {
        Task {
            id,
            title: title.into(),
            description: String::new(),
            completed: false,
            priority: Priority::Medium,
            category: category.into(),
            due_date: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn category(id: u32, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            color: String::new(),
            task_count: 0,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn due_today_at_2359_is_today_but_not_overdue() {
        let now = fixed_now();
        let mut t = task(1, "Ship release", "Work");
        t.due_date = Some(Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 0).unwrap());

        let overdue = FacetSpec {
            status: StatusFacet::Overdue,
            ..FacetSpec::default()
        };
        assert!(query_tasks(&[t.clone()], &overdue, now).is_empty());

        let today = FacetSpec {
            bucket: BucketFacet::Today,
            ..FacetSpec::default()
        };
        assert_eq!(query_tasks(&[t], &today, now).len(), 1);
    }

    #[test]
    fn due_yesterday_is_overdue_and_not_upcoming() {
        let now = fixed_now();
        let mut t = task(1, "Pay invoice", "Finance");
        t.due_date = Some(now - Duration::days(1));

        let overdue = FacetSpec {
            status: StatusFacet::Overdue,
            ..FacetSpec::default()
        };
        assert_eq!(query_tasks(&[t.clone()], &overdue, now).len(), 1);

        let upcoming = FacetSpec {
            bucket: BucketFacet::Upcoming,
            ..FacetSpec::default()
        };
        assert!(query_tasks(&[t], &upcoming, now).is_empty());
    }

    #[test]
    fn completed_tasks_are_never_overdue() {
        let now = fixed_now();
        let mut t = task(1, "Old chore", "Home");
        t.due_date = Some(now - Duration::days(3));
        t.completed = true;
        t.completed_at = Some(now);

        let overdue = FacetSpec {
            status: StatusFacet::Overdue,
            ..FacetSpec::default()
        };
        assert!(query_tasks(&[t], &overdue, now).is_empty());
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let now = fixed_now();
        let a = task(1, "Milestone review", "Work");
        let mut b = task(2, "Planning", "Work");
        b.description = "reach a milestone".into();
        let c = task(3, "Budget", "Work");

        let spec = FacetSpec {
            search: "mile".into(),
            ..FacetSpec::default()
        };
        let hits = query_tasks(&[a, b, c], &spec, now);
        let ids: Vec<u32> = hits.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn whitespace_search_is_unconstrained() {
        let now = fixed_now();
        let tasks = [task(1, "A", "Work"), task(2, "B", "Home")];
        let spec = FacetSpec {
            search: "   ".into(),
            ..FacetSpec::default()
        };
        assert_eq!(query_tasks(&tasks, &spec, now).len(), 2);
    }

    #[test]
    fn facets_compose_with_and_in_any_order() {
        let now = fixed_now();
        let mut tasks = Vec::new();
        for id in 1..=8 {
            let mut t = task(id, &format!("task {id}"), if id % 2 == 0 { "Work" } else { "Home" });
            t.priority = if id % 3 == 0 {
                Priority::High
            } else {
                Priority::Low
            };
            if id % 2 == 0 {
                t.due_date = Some(now + Duration::days(i64::from(id)));
            }
            tasks.push(t);
        }

        let combined = FacetSpec {
            priority: PriorityFacet::Fixed(Priority::High),
            bucket: BucketFacet::Upcoming,
            ..FacetSpec::default()
        }
        .with_category("work");

        // Apply the same facets one at a time, in two different orders.
        let single = |spec: FacetSpec, input: &[Task]| query_tasks(input, &spec, now);
        let order_a = single(
            FacetSpec {
                priority: PriorityFacet::Fixed(Priority::High),
                ..FacetSpec::default()
            },
            &single(
                FacetSpec {
                    bucket: BucketFacet::Upcoming,
                    ..FacetSpec::default()
                },
                &single(FacetSpec::default().with_category("work"), &tasks),
            ),
        );
        let order_b = single(
            FacetSpec::default().with_category("work"),
            &single(
                FacetSpec {
                    priority: PriorityFacet::Fixed(Priority::High),
                    ..FacetSpec::default()
                },
                &single(
                    FacetSpec {
                        bucket: BucketFacet::Upcoming,
                        ..FacetSpec::default()
                    },
                    &tasks,
                ),
            ),
        );
        let all_at_once = query_tasks(&tasks, &combined, now);

        let ids = |ts: &[Task]| ts.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(&order_a), ids(&all_at_once));
        assert_eq!(ids(&order_b), ids(&all_at_once));
        assert_eq!(ids(&all_at_once), vec![6]);
    }

    #[test]
    fn bucket_and_status_are_independent_and_both_applied() {
        let now = fixed_now();
        let mut due_today_done = task(1, "done today", "Work");
        due_today_done.due_date = Some(now);
        due_today_done.completed = true;
        due_today_done.completed_at = Some(now);
        let mut due_today_open = task(2, "open today", "Work");
        due_today_open.due_date = Some(now);

        let spec = FacetSpec {
            status: StatusFacet::Pending,
            bucket: BucketFacet::Today,
            ..FacetSpec::default()
        };
        let hits = query_tasks(&[due_today_done, due_today_open], &spec, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn unrecognized_facet_strings_fail_open_to_all() {
        assert_eq!(StatusFacet::parse("archived"), StatusFacet::All);
        assert_eq!(StatusFacet::parse(""), StatusFacet::All);
        assert_eq!(StatusFacet::parse("PENDING"), StatusFacet::Pending);
        assert_eq!(BucketFacet::parse("someday"), BucketFacet::All);
        assert_eq!(BucketFacet::parse("Today"), BucketFacet::Today);
        assert_eq!(PriorityFacet::parse("urgent"), PriorityFacet::All);
        assert_eq!(
            PriorityFacet::parse("high"),
            PriorityFacet::Fixed(Priority::High)
        );

        let now = fixed_now();
        let tasks = [task(1, "A", "Work"), task(2, "B", "Home")];
        let stale = FacetSpec {
            status: StatusFacet::parse("archived"),
            bucket: BucketFacet::parse("someday"),
            priority: PriorityFacet::parse("urgent"),
            ..FacetSpec::default()
        };
        assert_eq!(
            query_tasks(&tasks, &stale, now).len(),
            query_tasks(&tasks, &FacetSpec::default(), now).len()
        );
    }

    #[test]
    fn filter_preserves_snapshot_order() {
        let now = fixed_now();
        let tasks = [
            task(3, "c", "Work"),
            task(1, "a", "Work"),
            task(2, "b", "Work"),
        ];
        let ids: Vec<u32> = query_tasks(&tasks, &FacetSpec::default(), now)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn aggregation_counts_categories_buckets_and_totals() {
        let now = fixed_now();
        let categories = [category(1, "Work"), category(2, "Home")];

        let mut work_done = task(1, "a", "work"); // case-insensitive join
        work_done.completed = true;
        work_done.completed_at = Some(now);
        let mut work_today = task(2, "b", "Work");
        work_today.due_date = Some(now);
        let mut orphan_upcoming = task(3, "c", "Errands"); // no such category
        orphan_upcoming.due_date = Some(now + Duration::days(2));
        let home_idle = task(4, "d", "Home");

        let counts = aggregate_counts(
            &[work_done, work_today, orphan_upcoming, home_idle],
            &categories,
            now,
        );

        assert_eq!(
            counts.per_category["work"],
            GroupCount {
                total: 2,
                completed: 1
            }
        );
        assert_eq!(
            counts.per_category["home"],
            GroupCount {
                total: 1,
                completed: 0
            }
        );
        // Orphan category string gets no per-category entry...
        assert!(!counts.per_category.contains_key("errands"));
        // ...but still contributes to buckets.
        assert_eq!(counts.upcoming.total, 1);
        assert_eq!(counts.today.total, 1);
        assert_eq!(counts.completed.total, 1);
        assert_eq!(counts.completed.completed, 1);

        assert_eq!(counts.total_tasks, 4);
        assert_eq!(counts.completed_tasks, 1);
        for group in counts.per_category.values() {
            assert!(group.completed <= group.total);
        }
    }

    #[test]
    fn empty_categories_still_appear_with_zero_counts() {
        let now = fixed_now();
        let counts = aggregate_counts(&[], &[category(1, "Work")], now);
        assert_eq!(counts.per_category["work"], GroupCount::default());
        assert_eq!(counts.total_tasks, 0);
    }
}

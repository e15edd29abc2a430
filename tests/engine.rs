//! Store + query engine integration: drive the store through a
//! realistic session and check what the query engine reports.

use chrono::{Duration, Utc};
use taskdeck::category::CategoryDraft;
use taskdeck::query::{
    aggregate_counts, query_tasks, BucketFacet, FacetSpec, PriorityFacet, StatusFacet,
};
use taskdeck::store::EntityStore;
use taskdeck::task::{Priority, TaskDraft, TaskPatch};

fn draft(title: &str, category: &str) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        category: category.into(),
        ..TaskDraft::default()
    }
}

#[tokio::test]
async fn buckets_and_filters_reflect_store_mutations() {
    let now = Utc::now();
    let mut store = EntityStore::new();
    store
        .create_category(CategoryDraft {
            name: "Work".into(),
            color: Some("#5B4FE5".into()),
        })
        .await
        .unwrap();

    let today = store
        .create_task(TaskDraft {
            due_date: Some(now),
            priority: Some(Priority::High),
            ..draft("Ship release", "Work")
        })
        .await
        .unwrap();
    let upcoming = store
        .create_task(TaskDraft {
            due_date: Some(now + Duration::days(3)),
            ..draft("Prepare retro", "Work")
        })
        .await
        .unwrap();
    let overdue = store
        .create_task(TaskDraft {
            due_date: Some(now - Duration::days(2)),
            ..draft("Send invoice", "Finance")
        })
        .await
        .unwrap();

    let snapshot = store.all_tasks().await;

    let today_hits = query_tasks(
        &snapshot,
        &FacetSpec {
            bucket: BucketFacet::Today,
            ..FacetSpec::default()
        },
        now,
    );
    assert_eq!(today_hits.len(), 1);
    assert_eq!(today_hits[0].id, today.id);

    // Bucket narrowed further by priority.
    let today_high = query_tasks(
        &snapshot,
        &FacetSpec {
            bucket: BucketFacet::Today,
            priority: PriorityFacet::Fixed(Priority::High),
            ..FacetSpec::default()
        },
        now,
    );
    assert_eq!(today_high.len(), 1);

    let upcoming_hits = query_tasks(
        &snapshot,
        &FacetSpec {
            bucket: BucketFacet::Upcoming,
            ..FacetSpec::default()
        },
        now,
    );
    assert_eq!(upcoming_hits.len(), 1);
    assert_eq!(upcoming_hits[0].id, upcoming.id);

    let overdue_hits = query_tasks(
        &snapshot,
        &FacetSpec {
            status: StatusFacet::Overdue,
            ..FacetSpec::default()
        },
        now,
    );
    assert_eq!(overdue_hits.len(), 1);
    assert_eq!(overdue_hits[0].id, overdue.id);

    // Completing the overdue task removes it from overdue and adds it
    // to the completed bucket.
    store
        .update_task(
            overdue.id,
            TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    let snapshot = store.all_tasks().await;

    assert!(query_tasks(
        &snapshot,
        &FacetSpec {
            status: StatusFacet::Overdue,
            ..FacetSpec::default()
        },
        now,
    )
    .is_empty());

    let categories = store.all_categories().await;
    let counts = aggregate_counts(&snapshot, &categories, now);
    assert_eq!(counts.total_tasks, 3);
    assert_eq!(counts.completed_tasks, 1);
    assert_eq!(counts.today.total, 1);
    assert_eq!(counts.upcoming.total, 1);
    assert_eq!(counts.upcoming.completed, 0);
    assert_eq!(counts.completed.total, 1);
    // "Finance" is an orphan category string: bucket counts only.
    assert_eq!(counts.per_category.len(), 1);
    assert_eq!(counts.per_category["work"].total, 2);
}

#[tokio::test]
async fn query_engine_never_mutates_the_store() {
    let mut store = EntityStore::new();
    store.create_task(draft("A", "Work")).await.unwrap();
    let snapshot = store.all_tasks().await;

    let _ = query_tasks(
        &snapshot,
        &FacetSpec {
            search: "a".into(),
            ..FacetSpec::default()
        },
        Utc::now(),
    );

    // Snapshot and store contents are unchanged by querying.
    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.all_tasks().await.len(), 1);
    assert_eq!(store.task(1).await.unwrap().title, "A");
}

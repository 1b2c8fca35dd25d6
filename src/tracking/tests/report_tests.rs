//! Report service tests.

use super::fixtures::{clock, t0};
use crate::tracking::{
    adapters::memory::{InMemoryStore, ManualClock},
    domain::{Category, CategoryTag, DurationMinutes, TaskDescription, TrackedTask},
    ports::{CategoryRepository, TaskRepository},
    services::{CatalogService, DEFAULT_RECENT_LIMIT, ReportError, ReportService, ReportWindow},
};
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Seeded {
    store: Arc<InMemoryStore>,
    reports: ReportService<InMemoryStore, InMemoryStore>,
    work: Category,
    personal: Category,
}

impl Seeded {
    async fn record(
        &self,
        description: &str,
        category: Option<CategoryTag>,
        start_minutes: i64,
        length_minutes: i64,
    ) -> TrackedTask {
        let start = t0() + TimeDelta::minutes(start_minutes);
        let mut task = TrackedTask::start(
            TaskDescription::new(description).expect("valid description"),
            category,
            start,
        );
        task.close(start + TimeDelta::minutes(length_minutes))
            .expect("close should succeed");
        self.store
            .record_closed(&task)
            .await
            .expect("record should succeed");
        task
    }
}

#[fixture]
async fn seeded(clock: ManualClock) -> Seeded {
    let store = Arc::new(InMemoryStore::new());
    let catalog = CatalogService::new(Arc::clone(&store), Arc::clone(&store), Arc::new(clock));
    let work = catalog
        .add_category("Work", None)
        .await
        .expect("category should be created");
    let personal = catalog
        .add_category("Personal", None)
        .await
        .expect("category should be created");
    catalog
        .add_category("Learning", None)
        .await
        .expect("category should be created");
    Seeded {
        reports: ReportService::new(Arc::clone(&store), Arc::clone(&store)),
        store,
        work,
        personal,
    }
}

#[rstest]
#[tokio::test]
async fn recent_lists_newest_first_with_a_default_cap(#[future(awt)] seeded: Seeded) {
    for index in 0..12 {
        seeded.record("Ticket", None, index * 10, 5).await;
    }

    let default_cap = seeded.reports.recent(None).await.expect("recent should list");
    let top_two = seeded.reports.recent(Some(2)).await.expect("recent should list");

    assert_eq!(default_cap.len(), DEFAULT_RECENT_LIMIT);
    let starts: Vec<_> = top_two.iter().map(TrackedTask::start_time).collect();
    assert_eq!(
        starts,
        vec![t0() + TimeDelta::minutes(110), t0() + TimeDelta::minutes(100)]
    );
}

#[rstest]
#[tokio::test]
async fn recent_skips_the_open_task(#[future(awt)] seeded: Seeded) {
    let open = TrackedTask::start(
        TaskDescription::new("Running").expect("valid description"),
        None,
        t0(),
    );
    seeded
        .store
        .store_open(&open)
        .await
        .expect("store should succeed");

    let recent = seeded.reports.recent(None).await.expect("recent should list");

    assert!(recent.is_empty());
}

#[rstest]
#[tokio::test]
async fn by_category_filters_on_snapshot_and_window(#[future(awt)] seeded: Seeded) {
    let work = seeded.work.tag();
    seeded.record("Early", Some(work.clone()), 0, 30).await;
    let inside = seeded.record("Inside", Some(work.clone()), 60, 30).await;
    seeded.record("Late", Some(work), 180, 30).await;
    seeded
        .record("Elsewhere", Some(seeded.personal.tag()), 60, 30)
        .await;
    let window = ReportWindow {
        from: Some(t0() + TimeDelta::minutes(60)),
        until: Some(t0() + TimeDelta::minutes(120)),
    };

    let listed = seeded
        .reports
        .by_category("work", window)
        .await
        .expect("report should build");
    let everything = seeded
        .reports
        .by_category("Work", ReportWindow::unbounded())
        .await
        .expect("report should build");

    assert_eq!(listed, vec![inside]);
    assert_eq!(everything.len(), 3);
}

#[rstest]
#[tokio::test]
async fn by_category_lists_latest_start_first(#[future(awt)] seeded: Seeded) {
    let work = seeded.work.tag();
    let long = seeded.record("Long", Some(work.clone()), 0, 240).await;
    let short = seeded.record("Short", Some(work), 60, 30).await;

    let listed = seeded
        .reports
        .by_category("Work", ReportWindow::unbounded())
        .await
        .expect("report should build");
    let recent = seeded.reports.recent(None).await.expect("recent should list");

    assert_eq!(listed, vec![short.clone(), long.clone()]);
    assert_eq!(recent, vec![long, short]);
}

#[rstest]
#[tokio::test]
async fn by_category_rejects_unknown_names(#[future(awt)] seeded: Seeded) {
    let result = seeded
        .reports
        .by_category(" Gardening ", ReportWindow::default())
        .await;

    assert!(matches!(result, Err(ReportError::UnknownCategory(name)) if name == "Gardening"));
}

#[rstest]
#[tokio::test]
async fn summary_totals_every_category(#[future(awt)] seeded: Seeded) {
    seeded.record("Plan", Some(seeded.work.tag()), 0, 30).await;
    seeded.record("Build", Some(seeded.work.tag()), 30, 45).await;
    seeded
        .record("Run", Some(seeded.personal.tag()), 90, 20)
        .await;
    seeded.record("Untagged", None, 120, 15).await;

    let rows = seeded
        .reports
        .summary(ReportWindow::unbounded())
        .await
        .expect("summary should build");

    let flattened: Vec<(&str, usize, i64)> = rows
        .iter()
        .map(|row| {
            (
                row.category.name().as_str(),
                row.task_count,
                row.total.hundredths(),
            )
        })
        .collect();
    assert_eq!(
        flattened,
        vec![("Work", 2, 7500), ("Personal", 1, 2000), ("Learning", 0, 0)]
    );
}

#[rstest]
#[tokio::test]
async fn summary_drops_tasks_of_deleted_categories(#[future(awt)] seeded: Seeded) {
    seeded
        .record("Run", Some(seeded.personal.tag()), 0, 20)
        .await;
    seeded
        .store
        .delete(seeded.personal.id())
        .await
        .expect("delete should succeed");

    let rows = seeded
        .reports
        .summary(ReportWindow::unbounded())
        .await
        .expect("summary should build");

    assert!(
        rows.iter()
            .all(|row| row.category.id() != seeded.personal.id())
    );
    assert!(rows.iter().all(|row| row.total == DurationMinutes::ZERO));
}

//! Behavioural integration tests over [`InMemoryStore`].
//!
//! These tests drive the tracker actor, the catalog, and the reports
//! together, the way the command-line front end does.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use std::sync::Arc;
use timekeeper::tracking::{
    adapters::{
        memory::{InMemoryStore, ManualClock},
        notifier::ChannelNotifier,
    },
    services::{CatalogService, ReportService, ReportWindow, StartTaskRequest, TrackerHandle},
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0)
        .single()
        .expect("valid instant")
}

struct Setup {
    store: Arc<InMemoryStore>,
    clock: ManualClock,
    catalog: CatalogService<InMemoryStore, InMemoryStore, ManualClock>,
    reports: ReportService<InMemoryStore, InMemoryStore>,
}

#[fixture]
fn setup() -> Setup {
    let store = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(t0());
    Setup {
        catalog: CatalogService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::new(clock.clone()),
        ),
        reports: ReportService::new(Arc::clone(&store), Arc::clone(&store)),
        store,
        clock,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_working_morning_is_summarised_by_category(setup: Setup) {
    setup.catalog.seed_defaults().await.expect("seed defaults");
    setup
        .catalog
        .add_quick_button("Standup", Some("Work"))
        .await
        .expect("add quick button");
    let (tracker, join) = TrackerHandle::spawn(
        Arc::clone(&setup.store),
        Arc::new(setup.clock.clone()),
        Arc::new(ChannelNotifier::channel().0),
    );

    let standup = setup
        .catalog
        .quick_start_request(1)
        .await
        .expect("quick start request");
    tracker.start(standup).await.expect("start standup");
    setup.clock.advance(TimeDelta::minutes(15));

    let learning = setup
        .catalog
        .category_tag("learning")
        .await
        .expect("learning tag");
    tracker
        .start(StartTaskRequest::new("Read RFC").with_category(learning))
        .await
        .expect("start reading");
    setup.clock.advance(TimeDelta::minutes(40));

    tracker
        .start(StartTaskRequest::new("Coffee"))
        .await
        .expect("start coffee");
    setup.clock.advance(TimeDelta::minutes(5));
    tracker.stop().await.expect("stop coffee");
    tracker.shutdown(false).await.expect("shutdown");
    join.await.expect("tracker loop joins");

    let recent = setup.reports.recent(None).await.expect("recent tasks");
    let descriptions: Vec<&str> = recent
        .iter()
        .map(|task| task.description().as_str())
        .collect();
    assert_eq!(descriptions, vec!["Coffee", "Read RFC", "Standup"]);

    let summary = setup
        .reports
        .summary(ReportWindow::unbounded())
        .await
        .expect("summary");
    let totals: Vec<(&str, String)> = summary
        .iter()
        .map(|row| (row.category.name().as_str(), row.total.to_string()))
        .collect();
    assert_eq!(
        totals,
        vec![
            ("Learning", "40.00".to_owned()),
            ("Work", "15.00".to_owned()),
            ("Other", "0.00".to_owned()),
            ("Personal", "0.00".to_owned()),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_category_keeps_task_history(setup: Setup) {
    let work = setup
        .catalog
        .add_category("Work", Some("#2196F3"))
        .await
        .expect("add category");
    let (tracker, join) = TrackerHandle::spawn(
        Arc::clone(&setup.store),
        Arc::new(setup.clock.clone()),
        Arc::new(ChannelNotifier::channel().0),
    );
    tracker
        .start(StartTaskRequest::new("Ship release").with_category(work.tag()))
        .await
        .expect("start task");
    setup.clock.advance(TimeDelta::minutes(30));
    let stopped = tracker.stop().await.expect("stop task");
    tracker.shutdown(false).await.expect("shutdown");
    join.await.expect("tracker loop joins");

    setup
        .catalog
        .delete_category("work")
        .await
        .expect("delete category");

    let recent = setup.reports.recent(Some(1)).await.expect("recent tasks");
    assert_eq!(recent, vec![stopped]);
    assert_eq!(
        recent
            .first()
            .and_then(|task| task.category())
            .map(|tag| tag.name.as_str()),
        Some("Work")
    );
    let summary = setup
        .reports
        .summary(ReportWindow::unbounded())
        .await
        .expect("summary");
    assert!(summary.is_empty());
}

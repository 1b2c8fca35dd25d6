//! Category and quick button management tests.

use super::fixtures::{category, clock};
use crate::tracking::{
    adapters::memory::{InMemoryStore, ManualClock},
    domain::{CategoryColor, DEFAULT_CATEGORIES, TaskDomainError},
    ports::{
        CategoryRepositoryError, QuickButtonRepositoryError,
        category_repository::MockCategoryRepository,
        quick_button_repository::MockQuickButtonRepository,
    },
    services::{CatalogError, CatalogService},
};
use rstest::{fixture, rstest};
use std::sync::Arc;

type MemoryCatalog = CatalogService<InMemoryStore, InMemoryStore, ManualClock>;

#[fixture]
fn catalog(clock: ManualClock) -> MemoryCatalog {
    let store = Arc::new(InMemoryStore::new());
    CatalogService::new(Arc::clone(&store), store, Arc::new(clock))
}

#[rstest]
#[tokio::test]
async fn add_category_defaults_the_colour(catalog: MemoryCatalog) {
    let created = catalog
        .add_category(" Reading ", None)
        .await
        .expect("category should be created");

    assert_eq!(created.name().as_str(), "Reading");
    assert_eq!(created.color(), &CategoryColor::default());
    let found = catalog
        .find_category("READING")
        .await
        .expect("lookup should succeed");
    assert_eq!(found, Some(created));
}

#[rstest]
#[tokio::test]
async fn add_category_rejects_duplicates_ignoring_case(catalog: MemoryCatalog) {
    catalog
        .add_category("Work", Some("#2196F3"))
        .await
        .expect("first category should be created");

    let result = catalog.add_category("work", None).await;

    assert!(matches!(
        result,
        Err(CatalogError::Category(CategoryRepositoryError::DuplicateName(_)))
    ));
    assert_eq!(
        catalog
            .list_categories()
            .await
            .expect("list should succeed")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn add_category_validates_input(catalog: MemoryCatalog) {
    let blank = catalog.add_category("  ", None).await;
    let bad_colour = catalog.add_category("Music", Some("blue")).await;

    assert!(matches!(
        blank,
        Err(CatalogError::Domain(TaskDomainError::EmptyCategoryName))
    ));
    assert!(matches!(
        bad_colour,
        Err(CatalogError::Domain(TaskDomainError::InvalidCategoryColor(_)))
    ));
}

#[rstest]
#[tokio::test]
async fn seed_defaults_only_adds_missing_categories(catalog: MemoryCatalog) {
    catalog
        .add_category("work", Some("#000000"))
        .await
        .expect("category should be created");

    let created = catalog.seed_defaults().await.expect("seed should succeed");
    let again = catalog.seed_defaults().await.expect("reseed should succeed");

    let names: Vec<&str> = created.iter().map(|category| category.name().as_str()).collect();
    assert_eq!(names, vec!["Personal", "Learning", "Other"]);
    assert!(again.is_empty());
    let listed = catalog.list_categories().await.expect("list should succeed");
    assert_eq!(listed.len(), DEFAULT_CATEGORIES.len());
    let listed_names: Vec<&str> = listed.iter().map(|category| category.name().as_str()).collect();
    assert_eq!(listed_names, vec!["Learning", "Other", "Personal", "work"]);
}

#[rstest]
#[tokio::test]
async fn quick_buttons_are_appended_in_order(catalog: MemoryCatalog) {
    catalog
        .add_category("Work", None)
        .await
        .expect("category should be created");

    let standup = catalog
        .add_quick_button("Standup", Some("work"))
        .await
        .expect("button should be created");
    let email = catalog
        .add_quick_button("Email", None)
        .await
        .expect("button should be created");

    assert_eq!(standup.position(), 1);
    assert_eq!(email.position(), 2);
    let listed = catalog
        .list_quick_buttons()
        .await
        .expect("list should succeed");
    assert_eq!(listed, vec![standup, email]);
}

#[rstest]
#[tokio::test]
async fn quick_button_needs_a_known_category(catalog: MemoryCatalog) {
    let result = catalog.add_quick_button("Gym", Some("Fitness")).await;

    assert!(matches!(result, Err(CatalogError::UnknownCategory(name)) if name == "Fitness"));
}

#[rstest]
#[tokio::test]
async fn quick_start_carries_the_category_snapshot(catalog: MemoryCatalog) {
    let work = catalog
        .add_category("Work", None)
        .await
        .expect("category should be created");
    catalog
        .add_quick_button("Standup", Some("Work"))
        .await
        .expect("button should be created");

    let request = catalog
        .quick_start_request(1)
        .await
        .expect("request should build");

    assert_eq!(request.description(), "Standup");
    assert_eq!(request.category(), Some(&work.tag()));
}

#[rstest]
#[tokio::test]
async fn deleting_a_category_detaches_its_buttons(catalog: MemoryCatalog) {
    catalog
        .add_category("Work", None)
        .await
        .expect("category should be created");
    catalog
        .add_quick_button("Standup", Some("Work"))
        .await
        .expect("button should be created");

    catalog
        .delete_category("work")
        .await
        .expect("delete should succeed");

    let buttons = catalog
        .list_quick_buttons()
        .await
        .expect("list should succeed");
    assert!(buttons.iter().all(|button| button.category_id().is_none()));
    let request = catalog
        .quick_start_request(1)
        .await
        .expect("request should build");
    assert_eq!(request.category(), None);
    assert!(matches!(
        catalog.delete_category("Work").await,
        Err(CatalogError::UnknownCategory(_))
    ));
}

#[rstest]
#[tokio::test]
async fn unknown_positions_are_reported(catalog: MemoryCatalog) {
    catalog
        .add_quick_button("Email", None)
        .await
        .expect("button should be created");

    let removed = catalog
        .delete_quick_button(1)
        .await
        .expect("delete should succeed");

    assert_eq!(removed.label().as_str(), "Email");
    assert!(matches!(
        catalog.quick_start_request(1).await,
        Err(CatalogError::UnknownQuickButton(1))
    ));
    assert!(matches!(
        catalog.delete_quick_button(7).await,
        Err(CatalogError::UnknownQuickButton(7))
    ));
}

#[rstest]
#[tokio::test]
async fn delete_category_stops_when_buttons_cannot_be_detached(clock: ManualClock) {
    let work = category("Work", &clock);
    let mut categories = MockCategoryRepository::new();
    categories
        .expect_find_by_name()
        .returning(move |_| Ok(Some(work.clone())));
    categories.expect_delete().never();
    let mut buttons = MockQuickButtonRepository::new();
    buttons.expect_detach_category().times(1).returning(|_| {
        Err(QuickButtonRepositoryError::persistence(std::io::Error::other(
            "locked",
        )))
    });
    let catalog = CatalogService::new(Arc::new(categories), Arc::new(buttons), Arc::new(clock));

    let result = catalog.delete_category("Work").await;

    assert!(matches!(
        result,
        Err(CatalogError::QuickButton(QuickButtonRepositoryError::Persistence(_)))
    ));
}

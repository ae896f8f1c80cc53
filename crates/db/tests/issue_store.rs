//! Integration tests for the issue record store.
//!
//! Exercises `IssueRepo` against a real database:
//! - Create defaults and actor stamping
//! - Round-trip through `find_by_id`
//! - Partial updates preserving creation fields
//! - Filter conjunction, search, and ordering
//! - Delete semantics

use std::collections::HashSet;

use sqlx::PgPool;
use tracker_core::issue::{Impact, IssueStatus, IssueType};
use tracker_core::validation::{IssuePatch, NewIssue};
use tracker_db::models::issue::IssueFilter;
use tracker_db::repositories::IssueRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_issue(title: &str, issue_type: IssueType, status: IssueStatus) -> NewIssue {
    NewIssue {
        title: title.to_string(),
        description: format!("Description of {title}"),
        issue_type,
        impact: Impact::Medium,
        status,
        expected_fix_date: None,
    }
}

const TYPES: [IssueType; 2] = [IssueType::Issue, IssueType::FeatureRequest];
const STATUSES: [IssueStatus; 3] = [IssueStatus::Open, IssueStatus::Assigned, IssueStatus::Closed];

/// Seed a mixed set of records: every type/status combination once.
async fn seed_mixed(pool: &PgPool) {
    for issue_type in TYPES {
        for status in STATUSES {
            let title = format!("{issue_type} {status}");
            IssueRepo::create(pool, "seed", &new_issue(&title, issue_type, status))
                .await
                .unwrap();
        }
    }
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_stamps_actor_and_timestamps(pool: PgPool) {
    let input = new_issue("Crash on save", IssueType::Issue, IssueStatus::Open);
    let issue = IssueRepo::create(&pool, "u1", &input).await.unwrap();

    assert_eq!(issue.title, "Crash on save");
    assert_eq!(issue.status, IssueStatus::Open);
    assert_eq!(issue.created_by, "u1");
    assert_eq!(issue.updated_by, "u1");
    assert_eq!(issue.created_at, issue.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn ids_are_unique_across_creates(pool: PgPool) {
    let mut ids = HashSet::new();
    for i in 0..20 {
        let input = new_issue(&format!("issue {i}"), IssueType::Issue, IssueStatus::Open);
        let issue = IssueRepo::create(&pool, "u1", &input).await.unwrap();
        assert!(ids.insert(issue.id), "duplicate id {}", issue.id);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn create_then_find_round_trips(pool: PgPool) {
    let mut input = new_issue("Round trip", IssueType::FeatureRequest, IssueStatus::Assigned);
    input.expected_fix_date = Some(
        tracker_core::validation::parse_fix_date("2026-06-30T12:00:00Z").unwrap(),
    );
    let created = IssueRepo::create(&pool, "u1", &input).await.unwrap();

    let found = IssueRepo::find_by_id(&pool, created.id).await.unwrap();
    assert_eq!(found, Some(created));
}

#[sqlx::test(migrations = "./migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    let found = IssueRepo::find_by_id(&pool, uuid::Uuid::now_v7()).await.unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn update_merges_only_provided_fields(pool: PgPool) {
    let created = IssueRepo::create(
        &pool,
        "u1",
        &new_issue("Original", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();

    let patch = IssuePatch {
        status: Some(IssueStatus::Closed),
        ..Default::default()
    };
    let updated = IssueRepo::update(&pool, created.id, "u2", &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, IssueStatus::Closed);
    assert_eq!(updated.title, "Original");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.impact, created.impact);
    assert_eq!(updated.updated_by, "u2");
    assert_eq!(updated.created_by, "u1");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= updated.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn repeated_updates_never_touch_creation_fields(pool: PgPool) {
    let created = IssueRepo::create(
        &pool,
        "author",
        &new_issue("Stable", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();

    let mut last_updated_at = created.updated_at;
    for (i, status) in [IssueStatus::Assigned, IssueStatus::Closed, IssueStatus::Open]
        .into_iter()
        .enumerate()
    {
        let patch = IssuePatch {
            status: Some(status),
            title: Some(format!("Stable v{i}")),
            ..Default::default()
        };
        let updated = IssueRepo::update(&pool, created.id, &format!("editor{i}"), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.created_by, "author");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_by, format!("editor{i}"));
        assert!(updated.updated_at >= last_updated_at);
        last_updated_at = updated.updated_at;
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn update_sets_and_clears_fix_date(pool: PgPool) {
    let created = IssueRepo::create(
        &pool,
        "u1",
        &new_issue("Dated", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();
    let date = tracker_core::validation::parse_fix_date("2026-02-01").unwrap();

    let set = IssuePatch {
        expected_fix_date: Some(Some(date)),
        ..Default::default()
    };
    let updated = IssueRepo::update(&pool, created.id, "u1", &set)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.expected_fix_date, Some(date));

    // An empty patch leaves the date alone.
    let untouched = IssueRepo::update(&pool, created.id, "u1", &IssuePatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.expected_fix_date, Some(date));

    let clear = IssuePatch {
        expected_fix_date: Some(None),
        ..Default::default()
    };
    let cleared = IssueRepo::update(&pool, created.id, "u1", &clear)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.expected_fix_date, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_missing_returns_none(pool: PgPool) {
    let patch = IssuePatch {
        status: Some(IssueStatus::Closed),
        ..Default::default()
    };
    let result = IssueRepo::update(&pool, uuid::Uuid::now_v7(), "u1", &patch)
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// List / filter
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn no_filters_returns_all_in_creation_order(pool: PgPool) {
    seed_mixed(&pool).await;

    let all = IssueRepo::list(&pool, &IssueFilter::default()).await.unwrap();
    assert_eq!(all.len(), TYPES.len() * STATUSES.len());

    let titles: Vec<&str> = all.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles[0], "issue open");
    assert_eq!(titles[titles.len() - 1], "feature-request closed");

    // Same store state, same order.
    let again = IssueRepo::list(&pool, &IssueFilter::default()).await.unwrap();
    assert_eq!(all, again);
}

#[sqlx::test(migrations = "./migrations")]
async fn status_and_type_filters_combine_with_and(pool: PgPool) {
    seed_mixed(&pool).await;
    IssueRepo::create(
        &pool,
        "seed",
        &new_issue("another open issue", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();

    let filter = IssueFilter {
        status: Some(IssueStatus::Open),
        issue_type: Some(IssueType::Issue),
        search: None,
    };
    let matching = IssueRepo::list(&pool, &filter).await.unwrap();

    let all = IssueRepo::list(&pool, &IssueFilter::default()).await.unwrap();
    let expected: Vec<_> = all
        .into_iter()
        .filter(|i| i.status == IssueStatus::Open && i.issue_type == IssueType::Issue)
        .collect();

    assert_eq!(matching.len(), 2);
    assert_eq!(matching, expected);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_is_case_insensitive_over_title_and_description(pool: PgPool) {
    let mut by_title = new_issue("Crash on SAVE", IssueType::Issue, IssueStatus::Open);
    by_title.description = "Happens every time".into();
    let mut by_description = new_issue("Editor freeze", IssueType::Issue, IssueStatus::Open);
    by_description.description = "Freezes right after save".into();
    let unrelated = new_issue("Dark mode", IssueType::FeatureRequest, IssueStatus::Open);

    for input in [&by_title, &by_description, &unrelated] {
        IssueRepo::create(&pool, "u1", input).await.unwrap();
    }

    let filter = IssueFilter {
        search: Some("save".into()),
        ..Default::default()
    };
    let titles: Vec<String> = IssueRepo::list(&pool, &filter)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();

    assert_eq!(titles, vec!["Crash on SAVE", "Editor freeze"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_treats_wildcards_literally(pool: PgPool) {
    IssueRepo::create(
        &pool,
        "u1",
        &new_issue("100% CPU", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();
    IssueRepo::create(
        &pool,
        "u1",
        &new_issue("100 tabs open", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();

    let filter = IssueFilter {
        search: Some("100%".into()),
        ..Default::default()
    };
    let found = IssueRepo::list(&pool, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "100% CPU");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn delete_reports_whether_a_row_existed(pool: PgPool) {
    let created = IssueRepo::create(
        &pool,
        "u1",
        &new_issue("Doomed", IssueType::Issue, IssueStatus::Open),
    )
    .await
    .unwrap();

    assert!(IssueRepo::delete(&pool, created.id).await.unwrap());
    assert!(!IssueRepo::delete(&pool, created.id).await.unwrap());
    assert!(IssueRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}

//! Entity caches against the in-memory backend.

mod common;

use common::harness;
use recall_core::domain::{Credentials, NoteFilter, NoteInput, Supervision};
use recall_core::ports::PortError;
use recall_lib::session::AuthStatus;

fn input(title: &str, category_id: Option<i64>) -> NoteInput {
    NoteInput {
        title: title.to_string(),
        content: "Some content worth remembering".into(),
        category_id,
        is_supervised: false,
        supervision_duration_seconds: None,
    }
}

#[tokio::test]
async fn created_category_is_listed_exactly_once() {
    let h = harness();
    h.state.categories.fetch().await.unwrap();

    let created = h.state.categories.create("Rust").await.unwrap();
    let snapshot = h.state.categories.snapshot().await;
    assert_eq!(snapshot.data, vec![created.clone()]);
    assert!(!snapshot.loading);

    h.state.categories.fetch().await.unwrap();
    let listed = h.state.categories.snapshot().await.data;
    assert_eq!(listed.iter().filter(|c| c.id == created.id).count(), 1);
}

#[tokio::test]
async fn deleting_a_referenced_category_conflicts_and_changes_nothing() {
    let h = harness();
    h.backend.add_category(5, "Systems");
    h.backend
        .add_note(1, "Atomics", Supervision::Unsupervised, Some(5));
    h.state.categories.fetch().await.unwrap();
    h.state.notes.fetch(NoteFilter::All).await.unwrap();
    let categories_before = h.state.categories.snapshot().await.data;
    let notes_before = h.state.notes.snapshot().await.data;

    let err = h.state.categories.remove(5).await.unwrap_err();
    assert!(matches!(err, PortError::Conflict(_)));

    let after = h.state.categories.snapshot().await;
    assert_eq!(after.data, categories_before);
    assert!(after.error.unwrap().contains("still has notes"));
    assert_eq!(h.state.notes.snapshot().await.data, notes_before);
}

#[tokio::test]
async fn renamed_category_is_replaced_in_place() {
    let h = harness();
    h.backend.add_category(5, "Sytems");
    h.backend.add_category(6, "Web");
    h.state.categories.fetch().await.unwrap();

    h.state.categories.update(5, "Systems").await.unwrap();
    let names: Vec<_> = h
        .state
        .categories
        .snapshot()
        .await
        .data
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Systems", "Web"]);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_backend() {
    let h = harness();

    let long_name = "x".repeat(51);
    let err = h.state.categories.create(&long_name).await.unwrap_err();
    assert!(err.is_validation());

    let mut supervised = input("Short", None);
    supervised.is_supervised = true;
    supervised.supervision_duration_seconds = Some(5);
    assert!(h.state.notes.create(&supervised).await.unwrap_err().is_validation());

    let credentials = Credentials {
        username: "ab".into(),
        password: "secret1".into(),
    };
    assert!(h.state.auth.login(&credentials).await.unwrap_err().is_validation());

    assert_eq!(h.backend.calls(), 0);
    let snapshot = h.state.categories.snapshot().await;
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(h.state.session.status(), AuthStatus::SignedOut);
}

#[tokio::test]
async fn note_filters_are_exclusive() {
    let h = harness();
    h.backend.add_category(5, "Systems");
    h.backend
        .add_note(1, "Atomics", Supervision::Unsupervised, Some(5));
    h.backend.add_note(2, "Loose", Supervision::Unsupervised, None);

    let all = h.state.notes.fetch(NoteFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);

    let in_category = h.state.notes.fetch(NoteFilter::Category(5)).await.unwrap();
    assert_eq!(in_category.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);

    let loose = h.state.notes.fetch(NoteFilter::Uncategorized).await.unwrap();
    assert_eq!(loose.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(
        h.state.notes.snapshot().await.data.filter,
        NoteFilter::Uncategorized
    );
}

#[tokio::test]
async fn created_note_joins_the_list_only_when_the_filter_admits_it() {
    let h = harness();
    h.backend.add_category(5, "Systems");
    h.state.notes.fetch(NoteFilter::Category(5)).await.unwrap();

    h.state.notes.create(&input("Elsewhere", None)).await.unwrap();
    assert!(h.state.notes.snapshot().await.data.items.is_empty());

    let here = h.state.notes.create(&input("Here", Some(5))).await.unwrap();
    let items = h.state.notes.snapshot().await.data.items;
    assert_eq!(items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![here.id]);
}

#[tokio::test]
async fn moving_a_note_out_of_the_filter_drops_it_from_the_list() {
    let h = harness();
    h.backend.add_category(5, "Systems");
    h.backend
        .add_note(1, "Atomics", Supervision::Unsupervised, Some(5));
    h.state.notes.fetch(NoteFilter::Category(5)).await.unwrap();
    h.state.notes.fetch_detail(1).await.unwrap();

    h.state.notes.update(1, &input("Atomics", None)).await.unwrap();

    let data = h.state.notes.snapshot().await.data;
    assert!(data.items.is_empty());
    assert_eq!(data.current.unwrap().category_id, None);
}

#[tokio::test]
async fn summarizing_the_current_note_refreshes_it() {
    let h = harness();
    h.backend.add_note(1, "Pinning", Supervision::Unsupervised, None);
    h.state.notes.fetch(NoteFilter::All).await.unwrap();
    h.state.notes.fetch_detail(1).await.unwrap();

    let summary = h.state.notes.summarize(1).await.unwrap();

    let data = h.state.notes.snapshot().await.data;
    assert_eq!(data.current.unwrap().ai_summary, Some(summary.clone()));
    assert_eq!(data.items[0].ai_summary_preview, Some(summary.summary_text));
}

#[tokio::test]
async fn deleting_the_current_note_clears_it() {
    let h = harness();
    h.backend.add_note(1, "Unsafe", Supervision::Unsupervised, None);
    h.state.notes.fetch(NoteFilter::All).await.unwrap();
    h.state.notes.fetch_detail(1).await.unwrap();

    h.state.notes.remove(1).await.unwrap();

    let data = h.state.notes.snapshot().await.data;
    assert!(data.items.is_empty());
    assert!(data.current.is_none());
}

#[tokio::test]
async fn login_persists_the_session() {
    let h = harness();
    let credentials = Credentials {
        username: "ferris".into(),
        password: "crab123".into(),
    };

    let user = h.state.auth.login(&credentials).await.unwrap();
    assert_eq!(user.username, "ferris");
    assert_eq!(h.state.session.status(), AuthStatus::Authenticated);
    assert_eq!(
        h.state.session.token().unwrap().as_deref(),
        Some("token-for-ferris")
    );

    h.state.auth.logout().unwrap();
    assert_eq!(h.state.session.status(), AuthStatus::SignedOut);
    assert!(h.state.session.user().unwrap().is_none());
}

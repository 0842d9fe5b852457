//! End-to-end meeting lifecycle against an on-disk store.

use std::sync::Arc;

use livemeeting::config::DisplayConfig;
use livemeeting::db::{MeetingStore, SqliteMeetingStore};
use livemeeting::meeting::{
    archive, MeetingAnalysis, MeetingContext, MeetingRecord, MeetingRepository, MeetingUpdate,
    Note, Question, QuestionStatus, TranscriptChunk,
};

fn open_store(dir: &tempfile::TempDir) -> Arc<SqliteMeetingStore> {
    Arc::new(SqliteMeetingStore::open(&dir.path().join("livemeeting.db"), "live_meetings").unwrap())
}

fn archived(id: &str, start_time: &str) -> MeetingRecord {
    let mut record = MeetingRecord::new(id, start_time, id);
    record.is_archived = true;
    record
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let live_id = {
        let repo = MeetingRepository::new(open_store(&dir));
        let ctx = MeetingContext::new(repo, DisplayConfig::default());
        assert!(ctx.load(None).await);

        assert!(ctx.set_title("Customer call").await);
        assert!(
            ctx.set_notes(vec![Note {
                id: "n1".to_string(),
                text: "Wants SSO".to_string(),
                timestamp: "2026-01-01T10:03:00.000Z".to_string(),
            }])
            .await
        );
        assert!(
            ctx.ingest_chunk(TranscriptChunk {
                id: 0,
                timestamp: "2026-01-01T10:00:10.000Z".to_string(),
                text: "Thanks for joining".to_string(),
                device_name: Some("mic".to_string()),
                speaker: Some("spk_0".to_string()),
            })
            .await
        );
        ctx.record().unwrap().id
    };

    // A fresh process sees the same live meeting with every field intact
    let repo = MeetingRepository::new(open_store(&dir));
    let ctx = MeetingContext::new(repo, DisplayConfig::default());
    assert!(ctx.load(None).await);

    let record = ctx.record().unwrap();
    assert_eq!(record.id, live_id);
    assert_eq!(record.title, "Customer call");
    assert_eq!(record.notes.len(), 1);
    assert_eq!(record.chunks.len(), 1);
    assert_eq!(ctx.segments()[0].text, "Thanks for joining");
}

#[tokio::test]
async fn test_no_field_loss_across_setters() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let ctx = MeetingContext::new(MeetingRepository::new(store.clone()), DisplayConfig::default());
    ctx.load(None).await;

    ctx.set_questions(vec![Question {
        id: "q1".to_string(),
        text: "Pricing?".to_string(),
        status: QuestionStatus::InProgress,
        answer: None,
    }])
    .await;
    ctx.set_analysis(Some(MeetingAnalysis {
        summary: "Discussed pricing".to_string(),
        key_points: vec!["Annual plan".to_string()],
        action_items: vec![],
        generated_at: None,
    }))
    .await;
    ctx.set_title("Pricing").await;
    ctx.set_notes(vec![]).await;

    let id = ctx.record().unwrap().id;
    let persisted = store.get(&id).await.unwrap().unwrap();
    assert_eq!(persisted.title, "Pricing");
    assert_eq!(persisted.questions[0].status, QuestionStatus::InProgress);
    assert_eq!(persisted.analysis.unwrap().key_points, vec!["Annual plan"]);
    assert!(persisted.notes.is_empty());
}

#[tokio::test]
async fn test_single_active_meeting_invariant() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let repo = MeetingRepository::new(store.clone());

    for _ in 0..3 {
        repo.load_active(None).await.unwrap();
        repo.load_active(None).await.unwrap();
        let active = store
            .values()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.is_active())
            .count();
        assert_eq!(active, 1);

        let archived = archive::archive_active(&repo).await.unwrap();
        assert!(archived.end_time.is_some());
    }

    assert!(archive::archive_active(&repo).await.is_none());
    assert_eq!(store.values().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_history_ordering_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let repo = MeetingRepository::new(store.clone());

    for (id, ts) in [
        ("meeting-t2", "2026-02-02T09:00:00.000Z"),
        ("meeting-t3", "2026-03-03T09:00:00.000Z"),
        ("meeting-t1", "2026-01-01T09:00:00.000Z"),
    ] {
        store.put(&archived(id, ts)).await.unwrap();
    }

    let order: Vec<String> = archive::list_all(&repo).await.into_iter().map(|r| r.id).collect();
    assert_eq!(order, vec!["meeting-t3", "meeting-t2", "meeting-t1"]);

    let renamed = archive::update_archived(&repo, "meeting-t2", MeetingUpdate::title("Board prep"))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Board prep");
    assert_eq!(renamed.start_time, "2026-02-02T09:00:00.000Z");

    assert!(archive::delete_by_start_time(&repo, "2026-01-01T09:00:00.000Z").await);
    assert!(!archive::delete_by_start_time(&repo, "2026-01-01T09:00:00.000Z").await);

    let remaining: Vec<String> = archive::list_all(&repo).await.into_iter().map(|r| r.id).collect();
    assert_eq!(remaining, vec!["meeting-t3", "meeting-t2"]);
}

#[tokio::test]
async fn test_concurrent_writers_do_not_silently_lose_updates() {
    let dir = tempfile::tempdir().unwrap();

    let a = MeetingContext::new(MeetingRepository::new(open_store(&dir)), DisplayConfig::default());
    let b = MeetingContext::new(MeetingRepository::new(open_store(&dir)), DisplayConfig::default());
    a.load(None).await;
    b.load(None).await;
    assert_eq!(a.record().unwrap().id, b.record().unwrap().id);

    assert!(a.set_title("From A").await);
    // B still holds the pre-A snapshot
    assert!(!b.set_title("From B").await);
    assert_eq!(b.title().as_deref(), Some("Live Meeting"));

    assert!(b.reload_data().await);
    assert_eq!(b.title().as_deref(), Some("From A"));
}

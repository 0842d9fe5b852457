//! Live meeting context.
//!
//! Holds the in-memory copy of the meeting being recorded and exposes the
//! mutations UI layers need. Each mutation overlays one field on the
//! current copy and saves the full record; the copy is only replaced once
//! the store has accepted the write. Subscribers are notified through a
//! `watch` channel carrying the latest snapshot.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

use super::chunks::{AppendChunkHandler, ChunkHandler};
use super::display::{self, TranscriptSegment};
use super::record::{MeetingAnalysis, MeetingRecord, Note, Question, TranscriptChunk};
use super::repository::MeetingRepository;
use crate::config::DisplayConfig;

tokio::task_local! {
    static CURRENT: Arc<MeetingContext>;
}

/// Presentation toggles. Kept in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModes {
    pub notes_view: bool,
    pub transcription_view: bool,
}

pub struct MeetingContext {
    repository: MeetingRepository,
    chunk_handler: Arc<dyn ChunkHandler>,
    display: DisplayConfig,
    /// Serializes loads and writes; holds the requested meeting id.
    writer: Mutex<Option<String>>,
    loading: AtomicBool,
    notes_view: AtomicBool,
    transcription_view: AtomicBool,
    current: watch::Sender<Option<MeetingRecord>>,
}

impl MeetingContext {
    pub fn new(repository: MeetingRepository, display: DisplayConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            repository,
            chunk_handler: Arc::new(AppendChunkHandler),
            display,
            writer: Mutex::new(None),
            loading: AtomicBool::new(false),
            notes_view: AtomicBool::new(false),
            transcription_view: AtomicBool::new(false),
            current,
        }
    }

    pub fn with_chunk_handler(mut self, handler: Arc<dyn ChunkHandler>) -> Self {
        self.chunk_handler = handler;
        self
    }

    pub fn repository(&self) -> &MeetingRepository {
        &self.repository
    }

    /// Run `fut` with `ctx` installed as the current context.
    pub async fn scope<F: Future>(ctx: Arc<MeetingContext>, fut: F) -> F::Output {
        CURRENT.scope(ctx, fut).await
    }

    /// The context installed by [`MeetingContext::scope`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a scope. That is a wiring bug, not a
    /// runtime condition.
    pub fn current() -> Arc<MeetingContext> {
        match Self::try_current() {
            Some(ctx) => ctx,
            None => panic!("MeetingContext::current() called outside MeetingContext::scope"),
        }
    }

    pub fn try_current() -> Option<Arc<MeetingContext>> {
        CURRENT.try_with(Arc::clone).ok()
    }

    /// Load `meeting_id` (or the active meeting) and replace the in-memory
    /// copy. Returns `false` when the store failed.
    pub async fn load(&self, meeting_id: Option<&str>) -> bool {
        let mut target = self.writer.lock().await;
        self.load_locked(&mut target, meeting_id).await
    }

    /// Switch to another meeting. Does nothing when `meeting_id` is already
    /// the loaded target.
    pub async fn set_target(&self, meeting_id: Option<&str>) -> bool {
        let mut target = self.writer.lock().await;
        if target.as_deref() == meeting_id && self.current.borrow().is_some() {
            return true;
        }
        self.load_locked(&mut target, meeting_id).await
    }

    /// Reload the current target from the store.
    pub async fn reload_data(&self) -> bool {
        let mut target = self.writer.lock().await;
        let meeting_id = target.clone();
        self.load_locked(&mut target, meeting_id.as_deref()).await
    }

    async fn load_locked(&self, target: &mut Option<String>, meeting_id: Option<&str>) -> bool {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.repository.load_active(meeting_id).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(record) => {
                info!("Loaded meeting {}", record.id);
                *target = meeting_id.map(str::to_string);
                self.current.send_replace(Some(record));
                true
            }
            Err(e) => {
                error!("Failed to load meeting: {}", e);
                false
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn record(&self) -> Option<MeetingRecord> {
        self.current.borrow().clone()
    }

    pub fn title(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|r| r.title.clone())
    }

    pub fn notes(&self) -> Vec<Note> {
        self.current
            .borrow()
            .as_ref()
            .map(|r| r.notes.clone())
            .unwrap_or_default()
    }

    pub fn analysis(&self) -> Option<MeetingAnalysis> {
        self.current.borrow().as_ref().and_then(|r| r.analysis.clone())
    }

    pub fn questions(&self) -> Vec<Question> {
        self.current
            .borrow()
            .as_ref()
            .map(|r| r.questions.clone())
            .unwrap_or_default()
    }

    /// Receives every snapshot the context accepts.
    pub fn subscribe(&self) -> watch::Receiver<Option<MeetingRecord>> {
        self.current.subscribe()
    }

    pub async fn set_title(&self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.modify(move |record| record.title = title).await
    }

    pub async fn set_notes(&self, notes: Vec<Note>) -> bool {
        self.modify(move |record| record.notes = notes).await
    }

    pub async fn set_analysis(&self, analysis: Option<MeetingAnalysis>) -> bool {
        self.modify(move |record| record.analysis = analysis).await
    }

    pub async fn set_questions(&self, questions: Vec<Question>) -> bool {
        self.modify(move |record| record.questions = questions).await
    }

    /// Persist a full record and make it the in-memory copy.
    pub async fn update_store(&self, record: MeetingRecord) -> bool {
        let _writer = self.writer.lock().await;
        self.save(record).await
    }

    /// Hand a new transcription chunk to the chunk handler and save the
    /// result.
    pub async fn ingest_chunk(&self, chunk: TranscriptChunk) -> bool {
        let _writer = self.writer.lock().await;
        let Some(record) = self.record() else {
            debug!("Dropping chunk: no meeting loaded");
            return false;
        };

        match self.chunk_handler.handle(record, chunk).await {
            Ok(updated) => self.save(updated).await,
            Err(e) => {
                error!("Chunk handler failed: {}", e);
                false
            }
        }
    }

    async fn modify<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut MeetingRecord),
    {
        let _writer = self.writer.lock().await;
        let Some(mut record) = self.record() else {
            debug!("Ignoring update: no meeting loaded");
            return false;
        };

        apply(&mut record);
        self.save(record).await
    }

    async fn save(&self, record: MeetingRecord) -> bool {
        match self.repository.save(&record).await {
            Ok(stored) => {
                debug!("Saved meeting {} (version {})", stored.id, stored.version);
                self.current.send_replace(Some(stored));
                true
            }
            Err(e) => {
                error!("Failed to save meeting {}: {}", record.id, e);
                false
            }
        }
    }

    pub fn segments(&self) -> Vec<TranscriptSegment> {
        self.current
            .borrow()
            .as_ref()
            .map(|r| display::build_segments(r, &self.display.unknown_speaker))
            .unwrap_or_default()
    }

    pub fn speaker_color(&self, speaker: &str) -> String {
        match self.current.borrow().as_ref() {
            Some(record) => {
                display::speaker_color(record, speaker, &self.display.fallback_speaker_color)
            }
            None => self.display.fallback_speaker_color.clone(),
        }
    }

    pub fn view_modes(&self) -> ViewModes {
        ViewModes {
            notes_view: self.notes_view.load(Ordering::SeqCst),
            transcription_view: self.transcription_view.load(Ordering::SeqCst),
        }
    }

    /// Flip the notes view; returns the new value.
    pub fn toggle_notes_view(&self) -> bool {
        !self.notes_view.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the transcription view; returns the new value.
    pub fn toggle_transcription_view(&self) -> bool {
        !self.transcription_view.fetch_xor(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MeetingStore, MemoryMeetingStore, StoreError};
    use crate::meeting::record::QuestionStatus;
    use async_trait::async_trait;

    /// Memory store that can be switched into failing writes.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryMeetingStore,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl MeetingStore for FlakyStore {
        async fn get(&self, id: &str) -> Result<Option<MeetingRecord>, StoreError> {
            self.inner.get(id).await
        }
        async fn put(&self, record: &MeetingRecord) -> Result<MeetingRecord, StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.put(record).await
        }
        async fn delete(&self, id: &str) -> Result<bool, StoreError> {
            self.inner.delete(id).await
        }
        async fn values(&self) -> Result<Vec<MeetingRecord>, StoreError> {
            self.inner.values().await
        }
    }

    fn context_with_store() -> (Arc<FlakyStore>, MeetingContext) {
        let store = Arc::new(FlakyStore::default());
        let repo = MeetingRepository::new(store.clone());
        (store, MeetingContext::new(repo, DisplayConfig::default()))
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            timestamp: "2026-01-01T10:00:00.000Z".to_string(),
        }
    }

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            text: "When do we ship?".to_string(),
            status: QuestionStatus::Open,
            answer: None,
        }
    }

    fn chunk(text: &str, speaker: &str) -> TranscriptChunk {
        TranscriptChunk {
            id: 0,
            timestamp: "2026-01-01T10:00:00.000Z".to_string(),
            text: text.to_string(),
            device_name: Some("mic".to_string()),
            speaker: Some(speaker.to_string()),
        }
    }

    #[tokio::test]
    async fn test_mutations_without_record_are_noops() {
        let (store, ctx) = context_with_store();

        assert!(!ctx.set_title("Nope").await);
        assert!(!ctx.set_notes(vec![note("n1", "x")]).await);
        assert!(!ctx.ingest_chunk(chunk("hi", "spk_0")).await);
        assert!(ctx.record().is_none());
        assert!(store.values().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_creates_active_meeting() {
        let (store, ctx) = context_with_store();
        assert!(ctx.load(None).await);
        assert!(!ctx.is_loading());

        let record = ctx.record().unwrap();
        assert!(record.is_active());
        assert_eq!(record.title, "Live Meeting");
        assert_eq!(store.values().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_updates_keep_sibling_fields() {
        let (store, ctx) = context_with_store();
        ctx.load(None).await;

        assert!(ctx.set_title("Planning").await);
        assert!(ctx.set_notes(vec![note("n1", "Budget approved")]).await);
        assert!(
            ctx.set_analysis(Some(MeetingAnalysis {
                summary: "Planning went well".to_string(),
                ..Default::default()
            }))
            .await
        );
        assert!(ctx.set_questions(vec![question("q1")]).await);
        assert!(ctx.set_title("Planning (Q3)").await);

        let id = ctx.record().unwrap().id;
        let persisted = store.get(&id).await.unwrap().unwrap();
        assert_eq!(persisted.title, "Planning (Q3)");
        assert_eq!(persisted.notes, vec![note("n1", "Budget approved")]);
        assert_eq!(
            persisted.analysis.as_ref().map(|a| a.summary.as_str()),
            Some("Planning went well")
        );
        assert_eq!(persisted.questions.len(), 1);
        assert_eq!(persisted, ctx.record().unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let (store, ctx) = context_with_store();
        ctx.load(None).await;
        ctx.set_title("Before").await;

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(!ctx.set_title("After").await);
        assert_eq!(ctx.title().as_deref(), Some("Before"));

        store.fail_writes.store(false, Ordering::SeqCst);
        assert!(ctx.set_title("After").await);
        assert_eq!(ctx.title().as_deref(), Some("After"));
    }

    #[tokio::test]
    async fn test_failed_load_reports_false() {
        let (store, ctx) = context_with_store();
        store.fail_writes.store(true, Ordering::SeqCst);

        // Creating the first meeting needs a write
        assert!(!ctx.load(None).await);
        assert!(ctx.record().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_saved_snapshots() {
        let (_store, ctx) = context_with_store();
        let mut rx = ctx.subscribe();

        ctx.load(None).await;
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        ctx.set_title("Observed").await;
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|r| r.title.clone()),
            Some("Observed".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_target_switches_meeting() {
        let (store, ctx) = context_with_store();
        let mut old = MeetingRecord::new("meeting-old", "2025-12-01T10:00:00.000Z", "Old");
        old.is_archived = true;
        store.put(&old).await.unwrap();

        ctx.load(None).await;
        let live_id = ctx.record().unwrap().id;
        assert_ne!(live_id, "meeting-old");

        assert!(ctx.set_target(Some("meeting-old")).await);
        assert_eq!(ctx.record().unwrap().id, "meeting-old");

        assert!(ctx.set_target(None).await);
        assert_eq!(ctx.record().unwrap().id, live_id);
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_previous_target() {
        let (store, ctx) = context_with_store();
        let mut old = MeetingRecord::new("meeting-old", "2025-12-01T10:00:00.000Z", "Old");
        old.is_archived = true;
        store.put(&old).await.unwrap();

        assert!(ctx.set_target(Some("meeting-old")).await);

        // Switching to the live meeting has to create one
        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(!ctx.set_target(None).await);
        assert_eq!(ctx.record().unwrap().id, "meeting-old");

        store.fail_writes.store(false, Ordering::SeqCst);
        assert!(ctx.set_target(None).await);
        let live = ctx.record().unwrap();
        assert_ne!(live.id, "meeting-old");
        assert!(live.is_active());
        assert_eq!(store.values().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_copy_of_deleted_meeting_is_not_rewritten() {
        let (store, ctx) = context_with_store();
        ctx.load(None).await;
        let deleted = ctx.record().unwrap();

        assert!(ctx.repository().delete_by_start_time(&deleted.start_time).await.unwrap());
        let next = ctx.repository().load_active(None).await.unwrap();

        assert!(!ctx.set_title("late edit").await);
        let active: Vec<String> = store
            .values()
            .await
            .unwrap()
            .into_iter()
            .filter(MeetingRecord::is_active)
            .map(|r| r.id)
            .collect();
        assert_eq!(active, vec![next.id]);
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_changes() {
        let (_store, ctx) = context_with_store();
        ctx.load(None).await;

        let record = ctx.record().unwrap();
        let mut edited = record.clone();
        edited.title = "Edited elsewhere".to_string();
        ctx.repository().save(&edited).await.unwrap();

        // Stale in-memory copy: the store rejects the write
        assert!(!ctx.set_title("Local edit").await);

        assert!(ctx.reload_data().await);
        assert_eq!(ctx.title().as_deref(), Some("Edited elsewhere"));
        assert!(ctx.set_title("Local edit").await);
    }

    #[tokio::test]
    async fn test_ingest_chunk_and_segments() {
        let (_store, ctx) = context_with_store();
        ctx.load(None).await;

        assert!(ctx.ingest_chunk(chunk("hello", "spk_0")).await);
        assert!(ctx.ingest_chunk(chunk("there", "spk_0")).await);

        let mut record = ctx.record().unwrap();
        assert_eq!(record.chunks.len(), 2);
        assert_eq!(record.merged_chunks.len(), 1);
        assert_eq!(record.merged_chunks[0].text, "hello there");

        record
            .speaker_mappings
            .insert("spk_0".to_string(), "Dana".to_string());
        record
            .speaker_colors
            .insert("spk_0".to_string(), "#10B981".to_string());
        assert!(ctx.update_store(record).await);

        let segments = ctx.segments();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.speaker == "Dana"));
        assert_eq!(ctx.speaker_color("spk_0"), "#10B981");
        assert_eq!(ctx.speaker_color("spk_9"), "#9CA3AF");
    }

    #[tokio::test]
    async fn test_view_toggles_are_independent() {
        let (_store, ctx) = context_with_store();
        assert_eq!(ctx.view_modes(), ViewModes::default());

        assert!(ctx.toggle_notes_view());
        assert_eq!(
            ctx.view_modes(),
            ViewModes {
                notes_view: true,
                transcription_view: false
            }
        );

        assert!(ctx.toggle_transcription_view());
        assert!(!ctx.toggle_notes_view());
        assert_eq!(
            ctx.view_modes(),
            ViewModes {
                notes_view: false,
                transcription_view: true
            }
        );
    }

    #[tokio::test]
    async fn test_scope_exposes_current() {
        let (_store, ctx) = context_with_store();
        let ctx = Arc::new(ctx);

        assert!(MeetingContext::try_current().is_none());

        let inside = MeetingContext::scope(ctx.clone(), async {
            MeetingContext::current().set_title("Scoped").await
        })
        .await;
        // Nothing loaded yet, so the scoped update is a no-op
        assert!(!inside);
    }

    #[tokio::test]
    #[should_panic(expected = "outside MeetingContext::scope")]
    async fn test_current_outside_scope_panics() {
        let _ = MeetingContext::current();
    }
}

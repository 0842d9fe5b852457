//! Meeting record types.
//!
//! A `MeetingRecord` is the full snapshot persisted per meeting id. Field
//! names serialize in camelCase and every collection defaults to empty so
//! snapshots written before a field existed still load.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
///
/// The fixed width keeps lexical order equal to chronological order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A raw transcription fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptChunk {
    /// Position of the chunk in `MeetingRecord::chunks`.
    #[serde(default)]
    pub id: u64,
    pub timestamp: String,
    pub text: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    #[default]
    Open,
    InProgress,
    Answered,
    Skipped,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "inProgress",
            Self::Answered => "answered",
            Self::Skipped => "skipped",
        }
    }

    /// Answered and skipped questions need no further attention.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Answered | Self::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub status: QuestionStatus,
    #[serde(default)]
    pub answer: Option<Vec<Note>>,
}

/// AI-derived summary of the meeting so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAnalysis {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub id: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub analysis: Option<MeetingAnalysis>,
    #[serde(default)]
    pub chunks: Vec<TranscriptChunk>,
    #[serde(default)]
    pub merged_chunks: Vec<TranscriptChunk>,
    /// Edited text keyed by chunk id; sparse.
    #[serde(default)]
    pub edited_merged_chunks: BTreeMap<u64, String>,
    #[serde(default)]
    pub speaker_mappings: HashMap<String, String>,
    #[serde(default)]
    pub speaker_colors: HashMap<String, String>,
    #[serde(default)]
    pub last_processed_index: usize,
    /// Write counter maintained by the store.
    #[serde(default)]
    pub version: u64,
}

impl MeetingRecord {
    /// An empty, active meeting.
    pub fn new(id: impl Into<String>, start_time: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_time: start_time.into(),
            end_time: None,
            is_archived: false,
            title: title.into(),
            notes: Vec::new(),
            questions: Vec::new(),
            analysis: None,
            chunks: Vec::new(),
            merged_chunks: Vec::new(),
            edited_merged_chunks: BTreeMap::new(),
            speaker_mappings: HashMap::new(),
            speaker_colors: HashMap::new(),
            last_processed_index: 0,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    /// Questions that are neither answered nor skipped.
    pub fn open_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| !q.status.is_terminal())
    }
}

/// Partial field set for editing an archived meeting.
///
/// `None` keeps the stored value. For the nullable fields an explicit JSON
/// `null` deserializes to `Some(None)` and clears the stored value. `id` and
/// `is_archived` are accepted so a full record body deserializes, but neither
/// is ever applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingUpdate {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_time: Option<String>,
    #[serde(deserialize_with = "present")]
    pub end_time: Option<Option<String>>,
    pub is_archived: Option<bool>,
    pub notes: Option<Vec<Note>>,
    pub questions: Option<Vec<Question>>,
    #[serde(deserialize_with = "present")]
    pub analysis: Option<Option<MeetingAnalysis>>,
    pub chunks: Option<Vec<TranscriptChunk>>,
    pub merged_chunks: Option<Vec<TranscriptChunk>>,
    pub edited_merged_chunks: Option<BTreeMap<u64, String>>,
    pub speaker_mappings: Option<HashMap<String, String>>,
    pub speaker_colors: Option<HashMap<String, String>>,
    pub last_processed_index: Option<usize>,
}

/// Field present in the body, possibly `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MeetingUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Overlay this update on `existing`.
    ///
    /// The id and version always come from `existing` and the result is
    /// always archived.
    pub fn merge_into(self, existing: MeetingRecord) -> MeetingRecord {
        MeetingRecord {
            id: existing.id,
            start_time: self.start_time.unwrap_or(existing.start_time),
            end_time: self.end_time.unwrap_or(existing.end_time),
            is_archived: true,
            title: self.title.unwrap_or(existing.title),
            notes: self.notes.unwrap_or(existing.notes),
            questions: self.questions.unwrap_or(existing.questions),
            analysis: self.analysis.unwrap_or(existing.analysis),
            chunks: self.chunks.unwrap_or(existing.chunks),
            merged_chunks: self.merged_chunks.unwrap_or(existing.merged_chunks),
            edited_merged_chunks: self
                .edited_merged_chunks
                .unwrap_or(existing.edited_merged_chunks),
            speaker_mappings: self.speaker_mappings.unwrap_or(existing.speaker_mappings),
            speaker_colors: self.speaker_colors.unwrap_or(existing.speaker_colors),
            last_processed_index: self
                .last_processed_index
                .unwrap_or(existing.last_processed_index),
            version: existing.version,
        }
    }
}

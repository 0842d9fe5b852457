//! Display projections derived from a meeting record. Never persisted.

use serde::{Deserialize, Serialize};

use super::record::MeetingRecord;

/// One line of the live transcript as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub timestamp: String,
    pub text: String,
    pub device_name: String,
    pub speaker: String,
}

/// Map each raw chunk to a segment, preferring edited text and mapped
/// speaker names.
pub fn build_segments(record: &MeetingRecord, unknown_speaker: &str) -> Vec<TranscriptSegment> {
    record
        .chunks
        .iter()
        .map(|chunk| {
            let text = record
                .edited_merged_chunks
                .get(&chunk.id)
                .cloned()
                .unwrap_or_else(|| chunk.text.clone());

            let speaker = match chunk.speaker.as_deref() {
                Some(label) => record
                    .speaker_mappings
                    .get(label)
                    .cloned()
                    .unwrap_or_else(|| label.to_string()),
                None => unknown_speaker.to_string(),
            };

            TranscriptSegment {
                timestamp: chunk.timestamp.clone(),
                text,
                device_name: chunk.device_name.clone().unwrap_or_default(),
                speaker,
            }
        })
        .collect()
}

/// Mapped color for `speaker`, or `fallback`. Colors are never generated
/// here.
pub fn speaker_color(record: &MeetingRecord, speaker: &str, fallback: &str) -> String {
    record
        .speaker_colors
        .get(speaker)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

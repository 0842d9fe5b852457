//! Chunk ingestion.
//!
//! The improvement pipeline that turns raw transcription chunks into merged
//! chunks lives outside this crate; `ChunkHandler` is its seam. The default
//! handler appends the raw chunk and folds pending chunks by speaker.

use anyhow::Result;
use async_trait::async_trait;

use super::record::{MeetingRecord, TranscriptChunk};

#[async_trait]
pub trait ChunkHandler: Send + Sync {
    /// Fold `chunk` into `record` and return the updated record.
    async fn handle(&self, record: MeetingRecord, chunk: TranscriptChunk) -> Result<MeetingRecord>;
}

/// Appends chunks and merges consecutive chunks from the same speaker and
/// device.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendChunkHandler;

#[async_trait]
impl ChunkHandler for AppendChunkHandler {
    async fn handle(
        &self,
        mut record: MeetingRecord,
        mut chunk: TranscriptChunk,
    ) -> Result<MeetingRecord> {
        chunk.id = record.chunks.len() as u64;
        record.chunks.push(chunk);
        fold_pending(&mut record);
        Ok(record)
    }
}

/// Fold every chunk past `last_processed_index` into `merged_chunks` and
/// advance the watermark.
pub fn fold_pending(record: &mut MeetingRecord) {
    let start = record.last_processed_index.min(record.chunks.len());

    for chunk in &record.chunks[start..] {
        let text = chunk.text.trim();
        if text.is_empty() {
            continue;
        }

        match record.merged_chunks.last_mut() {
            Some(last) if last.speaker == chunk.speaker && last.device_name == chunk.device_name => {
                if !last.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(text);
            }
            _ => {
                let mut merged = chunk.clone();
                merged.text = text.to_string();
                record.merged_chunks.push(merged);
            }
        }
    }

    record.last_processed_index = record.chunks.len();
}

//! Persistence and lifecycle for a live meeting recording session.
//!
//! One meeting is live at a time; its transcript chunks, notes, speaker
//! mappings, analysis and questions are saved as full snapshots in a local
//! SQLite store. Ended meetings are archived and stay editable from history.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod global;
pub mod meeting;

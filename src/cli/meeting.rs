//! CLI handler for meeting commands.
//!
//! Commands work on the store directly; they do not need the API server.

use anyhow::{bail, Result};

use crate::cli::args::CliCommand;
use crate::meeting::{archive, MeetingRecord, MeetingRepository, MeetingUpdate};

pub async fn handle_meeting_command(command: CliCommand, repo: &MeetingRepository) -> Result<()> {
    match command {
        CliCommand::Active => show_active(repo).await,
        CliCommand::Archive => archive_active(repo).await,
        CliCommand::List { limit } => list_meetings(repo, limit).await,
        CliCommand::Show { id } => show_meeting(repo, &id).await,
        CliCommand::Rename { id, title } => rename_meeting(repo, &id, title).await,
        CliCommand::Delete { start_time } => delete_meeting(repo, &start_time).await,
        other @ (CliCommand::Serve | CliCommand::Version) => {
            bail!("{:?} is not a meeting command", other)
        }
    }
}

async fn show_active(repo: &MeetingRepository) -> Result<()> {
    let record = repo.load_active(None).await?;
    print_meeting(&record);
    Ok(())
}

async fn archive_active(repo: &MeetingRepository) -> Result<()> {
    match archive::archive_active(repo).await {
        Some(record) => println!(
            "Archived meeting {} ({})",
            record.id,
            display_title(&record)
        ),
        None => println!("No active meeting to archive."),
    }
    Ok(())
}

async fn list_meetings(repo: &MeetingRepository, limit: usize) -> Result<()> {
    let meetings = archive::list_all(repo).await;

    if meetings.is_empty() {
        println!("No meetings recorded yet.");
        return Ok(());
    }

    for meeting in meetings.iter().take(limit) {
        let status = if meeting.is_archived { "archived" } else { "live" };
        println!(
            "{} {} [{}] {} - {} ({} chunks, {} notes)",
            meeting.id,
            display_title(meeting),
            status,
            meeting.start_time,
            meeting.end_time.as_deref().unwrap_or("now"),
            meeting.chunks.len(),
            meeting.notes.len(),
        );
    }

    if meetings.len() > limit {
        println!("... {} more", meetings.len() - limit);
    }

    Ok(())
}

async fn show_meeting(repo: &MeetingRepository, id: &str) -> Result<()> {
    match archive::get(repo, id).await {
        Some(record) => {
            print_meeting(&record);
            Ok(())
        }
        None => bail!("Meeting {} not found", id),
    }
}

async fn rename_meeting(repo: &MeetingRepository, id: &str, title: String) -> Result<()> {
    match archive::update_archived(repo, id, MeetingUpdate::title(title)).await {
        Some(record) => {
            println!("Renamed meeting {} to \"{}\"", record.id, record.title);
            Ok(())
        }
        None => bail!("Meeting {} not found or could not be saved", id),
    }
}

async fn delete_meeting(repo: &MeetingRepository, start_time: &str) -> Result<()> {
    if archive::delete_by_start_time(repo, start_time).await {
        println!("Deleted meeting started at {}", start_time);
    } else {
        println!("No meeting started at {}", start_time);
    }
    Ok(())
}

fn display_title(record: &MeetingRecord) -> &str {
    if record.title.trim().is_empty() {
        "Untitled"
    } else {
        &record.title
    }
}

fn print_meeting(record: &MeetingRecord) {
    println!("Meeting {}: {}", record.id, display_title(record));
    println!(
        "Status: {}",
        if record.is_archived { "archived" } else { "live" }
    );
    println!("Started: {}", record.start_time);
    if let Some(end) = &record.end_time {
        println!("Ended: {}", end);
    }
    println!(
        "Chunks: {} ({} merged), Notes: {}, Questions: {} open / {} total",
        record.chunks.len(),
        record.merged_chunks.len(),
        record.notes.len(),
        record.open_questions().count(),
        record.questions.len(),
    );

    if let Some(analysis) = &record.analysis {
        println!("\n--- Summary ---\n{}", analysis.summary);
    }

    if !record.notes.is_empty() {
        println!("\n--- Notes ---");
        for note in &record.notes {
            println!("- {}", note.text);
        }
    }
}

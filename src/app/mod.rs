use crate::api::ApiServer;
use crate::config::Config;
use crate::db::SqliteMeetingStore;
use crate::meeting::{MeetingContext, MeetingRepository};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Open the configured store and wrap it in a repository.
pub fn open_repository(config: &Config) -> Result<MeetingRepository> {
    let db_path = config.store.resolve_db_path()?;
    let store = SqliteMeetingStore::open(&db_path, &config.store.partition)
        .with_context(|| format!("Failed to open meeting store at {:?}", db_path))?;

    info!(
        "Using meeting store {:?} (partition {})",
        db_path, config.store.partition
    );

    Ok(MeetingRepository::new(Arc::new(store)).with_default_title(&config.display.default_title))
}

pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting livemeeting service");

    let repository = open_repository(&config)?;
    let context = Arc::new(MeetingContext::new(repository, config.display.clone()));

    if !context.load(None).await {
        anyhow::bail!("Failed to load the live meeting");
    }

    if let Some(record) = context.record() {
        info!("Live meeting {} \"{}\" since {}", record.id, record.title, record.start_time);
    }

    spawn_change_logger(&context);

    let api_server = ApiServer::new(context, &config.api);
    api_server.start().await
}

/// Log every snapshot the context accepts.
fn spawn_change_logger(context: &MeetingContext) {
    let mut rx = context.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if let Some(record) = rx.borrow_and_update().as_ref() {
                debug!(
                    "Meeting {} now at version {} ({} chunks, {} notes, {} questions)",
                    record.id,
                    record.version,
                    record.chunks.len(),
                    record.notes.len(),
                    record.questions.len()
                );
            }
        }
    });
}

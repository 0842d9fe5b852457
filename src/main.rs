use anyhow::Result;
use clap::Parser;
use livemeeting::{
    app,
    cli::{handle_meeting_command, Cli, CliCommand},
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("livemeeting {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None | Some(CliCommand::Serve) => app::run_service(Config::load()?).await,
        Some(command) => {
            let repo = app::open_repository(&Config::load()?)?;
            handle_meeting_command(command, &repo).await
        }
    }
}

pub mod args;
pub mod meeting;

pub use args::{Cli, CliCommand};
pub use meeting::handle_meeting_command;

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs};
pub use output::{OutputFormat, OutputFormatter};

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ConfigArgs, InspectArgs};
pub use output::{OutputFormat, OutputFormatter};

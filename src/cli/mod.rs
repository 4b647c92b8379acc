mod commands;

pub use commands::{compose, construct, extract, load_config, Cli, Commands, ConstructArgs, ExtractArgs};

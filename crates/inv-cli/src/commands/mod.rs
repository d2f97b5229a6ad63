//! CLI subcommand implementations.

pub mod entries;
pub mod generate;

//! Calendar invoicing CLI library.
//!
//! This crate provides the CLI interface, client and provider loading, and
//! invoice rendering on top of `inv-core` and `inv-ics`.

mod cli;
pub mod clients;
pub mod commands;
mod config;
pub mod invoice;
pub mod invoicer;
pub mod render;

pub use cli::{Cli, Commands};
pub use config::Config;

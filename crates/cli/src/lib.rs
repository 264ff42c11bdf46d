//! mine-blocks CLI Library
//!
//! This crate provides the command-line front end of the pacer: argument
//! parsing, the optional node daemon lifecycle and the application flow
//! around [`pacer_miner::PacedMiningController`].

pub mod app;
pub mod args;
pub mod daemon;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

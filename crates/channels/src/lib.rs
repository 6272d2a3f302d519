//! Chat channel implementations for chainpilot.
//!
//! Each channel relays user text to the orchestrator and prints its
//! replies. Only the terminal channel ships today.

pub mod cli;

pub use cli::CliChannel;

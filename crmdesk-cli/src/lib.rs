//! crmdesk command-line front-end.
//!
//! The binary (main.rs) parses arguments and sets up logging; everything
//! else lives here so it can be tested without spawning a process.

pub mod cli;
pub mod commands;
pub mod render;

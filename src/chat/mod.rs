//! Interactive chat prompt on top of a [`Session`](crate::session::Session).

/// Slash command parsing.
pub mod command;
mod repl;
pub mod ui;

pub use repl::run_repl;

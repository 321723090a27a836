//! Subcommand implementations.

/// `listen` and `connect`.
pub mod chat;

/// Configure command handler.
pub mod configure;

/// `languages` listing.
pub mod languages;

/// Provider listing command handler.
pub mod providers;

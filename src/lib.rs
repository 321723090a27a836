//! # tarjimani - translated peer-to-peer chat
//!
//! Two people who speak different languages connect directly over TCP. Each
//! side tells the other which language it types in, and from then on every
//! outgoing message is translated into the peer's language before it is
//! sent. Incoming messages arrive already translated and are shown as is.
//!
//! ## Quick Start
//!
//! ```bash
//! # Georgian speaker waits for a peer
//! tarjimani listen --lang ka
//!
//! # English speaker connects to them
//! tarjimani connect 192.168.1.20 --lang en
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/tarjimani/config.toml`:
//!
//! ```toml
//! [tarjimani]
//! provider = "ollama"
//! model = "gemma3:12b"
//! language = "en"
//! port = 5000
//! pairs = ["en-ka", "ka-en", "en-ru", "ru-en"]
//!
//! [providers.ollama]
//! endpoint = "http://localhost:11434"
//! models = ["gemma3:12b"]
//! ```

/// Translation cache management using `SQLite`.
pub mod cache;

/// Interactive chat prompt.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

/// File system utilities.
pub mod fs;

/// Newline-delimited byte buffering.
pub mod lines;

/// Diagnostic logging setup.
pub mod logging;

/// Global output configuration (quiet mode, colors).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Peer connection, handshake and message exchange.
pub mod session;

/// Translation gateway and OpenAI-compatible client.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;

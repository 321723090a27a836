//! Terminal rendering for the chat prompt.

use std::io::{self, Write};

use super::command::SLASH_COMMANDS;
use crate::session::SessionState;
use crate::translation::language_name;
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROMPT: &str = "⟴ ";
pub const INCOMING: &str = "⥺";

pub fn print_header(local: &str, peer: &str) {
    println!(
        "{} {} - {} {} {}",
        Style::header("tarjimani"),
        Style::version(format!("v{VERSION}")),
        Style::code(language_name(local)),
        Style::secondary("⇄"),
        Style::code(language_name(peer)),
    );
    println!(
        "{}",
        Style::hint("Type a message to send it translated, /help for commands, Ctrl+C to quit")
    );
    println!();
}

pub fn print_prompt() {
    print!("{}", Style::prompt(PROMPT));
    let _ = io::stdout().flush();
}

/// Prints a message from the peer above a fresh prompt.
pub fn print_incoming(text: &str) {
    println!("\n{} {text}", Style::incoming(INCOMING));
    print_prompt();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in SLASH_COMMANDS {
        println!(
            "  {} {}",
            Style::command(format!("{command:<10}")),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_status(local: &str, peer: Option<&str>, state: SessionState) {
    println!("{}", Style::header("Session"));
    println!(
        "  {}   {} ({})",
        Style::label("you"),
        Style::value(local),
        Style::secondary(language_name(local))
    );
    match peer {
        Some(peer) => println!(
            "  {}  {} ({})",
            Style::label("peer"),
            Style::value(peer),
            Style::secondary(language_name(peer))
        ),
        None => println!("  {}  {}", Style::label("peer"), Style::secondary("unknown")),
    }
    println!("  {} {}", Style::label("state"), Style::value(state));
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
}

pub fn print_peer_left() {
    println!();
    crate::status!("{}", Style::warning("Peer disconnected"));
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

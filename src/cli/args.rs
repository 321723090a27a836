use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tarjimani")]
#[command(about = "Peer-to-peer chat that translates what you type into your peer's language")]
#[command(version)]
pub struct Args {
    /// Suppress status messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by `listen` and `connect`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChatArgs {
    /// Language you type in (ISO 639-1, e.g. en, ka, ru)
    #[arg(short, long = "lang")]
    pub lang: Option<String>,

    /// TCP port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Provider name from the config file
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Disable the translation cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wait for a peer to connect
    Listen {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        #[command(flatten)]
        chat: ChatArgs,
    },
    /// Connect to a listening peer
    Connect {
        /// Host name or IP address of the peer
        host: String,

        #[command(flatten)]
        chat: ChatArgs,
    },
    /// List language codes and the enabled translation pairs
    Languages,
    /// List configured providers
    Providers {
        /// Show details for this provider
        provider: Option<String>,
    },
    /// Edit default settings interactively
    Configure,
}

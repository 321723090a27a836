use anyhow::Result;
use clap::Parser;

use tarjimani::cli::commands::{chat, configure, languages, providers};
use tarjimani::cli::{Args, Command};
use tarjimani::session::SessionError;
use tarjimani::ui::Style;
use tarjimani::{logging, output};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    output::init(output::OutputConfig::from_flags(args.quiet, args.no_color));
    logging::init(args.verbose, output::is_no_color());

    let code = match run(args).await {
        Ok(()) => exitcode::OK,
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            exit_code(&e)
        }
    };

    // Exit right away instead of letting the runtime wait on stdin
    std::process::exit(code);
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Listen { bind, chat: options } => chat::run_listen(options, &bind).await,
        Command::Connect {
            host,
            chat: options,
        } => chat::run_connect(options, &host).await,
        Command::Languages => languages::run_languages(),
        Command::Providers { provider } => providers::print_providers(provider.as_deref()),
        Command::Configure => configure::run_configure(),
    }
}

fn exit_code(err: &anyhow::Error) -> exitcode::ExitCode {
    let session_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SessionError>());

    match session_error {
        Some(SessionError::Transport(_) | SessionError::PeerClosed) => exitcode::UNAVAILABLE,
        Some(SessionError::Protocol(_)) => exitcode::PROTOCOL,
        Some(SessionError::UnsupportedLanguagePair(_)) => exitcode::CONFIG,
        Some(_) => exitcode::SOFTWARE,
        None if err.chain().any(|cause| cause.is::<std::io::Error>()) => exitcode::IOERR,
        None => exitcode::CONFIG,
    }
}

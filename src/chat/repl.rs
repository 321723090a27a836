use anyhow::Result;
use std::future::Future;
use std::io::{self, BufRead};
use tokio::sync::mpsc;
use tracing::debug;

use super::command::{Input, SlashCommand, parse_input};
use super::ui;
use crate::session::{Session, SessionError};
use crate::translation::TranslationGateway;
use crate::ui::Spinner;

/// Runs the chat prompt over an active session until the user quits,
/// stdin ends, Ctrl+C is pressed, or the peer goes away.
///
/// Does not close the session.
pub async fn run_repl<G: TranslationGateway>(session: &Session<G>) -> Result<()> {
    ui::print_header(
        session.local_language(),
        session.peer_language().unwrap_or("?"),
    );

    let mut lines = spawn_stdin_reader();
    ui::print_prompt();

    loop {
        tokio::select! {
            () = session.closed() => {
                ui::print_peer_left();
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    println!();
                    break;
                };

                match parse_input(&line?) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !handle_command(session, cmd) {
                            break;
                        }
                    }
                    Input::Text(text) => {
                        match send_message(session, &text, tokio::signal::ctrl_c()).await {
                            Outcome::Sent | Outcome::Failed => {}
                            Outcome::Interrupted => {
                                println!();
                                break;
                            }
                            Outcome::PeerLeft => {
                                ui::print_peer_left();
                                break;
                            }
                        }
                    }
                }

                if session.is_active() {
                    ui::print_prompt();
                }
            }
        }
    }

    ui::print_goodbye();
    Ok(())
}

/// Returns `false` when the chat should end.
fn handle_command<G: TranslationGateway>(session: &Session<G>, cmd: SlashCommand) -> bool {
    match cmd {
        SlashCommand::Help => ui::print_help(),
        SlashCommand::Status => ui::print_status(
            session.local_language(),
            session.peer_language(),
            session.state(),
        ),
        SlashCommand::Quit => return false,
        SlashCommand::Unknown(cmd) => {
            ui::print_error(&format!("Unknown command: /{cmd} (try /help)"));
        }
    }
    true
}

/// How an outbound message ended.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Sent,
    /// Reported to the user; the chat goes on.
    Failed,
    Interrupted,
    PeerLeft,
}

/// Sends `text` unless `interrupt` fires or the peer leaves first.
///
/// Translation may stall indefinitely, so both are watched for the whole
/// send rather than only between lines.
async fn send_message<G, I>(session: &Session<G>, text: &str, interrupt: I) -> Outcome
where
    G: TranslationGateway,
    I: Future,
{
    let spinner = Spinner::new("Translating...");
    let sent = tokio::select! {
        sent = session.send(text) => Some(sent),
        _ = interrupt => {
            spinner.stop();
            return Outcome::Interrupted;
        }
        () = session.closed() => None,
    };
    spinner.stop();

    match sent {
        None => Outcome::PeerLeft,
        Some(Ok(())) => Outcome::Sent,
        Some(Err(SessionError::NotConnected)) => {
            ui::print_error("Not connected to a peer");
            Outcome::Failed
        }
        Some(Err(e)) => {
            ui::print_error(&e.to_string());
            Outcome::Failed
        }
    }
}

/// Reads stdin lines on a dedicated thread.
///
/// A blocking stdin read cannot be cancelled, so it must not live on the
/// runtime's blocking pool or shutting down would wait for the next line.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, duplex};
    use tokio::time::timeout;

    use crate::translation::{Translate, UnsupportedPair};

    /// Translator whose endpoint never answers.
    struct Stalled;

    impl Translate for Stalled {
        fn translate(&self, _: &str) -> impl Future<Output = anyhow::Result<String>> + Send {
            std::future::pending()
        }
    }

    struct StalledGateway;

    impl TranslationGateway for StalledGateway {
        type Translator = Stalled;

        fn resolve(&self, _: &str, _: &str) -> Result<Stalled, UnsupportedPair> {
            Ok(Stalled)
        }
    }

    async fn active_session() -> (Session<StalledGateway>, tokio::io::DuplexStream) {
        let (local, mut peer) = duplex(4096);
        peer.write_all(br#"{"type":"lang","language":"ka"}"#)
            .await
            .unwrap();

        let session = Session::new("en", StalledGateway).with_message_handler(|_| {});
        session.attach(local).await.unwrap();
        (session, peer)
    }

    #[tokio::test]
    async fn test_interrupt_ends_stalled_send() {
        let (session, _peer) = active_session().await;

        let outcome = timeout(
            Duration::from_secs(5),
            send_message(&session, "hello", std::future::ready(())),
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::Interrupted);
        session.close().await;
    }

    #[tokio::test]
    async fn test_peer_leaving_ends_stalled_send() {
        let (session, peer) = active_session().await;

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(peer);
        });

        let outcome = timeout(
            Duration::from_secs(5),
            send_message(&session, "hello", std::future::pending::<()>()),
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::PeerLeft);
        session.close().await;
    }
}

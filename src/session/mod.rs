//! Peer-to-peer translated chat session.
//!
//! A [`Session`] owns one connection to one peer. After the connection is
//! established both sides announce their language; the session then binds
//! the outbound translator for `local -> peer` and becomes
//! [`SessionState::Active`]. From then on a background task delivers inbound
//! chat text to the message handler while [`Session::send`] translates and
//! writes outbound text. Inbound text is never translated: the sender has
//! already translated it into our language.
//!
//! ```text
//! Idle -> Establishing -> Handshaking -> Active -> Closed
//!                              \__________________/^
//! ```

mod error;
mod frame;
mod handshake;
mod receiver;
mod transport;


use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use error::{ProtocolError, Result, SessionError};
pub use frame::{Frame, FrameDecoder};
pub use handshake::HANDSHAKE_BUFFER_SIZE;
pub use receiver::{MessageHandler, RECEIVE_BUFFER_SIZE};
pub use transport::{PeerListener, Role};

use crate::translation::{Translate, TranslationGateway};

/// Lifecycle of a session. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    Idle,
    Establishing,
    Handshaking,
    Active,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Establishing => "establishing",
            Self::Handshaking => "handshaking",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One translated chat connection with a single peer.
pub struct Session<G: TranslationGateway> {
    local_language: String,
    gateway: G,
    state: Arc<watch::Sender<SessionState>>,
    peer_language: OnceLock<String>,
    outbound: OnceLock<G::Translator>,
    writer: tokio::sync::Mutex<Option<BoxedWriter>>,
    handler: Mutex<Option<MessageHandler>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

impl<G: TranslationGateway> Session<G> {
    pub fn new(local_language: impl Into<String>, gateway: G) -> Self {
        Self {
            local_language: local_language.into(),
            gateway,
            state: Arc::new(watch::Sender::new(SessionState::Idle)),
            peer_language: OnceLock::new(),
            outbound: OnceLock::new(),
            writer: tokio::sync::Mutex::new(None),
            handler: Mutex::new(None),
            receiver: Mutex::new(None),
        }
    }

    /// Sets the handler for inbound chat text, replacing any previous one.
    ///
    /// Without a handler, inbound text is printed to stdout.
    #[must_use]
    pub fn with_message_handler<F>(self, handler: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        *lock(&self.handler) = Some(Box::new(handler));
        self
    }

    pub fn local_language(&self) -> &str {
        &self.local_language
    }

    /// The peer's language, known once the handshake has completed.
    pub fn peer_language(&self) -> Option<&str> {
        self.peer_language.get().map(String::as_str)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Watches state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolves once the session is closed, by either side.
    pub async fn closed(&self) {
        let mut state = self.state.subscribe();
        wait_closed(&mut state).await;
    }

    /// Establishes the connection for `role`, runs the handshake and starts
    /// receiving.
    ///
    /// Only valid on an idle session. Calling [`close`](Self::close) while
    /// this is pending aborts it and releases the listening socket.
    pub async fn start(&self, role: Role) -> Result<()> {
        if !transition(&self.state, SessionState::Idle, SessionState::Establishing) {
            return Err(self.not_startable());
        }

        let mut state = self.state.subscribe();
        let established = tokio::select! {
            () = wait_closed(&mut state) => return Err(SessionError::Closed),
            established = transport::establish(role) => established,
        };

        match established {
            Ok(stream) => self.handshake(stream).await,
            Err(e) => {
                warn!(error = %e, "failed to establish connection");
                advance(&self.state, SessionState::Closed);
                Err(e.into())
            }
        }
    }

    /// Runs the handshake over an already established connection and starts
    /// receiving.
    pub async fn attach<S>(&self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        if !transition(&self.state, SessionState::Idle, SessionState::Establishing) {
            return Err(self.not_startable());
        }
        self.handshake(stream).await
    }

    async fn handshake<S>(&self, mut stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        if !transition(
            &self.state,
            SessionState::Establishing,
            SessionState::Handshaking,
        ) {
            return Err(SessionError::Closed);
        }

        let mut state = self.state.subscribe();
        let exchanged = tokio::select! {
            () = wait_closed(&mut state) => return Err(SessionError::Closed),
            exchanged = handshake::exchange_languages(&mut stream, &self.local_language) => exchanged,
        };
        let exchanged = exchanged.inspect_err(|e| {
            warn!(error = %e, "handshake failed");
            advance(&self.state, SessionState::Closed);
        })?;

        let translator = self
            .gateway
            .resolve(&self.local_language, &exchanged.peer_language)
            .inspect_err(|e| {
                warn!(error = %e, "closing session");
                advance(&self.state, SessionState::Closed);
            })?;

        let peer_language = exchanged.peer_language;
        info!(local = %self.local_language, peer = %peer_language, "handshake complete");
        // Only one handshake ever runs per session, so both cells are empty
        let _ = self.peer_language.set(peer_language);
        let _ = self.outbound.set(translator);

        let (reader, writer) = tokio::io::split(stream);
        *self.writer.lock().await = Some(Box::new(writer));
        let handler = lock(&self.handler)
            .take()
            .unwrap_or_else(default_message_handler);

        if !transition(&self.state, SessionState::Handshaking, SessionState::Active) {
            self.writer.lock().await.take();
            return Err(SessionError::Closed);
        }

        self.start_receiving(reader, exchanged.leftover, handler)
    }

    /// Spawns the receive loop of a session that just became active.
    ///
    /// A `close` may land right after the transition to Active, in which
    /// case the loop exits at once and the start is reported as closed.
    fn start_receiving<R>(&self, reader: R, leftover: Vec<u8>, handler: MessageHandler) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let task = tokio::spawn(receiver::receive_loop(
            reader,
            leftover,
            handler,
            Arc::clone(&self.state),
        ));
        *lock(&self.receiver) = Some(task);

        if self.state() == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    /// Translates `text` into the peer's language and sends it as one chat
    /// frame.
    ///
    /// Blank input is ignored. Translation and write failures are returned
    /// as is; a failed write closes the session.
    pub async fn send(&self, text: &str) -> Result<()> {
        if !self.is_active() {
            return Err(SessionError::NotConnected);
        }
        if text.trim().is_empty() {
            return Ok(());
        }

        let translator = self.outbound.get().ok_or(SessionError::NotConnected)?;
        let translated = translator
            .translate(text)
            .await
            .map_err(SessionError::Translation)?;
        let line = Frame::chat(translated).encode_line()?;

        // A peer that stops reading can block the write indefinitely, so a
        // concurrent close must be able to abandon it and take the writer
        let mut state = self.state.subscribe();
        tokio::select! {
            () = wait_closed(&mut state) => Err(SessionError::NotConnected),
            written = self.write_line(&line) => written,
        }
    }

    async fn write_line(&self, line: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        // The peer may have gone away while we were translating
        let Some(writer) = writer.as_mut().filter(|_| self.is_active()) else {
            return Err(SessionError::NotConnected);
        };

        let written = async {
            writer.write_all(line).await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!(error = %e, "failed to send message");
            advance(&self.state, SessionState::Closed);
            return Err(e.into());
        }

        debug!(bytes = line.len(), "sent chat frame");
        Ok(())
    }

    /// Closes the session and releases the connection.
    ///
    /// Safe to call from any state and any number of times.
    pub async fn close(&self) {
        if advance(&self.state, SessionState::Closed) {
            info!("session closed");
        }

        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            let _ = writer.shutdown().await;
        }

        let receiver = lock(&self.receiver).take();
        if let Some(task) = receiver
            && let Err(e) = task.await
        {
            warn!(error = %e, "receive loop ended abnormally");
        }
    }

    fn not_startable(&self) -> SessionError {
        if self.state() == SessionState::Closed {
            SessionError::Closed
        } else {
            SessionError::AlreadyStarted
        }
    }
}

impl<G: TranslationGateway> Drop for Session<G> {
    fn drop(&mut self) {
        advance(&self.state, SessionState::Closed);
    }
}

impl<G: TranslationGateway> fmt::Debug for Session<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("local_language", &self.local_language)
            .field("peer_language", &self.peer_language.get())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Moves the state forward to `next`. Returns `false` if it was already
/// there or beyond.
fn advance(state: &watch::Sender<SessionState>, next: SessionState) -> bool {
    state.send_if_modified(|current| {
        if *current < next {
            debug!(from = %current, to = %next, "session state");
            *current = next;
            true
        } else {
            false
        }
    })
}

/// Moves the state from exactly `from` to `to`.
fn transition(state: &watch::Sender<SessionState>, from: SessionState, to: SessionState) -> bool {
    state.send_if_modified(|current| {
        if *current == from && from < to {
            debug!(%from, %to, "session state");
            *current = to;
            true
        } else {
            false
        }
    })
}

async fn wait_closed(state: &mut watch::Receiver<SessionState>) {
    // The sender lives as long as the session, so an error cannot happen
    // while anyone is waiting
    let _ = state.wait_for(|s| *s == SessionState::Closed).await;
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn default_message_handler() -> MessageHandler {
    Box::new(|text| crate::chat::ui::print_incoming(&text))
}

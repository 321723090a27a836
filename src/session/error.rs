//! Error types of the peer session.

use thiserror::Error;

use crate::translation::UnsupportedPair;

/// Problems with the content of a single frame.
///
/// Inside the receive loop these are reported and the offending line is
/// dropped. During the handshake they are fatal.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The bytes were not a well-formed frame (bad JSON, unknown type,
    /// missing field, invalid UTF-8).
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A well-formed frame arrived where a different type was expected.
    #[error("unexpected '{found}' frame, expected '{expected}'")]
    UnexpectedFrame {
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors surfaced to the owner of a [`Session`](super::Session).
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bind, accept, connect, read or write failure. Fatal.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer violated the handshake protocol. Fatal.
    #[error("handshake failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer closed the connection before the handshake completed.
    #[error("peer closed the connection during the handshake")]
    PeerClosed,

    /// No translation is available from our language into the peer's.
    #[error(transparent)]
    UnsupportedLanguagePair(#[from] UnsupportedPair),

    /// `send` was called while the session is not active.
    #[error("not connected")]
    NotConnected,

    /// `start` or `attach` was called on a session that already started.
    #[error("session already started")]
    AlreadyStarted,

    /// The session was closed while it was still being established.
    #[error("session closed before it became active")]
    Closed,

    /// The translation gateway failed to translate an outbound message.
    #[error("translation failed: {0:#}")]
    Translation(#[source] anyhow::Error),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_frame_message() {
        let err = ProtocolError::UnexpectedFrame {
            expected: "lang",
            found: "chat",
        };
        assert_eq!(err.to_string(), "unexpected 'chat' frame, expected 'lang'");
    }

    #[test]
    fn test_unsupported_pair_is_transparent() {
        let err = SessionError::from(UnsupportedPair::new("en", "xx"));
        assert_eq!(err.to_string(), "unsupported language pair: en -> xx");
    }

    #[test]
    fn test_translation_error_keeps_context() {
        let source = anyhow::anyhow!("status 500").context("request failed");
        let err = SessionError::Translation(source);
        assert_eq!(
            err.to_string(),
            "translation failed: request failed: status 500"
        );
    }
}

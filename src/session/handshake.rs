//! Single-shot language exchange performed right after connecting.
//!
//! Both sides write one Lang frame without a delimiter and then perform one
//! bounded read expecting the peer's Lang frame. Each side sends its
//! announcement before any other traffic, so the peer's frame is the first
//! JSON value of that read. Bytes following it belong to the framed chat
//! stream and are handed back to the caller.

use serde_json::Deserializer;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::error::{ProtocolError, Result, SessionError};
use super::frame::Frame;

/// Size of the single handshake read.
pub const HANDSHAKE_BUFFER_SIZE: usize = 1024;

/// Outcome of a successful exchange.
#[derive(Debug)]
pub struct Exchanged {
    /// Language announced by the peer.
    pub peer_language: String,
    /// Bytes read past the peer's Lang frame.
    pub leftover: Vec<u8>,
}

/// Announces `local_language` and reads the peer's announcement.
pub async fn exchange_languages<S>(stream: &mut S, local_language: &str) -> Result<Exchanged>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let announcement = Frame::lang(local_language).encode()?;
    stream.write_all(&announcement).await?;
    stream.flush().await?;
    debug!(language = local_language, "sent language announcement");

    let mut buf = vec![0u8; HANDSHAKE_BUFFER_SIZE];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Err(SessionError::PeerClosed);
    }

    let (frame, consumed) = parse_announcement(&buf[..n])?;
    let Frame::Lang { language } = frame else {
        return Err(ProtocolError::UnexpectedFrame {
            expected: "lang",
            found: frame.kind(),
        }
        .into());
    };
    debug!(peer_language = %language, extra_bytes = n - consumed, "received peer language");

    Ok(Exchanged {
        peer_language: language,
        leftover: buf[consumed..n].to_vec(),
    })
}

/// Parses the first JSON value of `bytes`, returning it with its length.
fn parse_announcement(bytes: &[u8]) -> std::result::Result<(Frame, usize), ProtocolError> {
    let mut values = Deserializer::from_slice(bytes).into_iter::<Frame>();
    match values.next() {
        Some(Ok(frame)) => Ok((frame, values.byte_offset())),
        Some(Err(e)) => Err(ProtocolError::Malformed(e)),
        None => Err(ProtocolError::Malformed(serde::de::Error::custom(
            "empty language announcement",
        ))),
    }
}

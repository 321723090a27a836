//! Background receive loop of an active session.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::SessionState;
use super::error::ProtocolError;
use super::frame::{Frame, FrameDecoder};

/// Size of each read from the connection.
pub const RECEIVE_BUFFER_SIZE: usize = 4096;

/// Callback receiving the text of every inbound chat frame.
pub type MessageHandler = Box<dyn FnMut(String) + Send + 'static>;

/// Reads the connection until EOF, a read error, or the session closing.
///
/// `leftover` holds bytes that arrived together with the handshake and is
/// decoded before the first read.
pub(crate) async fn receive_loop<R>(
    mut reader: R,
    leftover: Vec<u8>,
    mut handler: MessageHandler,
    state: Arc<watch::Sender<SessionState>>,
) where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    dispatch(decoder.feed(&leftover), &mut handler);

    let mut closed = state.subscribe();
    let mut buf = vec![0u8; RECEIVE_BUFFER_SIZE];

    loop {
        tokio::select! {
            () = super::wait_closed(&mut closed) => {
                debug!("receive loop cancelled by close");
                break;
            }
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    info!("connection closed by peer");
                    super::advance(&state, SessionState::Closed);
                    break;
                }
                Ok(n) => dispatch(decoder.feed(&buf[..n]), &mut handler),
                Err(e) => {
                    warn!(error = %e, "error receiving");
                    super::advance(&state, SessionState::Closed);
                    break;
                }
            },
        }
    }
}

fn dispatch(decoded: Vec<Result<Frame, ProtocolError>>, handler: &mut MessageHandler) {
    for result in decoded {
        match result {
            Ok(Frame::Chat { text }) => handler(text),
            Ok(other) => {
                let err = ProtocolError::UnexpectedFrame {
                    expected: "chat",
                    found: other.kind(),
                };
                warn!(error = %err, "ignoring frame");
            }
            Err(err) => warn!(error = %err, "invalid message"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncWriteExt, duplex};

    fn collecting_handler() -> (MessageHandler, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let handler: MessageHandler = Box::new(move |text| sink.lock().unwrap().push(text));
        (handler, received)
    }

    fn active_state() -> Arc<watch::Sender<SessionState>> {
        Arc::new(watch::Sender::new(SessionState::Active))
    }

    #[tokio::test]
    async fn test_delivers_chat_frames_and_stops_on_eof() {
        let (reader, mut peer) = duplex(4096);
        let (handler, received) = collecting_handler();
        let state = active_state();

        let task = tokio::spawn(receive_loop(reader, Vec::new(), handler, Arc::clone(&state)));

        peer.write_all(b"{\"type\":\"chat\",\"text\":\"one\"}\n{\"type\":\"chat\",")
            .await
            .unwrap();
        peer.write_all(b"\"text\":\"two\"}\n").await.unwrap();
        drop(peer);

        task.await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(*state.borrow(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_skips_invalid_and_non_chat_frames() {
        let (reader, mut peer) = duplex(4096);
        let (handler, received) = collecting_handler();

        let task = tokio::spawn(receive_loop(reader, Vec::new(), handler, active_state()));

        peer.write_all(
            b"{\"type\":\"chat\",\"text\":\"a\"}\n\
              garbage\n\
              {\"type\":\"lang\",\"language\":\"en\"}\n\
              {\"type\":\"chat\"}\n\
              {\"type\":\"chat\",\"text\":\"b\"}\n",
        )
        .await
        .unwrap();
        drop(peer);

        task.await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_leftover_is_delivered_first() {
        let (reader, mut peer) = duplex(4096);
        let (handler, received) = collecting_handler();

        let task = tokio::spawn(receive_loop(
            reader,
            b"{\"type\":\"chat\",\"text\":\"early\"}\n".to_vec(),
            handler,
            active_state(),
        ));

        peer.write_all(b"{\"type\":\"chat\",\"text\":\"late\"}\n")
            .await
            .unwrap();
        drop(peer);

        task.await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_close_unblocks_pending_read() {
        let (reader, _peer) = duplex(4096);
        let (handler, received) = collecting_handler();
        let state = active_state();

        let task = tokio::spawn(receive_loop(reader, Vec::new(), handler, Arc::clone(&state)));
        state.send_replace(SessionState::Closed);

        task.await.unwrap();
        assert!(received.lock().unwrap().is_empty());
    }
}

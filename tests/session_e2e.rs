#![allow(clippy::unwrap_used)]
//! Two real sessions talking over loopback TCP.
//!
//! Translation is stubbed, so these tests exercise connection setup, the
//! language handshake and message delivery without any model endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tarjimani::session::{PeerListener, Role, Session, SessionError, SessionState};
use tarjimani::translation::{TranslationGateway, UnsupportedPair};
use tokio::sync::mpsc;
use tokio::time::timeout;

type Translator = fn(&str) -> Result<String>;

/// Supports a fixed set of directions, each with its own function.
struct StubGateway {
    routes: Vec<(&'static str, &'static str, Translator)>,
}

impl TranslationGateway for StubGateway {
    type Translator = Translator;

    fn resolve(&self, source: &str, target: &str) -> Result<Translator, UnsupportedPair> {
        self.routes
            .iter()
            .find(|(s, t, _)| *s == source && *t == target)
            .map(|(_, _, translate)| *translate)
            .ok_or_else(|| UnsupportedPair::new(source, target))
    }
}

fn en_to_ka(text: &str) -> Result<String> {
    match text {
        "hello" => Ok("გამარჯობა".to_string()),
        "thank you" => Ok("მადლობა".to_string()),
        other => bail!("no translation for {other:?}"),
    }
}

fn ka_to_en(text: &str) -> Result<String> {
    match text {
        "როგორ ხარ?" => Ok("how are you?".to_string()),
        other => bail!("no translation for {other:?}"),
    }
}

fn gateway() -> StubGateway {
    StubGateway {
        routes: vec![("en", "ka", en_to_ka), ("ka", "en", ka_to_en)],
    }
}

type Inbox = mpsc::UnboundedReceiver<String>;

fn session(language: &str, gateway: StubGateway) -> (Arc<Session<StubGateway>>, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(language, gateway).with_message_handler(move |text| {
        let _ = tx.send(text);
    });
    (Arc::new(session), rx)
}

async fn next_message(inbox: &mut Inbox) -> String {
    timeout(Duration::from_secs(5), inbox.recv())
        .await
        .unwrap()
        .unwrap()
}

/// Starts a listening `ka` session and a dialing `en` session.
async fn connect_pair(
    listener_gateway: StubGateway,
    dialer_gateway: StubGateway,
) -> (
    (Arc<Session<StubGateway>>, Inbox),
    (Arc<Session<StubGateway>>, Inbox),
    Result<(), SessionError>,
    Result<(), SessionError>,
) {
    let listener = PeerListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (ka, ka_inbox) = session("ka", listener_gateway);
    let (en, en_inbox) = session("en", dialer_gateway);

    let listening = tokio::spawn({
        let ka = Arc::clone(&ka);
        async move { ka.start(Role::Listen(listener)).await }
    });
    let dialed = en.start(Role::dial("127.0.0.1", port)).await;
    let listened = timeout(Duration::from_secs(5), listening)
        .await
        .unwrap()
        .unwrap();

    ((ka, ka_inbox), (en, en_inbox), listened, dialed)
}

#[tokio::test]
async fn test_messages_arrive_translated_in_both_directions() {
    let ((ka, mut ka_inbox), (en, mut en_inbox), listened, dialed) =
        connect_pair(gateway(), gateway()).await;
    listened.unwrap();
    dialed.unwrap();

    assert_eq!(ka.peer_language(), Some("en"));
    assert_eq!(en.peer_language(), Some("ka"));

    en.send("hello").await.unwrap();
    en.send("thank you").await.unwrap();
    ka.send("როგორ ხარ?").await.unwrap();

    assert_eq!(next_message(&mut ka_inbox).await, "გამარჯობა");
    assert_eq!(next_message(&mut ka_inbox).await, "მადლობა");
    assert_eq!(next_message(&mut en_inbox).await, "how are you?");

    en.close().await;
    ka.close().await;
}

#[tokio::test]
async fn test_closing_one_side_closes_the_other() {
    let ((ka, _ka_inbox), (en, _en_inbox), listened, dialed) =
        connect_pair(gateway(), gateway()).await;
    listened.unwrap();
    dialed.unwrap();

    en.close().await;
    timeout(Duration::from_secs(5), ka.closed()).await.unwrap();

    assert_eq!(ka.state(), SessionState::Closed);
    assert!(matches!(
        ka.send("hello").await,
        Err(SessionError::NotConnected)
    ));
    ka.close().await;
}

#[tokio::test]
async fn test_failed_translation_leaves_the_chat_open() {
    let ((ka, mut ka_inbox), (en, _en_inbox), listened, dialed) =
        connect_pair(gateway(), gateway()).await;
    listened.unwrap();
    dialed.unwrap();

    let err = en.send("untranslatable").await.unwrap_err();
    assert!(matches!(err, SessionError::Translation(_)));
    assert!(en.is_active());

    en.send("hello").await.unwrap();
    assert_eq!(next_message(&mut ka_inbox).await, "გამარჯობა");

    en.close().await;
    ka.close().await;
}

#[tokio::test]
async fn test_unsupported_direction_rejects_the_peer() {
    // The listener cannot translate ka -> en, so it refuses the English peer
    let listener_gateway = StubGateway {
        routes: vec![("ka", "ru", ka_to_en)],
    };
    let ((ka, _ka_inbox), (en, _en_inbox), listened, dialed) =
        connect_pair(listener_gateway, gateway()).await;

    match listened {
        Err(SessionError::UnsupportedLanguagePair(pair)) => {
            assert_eq!(pair, UnsupportedPair::new("ka", "en"));
        }
        other => panic!("expected an unsupported pair, got {other:?}"),
    }
    assert_eq!(ka.state(), SessionState::Closed);

    // The dialer finished its handshake but sees the connection drop
    dialed.unwrap();
    timeout(Duration::from_secs(5), en.closed()).await.unwrap();
    en.close().await;
}

use anyhow::{Context, Result};
use tracing::debug;

use crate::cache::CacheManager;
use crate::chat;
use crate::cli::ChatArgs;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::session::{PeerListener, Role, Session};
use crate::translation::{LlmGateway, TranslationClient, TranslationGateway, validate_language};
use crate::ui::Style;

/// Waits for one peer on `bind` and chats with it.
pub async fn run_listen(args: ChatArgs, bind: &str) -> Result<()> {
    let config = load_config(&args)?;
    let gateway = build_gateway(&config, args.no_cache)?;

    let listener = PeerListener::bind((bind, config.port))
        .await
        .with_context(|| format!("Failed to listen on {bind}:{}", config.port))?;
    let addr = listener.local_addr()?;

    crate::status!(
        "{} Listening on {} as {}. Waiting for a peer...",
        Style::secondary("●"),
        Style::value(addr),
        Style::code(&config.language)
    );

    run_session(Session::new(config.language, gateway), Role::Listen(listener)).await
}

/// Connects to the peer listening on `host` and chats with it.
pub async fn run_connect(args: ChatArgs, host: &str) -> Result<()> {
    let config = load_config(&args)?;
    let gateway = build_gateway(&config, args.no_cache)?;

    crate::status!(
        "{} Connecting to {} as {}...",
        Style::secondary("●"),
        Style::value(format!("{host}:{}", config.port)),
        Style::code(&config.language)
    );

    run_session(
        Session::new(config.language, gateway),
        Role::dial(host, config.port),
    )
    .await
}

fn load_config(args: &ChatArgs) -> Result<ResolvedConfig> {
    if let Some(lang) = &args.lang {
        validate_language(lang)?;
    }

    let manager = ConfigManager::new()?;
    let config_file = manager.load_or_default()?;

    let options = ResolveOptions {
        language: args.lang.clone(),
        provider: args.provider.clone(),
        model: args.model.clone(),
        port: args.port,
    };
    resolve_config(&options, &config_file)
}

fn build_gateway(config: &ResolvedConfig, no_cache: bool) -> Result<LlmGateway> {
    debug!(
        provider = %config.provider_name,
        model = %config.model,
        pairs = config.pairs.len(),
        "building translation gateway"
    );

    let client = TranslationClient::new(config.endpoint.clone(), config.api_key.clone());
    let gateway = LlmGateway::new(client, config.model.clone(), config.pairs.clone());

    if no_cache {
        Ok(gateway)
    } else {
        Ok(gateway.with_cache(CacheManager::new()?))
    }
}

async fn run_session<G: TranslationGateway>(session: Session<G>, role: Role) -> Result<()> {
    let started = tokio::select! {
        started = session.start(role) => started,
        _ = tokio::signal::ctrl_c() => {
            session.close().await;
            println!();
            crate::status!("{}", Style::secondary("Cancelled"));
            return Ok(());
        }
    };
    started?;

    crate::status!(
        "{} Connected. Peer speaks {}",
        Style::success("✓"),
        Style::code(session.peer_language().unwrap_or("?"))
    );

    let result = chat::run_repl(&session).await;
    session.close().await;
    result
}

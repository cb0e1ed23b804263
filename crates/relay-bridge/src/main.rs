//! Relay bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-bridge --bin relay-bot
//! ```
//!
//! Configuration is loaded from environment variables. Each line read from
//! stdin is relayed as game chat; `/status <text>` changes the bot's status.

use relay_bridge::{
    BridgeConfig, ReconnectPolicy, RelayBridge, RelayService, StatusText, TracingActivityLog,
    TracingChatSink,
};
use relay_common::{try_init_tracing_with_config, RelayConfig, RelayError, TracingConfig};
use relay_gateway::{GatewaySession, SessionConfig, WebSocketTransport};
use relay_rest::{HttpRestClient, OutboundDispatcher};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = try_init_tracing_with_config(TracingConfig::default());
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, code = e.error_code(), "Relay stopped with an error");
        std::process::exit(1);
    }
}

async fn run(config: RelayConfig) -> Result<(), RelayError> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        channel_id = %config.discord.channel_id,
        "Starting relay bot..."
    );

    let status = StatusText::new(config.relay.status.clone());

    let client = HttpRestClient::from_config(&config.discord)?;
    let dispatcher = Arc::new(OutboundDispatcher::new(Arc::new(client)));
    dispatcher.start();

    let bridge = Arc::new(RelayBridge::new(
        BridgeConfig::new(config.discord.channel_id.clone()).with_embeds(config.relay.use_embeds),
        dispatcher.clone(),
        Arc::new(TracingChatSink),
        Arc::new(TracingActivityLog),
    ));

    let session = GatewaySession::new(
        SessionConfig::new(config.discord.token.clone(), config.discord.gateway_url.clone()),
        Arc::new(WebSocketTransport::new()),
        bridge.clone(),
        status.provider(),
    );

    let (service, handle) = RelayService::new(
        session,
        ReconnectPolicy::from_settings(&config.relay),
        status,
    );
    let mut service = tokio::spawn(service.run());

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let outcome = console_loop(&mut service, tokio::signal::ctrl_c(), lines, |line| {
        if let Some(text) = line.strip_prefix("/status ") {
            handle.update_status(text.trim());
        } else {
            bridge.relay_game_chat("Console", line);
        }
    })
    .await;

    let result = match outcome {
        Some(result) => result,
        None => {
            handle.shutdown();
            service.await
        }
    };

    dispatcher.shutdown().await;
    info!("Relay bot stopped");

    result.map_err(RelayError::internal)?
}

/// Feed console lines to `on_line` until the service ends or `shutdown` fires
///
/// Returns the service's output, or `None` when shutdown fired first. Blank
/// lines are skipped; the rest are trimmed. Once input ends, only the service
/// and the shutdown signal are awaited.
async fn console_loop<S, T, F, R>(
    service: &mut S,
    shutdown: F,
    mut lines: Lines<R>,
    mut on_line: impl FnMut(&str),
) -> Option<T>
where
    S: Future<Output = T> + Unpin,
    F: Future<Output = std::io::Result<()>>,
    R: AsyncBufRead + Unpin,
{
    let mut input_open = true;

    // Armed once so a signal during line handling is not missed
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut *service => return Some(result),
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return None;
            }
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        on_line(line);
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    input_open = false;
                }
            },
        }
    }
}

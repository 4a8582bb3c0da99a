//! [`Gateway`] -- Discord Gateway connection loop.
//!
//! Connects over WebSocket, identifies (or resumes), keeps the heartbeat going,
//! and hands READY and MESSAGE_CREATE events to a [`GatewayHandler`].
//! Reconnects after drops; stops only on a fatal close code.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::events::{
    ConnectionProperties, GatewayPayload, HelloData, IdentifyPayload, MessageCreate, OP_DISPATCH,
    OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_HELLO, OP_IDENTIFY, OP_INVALID_SESSION, OP_RECONNECT,
    OP_RESUME, ReadyEvent, ResumePayload, is_fatal_close,
};
use crate::domain::error::BotError;

const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg";
const GATEWAY_QUERY: &str = "/?v=10&encoding=json";

/// Delay before reconnecting after a connection failure.
const RECONNECT_DELAY_SECS: u64 = 5;

/// Used when the server never sends Hello.
const FALLBACK_HEARTBEAT_MS: u64 = 41250;

/// Receives gateway events. Implementations must return quickly; long work
/// belongs in a spawned task so heartbeats keep flowing.
#[async_trait]
pub trait GatewayHandler: Send + Sync {
    async fn on_ready(&self, ready: ReadyEvent);
    async fn on_message(&self, message: MessageCreate);
}

/// What the read loop should do after a payload.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Reconnect,
}

pub struct Gateway {
    token: String,
    intents: u32,
    base_url: String,
    /// Last received sequence number for heartbeats and resuming.
    sequence: AtomicU64,
    session_id: RwLock<Option<String>>,
    resume_url: RwLock<Option<String>>,
}

impl Gateway {
    pub fn new(token: String, intents: u32) -> Self {
        Self {
            token,
            intents,
            base_url: DEFAULT_GATEWAY_URL.to_owned(),
            sequence: AtomicU64::new(0),
            session_id: RwLock::new(None),
            resume_url: RwLock::new(None),
        }
    }

    pub fn intents(&self) -> u32 {
        self.intents
    }

    async fn connect_url(&self) -> String {
        let base = self
            .resume_url
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.base_url.clone());
        format!("{}{}", base.trim_end_matches('/'), GATEWAY_QUERY)
    }

    /// Resume when a previous READY gave us a session, otherwise Identify.
    async fn auth_payload(&self) -> GatewayPayload {
        if let Some(session_id) = self.session_id.read().await.clone() {
            let seq = self.sequence.load(Ordering::SeqCst);
            info!(session_id = %session_id, seq, "attempting Resume");
            GatewayPayload {
                op: OP_RESUME,
                d: serde_json::to_value(ResumePayload {
                    token: self.token.clone(),
                    session_id,
                    seq,
                })
                .ok(),
                s: None,
                t: None,
            }
        } else {
            debug!(intents = self.intents, "sending Identify");
            GatewayPayload {
                op: OP_IDENTIFY,
                d: serde_json::to_value(IdentifyPayload {
                    token: self.token.clone(),
                    intents: self.intents,
                    properties: ConnectionProperties {
                        os: std::env::consts::OS.to_owned(),
                        browser: "marsbot".into(),
                        device: "marsbot".into(),
                    },
                })
                .ok(),
                s: None,
                t: None,
            }
        }
    }

    async fn clear_session(&self) {
        *self.session_id.write().await = None;
        *self.resume_url.write().await = None;
        self.sequence.store(0, Ordering::SeqCst);
    }

    /// Run until a fatal close code. Connection drops are retried.
    pub async fn run(&self, handler: Arc<dyn GatewayHandler>) -> Result<(), BotError> {
        loop {
            self.session(&handler).await?;
            tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)).await;
            info!("reconnecting Discord Gateway...");
        }
    }

    /// One connection, from handshake until the socket drops. Recoverable
    /// failures are logged and return `Ok`; only fatal close codes are errors.
    async fn session(&self, handler: &Arc<dyn GatewayHandler>) -> Result<(), BotError> {
        let url = self.connect_url().await;
        let ws_stream = match tokio_tungstenite::connect_async(&url).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                error!(error = %e, "failed to connect Discord Gateway");
                return Ok(());
            }
        };

        info!("Discord Gateway connected");

        let (mut ws_write, mut ws_read) = ws_stream.split();

        let heartbeat_interval = loop {
            match ws_read.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Ok(payload) = serde_json::from_str::<GatewayPayload>(&text)
                        && payload.op == OP_HELLO
                        && let Some(d) = payload.d
                        && let Ok(hello) = serde_json::from_value::<HelloData>(d)
                    {
                        break hello.heartbeat_interval;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error waiting for Hello");
                    break FALLBACK_HEARTBEAT_MS;
                }
                None => return Ok(()),
                _ => {}
            }
        };

        debug!(interval_ms = heartbeat_interval, "received Hello");

        let auth = self.auth_payload().await;
        if let Ok(json) = serde_json::to_string(&auth)
            && let Err(e) = ws_write.send(WsMessage::Text(json)).await
        {
            error!(error = %e, "failed to send Identify/Resume");
            return Ok(());
        }

        let mut heartbeat_timer = tokio::time::interval(Duration::from_millis(heartbeat_interval));
        // First tick fires immediately.
        heartbeat_timer.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat_timer.tick() => {
                    let seq = self.sequence.load(Ordering::SeqCst);
                    if let Ok(json) = serde_json::to_string(&GatewayPayload::heartbeat(seq)) {
                        if let Err(e) = ws_write.send(WsMessage::Text(json)).await {
                            warn!(error = %e, "failed to send heartbeat");
                            return Ok(());
                        }
                        debug!(seq, "sent heartbeat");
                    }
                }
                msg = ws_read.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            let payload = match serde_json::from_str::<GatewayPayload>(&text) {
                                Ok(payload) => payload,
                                Err(e) => {
                                    warn!(error = %e, "failed to parse gateway payload");
                                    continue;
                                }
                            };
                            if payload.op == OP_HEARTBEAT {
                                // Server requesting an immediate heartbeat.
                                let seq = self.sequence.load(Ordering::SeqCst);
                                if let Ok(json) = serde_json::to_string(&GatewayPayload::heartbeat(seq)) {
                                    let _ = ws_write.send(WsMessage::Text(json)).await;
                                }
                                continue;
                            }
                            if self.handle_payload(payload, handler).await == Flow::Reconnect {
                                return Ok(());
                            }
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            let code = frame.as_ref().map(|f| u16::from(f.code)).unwrap_or(1000);
                            if is_fatal_close(code) {
                                let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
                                return Err(BotError::Transport(format!(
                                    "gateway closed with {code}: {reason}"
                                )));
                            }
                            info!(code, "Discord Gateway closed by server");
                            return Ok(());
                        }
                        Some(Ok(WsMessage::Ping(data))) => {
                            let _ = ws_write.send(WsMessage::Pong(data)).await;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Discord Gateway WebSocket error");
                            return Ok(());
                        }
                        None => {
                            info!("Discord Gateway stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_payload(
        &self,
        payload: GatewayPayload,
        handler: &Arc<dyn GatewayHandler>,
    ) -> Flow {
        if let Some(s) = payload.s {
            self.sequence.store(s, Ordering::SeqCst);
        }

        match payload.op {
            OP_DISPATCH => {
                self.handle_dispatch(payload.t.as_deref(), payload.d, handler)
                    .await;
                Flow::Continue
            }
            OP_HEARTBEAT_ACK => {
                debug!("heartbeat acknowledged");
                Flow::Continue
            }
            OP_RECONNECT => {
                info!("server requested reconnect");
                Flow::Reconnect
            }
            OP_INVALID_SESSION => {
                let resumable = payload.d.as_ref().and_then(|v| v.as_bool()).unwrap_or(false);
                if resumable {
                    warn!("invalid session (resumable), retrying");
                } else {
                    warn!("invalid session (not resumable), clearing state for fresh Identify");
                    self.clear_session().await;
                }
                Flow::Reconnect
            }
            op => {
                debug!(op, "unhandled opcode");
                Flow::Continue
            }
        }
    }

    async fn handle_dispatch(
        &self,
        event: Option<&str>,
        data: Option<serde_json::Value>,
        handler: &Arc<dyn GatewayHandler>,
    ) {
        let (Some(event), Some(data)) = (event, data) else {
            return;
        };
        match event {
            "READY" => match serde_json::from_value::<ReadyEvent>(data) {
                Ok(ready) => {
                    info!(
                        bot_id = %ready.user.id,
                        bot_name = %ready.user.username,
                        "Discord bot authenticated"
                    );
                    *self.session_id.write().await = Some(ready.session_id.clone());
                    *self.resume_url.write().await = ready.resume_gateway_url.clone();
                    handler.on_ready(ready).await;
                }
                Err(e) => warn!(error = %e, "failed to parse READY"),
            },
            "RESUMED" => info!("session resumed successfully"),
            "MESSAGE_CREATE" => match serde_json::from_value::<MessageCreate>(data) {
                Ok(msg) => handler.on_message(msg).await,
                Err(e) => warn!(error = %e, "failed to parse MESSAGE_CREATE"),
            },
            other => debug!(event = %other, "unhandled dispatch event"),
        }
    }
}

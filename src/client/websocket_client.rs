//! Room session: one background task that owns the room socket.
//!
//! [`RoomSession`] is a thin handle. Commands go to the task over an unbounded
//! channel, typed [`SessionEvent`]s come back on a bounded one. The task
//! reconnects with exponential backoff, re-sends `resume_game` on every open
//! and stops for good once the retry budget is spent or the handle closes it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::client::transport::{Connector, Transport};
use crate::core::identity::PlayerId;
use crate::core::protocol::{self, ClientMessage, ServerEvent};
use crate::core::reconnect::{Backoff, BackoffPolicy};
use crate::error::{ClientError, Result};

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// What the session reports back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A connection attempt is starting. `attempt` is 0 for the first try.
    Connecting { attempt: u32 },
    Connected,
    Message(ServerEvent),
    Disconnected { reason: Option<String> },
    RetryScheduled { attempt: u32, delay: Duration },
    /// Retry budget spent; the task has exited.
    GaveUp,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub url: Url,
    pub player_id: PlayerId,
    pub policy: BackoffPolicy,
    pub event_channel_capacity: usize,
    pub shutdown_timeout: Duration,
}

impl SessionConfig {
    pub fn new(url: Url, player_id: PlayerId) -> Self {
        Self {
            url,
            player_id,
            policy: BackoffPolicy::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Handle to a running room session. Dropping it aborts the task.
pub struct RoomSession {
    cmd_tx: mpsc::UnboundedSender<ClientMessage>,
    events: mpsc::Receiver<SessionEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl RoomSession {
    pub fn start<C: Connector>(connector: C, config: SessionConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::channel(config.event_channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let shutdown_timeout = config.shutdown_timeout;

        let task = tokio::spawn(session_loop(connector, config, cmd_rx, event_tx, shutdown_rx));

        Self {
            cmd_tx,
            events,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            shutdown_timeout,
        }
    }

    /// Queues a message. It is dropped by the task if the socket is down.
    pub fn send(&self, message: ClientMessage) -> Result<()> {
        self.cmd_tx
            .send(message)
            .map_err(|_| ClientError::SessionClosed)
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Closes the socket and cancels any pending retry.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(self.shutdown_timeout, &mut task).await.is_err() {
                warn!("room session did not stop in time, aborting");
                task.abort();
            }
        }
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

enum Ended {
    /// Handle asked us to stop (or went away).
    Shutdown,
    /// Socket dropped out from under us.
    Closed(Option<String>),
}

async fn session_loop<C: Connector>(
    connector: C,
    config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: mpsc::Sender<SessionEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut backoff = Backoff::new(config.policy);
    let hello = ClientMessage::ResumeGame {
        player_id: config.player_id.clone(),
    };

    loop {
        emit(&event_tx, SessionEvent::Connecting { attempt: backoff.attempts() }).await;

        let attempt = tokio::select! {
            res = connector.connect(&config.url) => res,
            _ = &mut shutdown_rx => {
                debug!("shutdown while connecting");
                return;
            }
        };

        match attempt {
            Ok(mut transport) => {
                info!(url = %config.url, "room socket open");
                backoff.reset();
                emit(&event_tx, SessionEvent::Connected).await;

                let ended = drive(&mut transport, &hello, &mut cmd_rx, &event_tx, &mut shutdown_rx).await;
                match ended {
                    Ended::Shutdown => {
                        if let Err(e) = transport.close().await {
                            debug!(error = %e, "error closing room socket");
                        }
                        emit(&event_tx, SessionEvent::Disconnected { reason: None }).await;
                        return;
                    }
                    Ended::Closed(reason) => {
                        warn!(?reason, "room socket closed");
                        emit(&event_tx, SessionEvent::Disconnected { reason }).await;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "room socket connect failed");
                emit(&event_tx, SessionEvent::Disconnected { reason: Some(e.to_string()) }).await;
            }
        }

        let Some(delay) = backoff.next_delay() else {
            warn!(retries = backoff.attempts(), "giving up on room socket");
            emit(&event_tx, SessionEvent::GaveUp).await;
            return;
        };
        info!(attempt = backoff.attempts(), ?delay, "reconnecting");
        emit(&event_tx, SessionEvent::RetryScheduled { attempt: backoff.attempts(), delay }).await;

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                _ = &mut shutdown_rx => {
                    debug!("shutdown during backoff");
                    return;
                }
                cmd = cmd_rx.recv() => match cmd {
                    Some(msg) => warn!(?msg, "not connected, dropping message"),
                    None => return,
                },
            }
        }
    }
}

/// Pumps one open transport until it closes or the session is shut down.
async fn drive<T: Transport>(
    transport: &mut T,
    hello: &ClientMessage,
    cmd_rx: &mut mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: &mpsc::Sender<SessionEvent>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> Ended {
    if let Err(e) = send_message(transport, hello).await {
        error!(error = %e, "failed to send resume request");
        return Ended::Closed(Some(e.to_string()));
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(msg) => {
                    if let Err(e) = send_message(transport, &msg).await {
                        error!(error = %e, "room socket send failed");
                        return Ended::Closed(Some(e.to_string()));
                    }
                }
                None => {
                    debug!("command channel closed");
                    return Ended::Shutdown;
                }
            },

            _ = &mut *shutdown_rx => return Ended::Shutdown,

            incoming = transport.recv() => match incoming {
                Some(Ok(text)) => match protocol::decode(&text) {
                    Ok(event) => {
                        debug!(?event, "server message");
                        emit(event_tx, SessionEvent::Message(event)).await;
                    }
                    Err(e) => warn!(error = %e, raw = %text, "dropping malformed server message"),
                },
                Some(Err(e)) => {
                    error!(error = %e, "room socket receive failed");
                    return Ended::Closed(Some(e.to_string()));
                }
                None => return Ended::Closed(None),
            },
        }
    }
}

async fn send_message<T: Transport>(transport: &mut T, message: &ClientMessage) -> Result<()> {
    let json = message.to_json()?;
    debug!(%json, "sending");
    transport.send(json).await
}

async fn emit(event_tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("session event receiver dropped");
    }
}

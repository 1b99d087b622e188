//! Bayeux-style realtime subscriptions over HTTP long polling.
//!
//! Talks to the platform's `/cep/realtime` endpoint: one handshake to
//! obtain a `clientId`, one subscribe per channel, then an unbounded
//! sequential connect loop that holds a poll open until the server has
//! data. Decoded payloads are fanned out through a
//! [`tokio::sync::broadcast`] channel.
//!
//! Loop semantics:
//! - handshake/subscribe failures abort the chain and surface to the
//!   caller before any background task is spawned;
//! - a failure inside the steady-state connect loop is logged and ends
//!   the loop without restart — observable through [`SubscriptionState`];
//! - the stop flag is checked between iterations only; an in-flight
//!   poll is never interrupted.
//!
//! # Example
//!
//! ```rust,ignore
//! use cumulo_api::realtime::{RealtimeHandle, RealtimeSession};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let session = RealtimeSession::from_api_client(&client)?;
//! let handle = RealtimeHandle::start(
//!     session,
//!     &["/alarms/*".into(), "/operations/*".into()],
//!     cancel.clone(),
//! )
//! .await?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(msg) = rx.recv().await {
//!     println!("{}: {:?}", msg.channel, msg.action);
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;

use futures_util::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::ApiClient;
use crate::error::Error;

// ── Constants ────────────────────────────────────────────────────────

const REALTIME_PATH: &str = "cep/realtime";
const MESSAGE_CHANNEL_CAPACITY: usize = 1024;

// ── Wire types ───────────────────────────────────────────────────────

/// One element of the array-wrapped Bayeux response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BayeuxReply {
    channel: String,
    #[serde(default)]
    successful: Option<bool>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// A decoded realtime notification.
///
/// `data` is the notification body as sent by the platform; for
/// inventory/alarm/event/operation channels it has the shape
/// `{"realtimeAction": "UPDATE", "data": { …resource… }}` which is
/// pre-split into [`action`](Self::action) and [`body`](Self::body).
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    /// Channel the notification arrived on, e.g. `"/alarms/4201"`.
    pub channel: String,
    /// `CREATE`, `UPDATE`, or `DELETE` when the payload carries one.
    pub action: Option<String>,
    /// The resource body (or the whole payload when it has no
    /// `realtimeAction` wrapper).
    pub body: Value,
}

impl RealtimeMessage {
    fn from_reply(channel: String, data: Value) -> Self {
        let action = data
            .get("realtimeAction")
            .and_then(Value::as_str)
            .map(String::from);
        let body = match data.get("data") {
            Some(inner) if action.is_some() => inner.clone(),
            _ => data,
        };
        Self {
            channel,
            action,
            body,
        }
    }
}

// ── Subscription state ───────────────────────────────────────────────

/// Lifecycle of a realtime subscription, published via `watch`.
///
/// A connect-loop failure lands in `Stopped { error: true }` — the loop
/// does not restart, but its death is observable so a consumer can
/// resubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    Handshaking,
    Subscribing,
    Connected,
    Stopped { error: bool },
}

// ── Session ──────────────────────────────────────────────────────────

/// The `/meta/*` call sequence against one realtime endpoint.
///
/// Owns the cached `clientId`: set by a successful handshake, cleared
/// again when a handshake fails.
pub struct RealtimeSession {
    http: reqwest::Client,
    endpoint: Url,
    client_id: Option<String>,
}

impl RealtimeSession {
    /// Build a session re-using the REST client's connection pool and
    /// auth headers.
    ///
    /// Note the REST client carries a request timeout; sessions built
    /// this way are fine for tests and short polls, but production use
    /// should pass a client from
    /// [`TransportConfig::build_long_poll_client`](crate::transport::TransportConfig::build_long_poll_client)
    /// via [`with_client`](Self::with_client).
    pub fn from_api_client(api: &ApiClient) -> Result<Self, Error> {
        Self::with_client(api.http().clone(), api.base_url())
    }

    /// Build a session from an explicit HTTP client.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Result<Self, Error> {
        let endpoint = base_url.join(REALTIME_PATH)?;
        Ok(Self {
            http,
            endpoint,
            client_id: None,
        })
    }

    /// The cached client ID, if the last handshake succeeded.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Perform the `/meta/handshake` exchange and cache the `clientId`.
    pub async fn handshake(&mut self) -> Result<(), Error> {
        self.client_id = None;

        let body = json!([{
            "channel": "/meta/handshake",
            "version": "1.0",
            "minimumVersion": "1.0",
            "supportedConnectionTypes": ["long-polling"],
        }]);

        let replies = self.exchange("handshake", &body).await?;
        let reply = find_reply(&replies, "/meta/handshake", "handshake")?;

        if reply.successful == Some(true) {
            match reply.client_id.clone() {
                Some(id) => {
                    tracing::debug!(client_id = %id, "realtime handshake complete");
                    self.client_id = Some(id);
                    Ok(())
                }
                None => Err(Error::Realtime {
                    phase: "handshake",
                    message: "successful reply without clientId".into(),
                }),
            }
        } else {
            Err(Error::Realtime {
                phase: "handshake",
                message: reply
                    .error
                    .clone()
                    .unwrap_or_else(|| "rejected by server".into()),
            })
        }
    }

    /// Subscribe the handshaked client to one channel.
    pub async fn subscribe(&self, subscription: &str) -> Result<(), Error> {
        let client_id = self.require_client_id("subscribe")?;

        let body = json!([{
            "channel": "/meta/subscribe",
            "clientId": client_id,
            "subscription": subscription,
        }]);

        let replies = self.exchange("subscribe", &body).await?;
        let reply = find_reply(&replies, "/meta/subscribe", "subscribe")?;

        if reply.successful == Some(true) {
            tracing::debug!(subscription, "realtime subscription active");
            Ok(())
        } else {
            Err(Error::Realtime {
                phase: "subscribe",
                message: reply
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("subscription to {subscription} rejected")),
            })
        }
    }

    /// Issue one `/meta/connect` poll and decode the payloads it
    /// returned (possibly none).
    pub async fn connect_once(&self) -> Result<Vec<RealtimeMessage>, Error> {
        let client_id = self.require_client_id("connect")?;

        let body = json!([{
            "channel": "/meta/connect",
            "clientId": client_id,
            "connectionType": "long-polling",
        }]);

        let replies = self.exchange("connect", &body).await?;

        // The reply array mixes the /meta/connect ack with any queued
        // notifications; only elements carrying data become messages.
        Ok(replies
            .into_iter()
            .filter(|r| !r.channel.starts_with("/meta/"))
            .filter_map(|r| r.data.map(|d| RealtimeMessage::from_reply(r.channel, d)))
            .collect())
    }

    fn require_client_id(&self, phase: &'static str) -> Result<&str, Error> {
        self.client_id.as_deref().ok_or_else(|| Error::Realtime {
            phase,
            message: "no clientId — handshake first".into(),
        })
    }

    async fn exchange(&self, phase: &'static str, body: &Value) -> Result<Vec<BayeuxReply>, Error> {
        tracing::debug!(phase, url = %self.endpoint, "POST realtime");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Realtime {
                phase,
                message: format!("HTTP {status}: {raw}"),
            });
        }

        serde_json::from_str(&raw).map_err(|e| Error::Deserialization {
            message: format!("{phase}: {e}"),
            body: raw,
        })
    }
}

fn find_reply<'a>(
    replies: &'a [BayeuxReply],
    channel: &str,
    phase: &'static str,
) -> Result<&'a BayeuxReply, Error> {
    replies
        .iter()
        .find(|r| r.channel == channel)
        .ok_or_else(|| Error::Realtime {
            phase,
            message: format!("no {channel} reply in response"),
        })
}

// ── RealtimeHandle ───────────────────────────────────────────────────

/// Handle to a running realtime subscription.
///
/// Obtain receivers via [`subscribe`](Self::subscribe) and
/// [`state`](Self::state); call [`shutdown`](Self::shutdown) to stop
/// the loop after its current poll returns.
#[derive(Debug)]
pub struct RealtimeHandle {
    message_rx: broadcast::Receiver<Arc<RealtimeMessage>>,
    state_rx: watch::Receiver<SubscriptionState>,
    cancel: CancellationToken,
}

impl RealtimeHandle {
    /// Handshake, subscribe to every channel in `subscriptions`, then
    /// spawn the connect loop.
    ///
    /// Any handshake or subscribe failure is returned here — nothing is
    /// spawned until the chain is fully established.
    pub async fn start(
        mut session: RealtimeSession,
        subscriptions: &[String],
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let (state_tx, state_rx) = watch::channel(SubscriptionState::Handshaking);
        let (message_tx, message_rx) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        session.handshake().await?;

        let _ = state_tx.send(SubscriptionState::Subscribing);
        for subscription in subscriptions {
            session.subscribe(subscription).await?;
        }

        let _ = state_tx.send(SubscriptionState::Connected);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            connect_loop(session, &message_tx, &state_tx, &task_cancel).await;
        });

        Ok(Self {
            message_rx,
            state_rx,
            cancel,
        })
    }

    /// Get a new broadcast receiver for the message stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer
    /// falls behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RealtimeMessage>> {
        self.message_rx.resubscribe()
    }

    /// Observe the subscription lifecycle.
    pub fn state(&self) -> watch::Receiver<SubscriptionState> {
        self.state_rx.clone()
    }

    /// Convenience: the message stream as a `futures` Stream.
    /// Lagged gaps are skipped silently.
    pub fn message_stream(&self) -> impl Stream<Item = Arc<RealtimeMessage>> + use<> {
        let mut rx = self.subscribe();
        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(msg) => yield msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "realtime stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Request the loop to stop before its next poll.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Connect loop ─────────────────────────────────────────────────────

/// Steady-state loop: poll, broadcast, repeat.
///
/// The stop flag is only honored between polls — an in-flight connect
/// call runs to completion. On error the loop terminates without
/// restart and publishes `Stopped { error: true }`.
async fn connect_loop(
    session: RealtimeSession,
    message_tx: &broadcast::Sender<Arc<RealtimeMessage>>,
    state_tx: &watch::Sender<SubscriptionState>,
    cancel: &CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("realtime loop stopped");
            let _ = state_tx.send(SubscriptionState::Stopped { error: false });
            return;
        }

        match session.connect_once().await {
            Ok(messages) => {
                for msg in messages {
                    // Ignore send errors -- just means no active subscribers right now
                    let _ = message_tx.send(Arc::new(msg));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "realtime connect failed, subscription ends");
                let _ = state_tx.send(SubscriptionState::Stopped { error: true });
                return;
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn message_splits_realtime_action_wrapper() {
        let data = json!({
            "realtimeAction": "UPDATE",
            "data": { "id": "4201", "severity": "MAJOR" }
        });

        let msg = RealtimeMessage::from_reply("/alarms/4201".into(), data);
        assert_eq!(msg.action.as_deref(), Some("UPDATE"));
        assert_eq!(msg.body["id"], "4201");
    }

    #[test]
    fn message_without_wrapper_keeps_whole_payload() {
        let data = json!({ "custom": true });

        let msg = RealtimeMessage::from_reply("/custom/channel".into(), data.clone());
        assert_eq!(msg.action, None);
        assert_eq!(msg.body, data);
    }

    #[test]
    fn find_reply_matches_channel() {
        let replies: Vec<BayeuxReply> = serde_json::from_value(json!([
            { "channel": "/meta/connect", "successful": true },
            { "channel": "/alarms/1", "data": {} }
        ]))
        .unwrap();

        assert!(find_reply(&replies, "/meta/connect", "connect").is_ok());
        assert!(find_reply(&replies, "/meta/handshake", "handshake").is_err());
    }

    #[test]
    fn handshake_reply_deserializes_client_id() {
        let replies: Vec<BayeuxReply> = serde_json::from_value(json!([{
            "channel": "/meta/handshake",
            "successful": true,
            "clientId": "5kqwmj",
            "version": "1.0"
        }]))
        .unwrap();

        assert_eq!(replies[0].client_id.as_deref(), Some("5kqwmj"));
    }
}

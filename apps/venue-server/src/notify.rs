//! Live order feed.
//!
//! Engines commit first; handlers then publish an [`OrderEvent`] here and
//! every connected floor or kitchen screen receives it as a JSON text frame.
//!
//! ```text
//! handler ──commit──► Notifier::publish ──► broadcast ──┬──► /ws client
//!                                                      ├──► /ws client
//!                                                      └──► ...
//! ```
//!
//! Publishing never fails the request: with no listeners the event is
//! dropped, and a slow listener skips what it missed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use venue_core::{Actor, OrderEvent};

use crate::error::ApiResult;
use crate::AppState;

/// Fan-out of order events to WebSocket subscribers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<OrderEvent>,
}

impl Notifier {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Notifier { tx }
    }

    pub fn publish(&self, event: OrderEvent) {
        let name = event.name();
        let order_id = event.order().order.id.clone();

        match self.tx.send(event) {
            Ok(receivers) => debug!(event = name, %order_id, receivers, "Published order event"),
            Err(_) => debug!(event = name, %order_id, "No subscribers for order event"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Browsers cannot set headers on a WebSocket handshake, so the token
/// rides in the query string.
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    token: String,
}

/// `GET /ws?token=<jwt>`
pub async fn order_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> ApiResult<Response> {
    let actor = state.jwt.actor(&params.token)?;
    let events = state.notifier.subscribe();
    Ok(ws.on_upgrade(move |socket| forward_events(socket, events, actor)))
}

async fn forward_events(socket: WebSocket, mut events: broadcast::Receiver<OrderEvent>, actor: Actor) {
    info!(staff_id = %actor.id, "Order feed subscriber connected");
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(?e, event = event.name(), "Failed to encode order event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(staff_id = %actor.id, skipped, "Order feed subscriber lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },

            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!(staff_id = %actor.id, "Order feed subscriber disconnected");
}

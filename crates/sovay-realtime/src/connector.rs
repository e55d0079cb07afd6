//! The transport seam: dialing a socket and pumping frames.
//!
//! The connection task talks to the wire through [`Connector`], which
//! yields a pair of channels per established socket. Production code uses
//! [`WsConnector`] (`tokio-tungstenite`); tests substitute a scripted
//! connector to simulate opens, closes and frames deterministically.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::RealtimeError;

/// What the read side of a socket surfaces to the connection task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound text frame.
    Frame(String),
    /// The socket reported an error. Cleanup waits for [`Self::Closed`].
    Error(String),
    /// The socket is gone.
    Closed,
}

/// An established socket, seen as a channel pair.
///
/// Dropping both ends tears the socket down: the write pump closes the
/// sink when the outbound sender goes away.
pub struct Connection {
    /// Serialized frames to transmit.
    pub outbound: mpsc::Sender<String>,
    /// Inbound frames and lifecycle events.
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// Dials a socket URL and returns the connected channel pair.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Connection, RealtimeError>;
}

/// Production connector over `tokio-tungstenite`.
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Connection, RealtimeError> {
        let (ws, _response) =
            connect_async(url)
                .await
                .map_err(|e| RealtimeError::Connect {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })?;
        let (mut ws_tx, mut ws_rx) = ws.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(64);
        let (inbound_tx, inbound_rx) = mpsc::channel::<TransportEvent>(64);

        // Write pump: drains the outbound queue into the sink, closing the
        // socket when the queue's sender side is dropped.
        let _ = tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
            debug!("socket write pump finished");
        });

        // Read pump: forwards text frames; protocol ping/pong is handled
        // by tungstenite itself.
        let _ = tokio::spawn(async move {
            while let Some(result) = ws_rx.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        if inbound_tx
                            .send(TransportEvent::Frame(text.to_string()))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = inbound_tx.send(TransportEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
            let _ = inbound_tx.send(TransportEvent::Closed).await;
            debug!("socket read pump finished");
        });

        Ok(Connection {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

//! WebSocket transport
//!
//! One task per connection attempt. The task owns the socket; the session
//! only ever sees [`ConnectionEvent`]s and a frame sender.

use crate::runtime::{ConnectionEvent, Connector};
use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn connect(
        &self,
        endpoint: &str,
        generation: u64,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> JoinHandle<()> {
        let endpoint = endpoint.to_string();
        tokio::spawn(async move {
            match run_connection(&endpoint, generation, &events).await {
                Ok(()) => tracing::debug!("Connection {} finished", generation),
                Err(e) => tracing::debug!("Connection {} ended: {:#}", generation, e),
            }
            let _ = events.send(ConnectionEvent::Closed { generation });
        })
    }
}

async fn run_connection(
    endpoint: &str,
    generation: u64,
    events: &mpsc::UnboundedSender<ConnectionEvent>,
) -> Result<()> {
    let (ws_stream, _) = connect_async(endpoint)
        .await
        .with_context(|| format!("Failed to connect to {endpoint}"))?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if events
        .send(ConnectionEvent::Opened {
            generation,
            sender: tx,
        })
        .is_err()
    {
        return Ok(());
    }

    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => {
                    ws_tx
                        .send(Message::Text(frame.into()))
                        .await
                        .context("Failed to write frame")?;
                }
                None => {
                    // Session closed the channel; everything queued is written
                    let _ = ws_tx.close().await;
                    break;
                }
            },
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let event = ConnectionEvent::Frame {
                        generation,
                        text: text.to_string(),
                    };
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("Service closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("WebSocket error"),
            },
        }
    }

    Ok(())
}

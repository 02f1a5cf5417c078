use crate::domain::{
    IngestionPipeline, OutboundMessage, SubscriberConfig, TransportError, TransportResult,
};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Run the gateway subscriber until the shutdown token is cancelled.
///
/// Each failed or closed session moves the pipeline back to
/// `Disconnected`, waits the fixed reconnect delay and tries again. There is
/// no attempt limit. The pipeline is returned in the `Stopped` state.
#[instrument(
    name = "websocket_subscriber",
    skip_all,
    fields(websocket_url = %config.websocket_url)
)]
pub async fn run_websocket_subscriber(
    mut pipeline: IngestionPipeline,
    config: SubscriberConfig,
    shutdown_token: CancellationToken,
) -> IngestionPipeline {
    info!(
        websocket_url = %config.websocket_url,
        reconnect_delay_secs = config.reconnect_delay_secs,
        "starting WebSocket subscriber"
    );

    let mut attempt: u64 = 0;

    loop {
        if shutdown_token.is_cancelled() {
            debug!("WebSocket subscriber cancelled before connection");
            break;
        }

        attempt += 1;
        match run_websocket_connection(&mut pipeline, &config.websocket_url, &shutdown_token).await {
            Ok(()) => {
                debug!("WebSocket subscriber stopped cleanly");
                break;
            }
            Err(e) => {
                error!(error = %e, attempt, "WebSocket connection error");
                pipeline.on_disconnected();

                warn!(
                    delay_secs = config.reconnect_delay_secs,
                    "reconnecting to gateway"
                );

                tokio::select! {
                    _ = shutdown_token.cancelled() => break,
                    _ = tokio::time::sleep(config.reconnect_delay()) => {}
                }
            }
        }
    }

    pipeline.stop();
    info!(devices = pipeline.store().device_count(), "WebSocket subscriber stopped");
    pipeline
}

/// Run a single WebSocket session. Returns `Ok(())` only on cancellation;
/// any close or failure is an error so the caller reconnects.
#[instrument(name = "websocket_connection", skip_all, fields(websocket_url = %websocket_url))]
async fn run_websocket_connection(
    pipeline: &mut IngestionPipeline,
    websocket_url: &str,
    shutdown_token: &CancellationToken,
) -> TransportResult<()> {
    let connect = tokio_tungstenite::connect_async(websocket_url);
    let (stream, _response) = tokio::select! {
        _ = shutdown_token.cancelled() => return Ok(()),
        result = connect => result.map_err(|e| TransportError::Connect(e.to_string()))?,
    };

    pipeline.on_connected();
    let (mut sink, mut frames) = stream.split();

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                debug!("shutdown signal received, closing connection");
                if let Err(e) = close_sink(&mut sink).await {
                    debug!(error = %e, "failed to close WebSocket connection cleanly");
                }
                return Ok(());
            }
            frame = frames.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = pipeline.handle_text(&text) {
                            send_message(&mut sink, &reply).await?;
                            if matches!(reply, OutboundMessage::Register { .. }) {
                                info!("registered with gateway");
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(close_frame = ?frame, "gateway closed the connection");
                        return Err(TransportError::Closed);
                    }
                    Some(Ok(Message::Binary(payload))) => {
                        warn!(payload_size = payload.len(), "ignoring binary frame");
                    }
                    Some(Ok(_)) => {
                        // ping/pong handled by tungstenite
                    }
                    Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
                    None => return Err(TransportError::Closed),
                }
            }
        }
    }
}

async fn send_message<S>(sink: &mut S, message: &OutboundMessage) -> TransportResult<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = serde_json::to_string(message)?;
    sink.send(Message::Text(text))
        .await
        .map_err(|e| TransportError::Send(e.to_string()))
}

async fn close_sink<S>(sink: &mut S) -> TransportResult<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    sink.close()
        .await
        .map_err(|e| TransportError::Send(e.to_string()))
}

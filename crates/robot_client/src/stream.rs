use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use console_logging::{console_debug, console_warn};

use crate::frame::decode_frame;
use crate::{ChannelError, ChannelEvent, ChannelId, ClientEvent};

/// Something that arrived on the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Close { reason: Option<String> },
}

/// An open, receive-only stream connection.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// `None` once the transport has ended.
    async fn next_inbound(&mut self) -> Option<Result<Inbound, ChannelError>>;
    /// Deliberate close from our side.
    async fn close(&mut self);
}

#[async_trait::async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn FrameSource>, ChannelError>;
}

/// WebSocket connector; the TCP connect and the upgrade handshake share one time limit.
#[derive(Debug, Clone, Copy)]
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl TungsteniteConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait::async_trait]
impl StreamConnector for TungsteniteConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn FrameSource>, ChannelError> {
        let handshake = connect_async(url.as_str());
        let (ws, _response) = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| {
                ChannelError::Connect(format!(
                    "handshake timed out after {:?}",
                    self.connect_timeout
                ))
            })?
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        Ok(Box::new(WebSocketSource { ws }))
    }
}

struct WebSocketSource {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl FrameSource for WebSocketSource {
    async fn next_inbound(&mut self) -> Option<Result<Inbound, ChannelError>> {
        loop {
            let message = match self.ws.next().await? {
                Ok(message) => message,
                Err(err) => return Some(Err(ChannelError::Transport(err.to_string()))),
            };
            match message {
                Message::Text(text) => return Some(Ok(Inbound::Text(text))),
                Message::Close(frame) => {
                    let reason = frame
                        .map(|frame| frame.reason.to_string())
                        .filter(|reason| !reason.is_empty());
                    return Some(Ok(Inbound::Close { reason }));
                }
                // Receive-only text protocol; pings are answered by tungstenite.
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.ws.close(None).await {
            console_debug!("stream close handshake failed: {}", err);
        }
    }
}

/// Drives one channel until it ends or `cancel` fires.
///
/// Exactly one terminal event (`Closed` or `Failed`) is reported per channel
/// unless the channel is cancelled, in which case nothing further is reported.
/// The source is dropped before the terminal event is sent.
pub(crate) async fn run_channel(
    connector: Arc<dyn StreamConnector>,
    url: Url,
    channel: ChannelId,
    cancel: CancellationToken,
    events: UnboundedSender<ClientEvent>,
) {
    let report = |event: ChannelEvent| {
        let _ = events.send(ClientEvent::Channel { channel, event });
    };

    let connected = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = connector.connect(&url) => result,
    };
    let mut source = match connected {
        Ok(source) => source,
        Err(err) => {
            console_warn!("channel {} failed to connect to {}: {}", channel, url, err);
            report(ChannelEvent::Failed(err));
            return;
        }
    };
    report(ChannelEvent::Opened);

    let terminal = loop {
        let inbound = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                source.close().await;
                console_debug!("channel {} closed on request", channel);
                return;
            }
            inbound = source.next_inbound() => inbound,
        };
        match inbound {
            Some(Ok(Inbound::Text(text))) => match decode_frame(&text) {
                Ok(frame) => report(ChannelEvent::Frame(frame)),
                Err(err) => {
                    console_warn!("channel {} rejected frame: {}", channel, err);
                    report(ChannelEvent::Rejected(err));
                }
            },
            Some(Ok(Inbound::Close { reason })) => break ChannelEvent::Closed { reason },
            Some(Err(err)) => break ChannelEvent::Failed(err),
            None => break ChannelEvent::Closed { reason: None },
        }
    };

    drop(source);
    report(terminal);
}

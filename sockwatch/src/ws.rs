//! Socket.IO client over one WebSocket connection to the collector.
//!
//! The client never reads in the background: the UI loop calls [`SocketClient::pump`]
//! to take one frame, which answers pings and dispatches events into the
//! [`EventBus`] on the caller's task.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, Connector, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::bus::{EventBus, HandlerId};
use crate::protocol::{EnginePacket, ProtocolError, SocketPacket};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid collector url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("tls: {0}")]
    Tls(String),
    #[error("reading {path}: {source}")]
    CaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("collector refused namespace {namespace}: {message}")]
    Refused { namespace: String, message: String },
    #[error("connection closed during handshake")]
    ClosedDuringHandshake,
    #[error("not connected")]
    NotConnected,
}

/// What one call to [`SocketClient::pump`] consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pumped {
    /// A named event, and how many handlers it reached.
    Event { name: String, handlers: usize },
    /// Protocol housekeeping (ping, noop, ignored packet types).
    Control,
    Disconnected,
}

/// One frame as read off the socket, before any reply is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    /// Binary or websocket-level ping/pong.
    Skipped,
    Closed,
}

/// Turn a collector base URL into its Engine.IO WebSocket endpoint.
///
/// `http://host:5000` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
/// Existing query pairs (e.g. auth tokens) are kept.
pub fn endpoint_url(base: &str) -> Result<Url, TransportError> {
    let invalid = |reason: &str| TransportError::InvalidUrl {
        url: base.to_string(),
        reason: reason.to_string(),
    };
    let mut url = Url::parse(base).map_err(|e| invalid(&e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("scheme must be http, https, ws or wss")),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid("cannot switch to a websocket scheme"))?;
    if !url.path().contains("/socket.io") {
        let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
        url.set_path(&path);
    }
    let keep: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "EIO" && k != "transport")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(keep)
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");
    Ok(url)
}

pub struct SocketClient {
    endpoint: Url,
    tls_ca: Option<PathBuf>,
    stream: Option<WsStream>,
    sid: Option<String>,
    bus: EventBus,
}

impl SocketClient {
    pub fn new(base_url: &str, tls_ca: Option<&Path>) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: endpoint_url(base_url)?,
            tls_ca: tls_ca.map(Path::to_path_buf),
            stream: None,
            sid: None,
            bus: EventBus::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Handle shared with subscriptions; handlers registered here receive every event.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: FnMut(&Value) + Send + 'static,
    {
        self.bus.on(event, handler)
    }

    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        self.bus.off(event, id)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    /// Open the socket and join the default namespace. No-op when already connected.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let mut ws = open_socket(&self.endpoint, self.tls_ca.as_deref()).await?;
        let sid = handshake(&mut ws).await?;
        info!(endpoint = %self.endpoint, sid = %sid, "connected to collector");
        self.stream = Some(ws);
        self.sid = Some(sid);
        Ok(())
    }

    /// Wait for the next frame and act on it.
    pub async fn pump(&mut self) -> Result<Pumped, TransportError> {
        let frame = self.next_frame().await?;
        self.process(frame).await
    }

    /// Read one frame without replying to it. Dropping this future loses
    /// nothing, so it is the part to put under a timeout.
    pub async fn next_frame(&mut self) -> Result<Frame, TransportError> {
        let ws = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        match ws.next().await {
            Some(Ok(Message::Text(t))) => Ok(Frame::Text(t.to_string())),
            Some(Ok(Message::Close(_))) | None => Ok(Frame::Closed),
            Some(Ok(_)) => Ok(Frame::Skipped),
            Some(Err(e)) => {
                self.drop_stream("transport error");
                Err(e.into())
            }
        }
    }

    /// Act on a frame from [`SocketClient::next_frame`]: answer pings, dispatch
    /// events, record disconnects.
    pub async fn process(&mut self, frame: Frame) -> Result<Pumped, TransportError> {
        match frame {
            Frame::Text(t) => self.handle_frame(&t).await,
            Frame::Skipped => Ok(Pumped::Control),
            Frame::Closed => {
                self.drop_stream("closed by collector");
                Ok(Pumped::Disconnected)
            }
        }
    }

    async fn handle_frame(&mut self, frame: &str) -> Result<Pumped, TransportError> {
        let packet = match EnginePacket::decode(frame) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "skipping malformed frame");
                return Ok(Pumped::Control);
            }
        };
        match packet {
            EnginePacket::Ping(p) => {
                self.send(EnginePacket::Pong(p)).await?;
                Ok(Pumped::Control)
            }
            EnginePacket::Close => {
                self.drop_stream("engine closed");
                Ok(Pumped::Disconnected)
            }
            EnginePacket::Message(SocketPacket::Event { name, payload, .. }) => {
                let handlers = self.bus.dispatch(&name, &payload);
                debug!(event = %name, handlers, "dispatched");
                Ok(Pumped::Event { name, handlers })
            }
            EnginePacket::Message(SocketPacket::Disconnect { .. }) => {
                self.drop_stream("namespace disconnected");
                Ok(Pumped::Disconnected)
            }
            EnginePacket::Message(SocketPacket::ConnectError { namespace, message }) => {
                warn!(%namespace, %message, "collector rejected namespace");
                self.drop_stream("namespace rejected");
                Ok(Pumped::Disconnected)
            }
            _ => Ok(Pumped::Control),
        }
    }

    async fn send(&mut self, packet: EnginePacket) -> Result<(), TransportError> {
        let ws = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        ws.send(Message::Text(packet.encode().into())).await?;
        Ok(())
    }

    /// Leave the namespace and close the socket. No-op when not connected.
    pub async fn disconnect(&mut self) -> Result<(), TransportError> {
        let Some(mut ws) = self.stream.take() else {
            return Ok(());
        };
        self.sid = None;
        let bye = EnginePacket::Message(SocketPacket::disconnect()).encode();
        let sent = ws.send(Message::Text(bye.into())).await;
        let closed = ws.close(None).await;
        info!(endpoint = %self.endpoint, "disconnected from collector");
        sent?;
        match closed {
            Ok(()) | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn drop_stream(&mut self, reason: &str) {
        if self.stream.take().is_some() {
            self.sid = None;
            info!(endpoint = %self.endpoint, reason, "disconnected from collector");
        }
    }
}

async fn open_socket(endpoint: &Url, tls_ca: Option<&Path>) -> Result<WsStream, TransportError> {
    let connector = match tls_ca {
        Some(path) if endpoint.scheme() == "wss" => {
            Some(Connector::Rustls(Arc::new(rustls_config(path)?)))
        }
        _ => None,
    };
    let (ws, _) = connect_async_tls_with_config(endpoint.as_str(), None, false, connector).await?;
    Ok(ws)
}

fn rustls_config(path: &Path) -> Result<rustls::ClientConfig, TransportError> {
    let file = File::open(path).map_err(|source| TransportError::CaFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(|source| TransportError::CaFile {
            path: path.to_path_buf(),
            source,
        })?;
        roots
            .add(cert)
            .map_err(|e| TransportError::Tls(e.to_string()))?;
    }
    if roots.is_empty() {
        return Err(TransportError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}

// Engine.IO open -> Socket.IO connect -> connect ack. Returns the namespace sid.
async fn handshake(ws: &mut WsStream) -> Result<String, TransportError> {
    let mut opened = false;
    loop {
        let frame = match ws.next().await {
            Some(Ok(Message::Text(t))) => t,
            Some(Ok(Message::Close(_))) | None => return Err(TransportError::ClosedDuringHandshake),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        };
        match EnginePacket::decode(&frame)? {
            EnginePacket::Open(h) => {
                debug!(sid = %h.sid, ping_interval = h.ping_interval, "engine.io open");
                let join = EnginePacket::Message(SocketPacket::connect()).encode();
                ws.send(Message::Text(join.into())).await?;
                opened = true;
            }
            EnginePacket::Ping(p) => {
                ws.send(Message::Text(EnginePacket::Pong(p).encode().into()))
                    .await?;
            }
            EnginePacket::Message(SocketPacket::Connect { data, .. }) if opened => {
                let sid = data
                    .as_ref()
                    .and_then(|d| d.get("sid"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Ok(sid);
            }
            EnginePacket::Message(SocketPacket::ConnectError { namespace, message }) => {
                return Err(TransportError::Refused { namespace, message });
            }
            EnginePacket::Close => return Err(TransportError::ClosedDuringHandshake),
            _ => {}
        }
    }
}

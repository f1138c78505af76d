//! Engine.IO v4 / Socket.IO v5 text framing, as carried in WebSocket text messages.
//!
//! Only what a read-only subscriber needs: the open handshake, ping/pong,
//! namespace connect/disconnect and named events. Binary packets decode to a
//! marker so the caller can skip them.

use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("unknown engine.io packet type {0:?}")]
    UnknownEnginePacket(char),
    #[error("unknown socket.io packet type {0:?}")]
    UnknownSocketPacket(char),
    #[error("malformed handshake: {0}")]
    Handshake(String),
    #[error("malformed socket.io payload: {0}")]
    Payload(String),
}

/// Body of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack: Option<u64>,
        name: String,
        /// First argument after the event name; `Null` when the server sent none.
        payload: Value,
    },
    Ack {
        namespace: String,
        ack: u64,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
    Binary,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();
        match kind {
            '0' => serde_json::from_str::<Handshake>(body)
                .map(EnginePacket::Open)
                .map_err(|e| ProtocolError::Handshake(e.to_string())),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => SocketPacket::decode(body).map(EnginePacket::Message),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(ProtocolError::UnknownEnginePacket(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            // servers never expect an open from the client; encode the sid for completeness
            EnginePacket::Open(h) => format!("0{{\"sid\":{}}}", Value::String(h.sid.clone())),
            EnginePacket::Close => "1".into(),
            EnginePacket::Ping(p) => format!("2{p}"),
            EnginePacket::Pong(p) => format!("3{p}"),
            EnginePacket::Message(m) => format!("4{}", m.encode()),
            EnginePacket::Upgrade => "5".into(),
            EnginePacket::Noop => "6".into(),
        }
    }
}

impl SocketPacket {
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.into(),
            data: None,
        }
    }

    pub fn disconnect() -> Self {
        SocketPacket::Disconnect {
            namespace: DEFAULT_NAMESPACE.into(),
        }
    }

    pub fn decode(body: &str) -> Result<Self, ProtocolError> {
        let mut chars = body.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Ok(SocketPacket::Binary);
        }

        let (namespace, rest) = split_namespace(rest);
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack = if digits > 0 {
            rest[..digits].parse::<u64>().ok()
        } else {
            None
        };
        let data = &rest[digits..];

        match kind {
            '0' => Ok(SocketPacket::Connect {
                namespace,
                data: parse_optional(data)?,
            }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let (name, payload) = parse_event(data)?;
                Ok(SocketPacket::Event {
                    namespace,
                    ack,
                    name,
                    payload,
                })
            }
            '3' => Ok(SocketPacket::Ack {
                namespace,
                ack: ack.ok_or_else(|| ProtocolError::Payload("ack without id".into()))?,
            }),
            '4' => {
                let message = match parse_optional(data)? {
                    Some(Value::String(s)) => s,
                    Some(Value::Object(map)) => map
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("connection refused")
                        .to_string(),
                    _ => "connection refused".to_string(),
                };
                Ok(SocketPacket::ConnectError { namespace, message })
            }
            other => Err(ProtocolError::UnknownSocketPacket(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            SocketPacket::Connect { namespace, data } => {
                let mut s = format!("0{}", namespace_prefix(namespace));
                if let Some(d) = data {
                    s.push_str(&d.to_string());
                }
                s
            }
            SocketPacket::Disconnect { namespace } => format!("1{}", namespace_prefix(namespace)),
            SocketPacket::Event {
                namespace,
                ack,
                name,
                payload,
            } => {
                let args = Value::Array(vec![Value::String(name.clone()), payload.clone()]);
                let ack = ack.map(|a| a.to_string()).unwrap_or_default();
                format!("2{}{ack}{args}", namespace_prefix(namespace))
            }
            SocketPacket::Ack { namespace, ack } => format!("3{}{ack}[]", namespace_prefix(namespace)),
            SocketPacket::ConnectError { namespace, message } => {
                let body = serde_json::json!({ "message": message });
                format!("4{}{body}", namespace_prefix(namespace))
            }
            SocketPacket::Binary => "5".into(),
        }
    }
}

// "/admin,..." -> ("/admin", "...")
fn split_namespace(rest: &str) -> (String, &str) {
    if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((ns, tail)) => (ns.to_string(), tail),
            None => (rest.to_string(), ""),
        }
    } else {
        (DEFAULT_NAMESPACE.to_string(), rest)
    }
}

fn namespace_prefix(ns: &str) -> String {
    if ns == DEFAULT_NAMESPACE || ns.is_empty() {
        String::new()
    } else {
        format!("{ns},")
    }
}

fn parse_optional(data: &str) -> Result<Option<Value>, ProtocolError> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| ProtocolError::Payload(e.to_string()))
}

fn parse_event(data: &str) -> Result<(String, Value), ProtocolError> {
    let args = match parse_optional(data)? {
        Some(Value::Array(args)) => args,
        _ => return Err(ProtocolError::Payload("event is not an array".into())),
    };
    let mut it = args.into_iter();
    let name = match it.next() {
        Some(Value::String(name)) => name,
        _ => return Err(ProtocolError::Payload("event name missing".into())),
    };
    Ok((name, it.next().unwrap_or(Value::Null)))
}

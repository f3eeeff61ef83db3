use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub type ChannelId = u64;
pub type TimerId = u64;

/// A registered click target as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTarget {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StatusRecord {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub clicks_made: u64,
    #[serde(default)]
    pub current_proxy: Option<String>,
    #[serde(default)]
    pub last_click_time: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Body of `POST /api/robot/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSettings {
    pub interval_seconds: u32,
    pub max_clicks: Option<u32>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One text frame of `/ws/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamFrame {
    pub message: String,
    pub level: FrameLevel,
    pub timestamp: String,
    pub clicks_made: u64,
    #[serde(default)]
    pub current_proxy: Option<String>,
}

/// What the stream task reports about its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Frame(StreamFrame),
    Rejected(FrameError),
    Closed { reason: Option<String> },
    Failed(ChannelError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    TargetsLoaded(Result<Vec<TargetRecord>, ApiError>),
    StatusLoaded(Result<StatusRecord, ApiError>),
    TargetCreated(Result<TargetRecord, ApiError>),
    TargetDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    /// Outcome of the start request alone; the status read that follows arrives as `StatusLoaded`.
    WorkerStarted(Result<(), ApiError>),
    WorkerStopped(Result<(), ApiError>),
    Channel {
        channel: ChannelId,
        event: ChannelEvent,
    },
    ReconnectDue {
        timer: TimerId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("{detail} (HTTP {status})")]
    Rejected { status: u16, detail: String },
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    Syntax(String),
    #[error("unexpected event shape: {0}")]
    Shape(String),
}

/// Target ids are uuid strings on the reference backend; numeric ids are
/// accepted too and stringified.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

impl fmt::Display for FrameLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameLevel::Info => write!(f, "info"),
            FrameLevel::Success => write!(f, "success"),
            FrameLevel::Warning => write!(f, "warning"),
            FrameLevel::Error => write!(f, "error"),
        }
    }
}

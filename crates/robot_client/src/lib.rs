//! Robot client: control API, log stream transport and effect execution.
mod api;
mod client;
mod frame;
mod stream;
mod types;

pub use api::{stream_url, ApiSettings, ControlApi, ReqwestControlApi};
pub use client::ClientHandle;
pub use frame::decode_frame;
pub use stream::{FrameSource, Inbound, StreamConnector, TungsteniteConnector};
pub use types::{
    ApiError, ChannelError, ChannelEvent, ChannelId, ClientEvent, FrameError, FrameLevel,
    NewTarget, RunSettings, StatusRecord, StreamFrame, TargetRecord, TimerId,
};

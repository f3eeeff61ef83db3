use crate::{ChannelId, StreamEvent, Target, TargetId, TimerId, WorkerStatus};

/// Request failures reach the core as display text only.
pub type Failure = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Console came up: load targets and status, open the stream.
    Boot,
    /// Operator closed the console.
    ShutdownRequested,

    /// Target list fetched.
    TargetsLoaded(Result<Vec<Target>, Failure>),
    /// Worker status fetched.
    StatusLoaded(Result<WorkerStatus, Failure>),

    IntervalChanged(u32),
    MaxClicksChanged(Option<u32>),
    EnabledChanged(bool),
    TargetUrlChanged(String),
    TargetNameChanged(String),
    PromptDismissed,

    AddTargetClicked,
    TargetCreated(Result<Target, Failure>),
    RemoveTargetClicked(TargetId),
    TargetRemoved {
        id: TargetId,
        result: Result<(), Failure>,
    },
    StartClicked,
    /// Start acknowledged; carries the status fetched right after.
    WorkerStarted(Result<(), Failure>),
    StopClicked,
    WorkerStopped(Result<(), Failure>),
    ClearLogsClicked,

    ChannelOpened {
        channel: ChannelId,
    },
    /// Remote side closed the stream or it ended.
    ChannelClosed {
        channel: ChannelId,
        reason: Option<String>,
    },
    /// Connecting failed or the transport errored.
    ChannelFailed {
        channel: ChannelId,
        error: String,
    },
    EventReceived {
        channel: ChannelId,
        event: StreamEvent,
    },
    /// A frame that did not decode as a stream event.
    FrameRejected {
        channel: ChannelId,
        error: String,
    },
    ReconnectDue {
        timer: TimerId,
    },

    /// Fallback for input that maps to nothing.
    NoOp,
}

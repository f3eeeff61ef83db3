use std::time::Duration;

use crate::{ChannelId, RunConfig, TargetId, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchTargets,
    FetchStatus,
    CreateTarget { url: String, name: String },
    DeleteTarget { id: TargetId },
    /// Start the worker, then fetch the status it reports.
    StartWorker { config: RunConfig },
    /// Stop the worker, then fetch the status it reports.
    StopWorker,
    OpenChannel { channel: ChannelId },
    CloseChannel { channel: ChannelId },
    ScheduleReconnect { timer: TimerId, delay: Duration },
    CancelReconnect { timer: TimerId },
}

use crate::{ConnectionState, LogEntry, RunConfig, Target, TargetDraft, WorkerStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub connection: ConnectionState,
    pub reconnect_pending: bool,
    pub status: WorkerStatus,
    pub targets: Vec<Target>,
    pub config: RunConfig,
    pub draft: TargetDraft,
    pub prompt: Option<String>,
    /// Oldest first.
    pub logs: Vec<LogEntry>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }
}

use crate::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerStatus {
    pub is_running: bool,
    pub clicks_made: u64,
    pub current_proxy: Option<String>,
    pub last_click_time: Option<String>,
    pub error_message: Option<String>,
}

/// The status fields carried by every stream event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusFragment {
    pub clicks_made: u64,
    pub current_proxy: Option<String>,
}

/// One parsed frame from the worker's event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub message: String,
    pub level: LogLevel,
    pub timestamp: String,
    pub status: StatusFragment,
}

impl WorkerStatus {
    /// Folds a stream fragment into the snapshot.
    ///
    /// Only `clicks_made` and `current_proxy` are taken from the fragment; run
    /// state, last click time and error message change through bootstrap or
    /// control acknowledgements only.
    pub fn project(&self, fragment: &StatusFragment) -> WorkerStatus {
        WorkerStatus {
            clicks_made: fragment.clicks_made,
            current_proxy: fragment.current_proxy.clone(),
            ..self.clone()
        }
    }
}

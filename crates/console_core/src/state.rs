use std::time::Duration;

use chrono::{SecondsFormat, Utc};

use crate::view_model::AppViewModel;
use crate::{
    ChannelMachine, ConnectionState, LogId, LogLedger, LogLevel, Prompt, RunConfig, StreamEvent,
    TargetDraft, WorkerStatus,
};

pub type TargetId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
    pub url: String,
    pub name: String,
}

/// Source of timestamps for entries the console synthesizes itself.
#[derive(Debug, Clone, Copy)]
pub struct Clock(fn() -> String);

impl Clock {
    pub fn system() -> Self {
        Self(system_now)
    }

    pub fn fixed(now: fn() -> String) -> Self {
        Self(now)
    }

    pub fn now(&self) -> String {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

fn system_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Everything the console knows. Mutated only through [`crate::update`].
#[derive(Debug, Clone, Default)]
pub struct AppState {
    targets: Vec<Target>,
    status: WorkerStatus,
    ledger: LogLedger,
    channel: ChannelMachine,
    config: RunConfig,
    draft: TargetDraft,
    prompt: Option<Prompt>,
    dirty: bool,
    clock: Clock,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.channel = ChannelMachine::with_delay(delay);
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            connection: self.channel.state(),
            reconnect_pending: self.channel.pending_timer().is_some(),
            status: self.status.clone(),
            targets: self.targets.clone(),
            config: self.config,
            draft: self.draft.clone(),
            prompt: self.prompt.as_ref().map(ToString::to_string),
            logs: self.ledger.entries(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn status(&self) -> &WorkerStatus {
        &self.status
    }

    pub fn ledger(&self) -> &LogLedger {
        &self.ledger
    }

    pub fn connection(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.channel.is_torn_down()
    }

    pub(crate) fn channel(&self) -> &ChannelMachine {
        &self.channel
    }

    pub(crate) fn channel_mut(&mut self) -> &mut ChannelMachine {
        &mut self.channel
    }

    pub(crate) fn reconnect_delay(&self) -> Duration {
        self.channel.reconnect_delay()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Appends a console-originated entry stamped with the current time.
    pub(crate) fn log(&mut self, level: LogLevel, message: impl Into<String>) -> LogId {
        let timestamp = self.clock.now();
        self.dirty = true;
        self.ledger.record(message, level, timestamp)
    }

    /// Appends the event to the ledger and folds its status fragment.
    pub(crate) fn apply_event(&mut self, event: StreamEvent) {
        self.status = self.status.project(&event.status);
        self.ledger.record(event.message, event.level, event.timestamp);
        self.dirty = true;
    }

    pub(crate) fn replace_status(&mut self, status: WorkerStatus) {
        self.status = status;
        self.dirty = true;
    }

    pub(crate) fn replace_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;
        self.dirty = true;
    }

    pub(crate) fn has_target(&self, id: &str) -> bool {
        self.targets.iter().any(|target| target.id == id)
    }

    pub(crate) fn clear_logs(&mut self) {
        self.ledger.clear();
        self.dirty = true;
    }

    pub(crate) fn config_mut(&mut self) -> &mut RunConfig {
        self.dirty = true;
        &mut self.config
    }

    pub(crate) fn draft(&self) -> &TargetDraft {
        &self.draft
    }

    pub(crate) fn draft_mut(&mut self) -> &mut TargetDraft {
        self.dirty = true;
        &mut self.draft
    }

    pub(crate) fn set_prompt(&mut self, prompt: Option<Prompt>) {
        if self.prompt != prompt {
            self.prompt = prompt;
            self.dirty = true;
        }
    }
}

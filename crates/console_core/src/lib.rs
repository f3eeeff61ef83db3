//! Console core: pure state machine and view-model helpers.
mod channel;
mod effect;
mod form;
mod ledger;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use channel::{
    ChannelId, ChannelMachine, ConnectionState, Loss, Teardown, TimerId, RECONNECT_DELAY,
};
pub use effect::Effect;
pub use form::{Prompt, RunConfig, TargetDraft, INTERVAL_RANGE};
pub use ledger::{LogEntry, LogId, LogLedger, LogLevel, LEDGER_CAPACITY};
pub use msg::{Failure, Msg};
pub use state::{AppState, Clock, Target, TargetId};
pub use status::{StatusFragment, StreamEvent, WorkerStatus};
pub use update::update;
pub use view_model::AppViewModel;

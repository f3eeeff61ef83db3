//! Connection lifecycle of the log stream.
//!
//! The machine only decides; opening sockets and running timers is left to
//! whoever executes the returned effects. Channels and timers carry
//! generation ids so that late notifications from a superseded channel or a
//! cancelled timer are recognised and dropped.

use std::time::Duration;

/// Delay between losing the stream and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub type ChannelId = u64;
pub type TimerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disconnected,
    Connecting(ChannelId),
    Connected(ChannelId),
}

/// Result of reporting a lost channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    /// The report concerned a channel that is no longer current.
    Stale,
    /// The current channel went away. `reconnect` is set when a new timer was
    /// armed by this call.
    Lost { reconnect: Option<TimerId> },
}

/// What a teardown requires the executor to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Teardown {
    pub close: Option<ChannelId>,
    pub cancel: Option<TimerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMachine {
    phase: Phase,
    pending_timer: Option<TimerId>,
    last_channel: ChannelId,
    last_timer: TimerId,
    torn_down: bool,
    reconnect_delay: Duration,
}

impl Default for ChannelMachine {
    fn default() -> Self {
        Self::with_delay(RECONNECT_DELAY)
    }
}

impl ChannelMachine {
    pub fn with_delay(reconnect_delay: Duration) -> Self {
        Self {
            phase: Phase::Disconnected,
            pending_timer: None,
            last_channel: 0,
            last_timer: 0,
            torn_down: false,
            reconnect_delay,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Disconnected => ConnectionState::Disconnected,
            Phase::Connecting(_) => ConnectionState::Connecting,
            Phase::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending_timer
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Starts a connection attempt if nothing is open, connecting or torn down.
    pub fn open(&mut self) -> Option<ChannelId> {
        if self.torn_down || self.phase != Phase::Disconnected {
            return None;
        }
        self.last_channel += 1;
        self.phase = Phase::Connecting(self.last_channel);
        Some(self.last_channel)
    }

    /// Returns false when `channel` is not the attempt in flight.
    pub fn on_opened(&mut self, channel: ChannelId) -> bool {
        if self.phase == Phase::Connecting(channel) {
            self.phase = Phase::Connected(channel);
            true
        } else {
            false
        }
    }

    /// Only frames from the open, current channel are accepted.
    pub fn accepts_frames_from(&self, channel: ChannelId) -> bool {
        self.phase == Phase::Connected(channel)
    }

    /// Handles close or error of `channel`, arming at most one reconnect timer.
    pub fn on_lost(&mut self, channel: ChannelId) -> Loss {
        match self.phase {
            Phase::Connecting(current) | Phase::Connected(current) if current == channel => {}
            _ => return Loss::Stale,
        }
        self.phase = Phase::Disconnected;
        Loss::Lost {
            reconnect: self.arm_timer(),
        }
    }

    /// Handles a fired timer. The decision is taken against the phase at fire
    /// time, not the phase at the moment the timer was armed.
    pub fn on_timer_fired(&mut self, timer: TimerId) -> Option<ChannelId> {
        if self.pending_timer != Some(timer) {
            return None;
        }
        self.pending_timer = None;
        self.open()
    }

    /// Moves to the terminal state. Nothing is opened or armed afterwards.
    pub fn teardown(&mut self) -> Teardown {
        if self.torn_down {
            return Teardown::default();
        }
        self.torn_down = true;
        let close = match self.phase {
            Phase::Connecting(channel) | Phase::Connected(channel) => Some(channel),
            Phase::Disconnected => None,
        };
        self.phase = Phase::Disconnected;
        Teardown {
            close,
            cancel: self.pending_timer.take(),
        }
    }

    fn arm_timer(&mut self) -> Option<TimerId> {
        if self.torn_down || self.pending_timer.is_some() {
            return None;
        }
        self.last_timer += 1;
        self.pending_timer = Some(self.last_timer);
        self.pending_timer
    }
}

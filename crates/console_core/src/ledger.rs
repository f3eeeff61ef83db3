use std::collections::VecDeque;

/// Number of entries the console keeps before evicting the oldest.
pub const LEDGER_CAPACITY: usize = 100;

pub type LogId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: LogId,
    pub message: String,
    pub level: LogLevel,
    /// ISO-8601 instant, kept verbatim as received.
    pub timestamp: String,
}

/// Bounded, arrival-ordered history of log entries.
///
/// Ids come from a counter owned by the ledger and are never reused, not even
/// across [`LogLedger::clear`], so they stay usable as rendering keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLedger {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: LogId,
}

impl Default for LogLedger {
    fn default() -> Self {
        Self::with_capacity(LEDGER_CAPACITY)
    }
}

impl LogLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Appends an entry under the next id, evicting from the head while over capacity.
    ///
    /// This is the only way in, so ids stay unique and increasing.
    pub fn record(
        &mut self,
        message: impl Into<String>,
        level: LogLevel,
        timestamp: impl Into<String>,
    ) -> LogId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(LogEntry {
            id,
            message: message.into(),
            level,
            timestamp: timestamp.into(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        id
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

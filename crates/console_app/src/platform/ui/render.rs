use chrono::{DateTime, Local, NaiveDateTime};
use console_core::{AppViewModel, ConnectionState, LogEntry, LogId, LogLevel};

/// Turns successive view models into the lines that are new since the last call.
#[derive(Debug, Default)]
pub struct Feed {
    last_log: Option<LogId>,
    prompt: Option<String>,
}

impl Feed {
    pub fn lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        let last_log = self.last_log;
        for entry in view
            .logs
            .iter()
            .filter(|entry| match last_log {
                Some(last) => entry.id > last,
                None => true,
            })
        {
            lines.push(log_line(entry));
        }
        if let Some(last) = view.logs.last() {
            self.last_log = Some(last.id);
        }

        if view.prompt != self.prompt {
            if let Some(prompt) = &view.prompt {
                lines.push(format!("! {prompt}"));
            }
            self.prompt = view.prompt.clone();
        }

        lines
    }
}

pub fn log_line(entry: &LogEntry) -> String {
    format!(
        "[{}] {:<7} {}",
        time_of_day(&entry.timestamp),
        level_label(entry.level),
        entry.message
    )
}

pub fn status_panel(view: &AppViewModel) -> Vec<String> {
    let status = &view.status;
    let mut lines = vec![
        format!(
            "Worker:      {}",
            if status.is_running { "running" } else { "stopped" }
        ),
        format!("Clicks:      {}", status.clicks_made),
        format!(
            "Proxy:       {}",
            status.current_proxy.as_deref().unwrap_or("none")
        ),
        format!(
            "Last click:  {}",
            status
                .last_click_time
                .as_deref()
                .map(time_of_day)
                .unwrap_or_else(|| "never".to_string())
        ),
    ];
    if let Some(error) = &status.error_message {
        lines.push(format!("Error:       {error}"));
    }
    lines.push(format!("Stream:      {}", connection_label(view)));
    lines.push(format!(
        "Config:      every {}s, max clicks {}, enabled {}",
        view.config.interval_seconds,
        view.config
            .max_clicks
            .map(|max| max.to_string())
            .unwrap_or_else(|| "unlimited".to_string()),
        if view.config.enabled { "yes" } else { "no" }
    ));
    lines
}

pub fn targets_panel(view: &AppViewModel) -> Vec<String> {
    if view.targets.is_empty() {
        return vec!["No targets. Use `add <url> [name]`.".to_string()];
    }
    view.targets
        .iter()
        .map(|target| {
            if target.name.is_empty() {
                format!("{}  {}", target.id, target.url)
            } else {
                format!("{}  {}  ({})", target.id, target.url, target.name)
            }
        })
        .collect()
}

pub fn log_panel(view: &AppViewModel) -> Vec<String> {
    if view.logs.is_empty() {
        return vec!["Log is empty.".to_string()];
    }
    view.logs.iter().map(log_line).collect()
}

pub fn help() -> Vec<String> {
    [
        "start                 start the worker with the current settings",
        "stop                  stop the worker",
        "interval <secs>       seconds between clicks (1-300)",
        "max <n|none>          stop after n clicks, or never",
        "enable <on|off>       enabled flag sent with start",
        "add <url> [name]      register a target",
        "rm <id>               remove a target",
        "dismiss               hide the current prompt",
        "clear                 empty the log",
        "status | targets | logs | help",
        "quit",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

fn connection_label(view: &AppViewModel) -> &'static str {
    match view.connection {
        ConnectionState::Connected => "connected",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Disconnected if view.reconnect_pending => {
            "disconnected (reconnecting)"
        }
        ConnectionState::Disconnected => "disconnected",
    }
}

fn level_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "INFO",
        LogLevel::Success => "OK",
        LogLevel::Warning => "WARN",
        LogLevel::Error => "ERROR",
    }
}

/// Local time of day for zoned instants, wall clock for naive ones, raw text otherwise.
fn time_of_day(timestamp: &str) -> String {
    if let Ok(instant) = DateTime::parse_from_rfc3339(timestamp) {
        return instant.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%H:%M:%S").to_string();
    }
    timestamp.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::{Target, WorkerStatus};
    use pretty_assertions::assert_eq;

    fn entry(id: LogId, message: &str) -> LogEntry {
        LogEntry {
            id,
            message: message.to_string(),
            level: LogLevel::Info,
            timestamp: "2024-05-01T10:15:30.250".to_string(),
        }
    }

    #[test]
    fn feed_emits_only_new_entries() {
        let mut feed = Feed::default();
        let mut view = AppViewModel {
            logs: vec![entry(1, "one"), entry(2, "two")],
            ..AppViewModel::default()
        };
        assert_eq!(feed.lines(&view).len(), 2);
        assert!(feed.lines(&view).is_empty());

        view.logs.push(entry(3, "three"));
        assert_eq!(feed.lines(&view), vec!["[10:15:30] INFO    three".to_string()]);
    }

    #[test]
    fn feed_continues_after_clear() {
        let mut feed = Feed::default();
        let mut view = AppViewModel {
            logs: vec![entry(7, "before")],
            ..AppViewModel::default()
        };
        feed.lines(&view);

        view.logs.clear();
        assert!(feed.lines(&view).is_empty());

        view.logs.push(entry(8, "after"));
        assert_eq!(feed.lines(&view).len(), 1);
    }

    #[test]
    fn feed_prints_a_prompt_once() {
        let mut feed = Feed::default();
        let mut view = AppViewModel {
            prompt: Some("please enter a URL".to_string()),
            ..AppViewModel::default()
        };
        assert_eq!(feed.lines(&view), vec!["! please enter a URL".to_string()]);
        assert!(feed.lines(&view).is_empty());

        view.prompt = None;
        assert!(feed.lines(&view).is_empty());
    }

    #[test]
    fn unparseable_timestamps_are_shown_raw() {
        assert_eq!(time_of_day("yesterday"), "yesterday");
        assert_eq!(time_of_day("2024-05-01T08:00:01"), "08:00:01");
    }

    #[test]
    fn status_panel_reports_stream_and_worker() {
        let view = AppViewModel {
            status: WorkerStatus {
                is_running: true,
                clicks_made: 12,
                current_proxy: Some("10.0.0.1:8080".to_string()),
                last_click_time: None,
                error_message: Some("proxy refused".to_string()),
            },
            connection: ConnectionState::Disconnected,
            reconnect_pending: true,
            ..AppViewModel::default()
        };
        let panel = status_panel(&view);
        assert_eq!(panel[0], "Worker:      running");
        assert_eq!(panel[1], "Clicks:      12");
        assert_eq!(panel[2], "Proxy:       10.0.0.1:8080");
        assert_eq!(panel[3], "Last click:  never");
        assert_eq!(panel[4], "Error:       proxy refused");
        assert_eq!(panel[5], "Stream:      disconnected (reconnecting)");
    }

    #[test]
    fn targets_panel_lists_ids() {
        let view = AppViewModel {
            targets: vec![Target {
                id: "a1".to_string(),
                url: "https://example.com".to_string(),
                name: "Home".to_string(),
            }],
            ..AppViewModel::default()
        };
        assert_eq!(
            targets_panel(&view),
            vec!["a1  https://example.com  (Home)".to_string()]
        );
    }
}

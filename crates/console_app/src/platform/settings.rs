use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use console_logging::LogDestination;
use log::LevelFilter;
use robot_client::ApiSettings;

/// Operator console for the click robot.
#[derive(Debug, Parser)]
#[command(name = "robot_console", version)]
pub struct Args {
    /// Backend root; the control API and the log stream hang off it.
    #[arg(long, env = "ROBOT_BACKEND_URL", default_value = "http://localhost:8001")]
    pub backend_url: String,

    /// Seconds allowed for establishing an HTTP connection.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// Seconds allowed for a whole control request.
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: u64,

    /// Seconds to wait before reopening a lost log stream.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconnect_delay: u64,

    /// Where diagnostics go.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    #[arg(long, default_value_t = LevelFilter::Info, value_parser = parse_level)]
    pub log_level: LevelFilter,

    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        }
    }
}

impl Args {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay)
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown log level `{raw}` (off, error, warn, info, debug, trace)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["robot_console"]).expect("defaults parse");
        assert_eq!(args.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(args.log, LogTarget::File);
        assert_eq!(args.log_level, LevelFilter::Info);
        let settings = args.api_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "robot_console",
            "--backend-url",
            "https://robot.internal:9000",
            "--reconnect-delay",
            "10",
            "--log",
            "both",
            "--log-level",
            "debug",
        ])
        .expect("overrides parse");
        assert_eq!(args.api_settings().base_url, "https://robot.internal:9000");
        assert_eq!(args.reconnect_delay(), Duration::from_secs(10));
        assert_eq!(LogDestination::from(args.log), LogDestination::Both);
        assert_eq!(args.log_level, LevelFilter::Debug);
    }

    #[test]
    fn zero_delay_is_rejected() {
        assert!(Args::try_parse_from(["robot_console", "--reconnect-delay", "0"]).is_err());
    }
}

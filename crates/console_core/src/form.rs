use std::fmt;
use std::ops::RangeInclusive;

pub const INTERVAL_RANGE: RangeInclusive<u32> = 1..=300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub interval_seconds: u32,
    pub max_clicks: Option<u32>,
    pub enabled: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            max_clicks: None,
            enabled: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), Prompt> {
        if !INTERVAL_RANGE.contains(&self.interval_seconds) {
            return Err(Prompt::IntervalOutOfRange(self.interval_seconds));
        }
        if self.max_clicks == Some(0) {
            return Err(Prompt::MaxClicksTooLow);
        }
        Ok(())
    }
}

/// The "add target" form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetDraft {
    pub url: String,
    pub name: String,
}

impl TargetDraft {
    /// Returns the trimmed url and name ready for submission.
    pub fn validate(&self) -> Result<(String, String), Prompt> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Prompt::EmptyUrl);
        }
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(Prompt::InvalidUrl(url.to_string())),
        }
        Ok((url.to_string(), self.name.trim().to_string()))
    }
}

/// Inline message shown to the operator when a form is rejected locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    EmptyUrl,
    InvalidUrl(String),
    NoTargets,
    IntervalOutOfRange(u32),
    MaxClicksTooLow,
    UnknownTarget(String),
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::EmptyUrl => write!(f, "please enter a URL"),
            Prompt::InvalidUrl(url) => write!(f, "not an http(s) URL: {url}"),
            Prompt::NoTargets => write!(f, "add at least one URL before starting the worker"),
            Prompt::IntervalOutOfRange(secs) => write!(
                f,
                "interval must be between {} and {} seconds (got {secs})",
                INTERVAL_RANGE.start(),
                INTERVAL_RANGE.end()
            ),
            Prompt::MaxClicksTooLow => write!(f, "max clicks must be at least 1"),
            Prompt::UnknownTarget(id) => write!(f, "no target with id {id}"),
        }
    }
}

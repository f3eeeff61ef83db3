use console_core::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Status,
    Targets,
    Logs,
    Help,
}

/// One parsed operator input line.
#[derive(Debug)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Show(Panel),
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "start" => Command::Dispatch(vec![Msg::StartClicked]),
        "stop" => Command::Dispatch(vec![Msg::StopClicked]),
        "clear" => Command::Dispatch(vec![Msg::ClearLogsClicked]),
        "dismiss" => Command::Dispatch(vec![Msg::PromptDismissed]),
        "interval" => match rest.parse::<u32>() {
            Ok(secs) => Command::Dispatch(vec![Msg::IntervalChanged(secs)]),
            Err(_) => Command::Invalid("usage: interval <seconds>".to_string()),
        },
        "max" => match rest.to_ascii_lowercase().as_str() {
            "none" | "off" | "unlimited" => Command::Dispatch(vec![Msg::MaxClicksChanged(None)]),
            other => match other.parse::<u32>() {
                Ok(max) => Command::Dispatch(vec![Msg::MaxClicksChanged(Some(max))]),
                Err(_) => Command::Invalid("usage: max <n|none>".to_string()),
            },
        },
        "enable" => match rest.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" => Command::Dispatch(vec![Msg::EnabledChanged(true)]),
            "off" | "no" | "false" => Command::Dispatch(vec![Msg::EnabledChanged(false)]),
            _ => Command::Invalid("usage: enable <on|off>".to_string()),
        },
        "add" => {
            let (url, name) = match rest.split_once(char::is_whitespace) {
                Some((url, name)) => (url, name.trim()),
                None => (rest, ""),
            };
            Command::Dispatch(vec![
                Msg::TargetUrlChanged(url.to_string()),
                Msg::TargetNameChanged(name.to_string()),
                Msg::AddTargetClicked,
            ])
        }
        "rm" | "remove" if !rest.is_empty() => {
            Command::Dispatch(vec![Msg::RemoveTargetClicked(rest.to_string())])
        }
        "rm" | "remove" => Command::Invalid("usage: rm <id>".to_string()),
        "status" => Command::Show(Panel::Status),
        "targets" => Command::Show(Panel::Targets),
        "logs" => Command::Show(Panel::Logs),
        "help" | "?" => Command::Show(Panel::Help),
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command `{other}`; try `help`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched(line: &str) -> Vec<Msg> {
        match parse(line) {
            Command::Dispatch(msgs) => msgs,
            other => panic!("expected dispatch for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn add_splits_url_and_name() {
        let msgs = dispatched("add https://example.com/landing  Landing page ");
        assert!(matches!(
            msgs.as_slice(),
            [
                Msg::TargetUrlChanged(url),
                Msg::TargetNameChanged(name),
                Msg::AddTargetClicked,
            ] if url == "https://example.com/landing" && name == "Landing page"
        ));
    }

    #[test]
    fn bare_add_still_submits() {
        let msgs = dispatched("add");
        assert!(matches!(
            msgs.as_slice(),
            [Msg::TargetUrlChanged(url), Msg::TargetNameChanged(_), Msg::AddTargetClicked]
                if url.is_empty()
        ));
    }

    #[test]
    fn numeric_settings() {
        assert!(matches!(
            dispatched("interval 30").as_slice(),
            [Msg::IntervalChanged(30)]
        ));
        assert!(matches!(
            dispatched("max none").as_slice(),
            [Msg::MaxClicksChanged(None)]
        ));
        assert!(matches!(
            dispatched("MAX 250").as_slice(),
            [Msg::MaxClicksChanged(Some(250))]
        ));
        assert!(matches!(parse("interval soon"), Command::Invalid(_)));
        assert!(matches!(parse("max -1"), Command::Invalid(_)));
    }

    #[test]
    fn panels_and_quit() {
        assert!(matches!(parse("status"), Command::Show(Panel::Status)));
        assert!(matches!(parse("  logs "), Command::Show(Panel::Logs)));
        assert!(matches!(parse("?"), Command::Show(Panel::Help)));
        assert!(matches!(parse("exit"), Command::Quit));
        assert!(matches!(parse("   "), Command::Empty));
        assert!(matches!(parse("rm"), Command::Invalid(_)));
        assert!(matches!(parse("launch"), Command::Invalid(_)));
    }
}

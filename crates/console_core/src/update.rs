use console_logging::{console_debug, console_info};

use crate::{AppState, ChannelId, Effect, LogLevel, Loss, Msg, Prompt};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Boot => {
            let mut effects = vec![Effect::FetchTargets, Effect::FetchStatus];
            if let Some(channel) = state.channel_mut().open() {
                state.mark_dirty();
                effects.push(Effect::OpenChannel { channel });
            }
            effects
        }
        Msg::ShutdownRequested => {
            let teardown = state.channel_mut().teardown();
            state.mark_dirty();
            let mut effects = Vec::with_capacity(2);
            if let Some(channel) = teardown.close {
                effects.push(Effect::CloseChannel { channel });
            }
            if let Some(timer) = teardown.cancel {
                effects.push(Effect::CancelReconnect { timer });
            }
            effects
        }

        Msg::TargetsLoaded(Ok(targets)) => {
            state.replace_targets(targets);
            Vec::new()
        }
        Msg::TargetsLoaded(Err(err)) => {
            state.log(LogLevel::Error, format!("Failed to load targets: {err}"));
            Vec::new()
        }
        Msg::StatusLoaded(Ok(status)) => {
            state.replace_status(status);
            Vec::new()
        }
        Msg::StatusLoaded(Err(err)) => {
            state.log(LogLevel::Error, format!("Failed to load worker status: {err}"));
            Vec::new()
        }

        Msg::IntervalChanged(secs) => {
            state.config_mut().interval_seconds = secs;
            clear_config_prompt(&mut state);
            Vec::new()
        }
        Msg::MaxClicksChanged(max) => {
            state.config_mut().max_clicks = max;
            clear_config_prompt(&mut state);
            Vec::new()
        }
        Msg::EnabledChanged(enabled) => {
            state.config_mut().enabled = enabled;
            Vec::new()
        }
        Msg::TargetUrlChanged(url) => {
            state.draft_mut().url = url;
            clear_draft_prompt(&mut state);
            Vec::new()
        }
        Msg::TargetNameChanged(name) => {
            state.draft_mut().name = name;
            Vec::new()
        }
        Msg::PromptDismissed => {
            state.set_prompt(None);
            Vec::new()
        }

        Msg::AddTargetClicked => match state.draft().validate() {
            Ok((url, name)) => {
                state.set_prompt(None);
                vec![Effect::CreateTarget { url, name }]
            }
            Err(prompt) => {
                state.set_prompt(Some(prompt));
                Vec::new()
            }
        },
        Msg::TargetCreated(Ok(target)) => {
            state.log(LogLevel::Success, format!("Target added: {}", target.url));
            *state.draft_mut() = Default::default();
            vec![Effect::FetchTargets]
        }
        Msg::TargetCreated(Err(err)) => {
            state.log(LogLevel::Error, format!("Failed to add target: {err}"));
            Vec::new()
        }
        Msg::RemoveTargetClicked(id) => {
            if state.has_target(&id) {
                state.set_prompt(None);
                vec![Effect::DeleteTarget { id }]
            } else {
                state.set_prompt(Some(Prompt::UnknownTarget(id)));
                Vec::new()
            }
        }
        Msg::TargetRemoved { id, result: Ok(()) } => {
            console_debug!("target {} removed", id);
            state.log(LogLevel::Info, "Target removed");
            vec![Effect::FetchTargets]
        }
        Msg::TargetRemoved {
            id,
            result: Err(err),
        } => {
            state.log(
                LogLevel::Error,
                format!("Failed to remove target {id}: {err}"),
            );
            Vec::new()
        }

        Msg::StartClicked => {
            let verdict = if state.targets().is_empty() {
                Err(Prompt::NoTargets)
            } else {
                state.config().validate()
            };
            match verdict {
                Ok(()) => {
                    state.set_prompt(None);
                    vec![Effect::StartWorker {
                        config: *state.config(),
                    }]
                }
                Err(prompt) => {
                    state.set_prompt(Some(prompt));
                    Vec::new()
                }
            }
        }
        Msg::WorkerStarted(Ok(())) => {
            state.log(LogLevel::Success, "Worker started");
            Vec::new()
        }
        Msg::WorkerStarted(Err(err)) => {
            state.log(LogLevel::Error, format!("Failed to start worker: {err}"));
            Vec::new()
        }
        Msg::StopClicked => vec![Effect::StopWorker],
        Msg::WorkerStopped(Ok(())) => {
            state.log(LogLevel::Info, "Worker stopped");
            Vec::new()
        }
        Msg::WorkerStopped(Err(err)) => {
            state.log(LogLevel::Error, format!("Failed to stop worker: {err}"));
            Vec::new()
        }
        Msg::ClearLogsClicked => {
            state.clear_logs();
            Vec::new()
        }

        Msg::ChannelOpened { channel } => {
            if state.channel_mut().on_opened(channel) {
                console_info!("log stream channel {} open", channel);
                state.log(LogLevel::Success, "Connected to log stream");
            } else {
                console_debug!("ignoring open of stale channel {}", channel);
            }
            Vec::new()
        }
        Msg::ChannelClosed { channel, reason } => {
            let notice = match reason {
                Some(reason) => format!("Disconnected from log stream: {reason}"),
                None => "Disconnected from log stream".to_string(),
            };
            channel_lost(&mut state, channel, notice)
        }
        Msg::ChannelFailed { channel, error } => {
            channel_lost(&mut state, channel, format!("Log stream error: {error}"))
        }
        Msg::EventReceived { channel, event } => {
            if state.channel().accepts_frames_from(channel) {
                state.apply_event(event);
            } else {
                console_debug!("dropping event from stale channel {}", channel);
            }
            Vec::new()
        }
        Msg::FrameRejected { channel, error } => {
            if state.channel().accepts_frames_from(channel) {
                state.log(
                    LogLevel::Error,
                    format!("Discarded malformed frame: {error}"),
                );
            }
            Vec::new()
        }
        Msg::ReconnectDue { timer } => match state.channel_mut().on_timer_fired(timer) {
            Some(channel) => {
                console_info!("reconnecting log stream as channel {}", channel);
                state.mark_dirty();
                vec![Effect::OpenChannel { channel }]
            }
            None => {
                console_debug!("reconnect timer {} no longer applies", timer);
                Vec::new()
            }
        },

        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn channel_lost(state: &mut AppState, channel: ChannelId, notice: String) -> Vec<Effect> {
    match state.channel_mut().on_lost(channel) {
        Loss::Stale => {
            console_debug!("ignoring loss of stale channel {}", channel);
            Vec::new()
        }
        Loss::Lost { reconnect } => {
            state.log(LogLevel::Error, notice);
            match reconnect {
                Some(timer) => vec![Effect::ScheduleReconnect {
                    timer,
                    delay: state.reconnect_delay(),
                }],
                None => Vec::new(),
            }
        }
    }
}

fn clear_config_prompt(state: &mut AppState) {
    if matches!(
        state.prompt(),
        Some(Prompt::IntervalOutOfRange(_) | Prompt::MaxClicksTooLow)
    ) {
        state.set_prompt(None);
    }
}

fn clear_draft_prompt(state: &mut AppState) {
    if matches!(state.prompt(), Some(Prompt::EmptyUrl | Prompt::InvalidUrl(_))) {
        state.set_prompt(None);
    }
}

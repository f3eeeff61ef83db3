use console_core::{
    Effect, LogLevel, Msg, RunConfig, StatusFragment, StreamEvent, Target, WorkerStatus,
};
use console_logging::{console_info, console_warn};
use robot_client::{
    ChannelEvent, ClientEvent, ClientHandle, FrameLevel, NewTarget, RunSettings, StatusRecord,
    StreamFrame, TargetRecord,
};

/// Carries core effects out through the client and turns client events back into messages.
pub struct EffectRunner {
    client: ClientHandle,
}

impl EffectRunner {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchTargets => self.client.fetch_targets(),
                Effect::FetchStatus => self.client.fetch_status(),
                Effect::CreateTarget { url, name } => {
                    console_info!("CreateTarget url_len={} url={}", url.len(), url);
                    self.client.create_target(NewTarget { url, name });
                }
                Effect::DeleteTarget { id } => {
                    console_info!("DeleteTarget id={}", id);
                    self.client.delete_target(id);
                }
                Effect::StartWorker { config } => {
                    console_info!(
                        "StartWorker interval={}s max_clicks={:?} enabled={}",
                        config.interval_seconds,
                        config.max_clicks,
                        config.enabled
                    );
                    self.client.start_worker(run_settings(config));
                }
                Effect::StopWorker => {
                    console_info!("StopWorker");
                    self.client.stop_worker();
                }
                Effect::OpenChannel { channel } => self.client.open_channel(channel),
                Effect::CloseChannel { channel } => self.client.close_channel(channel),
                Effect::ScheduleReconnect { timer, delay } => {
                    self.client.schedule_reconnect(timer, delay)
                }
                Effect::CancelReconnect { timer } => self.client.cancel_reconnect(timer),
            }
        }
    }

    pub async fn next_msg(&mut self) -> Option<Msg> {
        self.client.next_event().await.map(map_event)
    }

    pub fn shutdown(&mut self) {
        self.client.shutdown();
    }

    #[cfg(test)]
    pub fn client(&self) -> &ClientHandle {
        &self.client
    }
}

fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::TargetsLoaded(result) => Msg::TargetsLoaded(
            result
                .map(|targets| targets.into_iter().map(map_target).collect())
                .map_err(|err| err.to_string()),
        ),
        ClientEvent::StatusLoaded(result) => {
            Msg::StatusLoaded(result.map(map_status).map_err(|err| err.to_string()))
        }
        ClientEvent::TargetCreated(result) => {
            Msg::TargetCreated(result.map(map_target).map_err(|err| err.to_string()))
        }
        ClientEvent::TargetDeleted { id, result } => Msg::TargetRemoved {
            id,
            result: result.map_err(|err| err.to_string()),
        },
        ClientEvent::WorkerStarted(result) => {
            Msg::WorkerStarted(result.map_err(|err| err.to_string()))
        }
        ClientEvent::WorkerStopped(result) => {
            Msg::WorkerStopped(result.map_err(|err| err.to_string()))
        }
        ClientEvent::Channel { channel, event } => match event {
            ChannelEvent::Opened => Msg::ChannelOpened { channel },
            ChannelEvent::Frame(frame) => Msg::EventReceived {
                channel,
                event: map_frame(frame),
            },
            ChannelEvent::Rejected(err) => Msg::FrameRejected {
                channel,
                error: err.to_string(),
            },
            ChannelEvent::Closed { reason } => Msg::ChannelClosed { channel, reason },
            ChannelEvent::Failed(err) => {
                console_warn!("channel {} failed: {}", channel, err);
                Msg::ChannelFailed {
                    channel,
                    error: err.to_string(),
                }
            }
        },
        ClientEvent::ReconnectDue { timer } => Msg::ReconnectDue { timer },
    }
}

fn map_target(record: TargetRecord) -> Target {
    Target {
        id: record.id,
        url: record.url,
        name: record.name,
    }
}

fn map_status(record: StatusRecord) -> WorkerStatus {
    WorkerStatus {
        is_running: record.is_running,
        clicks_made: record.clicks_made,
        current_proxy: record.current_proxy,
        last_click_time: record.last_click_time,
        error_message: record.error_message,
    }
}

fn map_frame(frame: StreamFrame) -> StreamEvent {
    StreamEvent {
        message: frame.message,
        level: map_level(frame.level),
        timestamp: frame.timestamp,
        status: StatusFragment {
            clicks_made: frame.clicks_made,
            current_proxy: frame.current_proxy,
        },
    }
}

fn map_level(level: FrameLevel) -> LogLevel {
    match level {
        FrameLevel::Info => LogLevel::Info,
        FrameLevel::Success => LogLevel::Success,
        FrameLevel::Warning => LogLevel::Warning,
        FrameLevel::Error => LogLevel::Error,
    }
}

fn run_settings(config: RunConfig) -> RunSettings {
    RunSettings {
        interval_seconds: config.interval_seconds,
        max_clicks: config.max_clicks,
        enabled: config.enabled,
    }
}

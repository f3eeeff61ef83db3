use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use console_logging::{console_debug, console_info, console_warn};

use crate::api::{stream_url, ApiSettings, ControlApi, ReqwestControlApi};
use crate::stream::{run_channel, StreamConnector, TungsteniteConnector};
use crate::{ApiError, ChannelId, ClientEvent, NewTarget, RunSettings, TimerId};

struct ActiveChannel {
    id: ChannelId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct PendingTimer {
    id: TimerId,
    task: JoinHandle<()>,
}

/// Executes I/O on behalf of the console and reports results as [`ClientEvent`]s.
///
/// Requests and the stream run as tasks on the current tokio runtime. The
/// handle owns at most one stream task and one reconnect timer; both are
/// stopped on [`ClientHandle::shutdown`] and on drop.
pub struct ClientHandle {
    api: Arc<dyn ControlApi>,
    connector: Arc<dyn StreamConnector>,
    stream_url: Url,
    event_tx: mpsc::UnboundedSender<ClientEvent>,
    event_rx: mpsc::UnboundedReceiver<ClientEvent>,
    channel: Option<ActiveChannel>,
    timer: Option<PendingTimer>,
}

impl ClientHandle {
    pub fn new(
        api: Arc<dyn ControlApi>,
        connector: Arc<dyn StreamConnector>,
        stream_url: Url,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            api,
            connector,
            stream_url,
            event_tx,
            event_rx,
            channel: None,
            timer: None,
        }
    }

    /// HTTP control API plus WebSocket stream, both derived from `settings.base_url`.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        let api = ReqwestControlApi::new(settings)?;
        let url = stream_url(&settings.base_url)?;
        let connector = TungsteniteConnector::new(settings.connect_timeout);
        Ok(Self::new(Arc::new(api), Arc::new(connector), url))
    }

    pub fn stream_url(&self) -> &Url {
        &self.stream_url
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.event_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn fetch_targets(&self) {
        let api = self.api.clone();
        self.spawn_request(async move { ClientEvent::TargetsLoaded(api.list_targets().await) });
    }

    pub fn fetch_status(&self) {
        let api = self.api.clone();
        self.spawn_request(async move { ClientEvent::StatusLoaded(api.status().await) });
    }

    pub fn create_target(&self, target: NewTarget) {
        let api = self.api.clone();
        self.spawn_request(async move {
            ClientEvent::TargetCreated(api.create_target(&target).await)
        });
    }

    pub fn delete_target(&self, id: String) {
        let api = self.api.clone();
        self.spawn_request(async move {
            let result = api.delete_target(&id).await;
            ClientEvent::TargetDeleted { id, result }
        });
    }

    /// Starts the worker. A successful start is followed by a separate status read.
    pub fn start_worker(&self, settings: RunSettings) {
        let api = self.api.clone();
        self.spawn_command(async move {
            let result = api.start(&settings).await;
            let read_back = result.is_ok().then_some(api);
            (ClientEvent::WorkerStarted(result), read_back)
        });
    }

    pub fn stop_worker(&self) {
        let api = self.api.clone();
        self.spawn_command(async move {
            let result = api.stop().await;
            let read_back = result.is_ok().then_some(api);
            (ClientEvent::WorkerStopped(result), read_back)
        });
    }

    /// Spawns the stream task for `channel`.
    ///
    /// A previous task still winding down is cancelled first so that no two
    /// channels are ever live at once.
    pub fn open_channel(&mut self, channel: ChannelId) {
        if let Some(previous) = self.channel.take() {
            if !previous.task.is_finished() {
                console_warn!(
                    "channel {} still running while opening {}; cancelling it",
                    previous.id,
                    channel
                );
                previous.cancel.cancel();
            }
        }

        console_info!("opening channel {} to {}", channel, self.stream_url);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_channel(
            self.connector.clone(),
            self.stream_url.clone(),
            channel,
            cancel.clone(),
            self.event_tx.clone(),
        ));
        self.channel = Some(ActiveChannel {
            id: channel,
            cancel,
            task,
        });
    }

    pub fn close_channel(&mut self, channel: ChannelId) {
        match self.channel.take() {
            Some(active) if active.id == channel => {
                console_debug!("closing channel {}", channel);
                active.cancel.cancel();
            }
            other => self.channel = other,
        }
    }

    /// True while a stream task exists and has not returned.
    pub fn has_live_channel(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    pub fn schedule_reconnect(&mut self, timer: TimerId, delay: Duration) {
        if let Some(previous) = self.timer.take() {
            previous.task.abort();
        }
        let events = self.event_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ClientEvent::ReconnectDue { timer });
        });
        console_debug!("reconnect timer {} armed for {:?}", timer, delay);
        self.timer = Some(PendingTimer { id: timer, task });
    }

    pub fn cancel_reconnect(&mut self, timer: TimerId) {
        match self.timer.take() {
            Some(pending) if pending.id == timer => {
                console_debug!("reconnect timer {} cancelled", timer);
                pending.task.abort();
            }
            other => self.timer = other,
        }
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|pending| !pending.task.is_finished())
    }

    pub fn shutdown(&mut self) {
        if let Some(active) = self.channel.take() {
            active.cancel.cancel();
        }
        if let Some(pending) = self.timer.take() {
            pending.task.abort();
        }
    }

    /// Reports the acknowledgement, then `StatusLoaded` when an api is handed back for the read.
    fn spawn_command<F>(&self, command: F)
    where
        F: std::future::Future<Output = (ClientEvent, Option<Arc<dyn ControlApi>>)>
            + Send
            + 'static,
    {
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let (ack, read_back) = command.await;
            if events.send(ack).is_err() {
                return;
            }
            if let Some(api) = read_back {
                let _ = events.send(ClientEvent::StatusLoaded(api.status().await));
            }
        });
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: std::future::Future<Output = ClientEvent> + Send + 'static,
    {
        let events = self.event_tx.clone();
        tokio::spawn(async move {
            let _ = events.send(request.await);
        });
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

use std::io::Write;

use anyhow::Context;
use console_core::{update, AppState, Msg};
use console_logging::{console_info, console_warn};
use robot_client::ClientHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::effects::EffectRunner;
use super::settings::Args;
use super::ui::commands::{self, Command, Panel};
use super::ui::render::{self, Feed};

pub async fn run_app(args: Args) -> anyhow::Result<()> {
    let settings = args.api_settings();
    let client = ClientHandle::from_settings(&settings)
        .with_context(|| format!("cannot use backend url {}", settings.base_url))?;
    console_info!(
        "robot console starting: api={} stream={}",
        settings.base_url,
        client.stream_url()
    );

    let state = AppState::new().with_reconnect_delay(args.reconnect_delay());
    let mut console = Console::new(state, EffectRunner::new(client), std::io::stdout());
    let input = BufReader::new(tokio::io::stdin());

    let result = tokio::select! {
        result = console.run(input) => result.context("failed to read operator input"),
        signal = tokio::signal::ctrl_c() => signal.context("failed to listen for ctrl-c"),
    };
    console.shutdown();
    console_info!("robot console stopped");
    result
}

/// The event loop: owns the state, feeds it messages, runs the resulting effects.
struct Console<W> {
    state: AppState,
    runner: EffectRunner,
    feed: Feed,
    out: W,
}

impl<W: Write> Console<W> {
    fn new(state: AppState, runner: EffectRunner, out: W) -> Self {
        Self {
            state,
            runner,
            feed: Feed::default(),
            out,
        }
    }

    async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.emit(vec!["robot console ready; type `help` for commands".to_string()]);
        self.dispatch(Msg::Boot);

        loop {
            tokio::select! {
                alive = self.pump() => {
                    if !alive {
                        break;
                    }
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if !self.handle_line(&line) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Waits for the next client event and applies it. False once the client is gone.
    async fn pump(&mut self) -> bool {
        match self.runner.next_msg().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    fn handle_line(&mut self, line: &str) -> bool {
        match commands::parse(line) {
            Command::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Command::Show(panel) => {
                let view = self.state.view();
                let lines = match panel {
                    Panel::Status => render::status_panel(&view),
                    Panel::Targets => render::targets_panel(&view),
                    Panel::Logs => render::log_panel(&view),
                    Panel::Help => render::help(),
                };
                self.emit(lines);
            }
            Command::Invalid(message) => self.emit(vec![message]),
            Command::Empty => {}
            Command::Quit => return false,
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            let view = self.state.view();
            let lines = self.feed.lines(&view);
            self.emit(lines);
        }
    }

    fn shutdown(&mut self) {
        if !self.state.is_torn_down() {
            self.dispatch(Msg::ShutdownRequested);
        }
        self.runner.shutdown();
    }

    fn emit(&mut self, lines: Vec<String>) {
        for line in lines {
            if let Err(err) = writeln!(self.out, "{line}") {
                console_warn!("console output failed: {}", err);
                return;
            }
        }
        let _ = self.out.flush();
    }
}

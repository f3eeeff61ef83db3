use std::time::Duration;

use console_core::{
    update, AppState, ConnectionState, Effect, LogLevel, Msg, RECONNECT_DELAY,
};
use pretty_assertions::assert_eq;

fn connected() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Boot);
    let (state, _) = update(state, Msg::ChannelOpened { channel: 1 });
    state
}

#[test]
fn open_logs_success_and_connects() {
    let (state, _) = update(AppState::new(), Msg::Boot);
    assert_eq!(state.connection(), ConnectionState::Connecting);

    let (state, effects) = update(state, Msg::ChannelOpened { channel: 1 });

    assert!(effects.is_empty());
    assert_eq!(state.connection(), ConnectionState::Connected);
    let last = state.ledger().last().unwrap();
    assert_eq!(last.level, LogLevel::Success);
    assert_eq!(last.message, "Connected to log stream");
}

#[test]
fn close_schedules_one_reconnect_and_timer_reopens() {
    let state = connected();

    let (state, effects) = update(
        state,
        Msg::ChannelClosed {
            channel: 1,
            reason: None,
        },
    );
    assert_eq!(state.connection(), ConnectionState::Disconnected);
    assert_eq!(
        effects,
        vec![Effect::ScheduleReconnect {
            timer: 1,
            delay: RECONNECT_DELAY,
        }]
    );
    let last = state.ledger().last().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert_eq!(last.message, "Disconnected from log stream");

    // A late error report for the same channel neither logs nor reschedules.
    let before = state.ledger().len();
    let (state, effects) = update(
        state,
        Msg::ChannelFailed {
            channel: 1,
            error: "reset by peer".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.ledger().len(), before);

    let (state, effects) = update(state, Msg::ReconnectDue { timer: 1 });
    assert_eq!(effects, vec![Effect::OpenChannel { channel: 2 }]);
    assert_eq!(state.connection(), ConnectionState::Connecting);

    let (state, _) = update(state, Msg::ChannelOpened { channel: 2 });
    assert_eq!(state.connection(), ConnectionState::Connected);
    assert_eq!(
        state.ledger().last().map(|e| e.message.as_str()),
        Some("Connected to log stream")
    );
}

#[test]
fn failed_connect_keeps_retrying_at_fixed_delay() {
    let delay = Duration::from_millis(250);
    let (mut state, effects) = update(AppState::new().with_reconnect_delay(delay), Msg::Boot);
    let mut channel = match effects.last() {
        Some(Effect::OpenChannel { channel }) => *channel,
        other => panic!("expected open, got {other:?}"),
    };

    for attempt in 1..=5u64 {
        let (next, effects) = update(
            state,
            Msg::ChannelFailed {
                channel,
                error: "connection refused".to_string(),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::ScheduleReconnect {
                timer: attempt,
                delay,
            }]
        );
        let (next, effects) = update(next, Msg::ReconnectDue { timer: attempt });
        channel = match effects.as_slice() {
            [Effect::OpenChannel { channel }] => *channel,
            other => panic!("expected open, got {other:?}"),
        };
        state = next;
    }

    assert_eq!(channel, 6);
    assert_eq!(state.connection(), ConnectionState::Connecting);
}

#[test]
fn state_is_retained_while_disconnected() {
    let state = connected();
    let (state, _) = update(state, Msg::TargetsLoaded(Ok(Vec::new())));
    let (state, _) = update(
        state,
        Msg::ChannelClosed {
            channel: 1,
            reason: Some("going away".to_string()),
        },
    );

    let messages: Vec<_> = state.ledger().iter().map(|e| e.message.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "Connected to log stream".to_string(),
            "Disconnected from log stream: going away".to_string(),
        ]
    );
}

#[test]
fn shutdown_with_pending_timer_cancels_it_and_ignores_late_fire() {
    let state = connected();
    let (state, _) = update(
        state,
        Msg::ChannelClosed {
            channel: 1,
            reason: None,
        },
    );

    let (state, effects) = update(state, Msg::ShutdownRequested);
    assert_eq!(effects, vec![Effect::CancelReconnect { timer: 1 }]);
    assert!(state.is_torn_down());

    let (state, effects) = update(state, Msg::ReconnectDue { timer: 1 });
    assert!(effects.is_empty());
    assert_eq!(state.connection(), ConnectionState::Disconnected);
}

#[test]
fn shutdown_closes_the_open_channel_without_rescheduling() {
    let state = connected();

    let (state, effects) = update(state, Msg::ShutdownRequested);
    assert_eq!(effects, vec![Effect::CloseChannel { channel: 1 }]);

    let before = state.ledger().len();
    let (state, effects) = update(
        state,
        Msg::ChannelClosed {
            channel: 1,
            reason: None,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.ledger().len(), before);
}

#[test]
fn timer_firing_while_connected_does_not_open_a_second_channel() {
    let state = connected();
    let (state, _) = update(
        state,
        Msg::ChannelClosed {
            channel: 1,
            reason: None,
        },
    );
    let (state, _) = update(state, Msg::ReconnectDue { timer: 1 });
    let (state, _) = update(state, Msg::ChannelOpened { channel: 2 });

    // Duplicate delivery of the same timer must not open anything.
    let (state, effects) = update(state, Msg::ReconnectDue { timer: 1 });
    assert!(effects.is_empty());
    assert_eq!(state.connection(), ConnectionState::Connected);
}

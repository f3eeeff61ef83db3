use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use robot_client::{
    ApiError, ChannelEvent, ClientEvent, ClientHandle, ControlApi, FrameError, FrameLevel,
    ChannelError, NewTarget, RunSettings, StatusRecord, StreamConnector, TargetRecord,
    TungsteniteConnector,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Control API that is never expected to be called in these tests.
struct UnusedApi;

#[async_trait::async_trait]
impl ControlApi for UnusedApi {
    async fn list_targets(&self) -> Result<Vec<TargetRecord>, ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
    async fn create_target(&self, _target: &NewTarget) -> Result<TargetRecord, ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
    async fn delete_target(&self, _id: &str) -> Result<(), ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
    async fn status(&self) -> Result<StatusRecord, ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
    async fn start(&self, _settings: &RunSettings) -> Result<(), ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
    async fn stop(&self) -> Result<(), ApiError> {
        Err(ApiError::Network("unused".to_string()))
    }
}

fn client_for(addr: std::net::SocketAddr) -> ClientHandle {
    let url = Url::parse(&format!("ws://{addr}/ws/logs")).unwrap();
    ClientHandle::new(Arc::new(UnusedApi), Arc::new(TungsteniteConnector::default()), url)
}

async fn next_channel_event(client: &mut ClientHandle) -> (u64, ChannelEvent) {
    let event = tokio::time::timeout(Duration::from_secs(5), client.next_event())
        .await
        .expect("event in time")
        .expect("event channel open");
    match event {
        ClientEvent::Channel { channel, event } => (channel, event),
        other => panic!("unexpected client event {other:?}"),
    }
}

#[tokio::test]
async fn frames_are_decoded_and_close_is_reported_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let frame = r#"{"timestamp":"2026-01-01T10:00:00","level":"info","message":"proxy rotated","clicks_made":4,"current_proxy":"http://9.9.9.9:8080"}"#;
        ws.send(Message::Text(frame.to_string())).await.unwrap();
        ws.send(Message::Text("{broken".to_string())).await.unwrap();
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "worker restarting".into(),
        }))
        .await
        .unwrap();
        // Drain until the client acknowledges the close.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut client = client_for(addr);
    client.open_channel(1);

    assert_eq!(next_channel_event(&mut client).await, (1, ChannelEvent::Opened));

    let (channel, event) = next_channel_event(&mut client).await;
    assert_eq!(channel, 1);
    match event {
        ChannelEvent::Frame(frame) => {
            assert_eq!(frame.message, "proxy rotated");
            assert_eq!(frame.level, FrameLevel::Info);
            assert_eq!(frame.clicks_made, 4);
        }
        other => panic!("expected frame, got {other:?}"),
    }

    let (_, event) = next_channel_event(&mut client).await;
    assert!(matches!(event, ChannelEvent::Rejected(FrameError::Syntax(_))));

    let (_, event) = next_channel_event(&mut client).await;
    assert_eq!(
        event,
        ChannelEvent::Closed {
            reason: Some("worker restarting".to_string())
        }
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.try_next_event().is_none());
}

#[tokio::test]
async fn refused_connection_is_a_failure() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut client = client_for(addr);
    client.open_channel(3);

    let (channel, event) = next_channel_event(&mut client).await;
    assert_eq!(channel, 3);
    assert!(matches!(event, ChannelEvent::Failed(_)), "got {event:?}");
}

#[tokio::test]
async fn deliberate_close_sends_close_frame_and_reports_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let mut saw_close = false;
        while let Some(message) = ws.next().await {
            if matches!(message, Ok(Message::Close(_))) {
                saw_close = true;
                break;
            }
        }
        let _ = seen_tx.send(saw_close);
    });

    let mut client = client_for(addr);
    client.open_channel(1);
    assert_eq!(next_channel_event(&mut client).await, (1, ChannelEvent::Opened));
    assert!(client.has_live_channel());

    client.close_channel(1);

    let saw_close = tokio::time::timeout(Duration::from_secs(5), seen_rx)
        .await
        .expect("server finished")
        .expect("server result");
    assert!(saw_close);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.try_next_event().is_none());
}

#[tokio::test]
async fn stalled_handshake_fails_after_the_connect_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept the TCP connection but never answer the upgrade request.
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let connector = TungsteniteConnector::new(Duration::from_millis(200));
    let url = Url::parse(&format!("ws://{addr}/ws/logs")).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), connector.connect(&url))
        .await
        .expect("connector gave up on its own");

    match result {
        Err(ChannelError::Connect(message)) => assert!(message.contains("timed out")),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("handshake should not complete"),
    }
    server.abort();
}

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use navguard_lib::{
    Clock, DetectionController, DetectionSession, DetectorConfig, EventKind, InMemoryGateStore,
    NavigationEvent, OverlayCall, RecordingOverlaySink, SnapshotSource, UiSnapshotNode,
    UnlockGate, WindowSnapshot,
};

const CHROME: &str = "com.android.chrome";

/// Follows tokio's clock so paused-time tests and cooldowns agree.
struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Default)]
struct SharedWindow(Arc<Mutex<Option<WindowSnapshot<UiSnapshotNode>>>>);

impl SharedWindow {
    fn show(&self, bar: &str) {
        *self.0.lock().unwrap() = Some(WindowSnapshot {
            app_id: CHROME.to_string(),
            root: chrome_with_bar(bar),
        });
    }
}

impl SnapshotSource for SharedWindow {
    type Node = UiSnapshotNode;

    fn capture(&self) -> Option<WindowSnapshot<UiSnapshotNode>> {
        self.0.lock().unwrap().clone()
    }
}

fn chrome_with_bar(text: &str) -> UiSnapshotNode {
    UiSnapshotNode::new("android.widget.FrameLayout").with_child(
        UiSnapshotNode::new("android.widget.EditText")
            .with_resource_id("com.android.chrome:id/url_bar")
            .with_text(text),
    )
}

fn session(sink: &RecordingOverlaySink) -> DetectionSession {
    let config = DetectorConfig::default();
    let gate = UnlockGate::new(Arc::new(InMemoryGateStore::default()), config.unlock_duration());
    DetectionSession::new(config, gate, Box::new(sink.clone()), Arc::new(TokioClock))
        .expect("session")
}

#[tokio::test(start_paused = true)]
async fn polling_opens_overlay_once_and_dismissal_closes_it() {
    let sink = RecordingOverlaySink::new();
    let source = SharedWindow::default();
    source.show("https://www.pornhub.com/video");

    let mut controller = DetectionController::new();
    let handle = controller
        .start(session(&sink), source.clone())
        .expect("start");

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert_eq!(sink.open_count(), 1);
    let status = handle.status();
    assert!(status.is_open());
    assert_eq!(status.blocked_domain.as_deref(), Some("pornhub.com"));

    handle.dismiss().expect("dismiss");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.status().is_open());
    assert_eq!(
        sink.calls().last(),
        Some(&OverlayCall::ReturnToSource {
            source_app_id: CHROME.into()
        })
    );

    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn hover_preview_that_vanishes_before_recheck_never_blocks() {
    let sink = RecordingOverlaySink::new();
    let source = SharedWindow::default();
    source.show("google.com/search?q=cats");

    let mut controller = DetectionController::new();
    let _handle = controller
        .start(session(&sink), source.clone())
        .expect("start");

    tokio::time::sleep(Duration::from_millis(250)).await;
    source.show("xvideos.com");
    tokio::time::sleep(Duration::from_millis(450)).await;
    source.show("google.com/search?q=cats");
    tokio::time::sleep(Duration::from_millis(3_000)).await;

    assert_eq!(sink.open_count(), 0);
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn navigation_that_persists_past_transition_delay_is_blocked_once() {
    let sink = RecordingOverlaySink::new();
    let source = SharedWindow::default();
    source.show("google.com/search?q=x");

    let mut controller = DetectionController::new();
    let handle = controller
        .start(session(&sink), source.clone())
        .expect("start");

    tokio::time::sleep(Duration::from_millis(300)).await;
    source.show("xvideos.com/video1");
    assert!(handle.submit(NavigationEvent::new(
        CHROME,
        EventKind::WindowChanged,
        Some(chrome_with_bar("xvideos.com/video1")),
    )));

    tokio::time::sleep(Duration::from_millis(3_000)).await;

    assert_eq!(sink.open_count(), 1);
    assert_eq!(
        handle.status().blocked_domain.as_deref(),
        Some("xvideos.com")
    );
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn controller_refuses_double_start_and_stops_cleanly() {
    let sink = RecordingOverlaySink::new();
    let mut controller = DetectionController::new();

    let handle = controller
        .start(session(&sink), SharedWindow::default())
        .expect("first start");
    assert!(controller.is_running());
    assert!(controller
        .start(session(&sink), SharedWindow::default())
        .is_err());

    controller.stop().await.expect("stop");
    assert!(!controller.is_running());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.submit(NavigationEvent::new(
        CHROME,
        EventKind::ContentChanged,
        Some(chrome_with_bar("pornhub.com")),
    )));
    assert!(sink.calls().is_empty());
}

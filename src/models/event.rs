use serde::{Deserialize, Serialize};

use super::node::UiNode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    WindowChanged,
    ContentChanged,
    TextChanged,
    Scrolled,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WindowChanged => "WindowChanged",
            EventKind::ContentChanged => "ContentChanged",
            EventKind::TextChanged => "TextChanged",
            EventKind::Scrolled => "Scrolled",
        }
    }
}

/// One notification from the accessibility layer. Consumed once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent<N> {
    pub source_app_id: String,
    pub kind: EventKind,
    pub tree_snapshot: Option<N>,
}

impl<N: UiNode> NavigationEvent<N> {
    pub fn new(source_app_id: impl Into<String>, kind: EventKind, tree_snapshot: Option<N>) -> Self {
        Self {
            source_app_id: source_app_id.into(),
            kind,
            tree_snapshot,
        }
    }
}

/// The foreground window's tree together with the app that owns it.
#[derive(Debug, Clone)]
pub struct WindowSnapshot<N> {
    pub app_id: String,
    pub root: N,
}

/// Pull access to the current UI tree, used on poll ticks and deferred rechecks.
pub trait SnapshotSource: Send + 'static {
    type Node: UiNode + Send + 'static;

    /// `None` when no window is available yet.
    fn capture(&self) -> Option<WindowSnapshot<Self::Node>>;
}

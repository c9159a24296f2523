pub mod candidate;
pub mod event;
pub mod node;

pub use candidate::{ClassificationResult, UrlCandidate};
pub use event::{EventKind, NavigationEvent, SnapshotSource, WindowSnapshot};
pub use node::{UiNode, UiSnapshotNode};

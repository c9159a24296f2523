pub mod controller;
pub mod sink;
pub mod state;

pub use controller::{OpenOutcome, SessionController};
pub use sink::{OverlayCall, OverlaySink, RecordingOverlaySink};
pub use state::{OverlaySession, SessionSnapshot, SessionStatus};

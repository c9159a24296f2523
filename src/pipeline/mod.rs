pub mod config;
pub mod recheck;
pub mod session;

pub use config::DetectorConfig;
pub use recheck::{PendingRechecks, RecheckTicket};
pub use session::{DetectionSession, PassOutcome};

pub mod controller;
pub mod loop_worker;
mod recheck_timers;

pub use controller::{DetectionController, DetectionHandle};
pub use loop_worker::LoopMessage;

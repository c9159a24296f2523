pub mod controller;
pub mod cooldown;

pub use controller::{DebounceController, DebounceDecision};
pub use cooldown::CooldownState;

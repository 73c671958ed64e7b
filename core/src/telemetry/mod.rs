//! telemetry/mod.rs
//! Stage timers recorded by the strategies and the "measure and log" wrapper
//! used by benchmark harnesses.

pub mod timers;
pub mod measure;

pub use timers::*;
pub use measure::*;

//! telemetry/measure.rs
//! Generic wall-clock wrapper: run a computation, report how long it took.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Wall time of one labelled computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub label: String,
    pub elapsed: Duration,
}

impl Measurement {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Run `f`, returning its value together with the elapsed time.
pub fn measure<T>(label: impl Into<String>, f: impl FnOnce() -> T) -> (T, Measurement) {
    let start = Instant::now();
    let value = f();
    let measurement = Measurement {
        label: label.into(),
        elapsed: start.elapsed(),
    };
    (value, measurement)
}

/// Run `f` and log its duration in seconds under `label`.
pub fn measure_and_log<T>(label: impl Into<String>, f: impl FnOnce() -> T) -> T {
    let (value, m) = measure(label, f);
    info!(label = %m.label, seconds = m.seconds(), "{}: {:.3}s", m.label, m.seconds());
    value
}

//! Tick throttling.

use std::time::Duration;

/// Host clocks at the moment a tick is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    /// Host frame counter.
    pub frame: u64,
    /// Real time since the host started.
    pub realtime: Duration,
    /// Simulation universal time (seconds).
    pub universal_time: f64,
}

impl TickClock {
    /// Create a clock reading.
    pub fn new(frame: u64, realtime: Duration, universal_time: f64) -> Self {
        Self {
            frame,
            realtime,
            universal_time,
        }
    }
}

/// Admits at most one tick per frame and per minimum real-time interval.
#[derive(Debug, Clone, Default)]
pub struct TickGate {
    last_frame: Option<u64>,
    last_realtime: Option<Duration>,
}

impl TickGate {
    /// Create a gate that admits the first tick it sees.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick at `clock` may run. Admitting records the clock.
    ///
    /// A real-time clock that went backwards never blocks a tick.
    pub fn admit(&mut self, clock: &TickClock, min_interval: Duration) -> bool {
        if let Some(last) = self.last_realtime {
            if clock.realtime > last && clock.realtime - last < min_interval {
                return false;
            }
        }
        if self.last_frame == Some(clock.frame) {
            return false;
        }

        self.last_frame = Some(clock.frame);
        self.last_realtime = Some(clock.realtime);
        true
    }
}

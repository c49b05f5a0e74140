//! Push switch debouncing
//!
//! The switch is sampled on a fixed period. A level different from the accepted
//! one must hold for the whole window (10 ticks of 10 ms by default) before it
//! is accepted; any sample back at the accepted level restarts the count.
//! Only an accepted press publishes an event.

use super::{EventQueue, KeyEvent};
use crate::PlayerConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Raw switch level source
pub trait SwitchInput: Send {
    /// True while the switch is held down
    fn is_pressed(&self) -> bool;
}

impl<F: Fn() -> bool + Send> SwitchInput for F {
    fn is_pressed(&self) -> bool {
        self()
    }
}

/// Accepted level and countdown of a candidate change
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebounceState {
    /// Accepted switch level
    pub pressed: bool,
    /// Ticks still required before a differing level is accepted (0 = none pending)
    pub pending: u32,
}

/// Switch debouncer, fed one sample per tick
#[derive(Debug, Clone)]
pub struct SwitchDebouncer {
    window: u32,
    state: DebounceState,
}

impl SwitchDebouncer {
    /// Debouncer accepting a change after `window_ticks` consecutive differing samples
    pub fn new(window_ticks: u32) -> Self {
        SwitchDebouncer {
            window: window_ticks.max(1),
            state: DebounceState::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Feed one sample; publishes [`KeyEvent::Enter`] when a press is accepted
    pub fn sample(&mut self, pressed: bool, queue: &EventQueue) -> Option<KeyEvent> {
        if pressed == self.state.pressed {
            self.state.pending = 0;
            return None;
        }
        if self.state.pending == 0 {
            self.state.pending = self.window;
        }
        self.state.pending -= 1;
        if self.state.pending > 0 {
            return None;
        }

        self.state.pressed = pressed;
        trace!(pressed, "switch level accepted");
        let event = pressed.then_some(KeyEvent::Enter)?;
        queue.publish(event);
        Some(event)
    }
}

/// Periodic sampling thread driving a [`SwitchDebouncer`]
pub struct DebounceTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    /// Sample `switch` every `period` until stopped
    pub fn spawn<S: SwitchInput + 'static>(
        mut debouncer: SwitchDebouncer,
        switch: S,
        queue: Arc<EventQueue>,
        period: Duration,
    ) -> crate::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("debounce".into())
            .spawn(move || {
                let mut deadline = Instant::now();
                while !thread_stop.load(Ordering::Relaxed) {
                    debouncer.sample(switch.is_pressed(), &queue);
                    deadline += period;
                    let now = Instant::now();
                    if deadline > now {
                        spin_sleep::sleep(deadline - now);
                    } else {
                        // fell behind; don't try to catch up with a burst of samples
                        deadline = now;
                    }
                }
                debug!("debounce timer stopped");
            })?;
        Ok(DebounceTimer {
            stop,
            handle: Some(handle),
        })
    }

    /// Sample `switch` with the configured window and tick period
    pub fn from_config<S: SwitchInput + 'static>(
        config: &PlayerConfig,
        switch: S,
        queue: Arc<EventQueue>,
    ) -> crate::Result<Self> {
        let window = config.debounce_ticks();
        let period = config.debounce_period();
        debug!(window, ?period, "starting debounce timer");
        Self::spawn(SwitchDebouncer::new(window), switch, queue, period)
    }

    /// Stop sampling and wait for the thread to exit
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("debounce timer thread panicked");
            }
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.halt();
    }
}

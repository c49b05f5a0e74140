//! Hardware-paced pulse engine
//!
//! A bounded FIFO of [`PulseQueueEntry`] with one worker thread on the consumer
//! side. The producer blocks while the FIFO is full; the worker expands each entry
//! into line levels and holds each one for its tick count through the pacer.
//!
//! # Thread Safety
//! - Any number of producers may call [`PulseEngine::enqueue`]; entries are
//!   shifted in acceptance order
//! - The output line and pacer are owned by the worker thread
//! - Queue state lives behind a `parking_lot::Mutex` with condition variables for
//!   "not full", "not empty" and "drained"

use super::line::OutputLine;
use super::pacer::Pacer;
use super::{ClockDivider, PulseQueueEntry, PulseSink, WaveTiming};
use crate::{K7Error, PlayerConfig, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Counters for monitoring the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Bytes fully shifted out
    pub bytes_shifted: u64,
    /// Ticks emitted, silence included
    pub ticks_emitted: u64,
    /// Times `enqueue` had to wait for room
    pub producer_stalls: u64,
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<PulseQueueEntry>,
    /// An entry has been taken by the worker and is still being shifted
    in_flight: bool,
    shutdown: bool,
    /// The worker thread has exited; nothing will be shifted any more
    worker_exited: bool,
    /// First output error; reported by `shutdown`
    failure: Option<K7Error>,
    stats: EngineStats,
}

impl QueueState {
    fn is_draining(&self) -> bool {
        !self.entries.is_empty() || self.in_flight
    }
}

struct Shared {
    state: Mutex<QueueState>,
    not_full: Condvar,
    not_empty: Condvar,
    drained: Condvar,
    depth: usize,
}

/// Pulse Timing Engine
pub struct PulseEngine {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<Result<()>>>,
    divider: ClockDivider,
}

impl PulseEngine {
    /// Start the engine with its worker thread
    pub fn start(
        config: &PlayerConfig,
        line: Box<dyn OutputLine>,
        pacer: Box<dyn Pacer>,
    ) -> Result<Self> {
        config.validate()?;
        let divider = ClockDivider::new(config.system_clock_hz, config.tick_hz)?;
        let timing = WaveTiming::for_tick_rate(divider.tick_hz())?;

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            drained: Condvar::new(),
            depth: config.fifo_depth,
        });

        let worker = Worker {
            shared: Arc::clone(&shared),
            line,
            pacer,
            timing,
            invert: config.invert_output,
        };
        let handle = std::thread::Builder::new()
            .name("pulse-engine".into())
            .spawn(move || worker.run())?;

        debug!(
            divider = divider.divider(),
            tick_hz = divider.tick_hz(),
            depth = config.fifo_depth,
            "pulse engine started"
        );

        Ok(PulseEngine {
            shared,
            worker: Some(handle),
            divider,
        })
    }

    /// Queue an entry, blocking while the FIFO is full
    ///
    /// Entries offered after the worker has died are discarded; the failure is
    /// reported by [`PulseEngine::shutdown`].
    pub fn enqueue_entry(&self, entry: PulseQueueEntry) {
        let mut state = self.shared.state.lock();
        if state.entries.len() >= self.shared.depth && !state.worker_exited {
            state.stats.producer_stalls += 1;
            while state.entries.len() >= self.shared.depth && !state.worker_exited {
                self.shared.not_full.wait(&mut state);
            }
        }
        if state.worker_exited {
            debug!(?entry, "pulse engine worker gone, discarding entry");
            return;
        }
        state.entries.push_back(entry);
        self.shared.not_empty.notify_one();
    }

    /// True while accepted entries remain to be shifted out
    pub fn is_draining(&self) -> bool {
        self.shared.state.lock().is_draining()
    }

    /// Current counters
    pub fn stats(&self) -> EngineStats {
        self.shared.state.lock().stats
    }

    /// Divider the engine was configured with
    pub fn divider(&self) -> &ClockDivider {
        &self.divider
    }

    /// Shift out everything queued, stop the worker and finish the line
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            self.shared.not_empty.notify_all();
        }
        let finished = handle.join();
        let failure = self.shared.state.lock().failure.take();
        debug!(stats = ?self.stats(), "pulse engine stopped");
        match (failure, finished) {
            (Some(err), _) => Err(err),
            (None, Ok(result)) => result,
            (None, Err(_)) => Err(K7Error::Other("pulse engine worker panicked".into())),
        }
    }
}

impl PulseSink for PulseEngine {
    fn enqueue(&self, byte: u8) {
        self.enqueue_entry(PulseQueueEntry::Byte(byte));
    }

    fn drain_wait(&self) {
        let mut state = self.shared.state.lock();
        while state.is_draining() && !state.worker_exited {
            self.shared.drained.wait(&mut state);
        }
    }

    fn settle(&self, duration: Duration) {
        let mut ticks = self.divider.ticks_for(duration);
        while ticks > 0 {
            let chunk = ticks.min(u32::MAX as u64);
            self.enqueue_entry(PulseQueueEntry::Idle(chunk as u32));
            ticks -= chunk;
        }
        self.drain_wait();
    }
}

impl Drop for PulseEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("pulse engine stopped with error: {e}");
        }
    }
}

struct Worker {
    shared: Arc<Shared>,
    line: Box<dyn OutputLine>,
    pacer: Box<dyn Pacer>,
    timing: WaveTiming,
    invert: bool,
}

/// Marks the worker as gone and wakes every waiter, however the worker exits
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let mut state = self.0.state.lock();
        if std::thread::panicking() {
            warn!(
                discarded = state.entries.len(),
                "pulse engine worker panicked"
            );
            if state.failure.is_none() {
                state.failure = Some(K7Error::OutputError(
                    "pulse engine worker panicked".into(),
                ));
            }
        }
        state.worker_exited = true;
        state.in_flight = false;
        state.entries.clear();
        self.0.not_full.notify_all();
        self.0.not_empty.notify_all();
        self.0.drained.notify_all();
    }
}

impl Worker {
    fn run(mut self) -> Result<()> {
        let _exit = ExitGuard(Arc::clone(&self.shared));
        while let Some(entry) = self.next_entry() {
            let shifted = self.shift(entry);

            let mut state = self.shared.state.lock();
            state.in_flight = false;
            match shifted {
                Ok(ticks) => {
                    state.stats.ticks_emitted += ticks;
                    if matches!(entry, PulseQueueEntry::Byte(_)) {
                        state.stats.bytes_shifted += 1;
                    }
                }
                Err(e) => {
                    if state.failure.is_none() {
                        warn!("output line error: {e}");
                        state.failure = Some(e);
                    }
                }
            }
            if state.entries.is_empty() {
                self.shared.drained.notify_all();
            }
        }
        self.line.finish()
    }

    /// Wait for the next entry; `None` once shut down with nothing left to shift
    fn next_entry(&mut self) -> Option<PulseQueueEntry> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(entry) = state.entries.pop_front() {
                state.in_flight = true;
                self.shared.not_full.notify_one();
                return Some(entry);
            }
            if state.shutdown {
                return None;
            }
            self.pacer.idle();
            self.shared.not_empty.wait(&mut state);
        }
    }

    fn shift(&mut self, entry: PulseQueueEntry) -> Result<u64> {
        let mut ticks = 0u64;
        for segment in self.timing.segments(entry) {
            let level = if self.invert {
                segment.level.inverted()
            } else {
                segment.level
            };
            self.line.emit(level, segment.ticks)?;
            self.pacer.wait_ticks(segment.ticks);
            ticks += segment.ticks as u64;
        }
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::{Level, RecordingLine, Unpaced};

    fn engine(line: &RecordingLine, config: &PlayerConfig) -> PulseEngine {
        PulseEngine::start(config, Box::new(line.clone()), Box::new(Unpaced)).unwrap()
    }

    #[test]
    fn test_bytes_shift_in_order() {
        let line = RecordingLine::new();
        let engine = engine(&line, &PlayerConfig::instant());
        engine.enqueue(0xFF);
        engine.enqueue(0x00);
        engine.drain_wait();
        assert!(!engine.is_draining());

        let segments = line.segments();
        // 0xFF starts with a 9 pulse burst, 0x00 with a 4 pulse burst
        let timing = WaveTiming::for_tick_rate(20_000.0).unwrap();
        let first_byte = timing.byte_segments(0xFF).len();
        assert_eq!(segments.len(), first_byte + timing.byte_segments(0x00).len());
        assert_eq!(engine.stats().bytes_shifted, 2);
        assert_eq!(engine.stats().ticks_emitted, 640 + 400);
        engine.shutdown().unwrap();
    }

    #[test]
    fn test_settle_emits_silence() {
        let line = RecordingLine::new();
        let engine = engine(&line, &PlayerConfig::instant());
        engine.settle(Duration::from_millis(100));
        assert_eq!(line.segments(), vec![(Level::Low, 2000)]);
        engine.shutdown().unwrap();
    }

    #[test]
    fn test_inverted_output() {
        let line = RecordingLine::new();
        let config = PlayerConfig {
            invert_output: true,
            ..PlayerConfig::instant()
        };
        let engine = engine(&line, &config);
        engine.enqueue(0x00);
        engine.drain_wait();
        assert_eq!(line.segments()[0], (Level::Low, 3));
        assert_eq!(line.segments()[1], (Level::High, 3));
        engine.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_flushes_queue() {
        let line = RecordingLine::new();
        let engine = engine(&line, &PlayerConfig::instant());
        for byte in 0..32u8 {
            engine.enqueue(byte);
        }
        engine.shutdown().unwrap();
        let highs = line.segments().iter().filter(|(l, _)| *l == Level::High).count();
        let expected: u32 = (0..32u8)
            .map(|b| 4 * 8 + 5 * b.count_ones())
            .sum();
        assert_eq!(highs as u32, expected);
    }

    struct FailingLine;

    impl OutputLine for FailingLine {
        fn emit(&mut self, _level: Level, _ticks: u32) -> Result<()> {
            Err(K7Error::OutputError("unplugged".into()))
        }
    }

    struct PanickingLine;

    impl OutputLine for PanickingLine {
        fn emit(&mut self, _level: Level, _ticks: u32) -> Result<()> {
            panic!("line driver crashed");
        }
    }

    #[test]
    fn test_worker_panic_releases_producers() {
        let engine = PulseEngine::start(
            &PlayerConfig::instant(),
            Box::new(PanickingLine),
            Box::new(Unpaced),
        )
        .unwrap();
        engine.enqueue(0x55);
        engine.drain_wait();
        assert!(!engine.is_draining());

        // more than the FIFO holds: must not block once the worker is gone
        for byte in 0..32u8 {
            engine.enqueue(byte);
        }
        engine.drain_wait();
        assert_eq!(engine.stats().bytes_shifted, 0);
        assert!(matches!(engine.shutdown(), Err(K7Error::OutputError(_))));
    }

    #[test]
    fn test_line_error_reported_at_shutdown() {
        let engine = PulseEngine::start(
            &PlayerConfig::instant(),
            Box::new(FailingLine),
            Box::new(Unpaced),
        )
        .unwrap();
        engine.enqueue(0x55);
        engine.drain_wait();
        assert!(matches!(engine.shutdown(), Err(K7Error::OutputError(_))));
    }
}

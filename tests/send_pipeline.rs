//! End-to-end transmission tests: storage -> validation -> sender -> engine -> line

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use zxk7::pulse::{Level, PulseEngine, RecordingLine, Unpaced, WavOutputLine, WaveTiming};
use zxk7::sender::TapeSender;
use zxk7::status::{self, Display, Indicator, NoIndicator, Rgb};
use zxk7::storage::FsStorage;
use zxk7::{K7Error, PlayerConfig, ProgramName, PulseSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Settle(Duration),
    Byte(u8),
    Drain,
}

#[derive(Default)]
struct MockSink {
    calls: Mutex<Vec<Call>>,
}

impl PulseSink for MockSink {
    fn enqueue(&self, byte: u8) {
        self.calls.lock().push(Call::Byte(byte));
    }

    fn drain_wait(&self) {
        self.calls.lock().push(Call::Drain);
    }

    fn settle(&self, duration: Duration) {
        self.calls.lock().push(Call::Settle(duration));
    }
}

#[derive(Default)]
struct Screen {
    progress: Vec<u8>,
    status: Vec<String>,
}

impl Display for Screen {
    fn report_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn report_status(&mut self, message: &str) {
        self.status.push(message.to_string());
    }
}

#[derive(Default)]
struct Led(Vec<Rgb>);

impl Indicator for Led {
    fn set_indicator_color(&mut self, color: Rgb) {
        self.0.push(color);
    }
}

/// 200-byte buffer whose E_LINE declares 150 meaningful bytes
fn game_buffer() -> Vec<u8> {
    let mut buffer: Vec<u8> = (0..200).map(|i| (i * 7 % 0x7F) as u8).collect();
    buffer[0] = 0x00;
    buffer[11..13].copy_from_slice(&(0x4009u16 + 150).to_le_bytes());
    buffer[149] = 0x80;
    buffer
}

fn write_game(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("GAME.P");
    std::fs::write(&path, game_buffer()).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_send_file_byte_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_game(&dir);
    let sink = MockSink::default();
    let config = PlayerConfig::default();
    let sender = TapeSender::new(&sink, &config);
    let mut screen = Screen::default();
    let mut led = Led::default();

    sender
        .send_file(&mut FsStorage, &path, &ProgramName::default(), &mut screen, &mut led)
        .unwrap();

    let buffer = game_buffer();
    let mut expected = vec![Call::Settle(Duration::from_secs(3)), Call::Byte(0x29), Call::Byte(0xB6)];
    expected.extend(buffer[..150].iter().map(|&b| Call::Byte(b)));
    expected.push(Call::Drain);
    assert_eq!(*sink.calls.lock(), expected);

    assert_eq!(screen.status, vec!["Sending".to_string(), path]);
    assert_eq!(screen.progress.first(), Some(&0));
    assert_eq!(screen.progress.last(), Some(&100));
    assert_eq!(led.0.last(), Some(&status::READY));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Sink(Call),
    Progress(u8),
}

/// Sink and display writing into one shared log, to check their interleaving
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<Entry>>>);

impl PulseSink for Journal {
    fn enqueue(&self, byte: u8) {
        self.0.lock().push(Entry::Sink(Call::Byte(byte)));
    }

    fn drain_wait(&self) {
        self.0.lock().push(Entry::Sink(Call::Drain));
    }

    fn settle(&self, duration: Duration) {
        self.0.lock().push(Entry::Sink(Call::Settle(duration)));
    }
}

impl Display for Journal {
    fn report_progress(&mut self, percent: u8) {
        self.0.lock().push(Entry::Progress(percent));
    }

    fn report_status(&mut self, _message: &str) {}
}

#[test]
fn test_complete_reported_only_after_drain() {
    let journal = Journal::default();
    let config = PlayerConfig::instant();
    let sender = TapeSender::new(&journal, &config);
    let mut display = journal.clone();

    sender
        .send_raw(&ProgramName::default(), &game_buffer(), &mut display, &mut NoIndicator)
        .unwrap();

    let log = journal.0.lock().clone();
    let drain = log
        .iter()
        .position(|e| *e == Entry::Sink(Call::Drain))
        .unwrap();
    assert_eq!(drain, log.len() - 2);
    assert_eq!(log[drain - 1], Entry::Sink(Call::Byte(0x80)));
    assert_eq!(log[drain + 1], Entry::Progress(100));
    let completes = log.iter().filter(|e| **e == Entry::Progress(100)).count();
    assert_eq!(completes, 1);
}

#[test]
fn test_missing_file_sends_nothing() {
    let sink = MockSink::default();
    let config = PlayerConfig::instant();
    let sender = TapeSender::new(&sink, &config);
    let mut screen = Screen::default();
    let mut led = Led::default();

    let result = sender.send_file(
        &mut FsStorage,
        "/nonexistent/GAME.P",
        &ProgramName::default(),
        &mut screen,
        &mut led,
    );
    assert!(matches!(result, Err(K7Error::StorageUnavailable { .. })));
    assert!(sink.calls.lock().is_empty());
    assert_eq!(screen.status.last().map(String::as_str), Some("File not available"));
    assert_eq!(led.0, vec![status::FAILURE]);
}

#[test]
fn test_engine_line_carries_whole_transmission() {
    let line = RecordingLine::new();
    let config = PlayerConfig {
        settle_ms: 10,
        ..PlayerConfig::default()
    };
    let engine = PulseEngine::start(&config, Box::new(line.clone()), Box::new(Unpaced)).unwrap();
    let sender = TapeSender::new(&engine, &config);
    let mut screen = Screen::default();

    sender
        .send_raw(&ProgramName::default(), &game_buffer(), &mut screen, &mut NoIndicator)
        .unwrap();
    assert!(!engine.is_draining());
    assert_eq!(engine.stats().bytes_shifted, 152);
    engine.shutdown().unwrap();

    let timing = WaveTiming::for_tick_rate(20_000.0).unwrap();
    let bytes: Vec<u8> = [0x29, 0xB6]
        .into_iter()
        .chain(game_buffer()[..150].iter().copied())
        .collect();
    let pulses: u32 = bytes.iter().map(|b| 4 * 8 + 5 * b.count_ones()).sum();
    let payload_ticks: u64 = bytes.iter().map(|&b| timing.byte_ticks(b) as u64).sum();

    let segments = line.segments();
    // 10 ms of settling silence comes first
    assert_eq!(segments[0], (Level::Low, 200));
    let highs = segments.iter().filter(|(l, _)| *l == Level::High).count();
    assert_eq!(highs as u32, pulses);
    assert_eq!(line.ticks_at(Level::High) + line.ticks_at(Level::Low), payload_ticks + 200);
}

#[test]
fn test_render_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_game(&dir);
    let wav_path = dir.path().join("game.wav");
    let config = PlayerConfig::instant();

    let line = WavOutputLine::create(&wav_path, &config).unwrap();
    let engine = PulseEngine::start(&config, Box::new(line), Box::new(Unpaced)).unwrap();
    let sender = TapeSender::new(&engine, &config);
    sender
        .send_file(
            &mut FsStorage,
            &path,
            &ProgramName::default(),
            &mut Screen::default(),
            &mut NoIndicator,
        )
        .unwrap();
    let ticks = engine.stats().ticks_emitted;
    engine.shutdown().unwrap();

    let reader = hound::WavReader::open(&wav_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 44_100);
    assert_eq!(reader.spec().channels, 1);
    // 20 kHz ticks rendered at 44.1 kHz
    let expected = (ticks as f64 * 44_100.0 / 20_000.0).round() as i64;
    assert!((reader.len() as i64 - expected).abs() <= 1);
}

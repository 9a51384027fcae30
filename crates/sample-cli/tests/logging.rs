use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use sample_cli::logging::{LogConfig, LogFormat, init_logging_with_writer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn config(format: LogFormat) -> LogConfig {
    LogConfig {
        level_filter: LevelFilter::INFO,
        use_env_filter: false,
        with_ansi: false,
        format,
        ..LogConfig::default()
    }
}

#[test]
fn json_events_go_to_writer() {
    let capture = Capture::default();
    let guard = init_logging_with_writer(&config(LogFormat::Json), capture.clone());
    tracing::info!(target: "sample_core", samples = 3, "sample set imported");
    tracing::debug!(target: "sample_core", "hidden below info");
    drop(guard);

    let output = capture.contents();
    assert!(output.contains("\"samples\":3"));
    assert!(output.contains("sample set imported"));
    assert!(!output.contains("hidden below info"));
}

#[test]
fn dropping_guard_stops_logging() {
    let capture = Capture::default();
    let guard = init_logging_with_writer(&config(LogFormat::Compact), capture.clone());
    drop(guard);
    tracing::warn!(target: "sample_core", "after teardown");
    assert!(capture.contents().is_empty());
}

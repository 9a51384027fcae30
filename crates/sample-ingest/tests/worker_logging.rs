use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sample_ingest::read_table;
use tempfile::TempDir;
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

#[test]
fn worker_events_reach_caller_subscriber() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("enigma.csv");
    std::fs::write(&path, "Name,Depth (m)\nWell-1,12.5\n").unwrap();

    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(LevelFilter::DEBUG)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let span = tracing::info_span!("import", set = "wells");
        let _enter = span.enter();
        read_table(&path, 0, Duration::from_secs(10)).unwrap();
    });

    let output = capture.contents();
    assert!(output.contains("reading sample sheet"), "{output}");
    assert!(output.contains("read delimited file"), "{output}");
    let line = output
        .lines()
        .find(|line| line.contains("read delimited file"))
        .unwrap();
    assert!(line.contains("import{set=\"wells\"}"), "{line}");
}

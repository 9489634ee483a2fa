use std::io;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use worker::{console_error, console_log, Request};

static INIT: Once = Once::new();

/// Installs the global subscriber once per isolate. Output goes to the
/// Workers console, which timestamps lines itself.
pub fn init(level: Level) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .with_max_level(level)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

pub fn log_request(req: &Request, request_id: &str) {
    tracing::info!(request_id, "{} {}", req.method().to_string(), req.path());
}

pub fn log_response(status: u16, request_id: &str, elapsed_ms: u64) {
    if status >= 500 {
        tracing::error!(request_id, status, elapsed_ms, "request failed");
    } else {
        tracing::info!(request_id, status, elapsed_ms, "request done");
    }
}

pub fn log_error(msg: &str) {
    tracing::error!("{msg}");
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            buf: Vec::new(),
            error: *meta.level() <= Level::WARN,
        }
    }
}

/// Buffers one formatted event and emits it when dropped.
#[derive(Default)]
struct ConsoleWriter {
    buf: Vec<u8>,
    error: bool,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if self.error {
            console_error!("{}", line);
        } else {
            console_log!("{}", line);
        }
    }
}

//! Browser console logging.

use std::io::{self, Write};

use breeze::logging::{LogConfig, init_logging_with_writer};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::writer::MakeWriter;
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

/// [`MakeWriter`] sending each formatted event to the console method matching
/// its level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

/// One buffered console line, flushed on drop.
#[derive(Debug)]
pub struct ConsoleLine {
    level: Level,
    buffer: Vec<u8>,
}

impl Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = JsValue::from_str(text.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}

/// Routes panics and `tracing` events to the browser console (idempotent).
///
/// Returns `true` if this call installed the subscriber.
pub fn install_logging(config: &LogConfig) -> bool {
    console_error_panic_hook::set_once();
    init_logging_with_writer(config, ConsoleWriter)
}

/// JavaScript entry point for [`install_logging`]. `level` takes filter
/// directives such as `"debug"`; it defaults to `"info"`.
#[wasm_bindgen(js_name = installLogging)]
pub fn install_logging_js(level: Option<String>) -> bool {
    let config = level.map_or_else(LogConfig::new, |level| LogConfig::new().with_level(level));
    install_logging(&config)
}

//! Tracing subscriber setup.
//!
//! Every Breeze crate logs through [`tracing`]. Hosts that do not install their
//! own subscriber can call [`init_logging`] once at startup to get prefixed,
//! single-line output on stderr filtered by `RUST_LOG` or [`LogConfig::level`].

use std::io::{self, Write};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const TRACING_PREFIX: &str = "[breeze]";
const DEFAULT_LOG_LEVEL: &str = "info";

static TRACING_INSTALLED: Once = Once::new();

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset, e.g. `"debug"` or
    /// `"warn,breeze_core=trace"`.
    pub level: String,
    /// Emit ANSI colors in field output.
    pub ansi: bool,
}

impl LogConfig {
    /// `info` level, no colors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            ansi: false,
        }
    }

    /// Sets the fallback filter directives.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Enables or disables ANSI colors.
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// The filter described by [`LogConfig::level`], falling back to `info`
    /// when the directives do not parse.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber writing to stderr (idempotent).
///
/// Returns `true` if this call installed it.
pub fn init_logging(config: &LogConfig) -> bool {
    init_logging_with_writer(config, io::stderr)
}

/// Installs the global subscriber writing through `writer` (idempotent).
///
/// `RUST_LOG` takes precedence over [`LogConfig::level`] when it is set and
/// valid. Returns `true` if this call installed the subscriber; `false` if one
/// was already installed, by Breeze or by the host.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let mut installed = false;
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.filter());
        installed = subscriber(filter, config.ansi, writer).try_init().is_ok();
        if !installed {
            eprintln!("{TRACING_PREFIX} a global tracing subscriber is already installed");
        }
    });
    installed
}

fn subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console = fmt::layer()
        .event_format(LineFormat)
        .with_writer(Prefixed(writer))
        .with_ansi(ansi)
        .with_filter(filter);
    tracing_subscriber::registry().with(console)
}

// ============================================================================
// Output
// ============================================================================

#[derive(Clone, Default)]
struct Prefixed<M>(M);

impl<'a, M> MakeWriter<'a> for Prefixed<M>
where
    M: MakeWriter<'a>,
{
    type Writer = PrefixedWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixedWriter {
            inner: self.0.make_writer(),
            wrote_prefix: false,
        }
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        PrefixedWriter {
            inner: self.0.make_writer_for(meta),
            wrote_prefix: false,
        }
    }
}

struct PrefixedWriter<W> {
    inner: W,
    wrote_prefix: bool,
}

impl<W: Write> Write for PrefixedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.wrote_prefix {
            self.inner.write_all(TRACING_PREFIX.as_bytes())?;
            self.inner.write_all(b" ")?;
            self.wrote_prefix = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `LEVEL target: message field=value`
#[derive(Clone, Copy, Default)]
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(writer, "{} {}: ", metadata.level(), metadata.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

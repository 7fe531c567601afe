use anyhow::{Context, Result, bail};
use chrono::Local;
use std::{
    fmt,
    fs::File,
    io::{self, IsTerminal},
    path::Path,
    sync::Mutex,
};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "info";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const DIM: &str = "2";
const CYAN: &str = "36";

// --- Formatter ---

/// One line per event: `2024-07-31 09:15:02.114 INFO  loader.rs:88 message`.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        paint(&mut writer, ansi, DIM, Local::now().format(TIMESTAMP_FORMAT))?;
        writer.write_char(' ')?;
        let level = *meta.level();
        paint(&mut writer, ansi, level_style(level), format_args!("{level:<5}"))?;
        writer.write_char(' ')?;
        if let Some(location) = source_location(meta) {
            paint(&mut writer, ansi, CYAN, location)?;
            writer.write_char(' ')?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Writes `text`, wrapped in the SGR `style` when the writer takes colour.
fn paint(
    writer: &mut Writer<'_>,
    ansi: bool,
    style: &str,
    text: impl fmt::Display,
) -> fmt::Result {
    if ansi {
        write!(writer, "\x1b[{style}m{text}\x1b[0m")
    } else {
        write!(writer, "{text}")
    }
}

fn level_style(level: Level) -> &'static str {
    match level {
        Level::ERROR => "1;31",
        Level::WARN => "1;33",
        Level::INFO => "32",
        Level::DEBUG => "34",
        Level::TRACE => "35",
    }
}

/// `file.rs:line`, without the directories leading to the file.
fn source_location(meta: &Metadata<'_>) -> Option<String> {
    let file = meta.file()?;
    let line = meta.line()?;
    let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    Some(format!("{name}:{line}"))
}

// --- Filter ---

/// Picks the log filter: an explicit directive wins over `RUST_LOG`, which
/// wins over the `info` default.
///
/// Accepts a bare level ("error", "warn", "info", "debug", "trace") or any
/// full EnvFilter directive.
fn make_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

// --- Public API ---

/// Initializes logging. Call once at startup.
///
/// - Stdout: colored when attached to a terminal, plain when piped.
/// - File: appended to `log_file` when given; the directory must exist.
/// - Level: `level` when given, else `RUST_LOG`, else INFO.
///
/// A second call leaves the first subscriber in place. It succeeds when no
/// log file is asked for, and fails without creating the file otherwise,
/// since the installed subscriber would never write to it.
pub fn init_logging(
    level: Option<&str>,
    log_file: Option<&Path>,
) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        if let Some(path) = log_file {
            bail!(
                "logging is already initialized, cannot add log file '{}'",
                path.display()
            );
        }
        return Ok(());
    }

    let filter = make_filter(level)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stdout().is_terminal());

    let file_layer = log_file
        .map(open_log_file)
        .transpose()?
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(LocalFmt)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the log subscriber")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn explicit_level_is_accepted() {
        assert!(make_filter(Some("debug")).is_ok());
        assert!(make_filter(Some("itr_core=trace,warn")).is_ok());
    }

    #[test]
    fn malformed_level_is_rejected() {
        let err = make_filter(Some("itr_core=loud")).unwrap_err();

        assert!(err.to_string().contains("invalid log level"), "got: {err}");
    }

    #[test]
    fn missing_level_falls_back_to_default() {
        assert!(make_filter(None).is_ok());
    }

    #[test]
    fn log_file_in_missing_directory_is_reported() {
        let path = Path::new("/nonexistent-itr-logs/itr-rules.log");

        let err = open_log_file(path).unwrap_err();

        assert!(err.to_string().contains("itr-rules.log"), "got: {err}");
    }

    #[test]
    fn paint_wraps_text_only_when_colour_is_on() {
        let mut coloured = String::new();
        let mut plain = String::new();

        paint(&mut Writer::new(&mut coloured), true, "1;31", "ERROR").unwrap();
        paint(&mut Writer::new(&mut plain), false, "1;31", "ERROR").unwrap();

        assert_eq!(coloured, "\x1b[1;31mERROR\x1b[0m");
        assert_eq!(plain, "ERROR");
    }

    #[test]
    fn second_init_with_log_file_fails_without_creating_it() {
        let path = std::env::temp_dir().join(format!("itr-rules-{}.log", std::process::id()));

        init_logging(None, None).expect("first initialization");
        let err = init_logging(None, Some(&path)).unwrap_err();

        assert!(err.to_string().contains("already initialized"), "got: {err}");
        assert!(!path.exists());
        assert!(init_logging(None, None).is_ok());
    }
}

//local shortcuts

//third-party shortcuts
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

//standard shortcuts
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

//-------------------------------------------------------------------------------------------------------------------

static LOG_ENABLED: AtomicBool = AtomicBool::new(true);

/// Enables or disables payload-bearing `trace!` events (request/response bodies, RTT frame contents). Lifecycle
/// events (`debug`/`info`/`warn`/`error`) are never gated here; filter those at the subscriber the way `tracing`
/// normally expects.
pub fn set_log_enabled(enabled: bool)
{
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
}

pub(crate) fn log_enabled() -> bool
{
    LOG_ENABLED.load(Ordering::Relaxed)
}

//-------------------------------------------------------------------------------------------------------------------

/// Field names never allowed to reach a log sink unredacted.
const SENSITIVE_FIELDS: &[&str] = &["secretKey", "serverSecret", "apiKey", "secret", "token", "X-RTT-SECRET"];

fn is_sensitive(field_name: &str) -> bool
{
    SENSITIVE_FIELDS.iter().any(|candidate| candidate.eq_ignore_ascii_case(field_name))
}

//-------------------------------------------------------------------------------------------------------------------

/// Destination for formatted log lines. `StderrSink` is the crate's default; callers needing a file (with
/// whatever rotation/retention policy they want) supply their own implementation rather than the crate inventing
/// bespoke file-writing machinery.
pub trait LogSink: Send + Sync
{
    fn write_line(&self, line: &str);
}

/// Writes every line to stderr, matching `tracing_subscriber::fmt`'s default destination.
#[derive(Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink
{
    fn write_line(&self, line: &str)
    {
        let _ = writeln!(std::io::stderr(), "{line}");
    }
}

/// Appends every line to a file, flushing after each write. No rotation, no size cap: callers who need either
/// should implement [`LogSink`] themselves and hand it to [`SecretRedactingLayer::new`].
#[derive(Debug)]
pub struct FileSink
{
    file: Mutex<File>,
}

impl FileSink
{
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self>
    {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self{ file: Mutex::new(file) })
    }
}

impl LogSink for FileSink
{
    fn write_line(&self, line: &str)
    {
        let mut file = self.file.lock().unwrap_or_else(|poison| poison.into_inner());
        let _ = writeln!(file, "{line}");
        let _ = file.flush();
    }
}

//-------------------------------------------------------------------------------------------------------------------

struct RedactingVisitor
{
    message: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl RedactingVisitor
{
    fn new() -> Self
    {
        Self{ message: None, fields: Vec::new() }
    }

    fn push(&mut self, field: &Field, value: String)
    {
        let name = field.name();
        let value = if is_sensitive(name) { "[REDACTED]".to_string() } else { value };

        if name == "message"
        {
            self.message = Some(value);
        }
        else
        {
            self.fields.push((name, value));
        }
    }
}

impl Visit for RedactingVisitor
{
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug)
    {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str)
    {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64)
    {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64)
    {
        self.push(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool)
    {
        self.push(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64)
    {
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static))
    {
        self.push(field, value.to_string());
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A `tracing_subscriber::Layer` that formats every event to a [`LogSink`], redacting any field named like a
/// credential (`secretKey`, `serverSecret`, `apiKey`, `secret`, `token`, `X-RTT-SECRET`) with `[REDACTED]` first.
/// Payload-bearing `trace!` events are additionally gated by [`set_log_enabled`]; everything at `debug` and above
/// always passes through (filter those at the subscriber if you want them silenced too).
pub struct SecretRedactingLayer
{
    sink: Arc<dyn LogSink>,
}

impl Default for SecretRedactingLayer
{
    fn default() -> Self
    {
        Self::new(Arc::new(StderrSink))
    }
}

impl SecretRedactingLayer
{
    pub fn new(sink: Arc<dyn LogSink>) -> Self
    {
        Self{ sink }
    }
}

impl<S: Subscriber> Layer<S> for SecretRedactingLayer
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>)
    {
        let metadata = event.metadata();
        if *metadata.level() == Level::TRACE && !log_enabled()
        {
            return;
        }

        let mut visitor = RedactingVisitor::new();
        event.record(&mut visitor);

        let mut line = format!("{:>5} {}", metadata.level(), metadata.target());
        if let Some(message) = visitor.message
        {
            line.push(' ');
            line.push_str(&message);
        }
        for (name, value) in visitor.fields
        {
            line.push_str(&format!(" {name}={value}"));
        }

        self.sink.write_line(&line);
    }
}

//-------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests
{
    use super::*;
    use tracing_subscriber::prelude::*;

    #[derive(Default)]
    struct RecordingSink
    {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for RecordingSink
    {
        fn write_line(&self, line: &str)
        {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    #[test]
    fn is_sensitive_matches_known_credential_fields()
    {
        assert!(is_sensitive("secretKey"));
        assert!(is_sensitive("serverSecret"));
        assert!(is_sensitive("apiKey"));
        assert!(is_sensitive("token"));
        assert!(is_sensitive("X-RTT-SECRET"));
        assert!(!is_sensitive("sessionId"));
    }

    #[test]
    fn set_log_enabled_round_trips()
    {
        set_log_enabled(false);
        assert!(!log_enabled());
        set_log_enabled(true);
        assert!(log_enabled());
    }

    #[test]
    fn redacts_sensitive_fields_but_keeps_others()
    {
        let sink = Arc::new(RecordingSink::default());
        let layer = SecretRedactingLayer::new(sink.clone());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(sessionId = "abc", secretKey = "shh", "authenticated");
        });

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("sessionId=abc"));
        assert!(lines[0].contains("secretKey=[REDACTED]"));
        assert!(!lines[0].contains("shh"));
    }
}

//-------------------------------------------------------------------------------------------------------------------

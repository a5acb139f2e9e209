//! # smpl-cli::logging
//!
//! A custom `tracing` formatter that surfaces the `facility` field
//! `smpl-core` attaches to its `#[tracing::instrument]`ed spans, so a
//! running scenario reads as a stream of per-facility state transitions
//! rather than an undifferentiated log.

use std::fmt;
use tracing::field::Field;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FormatEvent, FormatFields},
    registry::LookupSpan,
};

/// Colorized formatter used in interactive (non-JSON) mode.
pub struct SimulationFormatter {
    timer: std::time::Instant,
}

impl SimulationFormatter {
    pub fn new() -> Self {
        Self {
            timer: std::time::Instant::now(),
        }
    }

    fn extract_facility(event: &Event) -> Option<String> {
        let mut visitor = FacilityExtractor::default();
        event.record(&mut visitor);
        visitor.facility
    }
}

#[derive(Default)]
struct FacilityExtractor {
    facility: Option<String>,
}

impl tracing::field::Visit for FacilityExtractor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "facility" {
            self.facility = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "facility" && self.facility.is_none() {
            self.facility = Some(format!("{:?}", value));
        }
    }

    fn record_u64(&mut self, _field: &Field, _value: u64) {}
    fn record_i64(&mut self, _field: &Field, _value: i64) {}
    fn record_bool(&mut self, _field: &Field, _value: bool) {}
    fn record_error(&mut self, _field: &Field, _value: &(dyn std::error::Error + 'static)) {}
}

impl<S, N> FormatEvent<S, N> for SimulationFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let elapsed = self.timer.elapsed();
        let metadata = event.metadata();

        write!(writer, "\x1b[90m[{:>8.3}s]\x1b[0m ", elapsed.as_secs_f64())?;

        let level = metadata.level();
        let level_color = match *level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[90m",
        };
        write!(writer, "{}[{:>5}]\x1b[0m ", level_color, level)?;

        if let Some(facility) = Self::extract_facility(event) {
            write!(writer, "\x1b[35m[{}]\x1b[0m ", facility)?;
        }

        let target = metadata.target();
        if target != env!("CARGO_PKG_NAME") && !target.starts_with("smpl_core") {
            write!(writer, "\x1b[90m[{}]\x1b[0m ", target)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Minimal formatter used when the scenario itself is expected to carry the
/// signal (the domain `Tracer`'s own lines), so `tracing` output stays to
/// warnings and errors only.
pub struct HeadlessFormatter;

impl<S, N> FormatEvent<S, N> for HeadlessFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if matches!(*metadata.level(), tracing::Level::DEBUG | tracing::Level::TRACE) {
            return Ok(());
        }
        write!(writer, "[{:>5}] ", metadata.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

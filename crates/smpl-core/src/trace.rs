//! # smpl-core::trace
//!
//! The domain-level trace sink exposed by `trace()`/`sendto()` (spec.md
//! §6) — not to be confused with the `tracing` crate instrumentation
//! sprinkled through `facility.rs`/`kernel.rs`, which is operator-facing
//! diagnostics. This is a user-facing log of simulated state transitions,
//! in the original library's literal line format.

use smpl_types::time::SimTime;
use std::io::Write;

/// Writes formatted trace lines describing kernel state transitions, when
/// enabled. Defaults to stdout; swappable via `sendto`.
pub struct Tracer {
    on: bool,
    sink: Box<dyn Write + Send>,
}

impl Tracer {
    pub fn new() -> Self {
        Self {
            on: false,
            sink: Box::new(std::io::stdout()),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Replaces the trace sink.
    pub fn set_sink(&mut self, sink: Box<dyn Write + Send>) {
        self.sink = sink;
    }

    /// Borrows the current trace sink, equivalent to spec.md's `sendto()`
    /// accessor. A `Box<dyn Write + Send>` cannot be returned by value
    /// without cloning the underlying stream, which most sinks (files,
    /// sockets) don't support, so this hands back a mutable reference
    /// instead of a second owning handle.
    pub fn sink_mut(&mut self) -> &mut (dyn Write + Send) {
        &mut *self.sink
    }

    /// Emits a trace line at `clock`, if tracing is on. Format:
    /// `At time %12.3f -- %s\n`.
    pub fn emit(&mut self, clock: SimTime, message: &str) {
        if !self.on {
            return;
        }
        let _ = writeln!(self.sink, "At time {:12.3} -- {}", clock, message);
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer").field("on", &self.on).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_is_silent_when_off() {
        let captured = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut tracer = Tracer::new();
        tracer.set_sink(Box::new(CapturingSink(captured.clone())));
        tracer.emit(3.0, "hello");
        assert!(captured.lock().unwrap().is_empty());
    }

    #[test]
    fn emit_writes_the_fixed_format_when_on() {
        let mut tracer = Tracer::new();
        let captured = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        tracer.set_sink(Box::new(CapturingSink(captured.clone())));
        tracer.set_on(true);
        tracer.emit(3.5, "CAUSE EVENT 1 FOR TOKEN 10");
        let written = captured.lock().unwrap();
        let text = String::from_utf8(written.clone()).unwrap();
        assert_eq!(text, "At time        3.500 -- CAUSE EVENT 1 FOR TOKEN 10\n");
    }

    struct CapturingSink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
    impl Write for CapturingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

}

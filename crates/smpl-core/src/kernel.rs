//! # smpl-core::kernel
//!
//! `Kernel<Tok>` owns the clock, event list, facility registry, RNG, and
//! trace sink, and exposes the public operations spec.md §6 names. Shaped
//! after `ftsim-engine::sim::Simulation` — one struct owning everything,
//! one impl block per concern, hot paths wrapped in `tracing::instrument` —
//! but single-threaded and free of the teacher's raw-pointer borrow
//! workarounds: there is no analogue here to a `Node` needing simultaneous
//! mutable access to the `Simulation` that owns it.

use smpl_types::{
    error::KernelError,
    ids::{EventCode, FacilityId},
    metrics as met,
    time::{SimTime, SIM_EPOCH},
    Token,
};
use std::io::Write;

use crate::event::{EventList, EventPool};
use crate::facility::{Facility, Outcome};
use crate::rng::Rng;
use crate::trace::Tracer;

/// The discrete-event simulation kernel.
pub struct Kernel<Tok: Token> {
    model_name: String,
    clock: SimTime,
    interval_start: SimTime,
    pool: EventPool<Tok>,
    events: EventList<Tok>,
    facilities: Vec<Facility<Tok>>,
    last_dispatched_event_code: EventCode,
    last_dispatched_token: Option<Tok>,
    rng: Rng,
    tracer: Tracer,
}

impl<Tok: Token> Kernel<Tok> {
    /// Builds a kernel and immediately `init`s it with `model_name`,
    /// selecting RNG stream 1.
    pub fn new(model_name: impl Into<String>) -> Result<Self, KernelError> {
        let mut kernel = Self {
            model_name: String::new(),
            clock: SIM_EPOCH,
            interval_start: SIM_EPOCH,
            pool: EventPool::new(),
            events: EventList::new(),
            facilities: Vec::new(),
            last_dispatched_event_code: 0,
            last_dispatched_token: None,
            // Sentinel: `init` rotates to `stream() % 15 + 1`, so starting
            // at 15 makes the very first `init` land on stream 1 as
            // spec.md's rotation requires. Never observed directly — `init`
            // overwrites it before `new` returns.
            rng: Rng::with_stream(15)?,
            tracer: Tracer::new(),
        };
        kernel.init(model_name)?;
        Ok(kernel)
    }

    /// Resets the clock, empties every list, clears the facility registry,
    /// rotates to the next of the 15 RNG seed streams, and records the
    /// model name.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn init(&mut self, model_name: impl Into<String>) -> Result<(), KernelError> {
        let model_name = model_name.into();
        if model_name.trim().is_empty() {
            return Err(KernelError::EmptyModelName);
        }
        self.model_name = model_name;
        self.clock = SIM_EPOCH;
        self.interval_start = SIM_EPOCH;
        self.pool = EventPool::new();
        self.events = EventList::new();
        self.facilities.clear();
        self.last_dispatched_event_code = 0;
        self.last_dispatched_token = None;
        // Rotates from whichever stream is currently active, not a
        // separately tracked counter — a manual `rand().set_stream(n)`
        // before `init` shifts where the rotation resumes (spec.md §8 S6:
        // `stream(3)` then `init` selects 4).
        let next_stream = self.rng.stream() % 15 + 1;
        self.rng = Rng::with_stream(next_stream)?;
        tracing::info!(model = %self.model_name, stream = self.rng.stream(), "INIT");
        Ok(())
    }

    /// Zeros statistics accumulators and resets the measurement interval,
    /// leaving the event list and every facility's current reservations
    /// and queue contents intact.
    pub fn reset(&mut self) {
        self.interval_start = self.clock;
        for facility in &mut self.facilities {
            facility.reset_stats(self.clock);
        }
    }

    pub fn mname(&self) -> &str {
        &self.model_name
    }

    pub fn time(&self) -> SimTime {
        self.clock
    }

    pub fn rand(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Registers a new facility with `num_servers` servers, never destroyed
    /// for the lifetime of this kernel instance.
    pub fn facility(
        &mut self,
        name: impl Into<String>,
        num_servers: u32,
    ) -> Result<FacilityId, KernelError> {
        let facility = Facility::new(name, num_servers)?;
        let fid = FacilityId(self.facilities.len() as u32);
        self.facilities.push(facility);
        Ok(fid)
    }

    fn facility_ref(&self, fid: FacilityId) -> Result<&Facility<Tok>, KernelError> {
        self.facilities
            .get(fid.index())
            .ok_or(KernelError::UnknownFacility(fid))
    }

    pub fn fname(&self, fid: FacilityId) -> Result<&str, KernelError> {
        Ok(self.facility_ref(fid)?.name())
    }

    pub fn num_servers(&self, fid: FacilityId) -> Result<u32, KernelError> {
        Ok(self.facility_ref(fid)?.num_servers())
    }

    /// Facility identifiers, in registration order, for iterating a report.
    pub fn facility_ids(&self) -> Vec<FacilityId> {
        (0..self.facilities.len() as u32).map(FacilityId).collect()
    }

    /// Schedules `event_code` for `token` to fire `delay` time units from
    /// now.
    pub fn schedule(
        &mut self,
        event_code: EventCode,
        delay: SimTime,
        token: Tok,
    ) -> Result<(), KernelError> {
        self.events.schedule(&mut self.pool, self.clock, event_code, delay, token)?;
        ::metrics::counter!(met::MET_EVENTS_SCHEDULED).increment(1);
        self.tracer.emit(
            self.clock,
            &format!("SCHEDULE EVENT {} FOR TOKEN {:?}", event_code, token),
        );
        Ok(())
    }

    /// Dequeues the earliest pending event and advances the clock to its
    /// trigger time. Returns `None` on an empty list; that is not an error.
    pub fn cause(&mut self) -> Option<(EventCode, Tok)> {
        let (event_code, token, trigger_time) = self.events.cause(&mut self.pool)?;
        debug_assert!(trigger_time >= self.clock, "clock must be monotonic");
        self.clock = trigger_time;
        self.last_dispatched_event_code = event_code;
        self.last_dispatched_token = Some(token);
        ::metrics::counter!(met::MET_EVENTS_CAUSED).increment(1);
        self.tracer.emit(
            self.clock,
            &format!("CAUSE EVENT {} FOR TOKEN {:?}", event_code, token),
        );
        Some((event_code, token))
    }

    pub fn cancel(&mut self, event_code: EventCode) -> Option<Tok> {
        let token = self.events.cancel(&mut self.pool, event_code)?;
        ::metrics::counter!(met::MET_EVENTS_CANCELLED).increment(1);
        self.tracer
            .emit(self.clock, &format!("CANCEL EVENT {}", event_code));
        Some(token)
    }

    pub fn unschedule(&mut self, event_code: EventCode, token: Tok) -> bool {
        let removed = self.events.unschedule(&mut self.pool, event_code, token);
        if removed {
            self.tracer.emit(
                self.clock,
                &format!("UNSCHEDULE EVENT {} FOR TOKEN {:?}", event_code, token),
            );
        }
        removed
    }

    pub fn request(
        &mut self,
        fid: FacilityId,
        token: Tok,
        priority: i32,
    ) -> Result<Outcome, KernelError> {
        let clock = self.clock;
        let last_code = self.last_dispatched_event_code;
        let facility = self
            .facilities
            .get_mut(fid.index())
            .ok_or(KernelError::UnknownFacility(fid))?;
        let outcome = facility.request(&mut self.pool, clock, last_code, token, priority);
        let name = facility.name().to_string();
        let inq = facility.inq();
        let line = match outcome {
            Outcome::Reserved => format!("REQUEST FACILITY {} FOR TOKEN {:?}:  RESERVED", name, token),
            Outcome::Queued => format!(
                "REQUEST FACILITY {} FOR TOKEN {:?}:  QUEUED  (inq = {})",
                name, token, inq
            ),
        };
        self.tracer.emit(clock, &line);
        Ok(outcome)
    }

    pub fn preempt(
        &mut self,
        fid: FacilityId,
        token: Tok,
        priority: i32,
    ) -> Result<Outcome, KernelError> {
        let clock = self.clock;
        let last_code = self.last_dispatched_event_code;
        let facility = self
            .facilities
            .get_mut(fid.index())
            .ok_or(KernelError::UnknownFacility(fid))?;
        let outcome =
            facility.preempt(&mut self.pool, &mut self.events, clock, last_code, token, priority)?;
        let name = facility.name().to_string();
        let line = match outcome {
            Outcome::Reserved => format!("PREEMPT FACILITY {} FOR TOKEN {:?}:  INTERRUPT", name, token),
            Outcome::Queued => format!("PREEMPT FACILITY {} FOR TOKEN {:?}:  QUEUED", name, token),
        };
        self.tracer.emit(clock, &line);
        Ok(outcome)
    }

    pub fn release(&mut self, fid: FacilityId, token: Tok) -> Result<(), KernelError> {
        let clock = self.clock;
        let facility = self
            .facilities
            .get_mut(fid.index())
            .ok_or(KernelError::UnknownFacility(fid))?;
        facility.release(fid, &mut self.pool, &mut self.events, clock, token)?;
        let name = facility.name().to_string();
        self.tracer
            .emit(clock, &format!("RELEASE FACILITY {} FOR TOKEN {:?}", name, token));
        Ok(())
    }

    pub fn status(&self, fid: FacilityId) -> Result<bool, KernelError> {
        Ok(self.facility_ref(fid)?.status())
    }

    pub fn inq(&self, fid: FacilityId) -> Result<u32, KernelError> {
        Ok(self.facility_ref(fid)?.inq())
    }

    fn elapsed(&self) -> SimTime {
        self.clock - self.interval_start
    }

    pub fn u(&self, fid: FacilityId) -> Result<f64, KernelError> {
        Ok(self.facility_ref(fid)?.utilization(self.elapsed()))
    }

    pub fn b(&self, fid: FacilityId) -> Result<f64, KernelError> {
        Ok(self.facility_ref(fid)?.mean_busy_period())
    }

    pub fn lq(&self, fid: FacilityId) -> Result<f64, KernelError> {
        Ok(self.facility_ref(fid)?.mean_queue_length(self.elapsed()))
    }

    pub fn preempt_count(&self, fid: FacilityId) -> Result<u64, KernelError> {
        Ok(self.facility_ref(fid)?.preempt_count())
    }

    pub fn queue_exit_count(&self, fid: FacilityId) -> Result<u64, KernelError> {
        Ok(self.facility_ref(fid)?.queue_exit_count())
    }

    pub fn trace(&mut self, on: bool) {
        self.tracer.set_on(on);
    }

    pub fn trace_on(&self) -> bool {
        self.tracer.is_on()
    }

    /// Redirects the trace sink; equivalent to spec.md's `sendto(sink)`.
    pub fn sendto(&mut self, sink: Box<dyn Write + Send>) {
        self.tracer.set_sink(sink);
    }

    /// Borrows the current trace sink; equivalent to spec.md's `sendto()`
    /// (the no-argument accessor form).
    pub fn sendto_sink(&mut self) -> &mut (dyn Write + Send) {
        self.tracer.sink_mut()
    }

    /// Renders the textual statistics report over every registered
    /// facility.
    pub fn report(&self) -> String {
        crate::report::render(self)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_fifo_scheduling() {
        let mut k = Kernel::<u32>::new("s1").unwrap();
        k.schedule(1, 5.0, 10).unwrap();
        k.schedule(2, 3.0, 20).unwrap();
        k.schedule(3, 5.0, 30).unwrap();

        assert_eq!(k.cause(), Some((2, 20)));
        assert_eq!(k.time(), 3.0);
        assert_eq!(k.cause(), Some((1, 10)));
        assert_eq!(k.time(), 5.0);
        assert_eq!(k.cause(), Some((3, 30)));
        assert_eq!(k.time(), 5.0);
        assert_eq!(k.cause(), None);
    }

    #[test]
    fn s2_simple_request_release() {
        let mut k = Kernel::<u32>::new("s2").unwrap();
        let f = k.facility("f", 1).unwrap();

        k.schedule(1, 0.0, 10).unwrap();
        k.cause().unwrap();
        assert_eq!(k.request(f, 10, 0).unwrap(), Outcome::Reserved);

        k.schedule(2, 10.0, 10).unwrap();
        k.cause().unwrap();
        k.release(f, 10).unwrap();

        assert_eq!(k.u(f).unwrap(), 1.0);
        assert_eq!(k.b(f).unwrap(), 10.0);
        assert_eq!(k.lq(f).unwrap(), 0.0);
    }

    #[test]
    fn s3_queueing() {
        let mut k = Kernel::<u32>::new("s3").unwrap();
        let f = k.facility("f", 1).unwrap();

        assert_eq!(k.request(f, 10, 0).unwrap(), Outcome::Reserved);
        assert_eq!(k.request(f, 20, 0).unwrap(), Outcome::Queued);

        k.schedule(5, 7.0, 999).unwrap();
        k.cause().unwrap();

        k.release(f, 10).unwrap();
        assert_eq!(k.queue_exit_count(f).unwrap(), 1);
        assert_eq!(k.lq(f).unwrap(), 1.0);

        assert_eq!(k.cause(), Some((0, 20)));
        assert_eq!(k.request(f, 20, 0).unwrap(), Outcome::Reserved);
    }

    #[test]
    fn s4_preemption_resumes_with_residual_time() {
        let mut k = Kernel::<u32>::new("s4").unwrap();
        let f = k.facility("f", 1).unwrap();

        assert_eq!(k.request(f, 10, 1).unwrap(), Outcome::Reserved);
        k.schedule(7, 10.0, 10).unwrap();

        k.schedule(9, 4.0, 999).unwrap();
        k.cause().unwrap();
        assert_eq!(k.preempt(f, 20, 5).unwrap(), Outcome::Reserved);
        assert_eq!(k.preempt_count(f).unwrap(), 1);

        k.schedule(8, 6.0, 20).unwrap();
        k.cause().unwrap();
        k.release(f, 20).unwrap();

        assert_eq!(k.cause(), Some((7, 10)));
        assert_eq!(k.time(), 16.0);
    }

    #[test]
    fn s5_preempt_blocked_on_equal_priority() {
        let mut k = Kernel::<u32>::new("s5").unwrap();
        let f = k.facility("f", 1).unwrap();

        assert_eq!(k.request(f, 10, 1).unwrap(), Outcome::Reserved);
        k.schedule(7, 10.0, 10).unwrap();
        k.schedule(9, 4.0, 999).unwrap();
        k.cause().unwrap();
        assert_eq!(k.preempt(f, 20, 5).unwrap(), Outcome::Reserved);

        assert_eq!(k.preempt(f, 30, 5).unwrap(), Outcome::Queued);
        assert_eq!(k.inq(f).unwrap(), 1);
    }

    #[test]
    fn s6_rng_stream_rotation_and_reproducibility() {
        let mut k = Kernel::<u32>::new("x").unwrap();
        k.rand().set_stream(3).unwrap();
        let first = k.rand().ranf();

        k.init("x").unwrap();
        assert_eq!(k.rand().stream(), 4);

        let mut direct = Rng::with_stream(3).unwrap();
        assert_eq!(first, direct.ranf());
    }

    #[test]
    fn cancel_then_cause_never_returns_the_cancelled_code() {
        let mut k = Kernel::<u32>::new("t").unwrap();
        k.schedule(1, 5.0, 1).unwrap();
        k.schedule(2, 3.0, 2).unwrap();
        assert_eq!(k.cancel(1), Some(1));
        assert_eq!(k.cause(), Some((2, 2)));
        assert_eq!(k.cause(), None);
    }

    #[test]
    fn unknown_facility_is_an_error() {
        let mut k = Kernel::<u32>::new("t").unwrap();
        assert!(k.request(FacilityId(42), 1, 0).is_err());
    }

    #[test]
    fn reset_zeros_stats_but_keeps_reservations() {
        let mut k = Kernel::<u32>::new("t").unwrap();
        let f = k.facility("f", 1).unwrap();
        k.request(f, 1, 0).unwrap();
        k.schedule(1, 10.0, 1).unwrap();
        k.cause().unwrap();
        k.release(f, 1).unwrap();
        assert!(k.b(f).unwrap() > 0.0);

        k.request(f, 2, 0).unwrap();
        k.reset();
        assert_eq!(k.b(f).unwrap(), 0.0);
        assert!(k.status(f).unwrap());
    }
}

//! # smpl-core::facility
//!
//! Multi-server resources with a priority-ordered waiting queue and
//! preemption. This is the one piece of the kernel with no direct teacher
//! analogue — `19h-ftsim`'s links and nodes hold per-instance fault state
//! but never preempt a holder — so the request/preempt/release algorithms
//! here are built straight from spec.md §4.3-4.4, in the surrounding
//! modules' idiom (explicit `Result`, `tracing::instrument`, `metrics`
//! counters on every state transition).

use smpl_types::{
    error::KernelError,
    ids::{EventCode, FacilityId},
    metrics as met,
    time::SimTime,
    Token,
};

use crate::event::{EventKey, EventList, EventPool, EventRecord, ZERO_RESIDUAL_SENTINEL};

/// Outcome of a `request` or `preempt` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reserved,
    Queued,
}

/// One server slot within a [`Facility`].
#[derive(Debug, Clone)]
pub struct FacilityServer<Tok: Token> {
    busy_token: Option<Tok>,
    busy_priority: i32,
    busy_start: SimTime,
    release_count: u64,
    total_busy_time: SimTime,
}

impl<Tok: Token> FacilityServer<Tok> {
    fn idle() -> Self {
        Self {
            busy_token: None,
            busy_priority: 0,
            busy_start: 0.0,
            release_count: 0,
            total_busy_time: 0.0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy_token.is_some()
    }

    pub fn busy_token(&self) -> Option<Tok> {
        self.busy_token
    }

    fn reserve(&mut self, token: Tok, priority: i32, clock: SimTime) {
        self.busy_token = Some(token);
        self.busy_priority = priority;
        self.busy_start = clock;
    }

    fn vacate(&mut self, clock: SimTime) {
        self.release_count += 1;
        self.total_busy_time += clock - self.busy_start;
        self.busy_token = None;
    }
}

/// A named bundle of `N` servers with a time-weighted waiting queue.
#[derive(Debug)]
pub struct Facility<Tok: Token> {
    name: String,
    servers: Vec<FacilityServer<Tok>>,
    busy_count: u32,
    queue: Vec<EventKey>,
    queue_exit_count: u64,
    preempt_count: u64,
    last_change_time: SimTime,
    total_queueing_time: SimTime,
}

impl<Tok: Token> Facility<Tok> {
    pub fn new(name: impl Into<String>, num_servers: u32) -> Result<Self, KernelError> {
        if num_servers == 0 {
            return Err(KernelError::InvalidServerCount(0));
        }
        Ok(Self {
            name: name.into(),
            servers: (0..num_servers).map(|_| FacilityServer::idle()).collect(),
            busy_count: 0,
            queue: Vec::new(),
            queue_exit_count: 0,
            preempt_count: 0,
            last_change_time: 0.0,
            total_queueing_time: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_servers(&self) -> u32 {
        self.servers.len() as u32
    }

    fn first_idle(&self) -> Option<usize> {
        self.servers.iter().position(|s| !s.is_busy())
    }

    /// Index of the server with the lowest `busy_priority`, first such index
    /// on ties. Every server must be busy when this is called.
    fn lowest_priority_server(&self) -> usize {
        self.servers
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.busy_priority)
            .map(|(i, _)| i)
            .expect("lowest_priority_server requires at least one server")
    }

    fn enqueue(&mut self, pool: &mut EventPool<Tok>, clock: SimTime, record: EventRecord<Tok>) {
        self.total_queueing_time += self.queue.len() as f64 * (clock - self.last_change_time);
        self.last_change_time = clock;

        let priority = record.priority;
        let preempted_resume = record.remaining_time > 0.0;
        let key = pool.acquire(record);

        let pos = self
            .queue
            .iter()
            .position(|&k| {
                let other = pool.get(k).expect("facility queue holds only live keys");
                other.priority < priority || (other.priority == priority && preempted_resume)
            })
            .unwrap_or(self.queue.len());
        self.queue.insert(pos, key);
    }

    /// Dequeues the head of the waiting queue, updating time-weighted
    /// bookkeeping. Returns `None` if the queue is empty.
    fn dequeue(&mut self, pool: &mut EventPool<Tok>, clock: SimTime) -> Option<EventRecord<Tok>> {
        if self.queue.is_empty() {
            return None;
        }
        self.total_queueing_time += self.queue.len() as f64 * (clock - self.last_change_time);
        self.queue_exit_count += 1;
        self.last_change_time = clock;
        let key = self.queue.remove(0);
        Some(pool.release(key).expect("queue key must be live"))
    }

    /// Non-preemptive reservation attempt. Queues a blocked request tagged
    /// with the event code the kernel most recently dispatched, so it can
    /// be resumed verbatim once a server frees up.
    #[tracing::instrument(level = "debug", skip(self, pool), fields(facility = %self.name))]
    pub fn request(
        &mut self,
        pool: &mut EventPool<Tok>,
        clock: SimTime,
        last_dispatched_event_code: EventCode,
        token: Tok,
        priority: i32,
    ) -> Outcome {
        if let Some(idx) = self.first_idle() {
            self.servers[idx].reserve(token, priority, clock);
            self.busy_count += 1;
            ::metrics::counter!(
                met::MET_FACILITY_REQUESTS,
                met::LBL_FACILITY => self.name.clone(),
                met::LBL_OUTCOME => "reserved"
            )
            .increment(1);
            tracing::debug!(?token, priority, "REQUEST: RESERVED");
            Outcome::Reserved
        } else {
            self.enqueue(
                pool,
                clock,
                EventRecord {
                    event_code: last_dispatched_event_code,
                    token,
                    trigger_time: clock,
                    remaining_time: 0.0,
                    priority,
                },
            );
            ::metrics::counter!(
                met::MET_FACILITY_QUEUED,
                met::LBL_FACILITY => self.name.clone()
            )
            .increment(1);
            tracing::debug!(?token, priority, inq = self.queue.len(), "REQUEST: QUEUED");
            Outcome::Queued
        }
    }

    /// Priority-based reservation attempt, possibly evicting the
    /// lowest-priority current holder.
    #[tracing::instrument(level = "debug", skip(self, pool, event_list), fields(facility = %self.name))]
    pub fn preempt(
        &mut self,
        pool: &mut EventPool<Tok>,
        event_list: &mut EventList<Tok>,
        clock: SimTime,
        last_dispatched_event_code: EventCode,
        token: Tok,
        priority: i32,
    ) -> Result<Outcome, KernelError> {
        if let Some(idx) = self.first_idle() {
            self.servers[idx].reserve(token, priority, clock);
            self.busy_count += 1;
            tracing::debug!(?token, priority, "PREEMPT: RESERVED (idle server)");
            return Ok(Outcome::Reserved);
        }

        let victim_idx = self.lowest_priority_server();
        let victim_priority = self.servers[victim_idx].busy_priority;

        if priority <= victim_priority {
            self.enqueue(
                pool,
                clock,
                EventRecord {
                    event_code: last_dispatched_event_code,
                    token,
                    trigger_time: clock,
                    remaining_time: 0.0,
                    priority,
                },
            );
            ::metrics::counter!(
                met::MET_FACILITY_QUEUED,
                met::LBL_FACILITY => self.name.clone()
            )
            .increment(1);
            tracing::debug!(?token, priority, victim_priority, "PREEMPT: blocked, QUEUED");
            return Ok(Outcome::Queued);
        }

        let victim_token = self.servers[victim_idx]
            .busy_token
            .expect("victim server must be busy");
        let victim = event_list.suspend(pool, victim_token)?;
        let residual = victim.trigger_time - clock;
        let residual = if residual == 0.0 {
            ZERO_RESIDUAL_SENTINEL
        } else {
            residual
        };

        self.enqueue(
            pool,
            clock,
            EventRecord {
                event_code: victim.event_code,
                token: victim_token,
                trigger_time: clock,
                remaining_time: residual,
                priority: victim_priority,
            },
        );

        self.servers[victim_idx].vacate(clock);
        self.busy_count -= 1;
        self.preempt_count += 1;

        self.servers[victim_idx].reserve(token, priority, clock);
        self.busy_count += 1;

        ::metrics::counter!(
            met::MET_FACILITY_PREEMPTS,
            met::LBL_FACILITY => self.name.clone()
        )
        .increment(1);
        tracing::debug!(
            ?token,
            priority,
            ?victim_token,
            residual,
            "PREEMPT: INTERRUPT"
        );
        Ok(Outcome::Reserved)
    }

    /// Frees the server held by `token`, waking the head of the waiting
    /// queue if one is present.
    #[tracing::instrument(level = "debug", skip(self, pool, event_list), fields(facility = %self.name))]
    pub fn release(
        &mut self,
        fid: FacilityId,
        pool: &mut EventPool<Tok>,
        event_list: &mut EventList<Tok>,
        clock: SimTime,
        token: Tok,
    ) -> Result<(), KernelError> {
        let idx = self
            .servers
            .iter()
            .position(|s| s.busy_token == Some(token))
            .ok_or(KernelError::NoReservation { facility: fid })?;

        self.servers[idx].vacate(clock);
        self.busy_count -= 1;
        ::metrics::counter!(
            met::MET_FACILITY_RELEASES,
            met::LBL_FACILITY => self.name.clone()
        )
        .increment(1);

        let Some(record) = self.dequeue(pool, clock) else {
            tracing::debug!(?token, "RELEASE: queue empty");
            return Ok(());
        };

        if record.remaining_time == 0.0 {
            event_list.prepend(
                pool,
                EventRecord {
                    event_code: record.event_code,
                    token: record.token,
                    trigger_time: clock,
                    remaining_time: 0.0,
                    priority: 0,
                },
            );
            tracing::debug!(woken = ?record.token, "RELEASE: dequeued blocked request, prepended");
        } else {
            self.servers[idx].reserve(record.token, record.priority, clock);
            self.busy_count += 1;
            event_list.schedule_record(
                pool,
                EventRecord {
                    event_code: record.event_code,
                    token: record.token,
                    trigger_time: clock + record.remaining_time,
                    remaining_time: 0.0,
                    priority: 0,
                },
            );
            tracing::debug!(resumed = ?record.token, residual = record.remaining_time, "RELEASE: resumed preempted holder");
        }

        Ok(())
    }

    /// Zeros every statistics accumulator without disturbing which servers
    /// are currently reserved or what is waiting in the queue. Used by the
    /// kernel's `reset()`.
    pub fn reset_stats(&mut self, clock: SimTime) {
        for server in &mut self.servers {
            server.release_count = 0;
            server.total_busy_time = 0.0;
            if server.is_busy() {
                server.busy_start = clock;
            }
        }
        self.queue_exit_count = 0;
        self.preempt_count = 0;
        self.last_change_time = clock;
        self.total_queueing_time = 0.0;
    }

    pub fn status(&self) -> bool {
        self.busy_count == self.num_servers()
    }

    pub fn inq(&self) -> u32 {
        self.queue.len() as u32
    }

    pub fn busy_count(&self) -> u32 {
        self.busy_count
    }

    pub fn queue_exit_count(&self) -> u64 {
        self.queue_exit_count
    }

    pub fn preempt_count(&self) -> u64 {
        self.preempt_count
    }

    /// Mean utilization across all servers over `elapsed` time units.
    pub fn utilization(&self, elapsed: SimTime) -> f64 {
        if elapsed > 0.0 {
            self.servers.iter().map(|s| s.total_busy_time).sum::<f64>() / elapsed
        } else {
            0.0
        }
    }

    /// Mean busy period: total busy time divided by total releases, or the
    /// raw total busy time if no server has ever released yet.
    pub fn mean_busy_period(&self) -> f64 {
        let total_busy: f64 = self.servers.iter().map(|s| s.total_busy_time).sum();
        let total_releases: u64 = self.servers.iter().map(|s| s.release_count).sum();
        if total_releases > 0 {
            total_busy / total_releases as f64
        } else {
            total_busy
        }
    }

    /// Mean queue length: time-weighted queue area over `elapsed` time
    /// units. Lags reality between queue changes (spec.md §4.5, §9 OQ1) —
    /// it is not corrected with the in-flight tail interval here, to match
    /// the worked arithmetic of the reference scenarios exactly.
    pub fn mean_queue_length(&self, elapsed: SimTime) -> f64 {
        if elapsed > 0.0 {
            self.total_queueing_time / elapsed
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventList;

    #[test]
    fn request_reserves_then_queues_on_a_single_server_facility() {
        let mut pool = EventPool::<u32>::new();
        let mut facility = Facility::<u32>::new("f", 1).unwrap();

        assert_eq!(facility.request(&mut pool, 0.0, 1, 10, 0), Outcome::Reserved);
        assert_eq!(facility.request(&mut pool, 0.0, 1, 20, 0), Outcome::Queued);
        assert_eq!(facility.inq(), 1);
        assert!(facility.status());
    }

    #[test]
    fn release_wakes_blocked_requester_and_prepends_resume() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        let mut facility = Facility::<u32>::new("f", 1).unwrap();

        facility.request(&mut pool, 0.0, 1, 10, 0);
        facility.request(&mut pool, 0.0, 1, 20, 0);

        list.schedule(&mut pool, 0.0, 99, 100.0, 999).unwrap();

        facility
            .release(FacilityId(0), &mut pool, &mut list, 7.0, 10)
            .unwrap();

        assert_eq!(facility.queue_exit_count(), 1);
        assert_eq!(facility.mean_queue_length(7.0), 1.0);
        assert_eq!(list.cause(&mut pool), Some((1, 20, 7.0)));
    }

    #[test]
    fn preempt_evicts_lower_priority_holder_and_saves_residual() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        let mut facility = Facility::<u32>::new("f", 1).unwrap();

        facility.request(&mut pool, 0.0, 7, 10, 1);
        list.schedule(&mut pool, 0.0, 7, 10.0, 10).unwrap();

        let outcome = facility
            .preempt(&mut pool, &mut list, 4.0, 7, 20, 5)
            .unwrap();
        assert_eq!(outcome, Outcome::Reserved);
        assert_eq!(facility.preempt_count(), 1);

        facility
            .release(FacilityId(0), &mut pool, &mut list, 10.0, 20)
            .unwrap();

        assert_eq!(list.cause(&mut pool), Some((7, 10, 16.0)));
    }

    #[test]
    fn preempt_blocked_on_equal_priority_queues_instead() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        let mut facility = Facility::<u32>::new("f", 1).unwrap();

        facility.request(&mut pool, 0.0, 7, 10, 5);
        let outcome = facility
            .preempt(&mut pool, &mut list, 4.0, 7, 30, 5)
            .unwrap();
        assert_eq!(outcome, Outcome::Queued);
        assert_eq!(facility.inq(), 1);
    }

    #[test]
    fn release_without_reservation_fails() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        let mut facility = Facility::<u32>::new("f", 1).unwrap();
        let err = facility
            .release(FacilityId(3), &mut pool, &mut list, 0.0, 42)
            .unwrap_err();
        assert_eq!(err, KernelError::NoReservation { facility: FacilityId(3) });
    }
}

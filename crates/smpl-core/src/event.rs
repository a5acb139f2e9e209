//! # smpl-core::event
//!
//! The event-record pool and the time-ordered event list. A single
//! [`EventPool`] backs both the kernel's event list and every facility's
//! waiting queue: a live record is reachable from exactly one of those
//! structures at a time, and freeing its slot is what spec.md calls
//! returning it to the pool. `slotmap` gives O(1) acquire/release with
//! generational keys, so a stale [`EventKey`] can never alias a record
//! that has since been reused — the arena-of-records approach spec.md's
//! own design notes recommend over an intrusive linked list.

use slotmap::{new_key_type, SlotMap};
use smpl_types::{error::KernelError, ids::EventCode, time::validate_delay, time::SimTime, Token};

new_key_type! {
    /// A handle into an [`EventPool`]. Stable across list membership changes;
    /// invalidated (and never silently reused) once the slot is freed.
    pub struct EventKey;
}

/// A scheduled or queued event descriptor.
#[derive(Debug, Clone)]
pub struct EventRecord<Tok: Token> {
    pub event_code: EventCode,
    pub token: Tok,
    /// Absolute firing time; meaningful only while in the event list.
    pub trigger_time: SimTime,
    /// 0 for a normal event; > 0 for a preempted request parked on a
    /// facility queue awaiting resumption.
    pub remaining_time: SimTime,
    /// Meaningful only while in a facility queue.
    pub priority: i32,
}

/// Sentinel residual time for a preempted event that had zero time left to
/// fire. Must stay strictly positive so the record is still treated as a
/// preempted resume (ahead of non-preempted peers) when it re-enters a
/// facility queue — see `smpl-core::facility`.
pub const ZERO_RESIDUAL_SENTINEL: SimTime = 1e-99;

/// Backing storage for every live [`EventRecord`], regardless of which list
/// currently references it.
#[derive(Debug, Default)]
pub struct EventPool<Tok: Token> {
    slots: SlotMap<EventKey, EventRecord<Tok>>,
}

impl<Tok: Token> EventPool<Tok> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Acquires a record from the pool (allocating a fresh slot if none are
    /// free) and returns its key.
    pub fn acquire(&mut self, record: EventRecord<Tok>) -> EventKey {
        self.slots.insert(record)
    }

    /// Releases a record's slot back to the pool, returning its last value.
    pub fn release(&mut self, key: EventKey) -> Option<EventRecord<Tok>> {
        self.slots.remove(key)
    }

    pub fn get(&self, key: EventKey) -> Option<&EventRecord<Tok>> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: EventKey) -> Option<&mut EventRecord<Tok>> {
        self.slots.get_mut(key)
    }
}

/// The kernel's master time-ordered list of pending events.
///
/// Represented as a plain `Vec` of keys rather than a `BinaryHeap`: spec.md's
/// tie-break rule (FIFO among equal trigger times, except a release-driven
/// resume that must jump the line) needs an explicit insertion position a
/// heap's unspecified tie order can't give us.
#[derive(Debug, Default)]
pub struct EventList<Tok: Token> {
    order: Vec<EventKey>,
}

impl<Tok: Token> EventList<Tok> {
    pub fn new() -> Self {
        Self { order: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Schedules `event_code` for `token` to fire `delay` time units from
    /// `clock`. Inserted before the first existing record with a strictly
    /// greater trigger time, so it lands after any existing equal-time
    /// records (FIFO).
    pub fn schedule(
        &mut self,
        pool: &mut EventPool<Tok>,
        clock: SimTime,
        event_code: EventCode,
        delay: SimTime,
        token: Tok,
    ) -> Result<(), KernelError> {
        let delay = validate_delay(delay)?;
        let key = pool.acquire(EventRecord {
            event_code,
            token,
            trigger_time: clock + delay,
            remaining_time: 0.0,
            priority: 0,
        });
        self.insert_sorted(pool, key);
        Ok(())
    }

    /// Schedules a fresh event directly from a pre-built record (used when
    /// resuming a preempted request or rescheduling from a fixed trigger
    /// time rather than a delay).
    pub fn schedule_record(&mut self, pool: &mut EventPool<Tok>, record: EventRecord<Tok>) {
        let key = pool.acquire(record);
        self.insert_sorted(pool, key);
    }

    fn insert_sorted(&mut self, pool: &EventPool<Tok>, key: EventKey) {
        let trigger_time = pool
            .get(key)
            .expect("just-acquired key must be present")
            .trigger_time;
        let pos = self
            .order
            .iter()
            .position(|&k| {
                pool.get(k)
                    .expect("event list holds only live keys")
                    .trigger_time
                    > trigger_time
            })
            .unwrap_or(self.order.len());
        self.order.insert(pos, key);
    }

    /// Inserts a record at the very front of the list, ahead of every other
    /// record regardless of trigger time. Used solely by `release`'s
    /// blocked-request resume (spec.md §4.4), which must fire in the same
    /// time step as the release that unblocked it.
    pub fn prepend(&mut self, pool: &mut EventPool<Tok>, record: EventRecord<Tok>) {
        let key = pool.acquire(record);
        self.order.insert(0, key);
    }

    /// Detaches the head of the list, advances nothing itself (the caller
    /// owns the clock), and releases the record back to the pool.
    pub fn cause(&mut self, pool: &mut EventPool<Tok>) -> Option<(EventCode, Tok, SimTime)> {
        if self.order.is_empty() {
            return None;
        }
        let key = self.order.remove(0);
        let record = pool
            .release(key)
            .expect("event list key must resolve to a live record");
        Some((record.event_code, record.token, record.trigger_time))
    }

    /// Removes the first record whose `event_code` matches, token ignored.
    pub fn cancel(&mut self, pool: &mut EventPool<Tok>, event_code: EventCode) -> Option<Tok> {
        let pos = self
            .order
            .iter()
            .position(|&k| pool.get(k).map(|r| r.event_code) == Some(event_code))?;
        let key = self.order.remove(pos);
        let record = pool.release(key).expect("located key must be live");
        Some(record.token)
    }

    /// Removes the first record whose `(event_code, token)` both match.
    pub fn unschedule(
        &mut self,
        pool: &mut EventPool<Tok>,
        event_code: EventCode,
        token: Tok,
    ) -> bool {
        let pos = self.order.iter().position(|&k| {
            pool.get(k)
                .map(|r| r.event_code == event_code && r.token == token)
                .unwrap_or(false)
        });
        match pos {
            Some(pos) => {
                let key = self.order.remove(pos);
                pool.release(key);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the first record for `token`, freeing its slot.
    /// Used internally by preemption to lift a victim's future event out of
    /// the list; failure is a program bug, not a user precondition
    /// violation, per spec.md §9.
    pub fn suspend(
        &mut self,
        pool: &mut EventPool<Tok>,
        token: Tok,
    ) -> Result<EventRecord<Tok>, KernelError> {
        let pos = self
            .order
            .iter()
            .position(|&k| pool.get(k).map(|r| r.token == token).unwrap_or(false))
            .ok_or(KernelError::NoSuchScheduledEvent)?;
        let key = self.order.remove(pos);
        Ok(pool.release(key).expect("located key must be live"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_scheduling_within_a_time_step() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        list.schedule(&mut pool, 0.0, 1, 5.0, 10).unwrap();
        list.schedule(&mut pool, 0.0, 2, 3.0, 20).unwrap();
        list.schedule(&mut pool, 0.0, 3, 5.0, 30).unwrap();

        assert_eq!(list.cause(&mut pool), Some((2, 20, 3.0)));
        assert_eq!(list.cause(&mut pool), Some((1, 10, 5.0)));
        assert_eq!(list.cause(&mut pool), Some((3, 30, 5.0)));
        assert_eq!(list.cause(&mut pool), None);
    }

    #[test]
    fn schedule_rejects_invalid_delay() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        assert!(list.schedule(&mut pool, 0.0, 1, -1.0, 10).is_err());
        assert!(list.schedule(&mut pool, 0.0, 1, f64::NAN, 10).is_err());
        assert!(list.schedule(&mut pool, 0.0, 1, f64::INFINITY, 10).is_err());
    }

    #[test]
    fn cancel_removes_first_matching_event_code() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        list.schedule(&mut pool, 0.0, 7, 1.0, 111).unwrap();
        list.schedule(&mut pool, 0.0, 8, 2.0, 222).unwrap();

        assert_eq!(list.cancel(&mut pool, 7), Some(111));
        assert_eq!(list.cancel(&mut pool, 7), None);
        assert_eq!(list.cause(&mut pool), Some((8, 222, 2.0)));
    }

    #[test]
    fn prepend_jumps_ahead_of_equal_time_events() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        list.schedule(&mut pool, 0.0, 1, 5.0, 10).unwrap();
        list.prepend(
            &mut pool,
            EventRecord {
                event_code: 99,
                token: 999,
                trigger_time: 5.0,
                remaining_time: 0.0,
                priority: 0,
            },
        );
        assert_eq!(list.cause(&mut pool), Some((99, 999, 5.0)));
        assert_eq!(list.cause(&mut pool), Some((1, 10, 5.0)));
    }

    #[test]
    fn suspend_requires_a_live_token() {
        let mut pool = EventPool::<u32>::new();
        let mut list = EventList::<u32>::new();
        assert!(list.suspend(&mut pool, 42).is_err());
        list.schedule(&mut pool, 0.0, 1, 5.0, 42).unwrap();
        let record = list.suspend(&mut pool, 42).unwrap();
        assert_eq!(record.trigger_time, 5.0);
        assert!(list.is_empty());
    }
}

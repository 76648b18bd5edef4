use std::collections::BTreeMap;
use std::time::Duration;

use crate::timer::Timer;

/// Identifies one scheduled entry so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// One-shot timers keyed by the event they should raise.
///
/// Nothing fires on its own: the owner asks for [`TimerQueue::pop_due`]
/// whenever its event loop wakes up, and [`TimerQueue::time_until_next`]
/// tells it how long it may sleep.
#[derive(Debug, Clone)]
pub struct TimerQueue<T, K> {
    timer: T,
    next_id: u64,
    entries: BTreeMap<(u64, TimerHandle), K>,
}

impl<T, K> TimerQueue<T, K>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, after: Duration, key: K) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = self.timer.now().saturating_add(after.as_nanos() as u64);
        self.entries.insert((deadline, handle), key);
        handle
    }

    /// Returns false when the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, h), _| *h != handle);
        self.entries.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.keys().any(|(_, h)| *h == handle)
    }

    /// Earliest deadline in timer nanoseconds.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|d| Duration::from_nanos(d.saturating_sub(self.timer.now())))
    }

    /// Removes and returns the earliest entry whose deadline has passed.
    /// Entries with equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, K)> {
        let now = self.timer.now();
        let (&(deadline, handle), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }
        self.entries
            .remove(&(deadline, handle))
            .map(|key| (handle, key))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Owner of a one-shot timer. At most one timer per owner is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Auto-dismiss of the milestone toast.
    Toast,
    /// Hand-over from the completion cue to the thank-you overlay.
    CompletionCue,
}

/// Handle for a scheduled timer. The token tells a live timer apart from a
/// stale one of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledTimer {
    pub kind: TimerKind,
    pub token: u64,
}

/// Bookkeeping for the live timer of each [`TimerKind`].
#[derive(Debug, Default, Clone)]
pub struct TimerSlots {
    next_token: u64,
    live: HashMap<TimerKind, ScheduledTimer>,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh timer for `kind`, returning it together with the
    /// timer it supersedes, if any.
    pub fn arm(&mut self, kind: TimerKind) -> (ScheduledTimer, Option<ScheduledTimer>) {
        self.next_token += 1;
        let timer = ScheduledTimer {
            kind,
            token: self.next_token,
        };
        let replaced = self.live.insert(kind, timer);
        (timer, replaced)
    }

    /// Consumes `timer` if it is the live one for its kind.
    pub fn fire(&mut self, timer: ScheduledTimer) -> bool {
        if self.live.get(&timer.kind) == Some(&timer) {
            self.live.remove(&timer.kind);
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.live.contains_key(&kind)
    }

    /// Disarms everything, returning the timers that must be cancelled.
    pub fn drain(&mut self) -> Vec<ScheduledTimer> {
        let mut timers: Vec<_> = self.live.drain().map(|(_, timer)| timer).collect();
        timers.sort_by_key(|timer| timer.token);
        timers
    }
}

/// Host-side handles of scheduled timers, one per [`TimerKind`]. An entry
/// leaves the table when its timer fires or is cancelled.
#[derive(Debug)]
pub struct TimerHandles<T> {
    entries: HashMap<TimerKind, (ScheduledTimer, T)>,
}

impl<T> Default for TimerHandles<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> TimerHandles<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the handle for `timer`, returning the one it replaces.
    pub fn insert(&mut self, timer: ScheduledTimer, handle: T) -> Option<T> {
        self.entries
            .insert(timer.kind, (timer, handle))
            .map(|(_, previous)| previous)
    }

    /// Removes the handle of `timer` if it is still the current one for its
    /// kind.
    pub fn take(&mut self, timer: ScheduledTimer) -> Option<T> {
        match self.entries.get(&timer.kind) {
            Some((current, _)) if *current == timer => {
                self.entries.remove(&timer.kind).map(|(_, handle)| handle)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Simulated millisecond clock used when no browser event loop is around.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: u64,
    queue: Vec<PendingTimer>,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due_ms: u64,
    timer: ScheduledTimer,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, timer: ScheduledTimer, delay_ms: u64) {
        self.queue.push(PendingTimer {
            due_ms: self.now_ms.saturating_add(delay_ms),
            timer,
        });
    }

    pub fn cancel(&mut self, timer: ScheduledTimer) -> bool {
        let before = self.queue.len();
        self.queue.retain(|pending| pending.timer != timer);
        self.queue.len() != before
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pops the earliest timer due at or before `deadline_ms`, moving the
    /// clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<ScheduledTimer> {
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due_ms <= deadline_ms)
            .min_by_key(|(_, pending)| (pending.due_ms, pending.timer.token))
            .map(|(index, _)| index)?;
        let pending = self.queue.remove(index);
        self.now_ms = self.now_ms.max(pending.due_ms);
        Some(pending.timer)
    }

    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

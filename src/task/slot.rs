/*!
 * Notification Slot
 *
 * Per-task single-value mailbox used to deliver wake-up payloads.
 *
 * # Design
 *
 * Each schedulable task owns exactly one slot. A sender overwrites the slot
 * and wakes the owner if it is blocked; the owner blocks until a value is
 * present or its timeout elapses, and receipt atomically clears the slot.
 * The slot never queues: a delivery before the previous value was consumed
 * replaces it, and only the last value is observed.
 */

use crate::core::types::Payload;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Single-value notification mailbox
///
/// # Invariants
///
/// - At most one pending value at any time (redelivery overwrites)
/// - `receive` clears the slot atomically with respect to `send`
///
/// # Contract
///
/// `send` may be called from any task. `receive` and `try_receive` must only
/// be called by the owning task; the slot assumes a single consumer.
pub struct NotificationSlot {
    value: Mutex<Option<Payload>>,
    delivered: Condvar,
}

impl NotificationSlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            value: Mutex::new(None),
            delivered: Condvar::new(),
        }
    }

    /// Deliver a value, waking the owner if it is blocked in `receive`
    ///
    /// Returns the displaced value if one was still pending. Never blocks.
    pub fn send(&self, value: Payload) -> Option<Payload> {
        let mut slot = self.value.lock();
        let displaced = slot.replace(value);
        // Single consumer per slot, one wakeup is enough.
        self.delivered.notify_one();
        displaced
    }

    /// Block until a value is delivered or `timeout` elapses
    ///
    /// `None` blocks indefinitely. On delivery the value is returned and the
    /// slot cleared; on timeout `None` is returned. A value that lands exactly
    /// at the deadline is still received. `Some(Duration::ZERO)` is an
    /// immediate poll.
    pub fn receive(&self, timeout: Option<Duration>) -> Option<Payload> {
        let slot = self.value.lock();

        let deadline = match timeout {
            Some(timeout) => match Instant::now().checked_add(timeout) {
                Some(deadline) => deadline,
                // A deadline beyond the representable range waits unbounded.
                None => return self.receive_untimed(slot),
            },
            None => return self.receive_untimed(slot),
        };

        let mut slot = slot;
        while slot.is_none() {
            if self.delivered.wait_until(&mut slot, deadline).timed_out() {
                // Pick up a value that raced in right at the deadline.
                return slot.take();
            }
        }
        slot.take()
    }

    fn receive_untimed(&self, mut slot: MutexGuard<'_, Option<Payload>>) -> Option<Payload> {
        while slot.is_none() {
            self.delivered.wait(&mut slot);
        }
        slot.take()
    }

    /// Non-blocking receive
    pub fn try_receive(&self) -> Option<Payload> {
        self.value.lock().take()
    }

    /// Drain any pending value without waking anybody
    ///
    /// Same operation as `try_receive`, named for the cleanup callers.
    pub fn clear(&self) -> Option<Payload> {
        self.try_receive()
    }

    /// True if no value is pending
    pub fn is_empty(&self) -> bool {
        self.value.lock().is_none()
    }
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new()
    }
}

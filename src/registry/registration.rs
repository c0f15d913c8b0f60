/*!
 * Registrations
 *
 * RAII token tying a wait entry's lifetime to a scope.
 *
 * # Design
 *
 * Every exit from a wait, including panic unwinds out of the arm callback,
 * runs the token's Drop and removes the entry from both indexes. No path
 * can leave a stale entry behind.
 */

use crate::core::types::TaskId;
use log::trace;
use std::fmt;
use std::hash::Hash;

use super::registry::WaitRegistry;

/// Active wait registration
///
/// Dropping the token deregisters the waiter.
#[must_use = "dropping the registration immediately deregisters the waiter"]
pub struct Registration<'a, I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    registry: &'a WaitRegistry<I, T>,
    task: TaskId,
    identity: I,
    kind: T,
}

impl<'a, I, T> Registration<'a, I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    pub(super) fn new(registry: &'a WaitRegistry<I, T>, task: TaskId, identity: I, kind: T) -> Self {
        Self {
            registry,
            task,
            identity,
            kind,
        }
    }

    /// Identity this registration waits under
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Kind this registration waits on
    pub fn kind(&self) -> &T {
        &self.kind
    }
}

impl<I, T> Drop for Registration<'_, I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    fn drop(&mut self) {
        // Drop has no error channel, deregistration acquires unconditionally.
        self.registry
            .remove_entry(self.task, &self.identity, &self.kind);
        trace!(
            "Deregistered waiter task={} identity={:?} kind={:?}",
            self.task,
            self.identity,
            self.kind
        );
    }
}

impl<I, T> fmt::Debug for Registration<'_, I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("task", &self.task)
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .finish()
    }
}

/*!
 * Wait Entries
 *
 * Bookkeeping records stored in the registry indexes.
 */

use crate::core::types::TaskId;
use crate::task::NotificationSlot;
use std::sync::Weak;

/// One registered waiter
///
/// The slot reference is weak: the registry never keeps a task's mailbox
/// alive, it only delivers into it while the task still exists. Equality
/// ignores the slot and compares the (task, identity, kind) triple.
#[derive(Clone, Debug)]
pub(crate) struct WaitEntry<I, T> {
    pub task: TaskId,
    pub slot: Weak<NotificationSlot>,
    pub identity: I,
    pub kind: T,
}

impl<I: PartialEq, T: PartialEq> PartialEq for WaitEntry<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task && self.identity == other.identity && self.kind == other.kind
    }
}

impl<I: Eq, T: Eq> Eq for WaitEntry<I, T> {}

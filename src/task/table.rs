/*!
 * Task Table
 *
 * Registry of schedulable tasks and their notification slots.
 *
 * # Design
 *
 * The table owns every slot; tasks and the wait registry hold non-owning
 * references. Detaching a task removes the table's strong reference, so
 * outstanding wait entries observe the slot as dead instead of delivering
 * into a mailbox nobody will read.
 *
 * # Performance
 *
 * Sharded concurrent map, no global lock on attach/detach/send.
 */

use crate::core::types::{Payload, TaskId};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use super::slot::NotificationSlot;

/// Handle to an attached task
///
/// Cheap to clone. Holding a handle keeps the slot alive even after the
/// task is detached from the table.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    slot: Arc<NotificationSlot>,
}

impl TaskHandle {
    /// Task identifier assigned by the table
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The task's notification slot
    #[inline]
    pub fn slot(&self) -> &NotificationSlot {
        &self.slot
    }

    /// Non-owning reference to the slot for wait entries
    pub(crate) fn slot_ref(&self) -> Weak<NotificationSlot> {
        Arc::downgrade(&self.slot)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish()
    }
}

/// Task table
///
/// Cache-line aligned to prevent false sharing
#[repr(C, align(64))]
pub struct TaskTable {
    tasks: DashMap<TaskId, Arc<NotificationSlot>, RandomState>,
    next_id: AtomicU32,
}

impl TaskTable {
    pub fn new() -> Self {
        info!("Task table initialized");
        Self {
            tasks: DashMap::with_hasher(RandomState::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Attach a new task, allocating its slot and identifier
    pub fn attach(&self) -> TaskHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let slot = Arc::new(NotificationSlot::new());
        self.tasks.insert(id, slot.clone());
        debug!("Attached task {}", id);
        TaskHandle { id, slot }
    }

    /// Handle for an attached task, `None` if unknown or detached
    pub fn handle_of(&self, id: TaskId) -> Option<TaskHandle> {
        self.tasks.get(&id).map(|slot| TaskHandle {
            id,
            slot: slot.clone(),
        })
    }

    /// Detach a task, dropping the table's reference to its slot
    ///
    /// Returns false if the task was not attached.
    pub fn detach(&self, id: TaskId) -> bool {
        let removed = self.tasks.remove(&id).is_some();
        if removed {
            debug!("Detached task {}", id);
        }
        removed
    }

    /// Deliver a value directly to a task's slot
    ///
    /// Returns false if the task is not attached.
    pub fn send(&self, id: TaskId, value: Payload) -> bool {
        match self.tasks.get(&id) {
            Some(slot) => {
                slot.send(value);
                true
            }
            None => false,
        }
    }

    /// True if the task is attached
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Number of attached tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

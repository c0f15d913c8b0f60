/*!
 * Wait Registry
 *
 * Rendezvous point between waiting tasks and their notifiers.
 *
 * # Design
 *
 * Two indexes over the same set of wait entries live under one mutex: a
 * unique identity index for exact wake-ups and a kind index of ordered
 * buckets for broadcast. Every mutation touches both indexes inside the
 * same critical section, so they can never disagree about who is waiting.
 *
 * Registration hands back an RAII token whose Drop deregisters, which is
 * what makes the wait protocol leak-free on wake, timeout, abort, and
 * unwind alike.
 */

use crate::core::types::{Payload, TaskId};
use crate::task::TaskHandle;
use ahash::RandomState;
use log::{debug, info, trace};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;
use thiserror::Error;

use super::config::RegistryConfig;
use super::entry::WaitEntry;
use super::registration::Registration;
use super::wake::WakeResult;

/// Wait registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RegistryError {
    /// The identity already has a pending wait
    #[error("identity is already waiting")]
    IdentityInUse,

    /// An equal (task, identity, kind) entry is already registered
    #[error("equivalent waiter already registered")]
    DuplicateWaiter,

    /// The arm callback declined to suspend
    #[error("arm callback aborted the wait")]
    ArmAborted,

    /// No notification arrived within the wait timeout
    #[error("wait timed out")]
    Timeout,

    /// The registry lock could not be acquired within the configured bound
    #[error("registry lock acquisition timed out")]
    LockTimeout,
}

pub type RegistryResult<T> = Result<T, RegistryError>;

struct Indexes<I, T> {
    /// Unique entry per waiting identity
    by_identity: HashMap<I, WaitEntry<I, T>, RandomState>,
    /// Waiters per kind, in registration order
    by_kind: HashMap<T, Vec<WaitEntry<I, T>>, RandomState>,
}

/// Wait/notify rendezvous registry
///
/// Waiters register under an identity and a kind, then block on their
/// task's notification slot. Notifiers address a single waiter by the
/// (identity, kind) pair or broadcast to every waiter of a kind.
///
/// # Examples
///
/// ```
/// use task_rendezvous::{RegistryError, TaskTable, WaitRegistry, WakeResult};
/// use std::time::Duration;
///
/// let table = TaskTable::new();
/// let registry: WaitRegistry<u32, &str> = WaitRegistry::new();
///
/// // Nobody is waiting yet.
/// assert_eq!(registry.notify(&7, &"read", 1).unwrap(), WakeResult::NoWaiters);
///
/// // A zero-duration wait polls and times out.
/// let task = table.attach();
/// let outcome = registry.wait(&task, 7, "read", || true, Some(Duration::ZERO));
/// assert_eq!(outcome, Err(RegistryError::Timeout));
/// assert!(registry.is_empty());
/// ```
pub struct WaitRegistry<I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    indexes: Mutex<Indexes<I, T>>,
    config: RegistryConfig,
}

impl<I, T> WaitRegistry<I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        info!(
            "Wait registry initialized (lock_timeout={:?})",
            config.lock_timeout
        );
        Self {
            indexes: Mutex::new(Indexes {
                by_identity: HashMap::with_capacity_and_hasher(
                    config.identity_capacity,
                    RandomState::new(),
                ),
                by_kind: HashMap::with_capacity_and_hasher(
                    config.kind_capacity,
                    RandomState::new(),
                ),
            }),
            config,
        }
    }

    fn lock_indexes(&self) -> RegistryResult<MutexGuard<'_, Indexes<I, T>>> {
        match self.config.lock_timeout {
            Some(timeout) => self
                .indexes
                .try_lock_for(timeout)
                .ok_or(RegistryError::LockTimeout),
            None => Ok(self.indexes.lock()),
        }
    }

    /// Register a waiter without suspending
    ///
    /// The returned token keeps the entry alive; dropping it deregisters.
    /// Fails with [`RegistryError::IdentityInUse`] if the identity already
    /// has a pending wait.
    pub fn register(
        &self,
        task: &TaskHandle,
        identity: I,
        kind: T,
    ) -> RegistryResult<Registration<'_, I, T>> {
        let entry = WaitEntry {
            task: task.id(),
            slot: task.slot_ref(),
            identity: identity.clone(),
            kind: kind.clone(),
        };

        {
            let mut indexes = self.lock_indexes()?;
            if indexes.by_identity.contains_key(&identity) {
                return Err(RegistryError::IdentityInUse);
            }
            if let Some(bucket) = indexes.by_kind.get(&kind) {
                if bucket.contains(&entry) {
                    return Err(RegistryError::DuplicateWaiter);
                }
            }
            indexes.by_identity.insert(identity.clone(), entry.clone());
            indexes.by_kind.entry(kind.clone()).or_default().push(entry);
        }

        trace!(
            "Registered waiter task={} identity={:?} kind={:?}",
            task.id(),
            identity,
            kind
        );
        Ok(Registration::new(self, task.id(), identity, kind))
    }

    /// Register, arm, and suspend until notified or timed out
    ///
    /// The arm callback runs after registration with no registry lock held;
    /// a notification arriving while it runs lands in the slot and is
    /// observed immediately on suspension. Returning false from the
    /// callback cancels the wait with [`RegistryError::ArmAborted`].
    ///
    /// `None` suspends indefinitely, `Some(Duration::ZERO)` polls. On every
    /// outcome the entry is deregistered and any residual slot value is
    /// discarded, so the identity is immediately reusable.
    pub fn wait<F>(
        &self,
        task: &TaskHandle,
        identity: I,
        kind: T,
        arm: F,
        timeout: Option<Duration>,
    ) -> RegistryResult<Payload>
    where
        F: FnOnce() -> bool,
    {
        let registration = self.register(task, identity, kind)?;

        if !arm() {
            drop(registration);
            self.drain_residual(task);
            return Err(RegistryError::ArmAborted);
        }

        match task.slot().receive(timeout) {
            Some(value) => {
                drop(registration);
                self.drain_residual(task);
                Ok(value)
            }
            None => {
                drop(registration);
                self.drain_residual(task);
                Err(RegistryError::Timeout)
            }
        }
    }

    /// Discard a value delivered after the wait outcome was decided
    fn drain_residual(&self, task: &TaskHandle) {
        if let Some(value) = task.slot().clear() {
            trace!(
                "Discarded residual notification {:#x} for task {}",
                value,
                task.id()
            );
        }
    }

    /// Wake the waiter registered under (identity, kind)
    ///
    /// `Ok(NoWaiters)` when no matching waiter exists or its task is gone.
    pub fn notify(&self, identity: &I, kind: &T, value: Payload) -> RegistryResult<WakeResult> {
        let indexes = self.lock_indexes()?;
        let entry = match indexes.by_identity.get(identity) {
            Some(entry) if entry.kind == *kind => entry,
            _ => return Ok(WakeResult::NoWaiters),
        };
        match entry.slot.upgrade() {
            Some(slot) => {
                slot.send(value);
                debug!(
                    "Notified task {} identity={:?} kind={:?} value={:#x}",
                    entry.task, identity, kind, value
                );
                Ok(WakeResult::Woken(1))
            }
            None => Ok(WakeResult::NoWaiters),
        }
    }

    /// Wake every waiter of a kind, in registration order
    pub fn notify_all(&self, kind: &T, value: Payload) -> RegistryResult<WakeResult> {
        let indexes = self.lock_indexes()?;
        let bucket = match indexes.by_kind.get(kind) {
            Some(bucket) => bucket,
            None => return Ok(WakeResult::NoWaiters),
        };

        let mut delivered = 0;
        for entry in bucket {
            if let Some(slot) = entry.slot.upgrade() {
                slot.send(value);
                delivered += 1;
            }
        }

        if delivered == 0 {
            return Ok(WakeResult::NoWaiters);
        }
        debug!(
            "Broadcast kind={:?} value={:#x} reached {} waiters",
            kind, value, delivered
        );
        Ok(WakeResult::Woken(delivered))
    }

    /// Number of waiters registered for a kind
    pub fn waiter_count(&self, kind: &T) -> usize {
        self.indexes
            .lock()
            .by_kind
            .get(kind)
            .map_or(0, |bucket| bucket.len())
    }

    /// True if the identity has a pending wait
    pub fn is_registered(&self, identity: &I) -> bool {
        self.indexes.lock().by_identity.contains_key(identity)
    }

    /// Total number of registered waiters
    pub fn len(&self) -> usize {
        self.indexes.lock().by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.lock().by_identity.is_empty()
    }

    /// Remove an entry from both indexes
    ///
    /// Called from `Registration::drop`, which has no error channel, so
    /// acquisition blocks unconditionally.
    pub(super) fn remove_entry(&self, task: TaskId, identity: &I, kind: &T) {
        let mut indexes = self.indexes.lock();
        let removed = indexes.by_identity.remove(identity);
        debug_assert!(removed.is_some(), "wait entry missing from identity index");

        if let Some(bucket) = indexes.by_kind.get_mut(kind) {
            let probe = WaitEntry {
                task,
                slot: Weak::new(),
                identity: identity.clone(),
                kind: kind.clone(),
            };
            bucket.retain(|entry| entry != &probe);
            if bucket.is_empty() {
                indexes.by_kind.remove(kind);
            }
        }
    }
}

impl<I, T> Default for WaitRegistry<I, T>
where
    I: Clone + Eq + Hash + fmt::Debug,
    T: Clone + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/*!
 * Task Rendezvous Library
 *
 * Wait/notify rendezvous registry for cooperating tasks.
 *
 * A waiting task registers under an (identity, kind) pair, runs an arm
 * callback, and suspends on its private notification slot. Notifiers wake
 * an exact waiter by the pair or broadcast a value to every waiter of a
 * kind. Deregistration is RAII-driven, so no outcome leaves a stale entry
 * in the registry.
 */

pub mod core;
pub mod registry;
pub mod task;

pub use crate::core::types::{Payload, TaskId};
pub use registry::{
    Registration, RegistryConfig, RegistryError, RegistryResult, WaitRegistry, WakeResult,
    DEFAULT_LOCK_TIMEOUT,
};
pub use task::{NotificationSlot, TaskHandle, TaskTable};

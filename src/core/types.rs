/*!
 * Core Types
 * Common types used across the crate
 */

/// Task ID type
///
/// Non-owning identifier for a schedulable task. The registry records it for
/// entry equality and logging; it never manages the task's lifetime.
pub type TaskId = u32;

/// Notification payload type
///
/// 32-bit value carried from a notifier to the waiter it wakes.
pub type Payload = u32;

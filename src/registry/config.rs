/*!
 * Registry Configuration
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on registry lock acquisition
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Wait registry tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Bound on acquiring the registry lock, `None` blocks indefinitely
    pub lock_timeout: Option<Duration>,
    /// Pre-sized capacity of the identity index (0 = grow on demand)
    pub identity_capacity: usize,
    /// Pre-sized capacity of the kind index (0 = grow on demand)
    pub kind_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Some(DEFAULT_LOCK_TIMEOUT),
            identity_capacity: 0,
            kind_capacity: 0,
        }
    }
}

impl RegistryConfig {
    /// No lock acquisition bound
    pub const fn unbounded() -> Self {
        Self {
            lock_timeout: None,
            identity_capacity: 0,
            kind_capacity: 0,
        }
    }

    /// Pre-size both indexes for an expected number of waiters
    pub const fn sized(waiters: usize) -> Self {
        Self {
            lock_timeout: Some(DEFAULT_LOCK_TIMEOUT),
            identity_capacity: waiters,
            kind_capacity: waiters,
        }
    }
}

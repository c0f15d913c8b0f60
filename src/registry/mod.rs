/*!
 * Registry Module
 * Wait/notify rendezvous between tasks
 */

mod config;
mod entry;
mod registration;
mod registry;
mod wake;

pub use config::{RegistryConfig, DEFAULT_LOCK_TIMEOUT};
pub use registration::Registration;
pub use registry::{RegistryError, RegistryResult, WaitRegistry};
pub use wake::WakeResult;

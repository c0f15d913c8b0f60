/*!
 * Core Module
 * Fundamental shared types
 */

pub mod types;

// Re-export for convenience
pub use types::*;

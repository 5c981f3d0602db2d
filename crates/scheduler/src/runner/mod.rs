//! Scheduler runner -- the top-level feedback queue.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructors, admission, completion, and accessors
//! - `scheduling`: per-tick activation and the aging pass
//! - `estimation`: active-op enumeration and wait-time estimates

mod core;
mod estimation;
mod scheduling;
#[cfg(test)]
mod tests;

pub use self::core::Scheduler;

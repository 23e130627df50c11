//! # Task System Core Trait
//!
//! Defines `Task`, the unit of work the `TaskManager` ships to its worker threads.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method runs on a worker thread
//! 3. The task reports its output through whatever channel it owns
//!
//! Tasks own all of their inputs. Shared read-only state (such as the density field)
//! travels inside an `Arc`.

/// A unit of work that can be executed on a worker thread.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Should be coarse-grained enough to amortize the channel round trip
/// - Must not block on other tasks, since workers process their queue in order
pub trait Task: Send {
    /// Runs the task, consuming it.
    fn process(self: Box<Self>);
}

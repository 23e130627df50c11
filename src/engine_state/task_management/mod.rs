//! # Task Management System
//!
//! A fixed pool of worker threads fed through per-worker channels.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Owns the workers and distributes tasks round-robin
//! - `Task`: A unit of work executed on a worker
//! - `WorkerChannel`: Sender half of a worker's queue plus its join handle
//!
//! Tasks report results through channels they carry themselves, so the manager never
//! needs to know what a task produces.
//!
//! ## Failure Handling
//!
//! A worker that panics drops its receiver. The next send to it fails, the task comes
//! back to the caller and is executed inline instead, so published work is never lost.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(0);
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//! ```

pub mod task;

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use task::Task;

/// A communication channel between the main thread and a worker thread.
#[derive(Debug)]
struct WorkerChannel {
    task_sender: Sender<Box<dyn Task>>,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and distributes tasks across them.
pub struct TaskManager {
    channels: Vec<WorkerChannel>,
    current_channel: usize,
}

impl TaskManager {
    /// Creates a new `TaskManager`.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads. `0` uses the available parallelism.
    ///
    /// Workers that fail to spawn are skipped and logged. A pool without workers is
    /// still usable: every task then runs inline on the publishing thread.
    pub fn new(num_workers: usize) -> Self {
        let available = thread::available_parallelism().map_or(1, |count| count.get());
        let num_workers = if num_workers == 0 { available } else { num_workers };

        log::info!(
            "Starting {} generation worker(s), available parallelism: {}",
            num_workers,
            available
        );

        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    task.process();
                }
            };

            match thread::Builder::new()
                .name(format!("worldgen-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(WorkerChannel {
                    task_sender: task_tx,
                    worker,
                }),
                Err(err) => log::error!("Failed to spawn worker {}: {}", index, err),
            }
        }

        TaskManager {
            channels,
            current_channel: 0,
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Publishes a task for background execution.
    ///
    /// Workers are tried round-robin starting after the last one used. Workers whose
    /// channel is disconnected are removed from the pool.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker
    /// - `false` if no worker could take it and it was executed inline
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        let mut task = task;

        while !self.channels.is_empty() {
            let channel_idx = self.current_channel % self.channels.len();
            match self.channels[channel_idx].task_sender.send(task) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => {
                    log::error!("Worker {} disconnected, removing it from the pool", channel_idx);
                    self.channels.remove(channel_idx);
                    task = returned.0;
                }
            }
        }

        task.process();
        false
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for WorkerChannel {
            task_sender,
            worker,
        } in self.channels.drain(..)
        {
            drop(task_sender);
            if worker.join().is_err() {
                log::error!("Generation worker panicked before shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;

    struct Echo {
        value: usize,
        results: Sender<(usize, String)>,
    }

    impl Task for Echo {
        fn process(self: Box<Self>) {
            let name = thread::current().name().unwrap_or("inline").to_string();
            let _ = self.results.send((self.value, name));
        }
    }

    struct Explode;

    impl Task for Explode {
        fn process(self: Box<Self>) {
            panic!("worker failure");
        }
    }

    #[test]
    fn test_tasks_run_on_workers() {
        let mut manager = TaskManager::new(2);
        assert_eq!(manager.worker_count(), 2);

        let (tx, rx) = channel();
        for value in 0..10 {
            assert!(manager.publish_task(Box::new(Echo {
                value,
                results: tx.clone(),
            })));
        }
        drop(tx);

        let mut results: Vec<_> = rx.iter().collect();
        results.sort();
        assert_eq!(results.len(), 10);
        assert!(results
            .iter()
            .all(|(_, name)| name.starts_with("worldgen-worker-")));
    }

    #[test]
    fn test_dead_worker_falls_back_to_inline() {
        let mut manager = TaskManager::new(1);
        manager.publish_task(Box::new(Explode));

        let (tx, rx) = channel();
        // The first publish may still reach the dying worker's queue; keep publishing
        // until the pool notices the disconnect.
        let mut inline = false;
        for value in 0..100 {
            if !manager.publish_task(Box::new(Echo {
                value,
                results: tx.clone(),
            })) {
                inline = true;
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        drop(tx);

        assert!(inline);
        assert_eq!(manager.worker_count(), 0);
        assert!(rx.iter().any(|(_, name)| name != "worldgen-worker-0"));
    }
}

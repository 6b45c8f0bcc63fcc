//! Worker pool (§5): a fixed set of threads pulling boxed closures off a
//! `crossbeam-channel`, sized by `std::thread::available_parallelism()` by
//! default so "one worker per CPU" needs no extra dependency beyond what the
//! teacher's workspace already declares (and never used) for this purpose.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = crossbeam_channel::unbounded();
        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let receiver = receiver.clone();
            workers.push(
                std::thread::Builder::new()
                    .name(format!("glsld-worker-{index}"))
                    .spawn(move || {
                        for job in receiver.iter() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread"),
            );
        }
        Self { sender, workers }
    }

    /// Default pool size: one worker per available CPU (§5 "default =
    /// number of CPUs"), falling back to 1 if the platform can't answer.
    pub fn with_default_size() -> Self {
        let size = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(size)
    }

    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        // The channel is only ever dropped together with every sender clone
        // (there are none outside this struct), so this send cannot fail
        // while `self` is alive.
        let _ = self.sender.send(Box::new(job));
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn runs_every_submitted_job() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn default_size_is_at_least_one() {
        let pool = WorkerPool::with_default_size();
        assert!(pool.len() >= 1);
    }
}

//! Fixed-size worker pool for downloads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::repository::ResolvedArtifact;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker threads fed by a shared channel.
///
/// Dropping the pool closes the channel and joins the workers once their
/// in-flight jobs finish.
pub struct DownloadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl DownloadPool {
    /// Start `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|i| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("conduit-download-{}", i))
                    .spawn(move || worker_loop(receiver))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!("Failed to start download worker: {}", e);
                    None
                }
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Number of running workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Download pool is shut down"))?;
        if self.workers.is_empty() {
            return Err(anyhow::anyhow!("Download pool has no workers").into());
        }
        sender
            .send(Box::new(job))
            .map_err(|_| anyhow::anyhow!("Download pool is shut down"))?;
        Ok(())
    }
}

fn worker_loop(receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = {
            let receiver = receiver.lock().unwrap_or_else(|e| e.into_inner());
            receiver.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

impl Drop for DownloadPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                debug!("Download worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for DownloadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPool")
            .field("size", &self.size())
            .finish()
    }
}

/// Cooperative cancellation of a waiting caller.
///
/// Cancelling only stops the wait; the download keeps running.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A submitted download and the channel its result arrives on.
#[derive(Debug)]
pub struct DownloadTask {
    pub coordinate: Coordinate,
    pub transitive: bool,
    pub submitted_at: Instant,
    pub(crate) receiver: Receiver<Result<Vec<ResolvedArtifact>>>,
}

//! Execution streams.
//!
//! A stream is a FIFO work queue drained by a dedicated worker thread. Jobs
//! submitted to the same stream run strictly in order; different streams run
//! concurrently. Submission returns a [`Completion`] handle that the caller
//! can block on, so a synchronous dispatch is just submit-then-wait.

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use std::thread::JoinHandle;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a job's eventual result.
pub struct Completion<R> {
    rx: Receiver<R>,
}

impl<R> Completion<R> {
    /// Block until the job has run and take its result.
    pub fn wait(self) -> R {
        // The worker always sends before dropping the sender; a recv error
        // can only mean the worker panicked mid-job.
        self.rx
            .recv()
            .unwrap_or_else(|_| panic!("stream worker dropped a job result"))
    }
}

/// One in-order execution queue on a device.
#[derive(Debug)]
pub struct Stream {
    device: usize,
    index: usize,
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Stream {
    /// Spawn the worker thread for stream `index` on device `device`.
    pub(crate) fn spawn(device: usize, index: usize) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let worker = std::thread::Builder::new()
            .name(format!("matprof-d{device}s{index}"))
            .spawn(move || {
                for job in rx {
                    job();
                }
                debug!(device, stream = index, "stream worker exiting");
            })
            .expect("failed to spawn stream worker thread");

        Self {
            device,
            index,
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Stream index within its device.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Enqueue `job` and return a handle to its result.
    pub fn submit<R, F>(&self, job: F) -> Completion<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let (done_tx, done_rx) = bounded(1);
        let wrapped: Job = Box::new(move || {
            let result = job();
            // Receiver may have been dropped if the caller abandoned the
            // completion; that is fine.
            let _ = done_tx.send(result);
        });

        self.tx
            .as_ref()
            .expect("stream already shut down")
            .send(wrapped)
            .expect("stream worker is gone");

        Completion { rx: done_rx }
    }

    /// Run `job` on the stream and wait for it.
    pub fn run<R, F>(&self, job: F) -> R
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.submit(job).wait()
    }

    /// Block until every job enqueued so far has finished.
    pub fn synchronize(&self) {
        self.run(|| ());
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain remaining jobs and exit.
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        debug!(device = self.device, stream = self.index, "stream closed");
    }
}

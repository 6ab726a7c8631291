use std::sync::Arc;
use std::thread::{self, JoinHandle};

use flume::{Receiver, Sender};

use crate::errors::Result;
use crate::model::WorkspaceFile;
use crate::storage::WorkspaceStorage;

const WORKER_NAME: &str = "otty-workspace-save";

enum SaveJob {
    Save(WorkspaceFile),
    Flush(Sender<()>),
}

/// Fire-and-forget wrapper that moves saves off the caller's thread.
///
/// Snapshots are queued on a FIFO channel and written by a single worker in
/// submission order. When the worker falls behind, a backlog of saves is
/// collapsed into the newest snapshot; older state is never written after
/// newer state.
pub struct BackgroundStorage<S> {
    storage: Arc<S>,
    jobs: Option<Sender<SaveJob>>,
    worker: Option<JoinHandle<()>>,
}

impl<S> BackgroundStorage<S>
where
    S: WorkspaceStorage + Send + Sync + 'static,
{
    /// Start the save worker in front of `storage`.
    pub fn spawn(storage: S) -> Result<Self> {
        let storage = Arc::new(storage);
        let (jobs, queue) = flume::unbounded();
        let worker_storage = Arc::clone(&storage);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || run_worker(worker_storage.as_ref(), &queue))?;

        Ok(Self {
            storage,
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }

    /// Block until every save queued before this call has been written.
    pub fn flush(&self) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        let (ack, done) = flume::bounded(1);
        if jobs.send(SaveJob::Flush(ack)).is_err() {
            return;
        }
        let _ = done.recv();
    }

    pub fn inner(&self) -> &S {
        &self.storage
    }
}

impl<S> WorkspaceStorage for BackgroundStorage<S>
where
    S: WorkspaceStorage + Send + Sync + 'static,
{
    fn load(&self) -> WorkspaceFile {
        self.storage.load()
    }

    fn save(&self, file: &WorkspaceFile) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        if jobs.send(SaveJob::Save(file.clone())).is_err() {
            log::error!("workspace save worker stopped, dropping snapshot");
        }
    }
}

impl<S> Drop for BackgroundStorage<S> {
    fn drop(&mut self) {
        // Closing the queue lets the worker finish what is pending and exit.
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("workspace save worker panicked");
            }
        }
    }
}

fn run_worker<S: WorkspaceStorage>(storage: &S, queue: &Receiver<SaveJob>) {
    while let Ok(job) = queue.recv() {
        match job {
            SaveJob::Save(file) => {
                let (latest, flush) = coalesce(file, queue);
                storage.save(&latest);
                if let Some(ack) = flush {
                    let _ = ack.send(());
                }
            },
            SaveJob::Flush(ack) => {
                let _ = ack.send(());
            },
        }
    }
}

/// Fold queued saves into the newest one, stopping at the first flush so it
/// is acknowledged only after the state queued before it is on disk.
fn coalesce(
    mut latest: WorkspaceFile,
    queue: &Receiver<SaveJob>,
) -> (WorkspaceFile, Option<Sender<()>>) {
    for job in queue.try_iter() {
        match job {
            SaveJob::Save(file) => latest = file,
            SaveJob::Flush(ack) => return (latest, Some(ack)),
        }
    }
    (latest, None)
}

use crate::FlagStorage;
use crate::codec::PersistedFlags;
use crate::error::StorageError;
use flagkit_domain::FlagMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

type Pending = Option<(u64, FlagMap)>;

/// Defers saves to a background task; only the latest snapshot is ever written.
///
/// `save` returns as soon as the snapshot is queued. Snapshots queued while a write is
/// in flight replace each other, so a burst of changes costs at most two writes.
/// Loads go straight to the wrapped storage.
///
/// A failed background write is logged, and every later `save` reports
/// [`StorageError::Unavailable`] so the caller can stop persisting.
#[derive(Debug)]
pub struct WriteBehind {
    inner: Arc<dyn FlagStorage>,
    pending: Mutex<Option<watch::Sender<Pending>>>,
    completed: watch::Receiver<u64>,
    generation: AtomicU64,
    failed: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteBehind {
    /// Starts the background writer on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] when called outside a tokio runtime.
    pub fn spawn(inner: Arc<dyn FlagStorage>) -> Result<Self, StorageError> {
        let handle = Handle::try_current().map_err(|e| StorageError::Unavailable {
            message: e.to_string().into(),
            context: Some("Write-behind storage needs a tokio runtime".into()),
        })?;

        let (pending_tx, pending_rx) = watch::channel(None);
        let (completed_tx, completed_rx) = watch::channel(0);
        let failed = Arc::new(AtomicBool::new(false));

        let worker =
            handle.spawn(run(inner.clone(), pending_rx, completed_tx, failed.clone()));
        debug!("Write-behind worker started");

        Ok(Self {
            inner,
            pending: Mutex::new(Some(pending_tx)),
            completed: completed_rx,
            generation: AtomicU64::new(0),
            failed,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Waits until every snapshot queued so far has been written (or has failed).
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] if the worker stopped before catching up, or if
    /// a background write failed.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let target = self.generation.load(Ordering::SeqCst);
        let mut completed = self.completed.clone();
        completed.wait_for(|done| *done >= target).await.map_err(|_| {
            StorageError::Unavailable {
                message: "write-behind worker stopped".into(),
                context: Some("Flushing pending flag snapshot".into()),
            }
        })?;
        self.check_failed()
    }

    /// Stops accepting snapshots, writes the last pending one and joins the worker.
    ///
    /// # Errors
    /// Returns [`StorageError::Internal`] if the worker panicked, and
    /// [`StorageError::Unavailable`] if a background write failed.
    pub async fn shutdown(&self) -> Result<(), StorageError> {
        drop(self.pending.lock().take());
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.await.map_err(|e| StorageError::from(format!("Write-behind worker: {e}")))?;
        }
        self.check_failed()
    }

    fn check_failed(&self) -> Result<(), StorageError> {
        if self.failed.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "a background write failed".into(),
                context: None,
            });
        }
        Ok(())
    }
}

impl FlagStorage for WriteBehind {
    fn load(&self) -> Result<Option<PersistedFlags>, StorageError> {
        self.inner.load()
    }

    fn save(&self, flags: &FlagMap) -> Result<(), StorageError> {
        self.check_failed()?;

        let pending = self.pending.lock();
        let Some(tx) = pending.as_ref().filter(|tx| !tx.is_closed()) else {
            return Err(StorageError::Unavailable {
                message: "write-behind worker stopped".into(),
                context: None,
            });
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tx.send_replace(Some((generation, flags.clone())));
        Ok(())
    }
}

async fn run(
    inner: Arc<dyn FlagStorage>,
    mut pending: watch::Receiver<Pending>,
    completed: watch::Sender<u64>,
    failed: Arc<AtomicBool>,
) {
    while pending.changed().await.is_ok() {
        let Some((generation, flags)) = pending.borrow_and_update().clone() else { continue };

        let storage = inner.clone();
        match tokio::task::spawn_blocking(move || storage.save(&flags)).await {
            Ok(Ok(())) => debug!(generation, "Write-behind snapshot persisted"),
            Ok(Err(err)) => {
                failed.store(true, Ordering::SeqCst);
                error!(error = %err, generation, "Write-behind save failed");
            },
            Err(err) => {
                failed.store(true, Ordering::SeqCst);
                error!(error = %err, generation, "Write-behind save task panicked");
            },
        }

        completed.send_replace(generation);
    }

    debug!("Write-behind worker stopped");
}

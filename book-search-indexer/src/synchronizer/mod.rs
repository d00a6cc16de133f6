//! Index synchronizer.
//!
//! Keeps the search index up to date with books as they are created. Events
//! are handed over through a bounded queue and indexed by a fixed pool of
//! background workers, so creating a book never waits on the search engine.
//!
//! Delivery is at-most-once: an event that cannot be queued, or whose document
//! cannot be written, is reported and dropped. Nothing is retried; a full
//! reindex is the recovery path.

mod events;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use book_search_repository::SearchIndexService;
use book_search_shared::BookDocument;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::errors::IngestError;
use crate::reporter::IndexEventReporter;

pub use events::BookEvent;

/// Default number of events that can wait for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default number of background workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SynchronizerConfig {
    /// Size of the event queue. Dispatches beyond this are dropped.
    pub queue_capacity: usize,
    /// Number of workers indexing events concurrently.
    pub workers: usize,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Point-in-time view of the synchronizer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Events accepted into the queue.
    pub dispatched: u64,
    /// Events whose document was written.
    pub indexed: u64,
    /// Events whose document could not be written.
    pub failed: u64,
    /// Events that never made it into the queue.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct SyncCounters {
    dispatched: AtomicU64,
    indexed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl SyncCounters {
    fn snapshot(&self) -> SyncStats {
        SyncStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            indexed: self.indexed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Cheap, cloneable handle used to hand events to the synchronizer.
#[derive(Clone)]
pub struct SyncDispatcher {
    sender: mpsc::Sender<BookEvent>,
    counters: Arc<SyncCounters>,
    reporter: Arc<dyn IndexEventReporter>,
}

impl SyncDispatcher {
    /// Queue an event without waiting.
    ///
    /// A full or closed queue drops the event. The drop is counted and
    /// reported here, and also returned so callers can react if they care.
    pub fn dispatch(&self, event: BookEvent) -> Result<(), IngestError> {
        let book_id = event.book_id();

        let error = match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            Err(TrySendError::Full(_)) => IngestError::QueueFull { book_id },
            Err(TrySendError::Closed(_)) => IngestError::QueueClosed { book_id },
        };

        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        self.reporter.dispatch_dropped(book_id, &error);
        Err(error)
    }
}

/// State shared by every worker.
struct WorkerContext {
    index: Arc<SearchIndexService>,
    reporter: Arc<dyn IndexEventReporter>,
    counters: Arc<SyncCounters>,
}

impl WorkerContext {
    async fn handle(&self, event: BookEvent) {
        match event {
            BookEvent::Created(record) => {
                let book_id = record.id;
                let document = BookDocument::from(record);

                match self.index.index_one(&document).await {
                    Ok(()) => {
                        self.counters.indexed.fetch_add(1, Ordering::Relaxed);
                        self.reporter.indexed(book_id);
                    }
                    Err(e) => {
                        self.counters.failed.fetch_add(1, Ordering::Relaxed);
                        self.reporter.index_failed(book_id, &IngestError::from(e));
                    }
                }
            }
        }
    }
}

/// The running synchronizer: the worker pool plus its dispatcher.
pub struct IndexSynchronizer {
    dispatcher: SyncDispatcher,
    shutdown_tx: broadcast::Sender<()>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<SyncCounters>,
}

impl IndexSynchronizer {
    /// Start the worker pool.
    ///
    /// Must be called from within a tokio runtime. A queue capacity or worker
    /// count of zero is treated as one.
    pub fn start(
        index: Arc<SearchIndexService>,
        reporter: Arc<dyn IndexEventReporter>,
        config: SynchronizerConfig,
    ) -> Self {
        let queue_capacity = config.queue_capacity.max(1);
        let worker_count = config.workers.max(1);

        let (sender, receiver) = mpsc::channel::<BookEvent>(queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let (shutdown_tx, _) = broadcast::channel(1);
        let counters = Arc::new(SyncCounters::default());

        let context = Arc::new(WorkerContext {
            index,
            reporter: Arc::clone(&reporter),
            counters: Arc::clone(&counters),
        });

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&receiver),
                    shutdown_tx.subscribe(),
                    Arc::clone(&context),
                ))
            })
            .collect();

        info!(queue_capacity, workers = worker_count, "Index synchronizer started");

        Self {
            dispatcher: SyncDispatcher {
                sender,
                counters: Arc::clone(&counters),
                reporter,
            },
            shutdown_tx,
            workers,
            counters,
        }
    }

    /// A handle for queueing events.
    pub fn dispatcher(&self) -> SyncDispatcher {
        self.dispatcher.clone()
    }

    pub fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }

    /// Stop the workers.
    ///
    /// Workers finish the events already queued, then exit. Any worker still
    /// running after `grace` is aborted. Returns the final counters.
    #[instrument(skip(self))]
    pub async fn shutdown(mut self, grace: Duration) -> SyncStats {
        let _ = self.shutdown_tx.send(());

        let drained = tokio::time::timeout(
            grace,
            futures::future::join_all(self.workers.iter_mut()),
        )
        .await;

        if drained.is_err() {
            let mut aborted = 0;
            for worker in &self.workers {
                if !worker.is_finished() {
                    worker.abort();
                    aborted += 1;
                }
            }
            warn!(aborted, "Synchronizer workers did not drain in time");
        }

        let stats = self.counters.snapshot();
        info!(
            dispatched = stats.dispatched,
            indexed = stats.indexed,
            failed = stats.failed,
            dropped = stats.dropped,
            "Index synchronizer stopped"
        );
        stats
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<BookEvent>>>,
    mut shutdown: broadcast::Receiver<()>,
    context: Arc<WorkerContext>,
) {
    debug!(worker_id, "Synchronizer worker started");

    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                event = receiver.recv() => event,
                _ = shutdown.recv() => None,
            }
        };

        match next {
            Some(event) => context.handle(event).await,
            None => break,
        }
    }

    // Drain what was queued before the shutdown signal.
    loop {
        let next = receiver.lock().await.try_recv();
        match next {
            Ok(event) => context.handle(event).await,
            Err(_) => break,
        }
    }

    debug!(worker_id, "Synchronizer worker stopped");
}

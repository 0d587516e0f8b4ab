//! Worker pool management.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info};

use crate::crypto::{Address, AddressEncoder, CryptoError, KeyDeriver, PrivateKey, PublicKey};
use crate::matcher::Needle;
use crate::source::CandidateSource;

use super::cpu::{CpuWorker, Searcher, WorkerStats};

/// A keypair whose address contains the needle.
#[derive(Debug, Clone)]
pub struct VanityResult {
    /// The private key, in derivation byte order
    pub private_key: PrivateKey,
    /// The derived public key
    pub public_key: PublicKey,
    /// The encoded address
    pub address: Address,
    /// Offset of the needle within the address
    pub position: usize,
    /// Length of the needle
    pub needle_len: usize,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

/// Messages from workers to the reporting thread.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A match was found; the worker keeps searching.
    Found(VanityResult),
    /// Key derivation failed; the pool has been stopped.
    Failed { worker_id: usize, error: CryptoError },
}

/// Manages a pool of workers for parallel vanity address search.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The needle being searched for
    needle: Needle,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for worker events
    event_rx: Receiver<WorkerEvent>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Creates a new worker pool with the specified number of workers.
    ///
    /// Each worker gets its own clock-seeded candidate stream, selected by
    /// its worker ID.
    pub fn new<D, E>(num_workers: usize, needle: Needle, deriver: D, encoder: E) -> io::Result<Self>
    where
        D: KeyDeriver + Clone + 'static,
        E: AddressEncoder + Clone + 'static,
    {
        Self::with_sources(num_workers, needle, deriver, encoder, |id| {
            CandidateSource::from_time(id as u64)
        })
    }

    /// Creates a new worker pool, building each worker's candidate stream
    /// with `source`.
    pub fn with_sources<D, E, F>(
        num_workers: usize,
        needle: Needle,
        deriver: D,
        encoder: E,
        mut source: F,
    ) -> io::Result<Self>
    where
        D: KeyDeriver + Clone + 'static,
        E: AddressEncoder + Clone + 'static,
        F: FnMut(usize) -> CandidateSource,
    {
        let (event_tx, event_rx) = bounded(100);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());

        let searchers = (0..num_workers)
            .map(|id| Searcher::new(deriver.clone(), encoder.clone(), needle.clone(), source(id)))
            .collect();

        let handles = match Self::spawn_workers(searchers, event_tx, stop_flag.clone(), stats.clone())
        {
            Ok(handles) => handles,
            Err(err) => {
                stop_flag.store(true, Ordering::Relaxed);
                return Err(err);
            }
        };
        info!(workers = num_workers, needle = %needle, "worker pool started");

        Ok(Self {
            num_workers,
            needle,
            handles: Some(handles),
            event_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Spawns worker threads.
    fn spawn_workers<D, E>(
        searchers: Vec<Searcher<D, E>>,
        event_tx: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> io::Result<Vec<JoinHandle<()>>>
    where
        D: KeyDeriver + 'static,
        E: AddressEncoder + 'static,
    {
        searchers
            .into_iter()
            .enumerate()
            .map(|(id, searcher)| {
                let worker =
                    CpuWorker::new(id, searcher, event_tx.clone(), stop_flag.clone(), stats.clone());

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || worker.run())
            })
            .collect()
    }

    /// Waits for an event with a timeout.
    ///
    /// Returns `None` if the timeout expires first.
    pub fn wait_for_event(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops the workers, waits for them, and returns any events they sent
    /// that were not received yet.
    ///
    /// Counters are exact once this returns.
    pub fn stop_and_drain(&mut self) -> Vec<WorkerEvent> {
        self.shutdown();
        self.event_rx.try_iter().collect()
    }

    fn shutdown(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
            debug!(tried = self.total_keys(), "worker pool joined");
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the needle being searched for.
    pub fn needle(&self) -> &Needle {
        &self.needle
    }

    /// Returns the total keys generated across all workers.
    ///
    /// Workers publish their counts in batches, so this lags the true count
    /// by less than one batch per worker until the pool is joined.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_keys() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

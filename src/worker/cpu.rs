//! CPU-based search for vanity addresses.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use tracing::{debug, error};

use crate::crypto::{
    Address, AddressEncoder, CryptoError, KeyDeriver, PrivateKey, PublicKey,
};
use crate::matcher::Needle;
use crate::source::CandidateSource;

use super::{VanityResult, WorkerEvent};

/// Iterations between flushes of a worker's count into the shared stats.
pub const SEARCH_PROGRESS_INTERVAL: u64 = 1047;

/// How long a worker waits on a full result channel before re-checking the
/// stop flag.
const SEND_RETRY: Duration = Duration::from_millis(100);

/// Statistics shared by all workers of a pool.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated
    pub keys_generated: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// One sequential stream of candidates: generate, derive, encode, match.
///
/// Key and address buffers are reused across iterations; a rejected
/// candidate is simply overwritten by the next one.
pub struct Searcher<D, E> {
    deriver: D,
    encoder: E,
    needle: Needle,
    source: CandidateSource,
    private_key: PrivateKey,
    public_key: PublicKey,
    address: Address,
    tried: u64,
}

impl<D: KeyDeriver, E: AddressEncoder> Searcher<D, E> {
    pub fn new(deriver: D, encoder: E, needle: Needle, source: CandidateSource) -> Self {
        Self {
            deriver,
            encoder,
            needle,
            source,
            private_key: PrivateKey::default(),
            public_key: PublicKey::default(),
            address: Address::default(),
            tried: 0,
        }
    }

    /// Runs one iteration.
    ///
    /// Returns the needle position if the new candidate's address matches.
    /// A derivation failure is returned as-is and the iteration is not
    /// counted.
    #[inline]
    pub fn step(&mut self) -> Result<Option<usize>, CryptoError> {
        self.source.fill(&mut self.private_key);
        self.public_key = self.deriver.derive_public(&self.private_key)?;
        self.address = self.encoder.encode_address(&self.public_key);
        self.tried += 1;
        Ok(self.needle.find(&self.address))
    }

    /// Returns the number of candidates tried so far.
    pub fn tried(&self) -> u64 {
        self.tried
    }

    /// Copies the current candidate out as a result.
    pub fn result(&self, position: usize, worker_id: usize) -> VanityResult {
        VanityResult {
            private_key: self.private_key.clone(),
            public_key: self.public_key,
            address: self.address,
            position,
            needle_len: self.needle.len(),
            worker_id,
        }
    }
}

/// A CPU worker that runs a [`Searcher`] until told to stop.
pub struct CpuWorker<D, E> {
    /// Worker ID
    id: usize,
    /// The candidate stream
    searcher: Searcher<D, E>,
    /// Channel to send results
    event_tx: Sender<WorkerEvent>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
}

impl<D: KeyDeriver, E: AddressEncoder> CpuWorker<D, E> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        searcher: Searcher<D, E>,
        event_tx: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            searcher,
            event_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Tests candidates and reports every match through the channel until:
    /// - Stop flag is set
    /// - Channel is closed
    /// - Key derivation fails (the pool is stopped and the error reported)
    pub fn run(mut self) {
        debug!(worker = self.id, "worker started");
        let mut pending = 0u64;

        while !self.stop_flag.load(Ordering::Relaxed) {
            let hit = match self.searcher.step() {
                Ok(hit) => hit,
                Err(err) => {
                    error!(worker = self.id, error = %err, "key derivation failed, stopping search");
                    self.stop_flag.store(true, Ordering::Relaxed);
                    let _ = self.event_tx.send_timeout(
                        WorkerEvent::Failed {
                            worker_id: self.id,
                            error: err,
                        },
                        SEND_RETRY,
                    );
                    break;
                }
            };

            pending += 1;
            if pending == SEARCH_PROGRESS_INTERVAL {
                self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
                pending = 0;
            }

            if let Some(position) = hit {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                let result = self.searcher.result(position, self.id);
                if !self.deliver(WorkerEvent::Found(result)) {
                    break;
                }
            }
        }

        self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
        debug!(worker = self.id, tried = self.searcher.tried(), "worker stopped");
    }

    /// Sends an event, giving up if the pool stops or the receiver is gone.
    fn deliver(&self, mut event: WorkerEvent) -> bool {
        loop {
            match self.event_tx.send_timeout(event, SEND_RETRY) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(returned)) => {
                    if self.stop_flag.load(Ordering::Relaxed) {
                        return false;
                    }
                    event = returned;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}

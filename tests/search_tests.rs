//! Search loop and worker pool tests against the real NIS1 backend.

use std::time::Duration;

use nem_vanity::{
    AddressEncoder, CandidateSource, CryptoError, KeyDeriver, NemAddressEncoder, NemKeyDeriver,
    Needle, Network, PrivateKey, PublicKey, Searcher, VanityResult, WorkerEvent, WorkerPool,
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct FailingDeriver;

impl KeyDeriver for FailingDeriver {
    fn derive_public(&self, _: &PrivateKey) -> Result<PublicKey, CryptoError> {
        Err(CryptoError::Backend("hardware unavailable".into()))
    }
}

fn next_found(pool: &WorkerPool) -> VanityResult {
    match pool.wait_for_event(EVENT_TIMEOUT) {
        Some(WorkerEvent::Found(result)) => result,
        other => panic!("expected a match, got {:?}", other),
    }
}

fn assert_valid(result: &VanityResult, network: Network, needle: &str) {
    let public_key = NemKeyDeriver::new()
        .derive_public(&result.private_key)
        .unwrap();
    assert_eq!(public_key, result.public_key);

    let address = NemAddressEncoder::new(network).encode_address(&public_key);
    assert_eq!(address, result.address);

    let text = address.as_str();
    assert_eq!(&text[result.position..result.position + result.needle_len], needle);
    assert_eq!(text.find(needle), Some(result.position));
}

#[test]
fn test_pool_finds_valid_matches() {
    let needle = Needle::parse("ab").unwrap();
    let encoder = NemAddressEncoder::new(Network::Mainnet);
    let mut pool = WorkerPool::new(2, needle, NemKeyDeriver::new(), encoder).unwrap();
    assert_eq!(pool.num_workers(), 2);
    assert_eq!(pool.needle().as_str(), "AB");

    let results: Vec<_> = (0..3).map(|_| next_found(&pool)).collect();
    pool.stop_and_drain();

    for result in &results {
        assert!(result.worker_id < 2);
        assert_valid(result, Network::Mainnet, "AB");
    }
    assert!(pool.total_keys() >= results.len() as u64);
    assert!(pool.total_matches() >= results.len() as u64);
}

#[test]
fn test_pool_on_testnet() {
    let needle = Needle::parse("T").unwrap();
    let encoder = NemAddressEncoder::new(Network::Testnet);
    let mut pool = WorkerPool::new(1, needle, NemKeyDeriver::new(), encoder).unwrap();

    let result = next_found(&pool);
    pool.stop_and_drain();

    // Every testnet address starts with 'T'.
    assert_eq!(result.position, 0);
    assert_valid(&result, Network::Testnet, "T");
}

#[test]
fn test_backend_failure_stops_pool() {
    let needle = Needle::parse("nem").unwrap();
    let encoder = NemAddressEncoder::new(Network::Mainnet);
    let mut pool = WorkerPool::new(2, needle, FailingDeriver, encoder).unwrap();

    match pool.wait_for_event(EVENT_TIMEOUT) {
        Some(WorkerEvent::Failed { error, .. }) => {
            assert_eq!(error, CryptoError::Backend("hardware unavailable".into()));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
    assert!(pool.is_stopped());

    for event in pool.stop_and_drain() {
        assert!(matches!(event, WorkerEvent::Failed { .. }));
    }
    assert_eq!(pool.total_keys(), 0);
    assert_eq!(pool.total_matches(), 0);
}

#[test]
fn test_seeded_pool_is_reproducible() {
    let first_match = || {
        let needle = Needle::parse("ab").unwrap();
        let encoder = NemAddressEncoder::new(Network::Mainnet);
        let mut pool = WorkerPool::with_sources(1, needle, NemKeyDeriver::new(), encoder, |id| {
            CandidateSource::new(42, id as u64)
        })
        .unwrap();
        let result = next_found(&pool);
        pool.stop_and_drain();
        result
    };

    let a = first_match();
    let b = first_match();
    assert_eq!(a.private_key, b.private_key);
    assert_eq!(a.address, b.address);
}

#[test]
fn test_searcher_matches_pool_worker() {
    let needle = Needle::parse("ab").unwrap();
    let encoder = NemAddressEncoder::new(Network::Mainnet);

    let mut searcher = Searcher::new(
        NemKeyDeriver::new(),
        encoder,
        needle.clone(),
        CandidateSource::new(7, 0),
    );
    let position = loop {
        if let Some(position) = searcher.step().unwrap() {
            break position;
        }
    };
    let expected = searcher.result(position, 0);

    let mut pool = WorkerPool::with_sources(1, needle, NemKeyDeriver::new(), encoder, |id| {
        CandidateSource::new(7, id as u64)
    })
    .unwrap();
    let actual = next_found(&pool);
    pool.stop_and_drain();

    assert_eq!(actual.private_key, expected.private_key);
    assert_eq!(actual.position, expected.position);
}

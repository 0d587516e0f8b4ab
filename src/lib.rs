//! # nem_vanity
//!
//! NEM vanity address generator with self-verifying key derivation.
//!
//! ## Architecture
//!
//! - `crypto`: Key types, NIS1 key derivation and address encoding
//! - `source`: Deterministic candidate generation
//! - `matcher`: Needle validation and matching
//! - `worker`: Search loop and worker pool
//! - `verify`: Built-in self-test and test-vector file verification
//! - `report`: Output sinks for matches, progress and verification results
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod report;
pub mod source;
pub mod verify;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{
    Address, AddressEncoder, CryptoError, KeyDeriver, NemAddressEncoder, NemKeyDeriver, Network,
    PrivateKey, PublicKey,
};
pub use matcher::{Needle, NeedleError};
pub use report::{ConsoleSink, MemorySink, ReportSink, Reporter};
pub use source::CandidateSource;
pub use verify::{self_test, Mismatch, TestVectorRecord, Verifier, VerifyError};
pub use worker::{Searcher, VanityResult, WorkerEvent, WorkerPool};

//! Self-verification of key derivation and address encoding.
//!
//! Two checks share the same record format and comparison logic:
//! - the built-in self-test, run before any search unless skipped
//! - verification of an external file of test vectors

mod harness;
mod record;

pub use harness::{
    self_test, Mismatch, Verifier, VerifyError, BUILT_IN_VECTORS, VERIFY_PROGRESS_INTERVAL,
};
pub use record::{RecordError, TestVectorRecord};

//! Replays known-good vectors through key derivation and address encoding.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto::{
    Address, AddressEncoder, CryptoError, KeyDeriver, NemAddressEncoder, Network, PublicKey,
};
use crate::report::{ReportSink, Reporter};

use super::record::{RecordError, TestVectorRecord};

/// Records between progress updates while verifying a file.
pub const VERIFY_PROGRESS_INTERVAL: usize = 513;

/// Mainnet vectors checked before every search.
///
/// The first is the published NIS1 test vector; all were re-derived with an
/// independent Keccak/ed25519/RIPEMD-160/base32 implementation.
pub const BUILT_IN_VECTORS: &[&str] = &[
    ": 575dbb3062267eff57c970a336ebbc8fbcfe12c5bd3ed7bc11eb0481d7704ced : e4355f5775994f441a969cb0fb511c5b50fda6b986cccf370c4636e7582b430d : c5f54ba980fcbb657dbaaa42700539b207873e134d2375efeab5f1ab52f87844 : NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4",
    ": 5b0e3fa5d3b49a79022d7c1e121ba1cbbf4db5821f47ab8c708ef88defc29bfe : ea7f072d36925adf9108b153e164263aa6bfe5706be3b0c9e99a55819ff61ac2 : 96eb2a145211b1b7ab5f0d4b14f8abc8d695c7aee31a3cfc2d4881313c68eea3 : NABHFGE5ORQD3LE4O6B7JUFN47ECOFBFASC3SCAC",
    ": 738ba9bb9110aea8f15caa353aca5653b4bdfca1db9f34d0efed2ce1325aeeda : 14bbb91ac0fd71c12548851c6a868faf741d17b3c240bb06142a19947ad1874b : 2d8425e4ca2d8926346c7a7ca39826acd881a8639e81bd68820409c6e30d142a : NAVOZX4HDVOAR4W6K4WJHWPD3MOFU27DFHC7KZOZ",
    ": e8bf9bc0f35c12d8c8bf94dd3a8b5b4034f1063948e3cc5304e55e31aa4b95a6 : 0b48b5068f8edb96d9b1b5223698ae051e900a4cc6c71ef700bc7a7dedb663d5 : 4feed486777ed38e44c489c7c4e93a830e4c4a907fa19a174e630ef0f6ed0409 : NBZ6JK5YOCU6UPSSZ5D3G27UHAPHTY5HDQMGE6TT",
];

/// Expected and actual values for a record that failed verification.
#[derive(Debug, Clone)]
pub struct Mismatch {
    pub input_private_key: String,
    pub expected_public_key: PublicKey,
    pub actual_public_key: PublicKey,
    pub expected_address: String,
    pub actual_address: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("cannot open file {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        verified: usize,
        #[source]
        source: io::Error,
    },

    #[error("malformed record on line {line}: {source}")]
    Parse {
        line: usize,
        verified: usize,
        #[source]
        source: RecordError,
    },

    #[error("derived key or address does not match record on line {line}")]
    Mismatch {
        line: usize,
        verified: usize,
        mismatch: Box<Mismatch>,
    },

    #[error("key derivation failed on line {line}: {source}")]
    Crypto {
        line: usize,
        verified: usize,
        #[source]
        source: CryptoError,
    },
}

impl VerifyError {
    /// Number of records verified before the failure.
    pub fn verified(&self) -> usize {
        match self {
            VerifyError::Open { .. } => 0,
            VerifyError::Read { verified, .. }
            | VerifyError::Parse { verified, .. }
            | VerifyError::Mismatch { verified, .. }
            | VerifyError::Crypto { verified, .. } => *verified,
        }
    }
}

/// Checks records against a key deriver and address encoder.
pub struct Verifier<D, E> {
    deriver: D,
    encoder: E,
}

impl<D: KeyDeriver, E: AddressEncoder> Verifier<D, E> {
    pub fn new(deriver: D, encoder: E) -> Self {
        Self { deriver, encoder }
    }

    /// Re-derives one record, returning the differences if any.
    pub fn check(&self, record: &TestVectorRecord) -> Result<Option<Mismatch>, CryptoError> {
        let public_key = self.deriver.derive_public(&record.private_key)?;
        let address = self.encoder.encode_address(&public_key);

        if public_key == record.public_key && address.as_str() == record.address {
            return Ok(None);
        }

        Ok(Some(Mismatch {
            input_private_key: record.input_private_key.clone(),
            expected_public_key: record.public_key,
            actual_public_key: public_key,
            expected_address: record.address.clone(),
            actual_address: address,
        }))
    }

    /// Verifies records in order, stopping at the first bad one.
    ///
    /// `on_progress` is called every [`VERIFY_PROGRESS_INTERVAL`] records.
    /// Returns the number of records verified.
    pub fn verify_records<I, F>(&self, lines: I, mut on_progress: F) -> Result<usize, VerifyError>
    where
        I: IntoIterator<Item = io::Result<String>>,
        F: FnMut(usize),
    {
        let mut verified = 0;

        for (index, line) in lines.into_iter().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|source| VerifyError::Read {
                line: line_no,
                verified,
                source,
            })?;

            let record = TestVectorRecord::parse(&line).map_err(|source| VerifyError::Parse {
                line: line_no,
                verified,
                source,
            })?;

            let outcome = self.check(&record).map_err(|source| VerifyError::Crypto {
                line: line_no,
                verified,
                source,
            })?;
            if let Some(mismatch) = outcome {
                return Err(VerifyError::Mismatch {
                    line: line_no,
                    verified,
                    mismatch: Box::new(mismatch),
                });
            }

            verified += 1;
            if verified % VERIFY_PROGRESS_INTERVAL == 0 {
                on_progress(verified);
            }
        }

        Ok(verified)
    }

    /// Verifies records, reporting progress, the summary and any mismatch.
    pub fn verify_lines<I, S>(&self, lines: I, reporter: &mut Reporter<S>) -> Result<usize, VerifyError>
    where
        I: IntoIterator<Item = io::Result<String>>,
        S: ReportSink,
    {
        let outcome = self.verify_records(lines, |verified| reporter.verify_progress(verified));
        match &outcome {
            Ok(verified) => reporter.verified(*verified),
            Err(VerifyError::Mismatch { mismatch, .. }) => reporter.mismatch(mismatch),
            Err(_) => {}
        }
        outcome
    }

    /// Verifies every record in the file at `path`.
    pub fn verify_file<S: ReportSink>(
        &self,
        path: impl AsRef<Path>,
        reporter: &mut Reporter<S>,
    ) -> Result<usize, VerifyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| VerifyError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "verifying test file");
        let verified = self.verify_lines(BufReader::new(file).lines(), reporter)?;
        info!(verified, "test file verified");
        Ok(verified)
    }
}

/// Checks `deriver` against [`BUILT_IN_VECTORS`] with mainnet addresses.
///
/// A mismatch is written to `reporter`; nothing is printed on success.
pub fn self_test<D: KeyDeriver, S: ReportSink>(
    deriver: D,
    reporter: &mut Reporter<S>,
) -> Result<usize, VerifyError> {
    let verifier = Verifier::new(deriver, NemAddressEncoder::new(Network::Mainnet));
    let lines = BUILT_IN_VECTORS.iter().map(|line| Ok(line.to_string()));

    let outcome = verifier.verify_records(lines, |_| {});
    match &outcome {
        Ok(verified) => debug!(vectors = *verified, "self-test passed"),
        Err(VerifyError::Mismatch { mismatch, .. }) => reporter.mismatch(mismatch),
        Err(_) => {}
    }
    outcome
}

//! Cryptographic operations for NEM key and address generation.
//!
//! This module provides:
//! - Private/public key types with the NEM reversed-hex convention
//! - NIS1 public key derivation (ed25519 over Keccak-512)
//! - Account address encoding (Keccak-256, RIPEMD-160, base32)
//!
//! Both derivation steps sit behind traits so the search and verification
//! code can run against stub backends.

mod address;
pub mod base32;
mod keypair;

pub use address::{Address, AddressError, Network, NemAddressEncoder, ADDRESS_LEN};
pub use keypair::{NemKeyDeriver, PrivateKey, PublicKey, KEY_LEN};

/// Errors surfaced by a key derivation backend.
///
/// The NEM backend never fails; any error here means the backend is broken
/// and nothing it produced can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("Key derivation backend failed: {0}")]
    Backend(String),
}

/// Derives a public key from a private key.
pub trait KeyDeriver: Send + Sync {
    fn derive_public(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError>;
}

/// Encodes a public key into a printable account address.
pub trait AddressEncoder: Send + Sync {
    fn encode_address(&self, public_key: &PublicKey) -> Address;
}

impl<T: KeyDeriver + ?Sized> KeyDeriver for &T {
    fn derive_public(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError> {
        (**self).derive_public(private_key)
    }
}

impl<T: AddressEncoder + ?Sized> AddressEncoder for &T {
    fn encode_address(&self, public_key: &PublicKey) -> Address {
        (**self).encode_address(public_key)
    }
}

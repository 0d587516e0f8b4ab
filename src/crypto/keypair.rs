//! NEM keypair types and public key derivation.

use std::fmt;

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use tiny_keccak::{Hasher, Keccak};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{CryptoError, KeyDeriver};

/// Length in bytes of both private and public keys.
pub const KEY_LEN: usize = 32;

/// A 32-byte private key (the ed25519 seed).
///
/// Bytes are held in derivation order. NEM wallets display and import
/// private keys with the byte order reversed, so the only textual form this
/// type offers is [`PrivateKey::to_reversed_hex`].
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; KEY_LEN]);

impl PrivateKey {
    /// Creates a private key from bytes in derivation order.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a private key from its NEM display form: 64 hex characters
    /// whose byte order is reversed relative to derivation order.
    pub fn from_reversed_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }

    /// Returns the private key bytes in derivation order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[inline]
    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.0
    }

    /// Returns the key as lowercase hex read from byte 31 down to byte 0,
    /// which is the form NEM wallets import.
    pub fn to_reversed_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        let encoded = hex::encode(reversed);
        reversed.zeroize();
        encoded
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A 32-byte compressed ed25519 public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    /// Creates a public key from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a public key from 64 hex characters in natural byte order.
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Returns the public key bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Returns the key as lowercase hex in natural byte order.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// NIS1 key derivation: ed25519 with Keccak-512 in place of SHA-512.
#[derive(Debug, Clone, Copy, Default)]
pub struct NemKeyDeriver;

impl NemKeyDeriver {
    pub fn new() -> Self {
        Self
    }
}

impl KeyDeriver for NemKeyDeriver {
    /// Derives the public key.
    ///
    /// Process:
    /// 1. Hash the 32 private key bytes with Keccak-512
    /// 2. Clamp the lower 32 bytes of the hash into an ed25519 scalar
    /// 3. Multiply the base point by the scalar and compress the result
    #[inline]
    fn derive_public(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError> {
        let mut hasher = Keccak::v512();
        hasher.update(private_key.as_bytes());
        let mut hash = [0u8; 64];
        hasher.finalize(&mut hash);

        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&hash[..32]);
        scalar_bytes[0] &= 248;
        scalar_bytes[31] &= 127;
        scalar_bytes[31] |= 64;

        // The base point has prime order, so reducing the clamped scalar
        // yields the same point.
        let scalar = Scalar::from_bytes_mod_order(scalar_bytes);
        let point = EdwardsPoint::mul_base(&scalar);

        hash.zeroize();
        scalar_bytes.zeroize();

        Ok(PublicKey::from_bytes(point.compress().to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_PRIVATE: &str = "575dbb3062267eff57c970a336ebbc8fbcfe12c5bd3ed7bc11eb0481d7704ced";
    const VECTOR_PUBLIC: &str = "c5f54ba980fcbb657dbaaa42700539b207873e134d2375efeab5f1ab52f87844";

    #[test]
    fn test_known_public_key() {
        let private_key = PrivateKey::from_reversed_hex(VECTOR_PRIVATE).unwrap();
        let public_key = NemKeyDeriver::new().derive_public(&private_key).unwrap();
        assert_eq!(public_key.to_hex(), VECTOR_PUBLIC);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let deriver = NemKeyDeriver::new();
        let private_key = PrivateKey::from_bytes([7u8; 32]);
        let first = deriver.derive_public(&private_key).unwrap();
        let second = deriver.derive_public(&private_key).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reversed_hex_output() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let private_key = PrivateKey::from_bytes(bytes);
        assert_eq!(
            private_key.to_reversed_hex(),
            "1f1e1d1c1b1a191817161514131211100f0e0d0c0b0a09080706050403020100"
        );
    }

    #[test]
    fn test_reversed_hex_roundtrip() {
        let private_key = PrivateKey::from_reversed_hex(VECTOR_PRIVATE).unwrap();
        assert_eq!(private_key.as_bytes()[0], 0xed);
        assert_eq!(private_key.as_bytes()[31], 0x57);
        assert_eq!(private_key.to_reversed_hex(), VECTOR_PRIVATE);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(PrivateKey::from_reversed_hex(&VECTOR_PRIVATE[1..]).is_err());
        assert!(PublicKey::from_hex(&format!("{}0", VECTOR_PUBLIC)).is_err());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let private_key = PrivateKey::from_reversed_hex(VECTOR_PRIVATE).unwrap();
        let debug = format!("{:?}", private_key);
        assert!(!debug.contains("575d"));
        assert!(debug.contains("redacted"));
    }
}

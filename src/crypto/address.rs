//! NEM account address representation and encoding.

use std::fmt;
use std::str::FromStr;

use ripemd::{Digest, Ripemd160};
use tiny_keccak::{Hasher, Keccak};

use super::base32;
use super::{AddressEncoder, PublicKey};

/// Length of an encoded address in characters.
pub const ADDRESS_LEN: usize = 40;

/// Version byte + RIPEMD-160 digest + 4 checksum bytes.
const DECODED_LEN: usize = 25;

/// The NEM network an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// Public main network, addresses start with `N`
    #[default]
    Mainnet,
    /// Public test network, addresses start with `T`
    Testnet,
    /// Mijin private chains, addresses start with `M`
    Mijin,
}

impl Network {
    /// Returns the version byte prepended to the address hash.
    pub const fn version_byte(self) -> u8 {
        match self {
            Network::Mainnet => 0x68,
            Network::Testnet => 0x98,
            Network::Mijin => 0x60,
        }
    }

    /// Returns the first character shared by every address on this network.
    pub const fn prefix(self) -> char {
        match self {
            Network::Mainnet => 'N',
            Network::Testnet => 'T',
            Network::Mijin => 'M',
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "mijin" => Ok(Network::Mijin),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Mijin => write!(f, "mijin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address must be 40 characters, got {0}")]
    InvalidLength(usize),

    #[error("Invalid address character: {0:?}")]
    InvalidCharacter(char),
}

/// A NEM account address: 40 uppercase base32 characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Parses an address string, checking its length and alphabet.
    ///
    /// No checksum validation is done; this is only a well-formedness check.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let bytes = s.as_bytes();
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(s.chars().count()));
        }
        if let Some(c) = s.chars().find(|&c| !c.is_ascii() || !base32::is_base32(c as u8)) {
            return Err(AddressError::InvalidCharacter(c));
        }

        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(bytes);
        Ok(Self(address))
    }

    /// Returns the address characters as bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns the address as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ever built from the base32 alphabet.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Default for Address {
    fn default() -> Self {
        Self([base32::ALPHABET[0]; ADDRESS_LEN])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.as_str())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes public keys into NIS1 account addresses for one network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NemAddressEncoder {
    network: Network,
}

impl NemAddressEncoder {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl AddressEncoder for NemAddressEncoder {
    /// Encodes the address.
    ///
    /// Process:
    /// 1. Hash the public key with Keccak-256, then RIPEMD-160
    /// 2. Prepend the network version byte
    /// 3. Append the first 4 bytes of Keccak-256 over those 21 bytes
    /// 4. Base32 encode the 25 bytes into 40 characters
    #[inline]
    fn encode_address(&self, public_key: &PublicKey) -> Address {
        let mut hasher = Keccak::v256();
        hasher.update(public_key.as_bytes());
        let mut sha3 = [0u8; 32];
        hasher.finalize(&mut sha3);

        let ripe = Ripemd160::digest(sha3);

        let mut decoded = [0u8; DECODED_LEN];
        decoded[0] = self.network.version_byte();
        decoded[1..21].copy_from_slice(&ripe);

        let mut hasher = Keccak::v256();
        hasher.update(&decoded[..21]);
        let mut checksum = [0u8; 32];
        hasher.finalize(&mut checksum);
        decoded[21..].copy_from_slice(&checksum[..4]);

        let mut address = [0u8; ADDRESS_LEN];
        base32::encode_into(&decoded, &mut address);
        Address(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_PUBLIC: &str = "c5f54ba980fcbb657dbaaa42700539b207873e134d2375efeab5f1ab52f87844";

    fn vector_public() -> PublicKey {
        PublicKey::from_hex(VECTOR_PUBLIC).unwrap()
    }

    #[test]
    fn test_mainnet_address() {
        let encoder = NemAddressEncoder::new(Network::Mainnet);
        let address = encoder.encode_address(&vector_public());
        assert_eq!(address.as_str(), "NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4");
    }

    #[test]
    fn test_network_prefixes() {
        let public_key = vector_public();
        for network in [Network::Mainnet, Network::Testnet, Network::Mijin] {
            let encoder = NemAddressEncoder::new(network);
            assert_eq!(encoder.network(), network);
            let address = encoder.encode_address(&public_key);
            assert!(address.as_str().starts_with(network.prefix()));
        }

        let testnet = NemAddressEncoder::new(Network::Testnet).encode_address(&public_key);
        assert_eq!(testnet.as_str(), "TDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5KZPFMK2");
    }

    #[test]
    fn test_parse_address() {
        let address = Address::parse("NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4").unwrap();
        assert_eq!(address.to_string(), "NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4");

        assert_eq!(
            Address::parse("NDD2CT6LQ"),
            Err(AddressError::InvalidLength(9))
        );
        assert_eq!(
            Address::parse("NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R1"),
            Err(AddressError::InvalidCharacter('1'))
        );
        assert_eq!(
            Address::parse("nDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4"),
            Err(AddressError::InvalidCharacter('n'))
        );
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!("TEST".parse::<Network>(), Ok(Network::Testnet));
        assert_eq!("mijin".parse::<Network>(), Ok(Network::Mijin));
        assert!("nis2".parse::<Network>().is_err());
    }
}

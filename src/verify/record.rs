//! Test-vector record parsing.
//!
//! One record per line:
//!
//! ```text
//! : <private key, 64 hex, reversed> : <hex, ignored> : <public key, 64 hex> : <address>
//! ```
//!
//! Hex fields are lowercase; the address uses the base32 alphabet.

use crate::crypto::{base32, PrivateKey, PublicKey};

const SEPARATOR: &str = " : ";
const KEY_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record must have the form ': <private key> : <hex> : <public key> : <address>'")]
    Layout,

    #[error("{field} must contain only lowercase hex characters")]
    InvalidHex { field: &'static str },

    #[error("{field} must have 64 characters, got {len}")]
    KeyLength { field: &'static str, len: usize },

    #[error("address must contain only base32 characters (A-Z, 2-7)")]
    InvalidAddress,
}

/// A parsed (private key, public key, address) triple.
#[derive(Debug, Clone)]
pub struct TestVectorRecord {
    /// The private key field exactly as written in the record
    pub input_private_key: String,
    /// The private key in derivation byte order
    pub private_key: PrivateKey,
    /// The expected public key
    pub public_key: PublicKey,
    /// The expected address
    pub address: String,
}

impl TestVectorRecord {
    /// Parses one record. A trailing `\r` is ignored.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let rest = line.strip_prefix(": ").ok_or(RecordError::Layout)?;

        let fields: Vec<&str> = rest.split(SEPARATOR).collect();
        let &[private, intermediate, public, address] = fields.as_slice() else {
            return Err(RecordError::Layout);
        };

        check_hex("private key", private)?;
        check_hex("second column", intermediate)?;
        check_hex("public key", public)?;
        check_key_len("private key", private)?;
        check_key_len("public key", public)?;

        if address.is_empty() || !address.bytes().all(base32::is_base32) {
            return Err(RecordError::InvalidAddress);
        }

        let private_key = PrivateKey::from_reversed_hex(private)
            .map_err(|_| RecordError::InvalidHex { field: "private key" })?;
        let public_key = PublicKey::from_hex(public)
            .map_err(|_| RecordError::InvalidHex { field: "public key" })?;

        Ok(Self {
            input_private_key: private.to_owned(),
            private_key,
            public_key,
            address: address.to_owned(),
        })
    }
}

fn check_hex(field: &'static str, value: &str) -> Result<(), RecordError> {
    let is_hex = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if is_hex {
        Ok(())
    } else {
        Err(RecordError::InvalidHex { field })
    }
}

fn check_key_len(field: &'static str, value: &str) -> Result<(), RecordError> {
    if value.len() == KEY_HEX_LEN {
        Ok(())
    } else {
        Err(RecordError::KeyLength {
            field,
            len: value.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE: &str = "575dbb3062267eff57c970a336ebbc8fbcfe12c5bd3ed7bc11eb0481d7704ced";
    const MIDDLE: &str = "e4355f5775994f441a969cb0fb511c5b50fda6b986cccf370c4636e7582b430d";
    const PUBLIC: &str = "c5f54ba980fcbb657dbaaa42700539b207873e134d2375efeab5f1ab52f87844";
    const ADDRESS: &str = "NDD2CT6LQLIYQ56KIXI3ENTM6EK3D44P5JFXJ4R4";

    fn line(private: &str, public: &str, address: &str) -> String {
        format!(": {} : {} : {} : {}", private, MIDDLE, public, address)
    }

    #[test]
    fn test_parse_record() {
        let record = TestVectorRecord::parse(&line(PRIVATE, PUBLIC, ADDRESS)).unwrap();
        assert_eq!(record.input_private_key, PRIVATE);
        assert_eq!(record.private_key.to_reversed_hex(), PRIVATE);
        assert_eq!(record.private_key.as_bytes()[0], 0xed);
        assert_eq!(record.public_key.to_hex(), PUBLIC);
        assert_eq!(record.address, ADDRESS);
    }

    #[test]
    fn test_crlf_tolerated() {
        let crlf = format!("{}\r", line(PRIVATE, PUBLIC, ADDRESS));
        assert!(TestVectorRecord::parse(&crlf).is_ok());
    }

    #[test]
    fn test_short_and_long_keys() {
        let short = line(&PRIVATE[1..], PUBLIC, ADDRESS);
        assert_eq!(
            TestVectorRecord::parse(&short).unwrap_err(),
            RecordError::KeyLength { field: "private key", len: 63 }
        );

        let long = line(&format!("{}0", PRIVATE), PUBLIC, ADDRESS);
        assert_eq!(
            TestVectorRecord::parse(&long).unwrap_err(),
            RecordError::KeyLength { field: "private key", len: 65 }
        );

        let short_public = line(PRIVATE, &PUBLIC[2..], ADDRESS);
        assert_eq!(
            TestVectorRecord::parse(&short_public).unwrap_err(),
            RecordError::KeyLength { field: "public key", len: 62 }
        );
    }

    #[test]
    fn test_character_classes() {
        let upper_hex = line(&PRIVATE.to_uppercase(), PUBLIC, ADDRESS);
        assert_eq!(
            TestVectorRecord::parse(&upper_hex).unwrap_err(),
            RecordError::InvalidHex { field: "private key" }
        );

        let lower_address = line(PRIVATE, PUBLIC, &ADDRESS.to_lowercase());
        assert_eq!(
            TestVectorRecord::parse(&lower_address).unwrap_err(),
            RecordError::InvalidAddress
        );

        let bad_middle = format!(": {} : xyz : {} : {}", PRIVATE, PUBLIC, ADDRESS);
        assert_eq!(
            TestVectorRecord::parse(&bad_middle).unwrap_err(),
            RecordError::InvalidHex { field: "second column" }
        );
    }

    #[test]
    fn test_layout_errors() {
        let bad_lines = vec![
            String::new(),
            ADDRESS.to_string(),
            format!("{} : {} : {} : {}", PRIVATE, MIDDLE, PUBLIC, ADDRESS),
            format!(": {} : {} : {}", PRIVATE, PUBLIC, ADDRESS),
            format!(": {} : {} : {} : {} : {}", PRIVATE, MIDDLE, PUBLIC, ADDRESS, ADDRESS),
            format!(":  {} : {} : {} : {}", PRIVATE, MIDDLE, PUBLIC, ADDRESS),
        ];
        for bad in &bad_lines {
            assert!(TestVectorRecord::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }
}

//! RFC 4648 base32 encoding (no padding), as used by NEM account addresses.

/// Base32 character set
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Returns true if `c` belongs to the base32 alphabet.
#[inline]
pub fn is_base32(c: u8) -> bool {
    matches!(c, b'A'..=b'Z' | b'2'..=b'7')
}

/// Returns the number of characters produced for `len` input bytes.
#[inline]
pub const fn encoded_len(len: usize) -> usize {
    (len * 8 + 4) / 5
}

/// Encodes `input` into `output`, which must be exactly
/// [`encoded_len`]`(input.len())` bytes long.
///
/// Bits are consumed most significant first; a trailing partial group is
/// padded with zero bits.
pub fn encode_into(input: &[u8], output: &mut [u8]) {
    debug_assert_eq!(output.len(), encoded_len(input.len()));

    let mut acc: u32 = 0;
    let mut bits = 0u32;
    let mut out = 0;

    for &byte in input {
        acc = (acc << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            output[out] = ALPHABET[((acc >> bits) & 0x1f) as usize];
            out += 1;
        }
        acc &= (1 << bits) - 1;
    }

    if bits > 0 {
        output[out] = ALPHABET[((acc << (5 - bits)) & 0x1f) as usize];
    }
}

/// Encodes `input` into a freshly allocated string.
pub fn encode(input: &[u8]) -> String {
    let mut output = vec![0u8; encoded_len(input.len())];
    encode_into(input, &mut output);
    output.into_iter().map(char::from).collect()
}

// Licensed under the Apache-2.0 license

//! Integrity checks applied to raw e-Fuse fields.
//!
//! Identity and secret fields are provisioned either fully cleared or with
//! exactly as many 1 bits as 0 bits. Any other population count means the
//! field was corrupted or tampered with.

/// Vendor and product IDs each occupy one 32-bit fuse word.
pub const IDENTITY_FIELD_BYTES: usize = 4;
/// Size of the IMS fuse bank.
pub const IMS_FUSE_BYTES: usize = 35;
/// Only the leading bytes of the IMS bank carry the secret.
pub const IMS_MEANINGFUL_BYTES: usize = 32;

pub type IdentityField = [u8; IDENTITY_FIELD_BYTES];
pub type ImsField = [u8; IMS_FUSE_BYTES];

const MASK8_1S: u8 = 0x55; // 0101...
const MASK8_2S: u8 = 0x33; // 00110011..
const MASK8_4S: u8 = 0x0f; // 4 zeros, 4 ones

const MASK32_1S: u32 = 0x5555_5555;
const MASK32_2S: u32 = 0x3333_3333;
const MASK32_4S: u32 = 0x0f0f_0f0f;
const MASK32_8S: u32 = 0x00ff_00ff;
const MASK32_16S: u32 = 0x0000_ffff;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HammingState {
    /// Every bit is clear
    Unset,
    /// Exactly half of the bits are set
    ValidSet,
    Invalid,
}

/// Count the set bits in `buf`.
///
/// Whole 32-bit words are reduced in parallel; the trailing bytes are counted
/// one at a time.
pub fn count_ones(buf: &[u8]) -> usize {
    let mut count = 0;
    let mut words = buf.chunks_exact(4);

    for word in words.by_ref() {
        let mut x = u32::from_ne_bytes([word[0], word[1], word[2], word[3]]);
        // count of each 2 bits into those 2 bits
        x = (x & MASK32_1S) + ((x >> 1) & MASK32_1S);
        // count of each 4 bits into those 4 bits
        x = (x & MASK32_2S) + ((x >> 2) & MASK32_2S);
        // count of each 8 bits into those 8 bits
        x = (x & MASK32_4S) + ((x >> 4) & MASK32_4S);
        // count of each 16 bits into those 16 bits
        x = (x & MASK32_8S) + ((x >> 8) & MASK32_8S);
        // total into the low 16 bits
        x = (x + (x >> 16)) & MASK32_16S;
        count += x as usize;
    }

    for &byte in words.remainder() {
        let mut x = byte;
        x -= (x >> 1) & MASK8_1S;
        x = (x & MASK8_2S) + ((x >> 2) & MASK8_2S);
        x = (x + (x >> 4)) & MASK8_4S;
        count += x as usize;
    }

    count
}

/// Classify a fuse field by its Hamming weight.
pub fn hamming_state(buf: &[u8]) -> HammingState {
    match count_ones(buf) {
        0 => HammingState::Unset,
        n if n == buf.len() * 8 / 2 => HammingState::ValidSet,
        _ => HammingState::Invalid,
    }
}

/// True if the field is unset or has a balanced bit pattern.
pub fn valid_hamming_weight(buf: &[u8]) -> bool {
    hamming_state(buf) != HammingState::Invalid
}

/// True if every byte of `buf` equals `val`.
pub fn is_buf_const(buf: &[u8], val: u8) -> bool {
    let val32 = u32::from_ne_bytes([val; 4]);
    let mut words = buf.chunks_exact(4);

    if words
        .by_ref()
        .any(|word| u32::from_ne_bytes([word[0], word[1], word[2], word[3]]) != val32)
    {
        return false;
    }
    words.remainder().iter().all(|&byte| byte == val)
}

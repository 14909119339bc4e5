/*++

Licensed under the Apache-2.0 license.

File Name:

    endpoint_id.rs

Abstract:

    Derivation of the public Endpoint Unique ID from the Internal Master
    Secret (IMS).

--*/

use crate::fuses::IMS_MEANINGFUL_BYTES;
use bridge_error::BridgeResult;
use romtime::{Sha256Alg, Sha256Digest, Sha256DigestOp, SHA256_DIGEST_BYTE_SIZE};
use zeroize::Zeroizing;

/// Leading IMS bytes that feed the derivation.
const IMS_KEY_BYTES: usize = 16;
const IMS_PAD_BYTE: u8 = 0x3d;
const Z0_PAD_WORD: u32 = 0x0101_0101;
const Z0_PAD_WORDS: usize = 8;

/// 64-bit identifier published on the UniPro link.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct EndpointId {
    pub low: u32,
    pub high: u32,
}

impl EndpointId {
    /// Identifier used by simulation builds that have no real IMS.
    pub const SIMULATION: Self = Self::new(0x1234_5678, 0x9ABC_DEF0);

    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub const fn from_u64(value: u64) -> Self {
        Self::new(value as u32, (value >> 32) as u32)
    }

    pub const fn as_u64(&self) -> u64 {
        ((self.high as u64) << 32) | self.low as u64
    }

    /// Interpret the first eight digest bytes as the low then high word, in
    /// the chip's little-endian byte order.
    fn from_digest(digest: &Sha256Digest) -> Self {
        Self::new(
            u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]),
            u32::from_le_bytes([digest[4], digest[5], digest[6], digest[7]]),
        )
    }
}

/// How the ROM produces the endpoint ID once the IMS has been validated.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum DerivationMode {
    /// Run the IMS through the hash chain
    #[default]
    Hashed,
    /// Publish a fixed identifier instead of hashing the IMS
    Fixed(EndpointId),
}

/// Compute the Endpoint Unique ID from the IMS.
///
/// ```text
/// Y1          = sha256(IMS[0:15] xor copy(0x3d, 16))
/// Z0          = sha256(Y1 || copy(0x01, 32))
/// EP_UID[0:7] = sha256(Z0)[0:7]
/// ```
///
/// The input is fed to the hash one 32-bit word at a time, matching the
/// boundaries downstream verifiers were built against. The IMS must already
/// be known to be non-zero with a valid Hamming weight.
///
/// # Arguments
///
/// * `sha` - SHA-256 engine, used for three separate sessions
/// * `ims` - meaningful bytes of the Internal Master Secret
pub fn derive_endpoint_id<S: Sha256Alg>(
    sha: &mut S,
    ims: &[u8; IMS_MEANINGFUL_BYTES],
) -> BridgeResult<EndpointId> {
    let mut y1 = Zeroizing::new([0u8; SHA256_DIGEST_BYTE_SIZE]);
    let mut z0 = Zeroizing::new([0u8; SHA256_DIGEST_BYTE_SIZE]);
    let mut ep_uid = Zeroizing::new([0u8; SHA256_DIGEST_BYTE_SIZE]);

    let mut op = sha.digest_init()?;
    let mut word = Zeroizing::new([0u8; 4]);
    for chunk in ims[..IMS_KEY_BYTES].chunks_exact(4) {
        for (dst, src) in word.iter_mut().zip(chunk) {
            *dst = src ^ IMS_PAD_BYTE;
        }
        op.update(&word[..])?;
    }
    op.finalize(&mut *y1)?;

    let mut op = sha.digest_init()?;
    op.update(&y1[..])?;
    for _ in 0..Z0_PAD_WORDS {
        op.update(&Z0_PAD_WORD.to_ne_bytes())?;
    }
    op.finalize(&mut *z0)?;

    let mut op = sha.digest_init()?;
    op.update(&z0[..])?;
    op.finalize(&mut *ep_uid)?;

    Ok(EndpointId::from_digest(&ep_uid))
}

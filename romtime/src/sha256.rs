/*++

Licensed under the Apache-2.0 license.

File Name:

    sha256.rs

Abstract:

    File contains the SHA-256 hash primitive used by the boot ROM and a
    software engine backing it.

--*/

use bridge_error::{BridgeError, BridgeResult};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

pub const SHA256_DIGEST_BYTE_SIZE: usize = 32;
pub const SHA256_MAX_DATA_SIZE: usize = 1024 * 1024;

pub type Sha256Digest = [u8; SHA256_DIGEST_BYTE_SIZE];

pub trait Sha256DigestOp<'a> {
    /// Feed `data` into the running digest. May be called any number of
    /// times; the result only depends on the concatenated input.
    fn update(&mut self, data: &[u8]) -> BridgeResult<()>;

    /// # Arguments
    ///
    /// * `digest`  - result of the sha256 digest operation
    fn finalize(self, digest: &mut Sha256Digest) -> BridgeResult<()>;
}

pub trait Sha256Alg {
    type DigestOp<'a>: Sha256DigestOp<'a>
    where
        Self: 'a;

    /// Start a fresh digest session.
    fn digest_init(&mut self) -> BridgeResult<Self::DigestOp<'_>>;

    /// Calculate the digest of the buffer in a single session
    fn digest(&mut self, buf: &[u8]) -> BridgeResult<Sha256Digest> {
        let mut op = self.digest_init()?;
        op.update(buf)?;
        let mut digest = [0u8; SHA256_DIGEST_BYTE_SIZE];
        op.finalize(&mut digest)?;
        Ok(digest)
    }
}

/// SHA-256 computed on the core rather than by a hash peripheral.
#[derive(Default)]
pub struct SoftSha256 {
    sessions: u32,
}

impl SoftSha256 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of digest sessions started on this engine.
    pub fn sessions(&self) -> u32 {
        self.sessions
    }
}

impl Sha256Alg for SoftSha256 {
    type DigestOp<'a> = SoftSha256DigestOp<'a>;

    fn digest_init(&mut self) -> BridgeResult<SoftSha256DigestOp<'_>> {
        self.sessions = self.sessions.wrapping_add(1);
        Ok(SoftSha256DigestOp {
            _sha: self,
            hasher: Sha256::new(),
            data_size: 0,
        })
    }
}

pub struct SoftSha256DigestOp<'a> {
    _sha: &'a mut SoftSha256,
    hasher: Sha256,
    data_size: usize,
}

impl<'a> Sha256DigestOp<'a> for SoftSha256DigestOp<'a> {
    fn update(&mut self, data: &[u8]) -> BridgeResult<()> {
        let data_size = self
            .data_size
            .checked_add(data.len())
            .filter(|size| *size <= SHA256_MAX_DATA_SIZE)
            .ok_or(BridgeError::DRIVER_SHA256_MAX_DATA)?;
        self.hasher.update(data);
        self.data_size = data_size;
        Ok(())
    }

    fn finalize(self, digest: &mut Sha256Digest) -> BridgeResult<()> {
        let mut out = self.hasher.finalize();
        digest.copy_from_slice(&out);
        out.as_mut_slice().zeroize();
        Ok(())
    }
}

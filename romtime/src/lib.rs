// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

mod sha256;

pub use sha256::{
    Sha256Alg, Sha256Digest, Sha256DigestOp, SoftSha256, SoftSha256DigestOp,
    SHA256_DIGEST_BYTE_SIZE, SHA256_MAX_DATA_SIZE,
};

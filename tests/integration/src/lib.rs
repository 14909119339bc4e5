// Licensed under the Apache-2.0 license

//! Helpers shared by the e-Fuse boot scenarios.

use bridge_error::{BridgeResult, LastError};
use bridge_rom::fuses::IMS_MEANINGFUL_BYTES;
use bridge_rom::{efuse_init, EfuseConfig, EfuseReport, EndpointId};
use emulator_periph::{EmulatedEfuse, FuseImage};
use log::LevelFilter;
use romtime::SoftSha256;
use sha2::{Digest, Sha256};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

/// Route ROM logging to stderr. Safe to call from every test.
pub fn init_logger() {
    // only the first caller in a test binary installs the logger
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> FuseImage {
    FuseImage::load(&fixture(name)).unwrap()
}

pub struct BootOutcome {
    pub efuse: EmulatedEfuse,
    pub result: BridgeResult<EfuseReport>,
    pub last_error: LastError,
    pub hash_sessions: u32,
}

/// Run the e-Fuse bring-up once against `efuse`, as the boot ROM would.
pub fn boot(mut efuse: EmulatedEfuse, config: EfuseConfig) -> BootOutcome {
    init_logger();
    let mut sha = SoftSha256::new();
    let mut last_error = LastError::new();
    let result = efuse_init(&mut efuse, &mut sha, config, &mut last_error);
    BootOutcome {
        efuse,
        result,
        last_error,
        hash_sessions: sha.sessions(),
    }
}

pub fn boot_image(image: FuseImage) -> BootOutcome {
    boot(EmulatedEfuse::new(image), EfuseConfig::default())
}

/// Endpoint ID computed straight from the derivation formula with `sha2`.
pub fn reference_endpoint_id(ims: &[u8]) -> EndpointId {
    assert!(ims.len() >= IMS_MEANINGFUL_BYTES);
    let masked: Vec<u8> = ims[..16].iter().map(|b| b ^ 0x3d).collect();
    let y1 = Sha256::digest(&masked);

    let mut z0 = Sha256::new();
    z0.update(y1);
    z0.update([0x01u8; 32]);
    let ep_uid = Sha256::digest(z0.finalize());

    EndpointId::new(
        u32::from_le_bytes(ep_uid[0..4].try_into().unwrap()),
        u32::from_le_bytes(ep_uid[4..8].try_into().unwrap()),
    )
}

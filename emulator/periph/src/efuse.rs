/*++

Licensed under the Apache-2.0 license.

File Name:

    efuse.rs

Abstract:

    File contains the e-Fuse bank and UniPro DME attribute emulation used to
    run the boot ROM e-Fuse flow on the host.

--*/

use bridge_rom::fuses::{ImsField, IMS_FUSE_BYTES};
use bridge_rom::unipro::{AttrScope, AttrWriteError};
use bridge_rom::EfusePeripheral;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Size of the emulated CMS fuse bank.
pub const CMS_FUSE_BYTES: usize = 32;

/// UniPro config result code for an access the peer could not complete.
const UNIPRO_PEER_COMMUNICATION_FAILURE: u32 = 8;

#[derive(Error, Debug)]
pub enum FuseImageError {
    #[error("failed to read fuse image: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid fuse image: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Programmed contents of the e-Fuse bank.
///
/// Loaded from TOML; the secret banks are hex strings of their full length.
/// Omitted fields read back as zero (unprogrammed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuseImage {
    #[serde(default)]
    pub ecc_status: u32,
    #[serde(default)]
    pub vid: u32,
    #[serde(default)]
    pub pid: u32,
    #[serde(default = "unprogrammed_ims", deserialize_with = "hex_bank")]
    pub ims: ImsField,
    #[serde(default = "unprogrammed_cms", deserialize_with = "hex_bank")]
    pub cms: [u8; CMS_FUSE_BYTES],
}

fn unprogrammed_ims() -> ImsField {
    [0; IMS_FUSE_BYTES]
}

fn unprogrammed_cms() -> [u8; CMS_FUSE_BYTES] {
    [0; CMS_FUSE_BYTES]
}

fn hex_bank<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let bytes = hex::decode(text.trim()).map_err(D::Error::custom)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        D::Error::custom(format!("expected {N} bytes of fuse data, found {}", bytes.len()))
    })
}

impl Default for FuseImage {
    fn default() -> Self {
        Self {
            ecc_status: 0,
            vid: 0,
            pid: 0,
            ims: unprogrammed_ims(),
            cms: unprogrammed_cms(),
        }
    }
}

impl FuseImage {
    pub fn from_toml_str(text: &str) -> Result<Self, FuseImageError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, FuseImageError> {
        let text = std::fs::read_to_string(path)?;
        let image = Self::from_toml_str(&text)?;
        log::debug!("Loaded fuse image {}", path.display());
        Ok(image)
    }
}

/// How many times each fuse field was read.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FuseReadCounts {
    pub ecc_status: u32,
    pub vid: u32,
    pub pid: u32,
    pub ims: u32,
}

/// Host model of the e-Fuse bank plus the local DME attribute space.
///
/// Once locked, the IMS and CMS banks read back as zeros until the model is
/// recreated, which stands in for a chip reset.
pub struct EmulatedEfuse {
    image: FuseImage,
    ims_locked: bool,
    cms_locked: bool,
    attrs: HashMap<u16, u32>,
    failing_attrs: HashMap<u16, u32>,
    reads: FuseReadCounts,
}

impl EmulatedEfuse {
    pub fn new(image: FuseImage) -> Self {
        Self {
            image,
            ims_locked: false,
            cms_locked: false,
            attrs: HashMap::new(),
            failing_attrs: HashMap::new(),
            reads: FuseReadCounts::default(),
        }
    }

    /// Make every write to `attr` fail with the UniPro result `code`.
    pub fn fail_attr_write(&mut self, attr: u16, code: u32) {
        self.failing_attrs.insert(attr, code);
    }

    /// Local DME attribute value, if it was ever written.
    pub fn attr(&self, attr: u16) -> Option<u32> {
        self.attrs.get(&attr).copied()
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    pub fn reads(&self) -> FuseReadCounts {
        self.reads
    }

    pub fn ims_locked(&self) -> bool {
        self.ims_locked
    }

    pub fn cms_locked(&self) -> bool {
        self.cms_locked
    }

    pub fn read_cms(&self, buf: &mut [u8]) {
        read_bank(&self.image.cms, self.cms_locked, buf);
    }
}

/// Copy the head of a fuse bank, or zeros once the bank is locked.
fn read_bank(bank: &[u8], locked: bool, buf: &mut [u8]) {
    let len = buf.len().min(bank.len());
    if locked {
        buf.fill(0);
    } else {
        buf[..len].copy_from_slice(&bank[..len]);
        buf[len..].fill(0);
    }
}

impl EfusePeripheral for EmulatedEfuse {
    fn ecc_status(&mut self) -> u32 {
        self.reads.ecc_status += 1;
        self.image.ecc_status
    }

    fn vid(&mut self) -> u32 {
        self.reads.vid += 1;
        self.image.vid
    }

    fn pid(&mut self) -> u32 {
        self.reads.pid += 1;
        self.image.pid
    }

    fn read_ims(&mut self, buf: &mut [u8]) {
        self.reads.ims += 1;
        if buf.len() > IMS_FUSE_BYTES {
            log::warn!("IMS read of {} bytes truncated", buf.len());
        }
        read_bank(&self.image.ims, self.ims_locked, buf);
    }

    fn dme_attr_write(
        &mut self,
        attr: u16,
        value: u32,
        selector: u8,
        scope: AttrScope,
    ) -> Result<(), AttrWriteError> {
        log::trace!("DME write attr={attr:#06x} selector={selector} scope={scope:?} value={value:#010x}");
        if scope == AttrScope::Peer {
            return Err(AttrWriteError(UNIPRO_PEER_COMMUNICATION_FAILURE));
        }
        if let Some(&code) = self.failing_attrs.get(&attr) {
            return Err(AttrWriteError(code));
        }
        self.attrs.insert(attr, value);
        Ok(())
    }

    fn disable_ims_access(&mut self) {
        log::debug!("IMS access disabled");
        self.ims_locked = true;
    }

    fn disable_cms_access(&mut self) {
        log::debug!("CMS access disabled");
        self.cms_locked = true;
    }
}

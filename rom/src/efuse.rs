/*++

Licensed under the Apache-2.0 license.

File Name:

    efuse.rs

Abstract:

    Validates the e-Fuses at boot and publishes the non-secret results as
    DME attributes.

--*/

use crate::endpoint_id::{derive_endpoint_id, DerivationMode, EndpointId};
use crate::fuses::{is_buf_const, valid_hamming_weight, IdentityField, IMS_MEANINGFUL_BYTES};
use crate::io::{HexQuad, HexWord};
use crate::unipro::{
    AttrScope, AttrWriteError, ATTR_SELECTOR_DEFAULT, DME_DDBL2_ENDPOINTID_H,
    DME_DDBL2_ENDPOINTID_L,
};
use bridge_error::{BridgeError, BridgeResult, LastError};
use log::{debug, error, info};
use romtime::Sha256Alg;
use zeroize::Zeroizing;

/// ECC error flag in the e-Fuse status register.
pub const ECC_STATUS_ERROR: u32 = 1 << 0;

/// Access to the e-Fuse bank and the UniPro attribute interface.
pub trait EfusePeripheral {
    /// e-Fuse ECC status register
    fn ecc_status(&mut self) -> u32;

    /// Vendor ID fuse word
    fn vid(&mut self) -> u32;

    /// Product ID fuse word
    fn pid(&mut self) -> u32;

    /// Copy the leading `buf.len()` bytes of the IMS into `buf`.
    fn read_ims(&mut self, buf: &mut [u8]);

    fn dme_attr_write(
        &mut self,
        attr: u16,
        value: u32,
        selector: u8,
        scope: AttrScope,
    ) -> Result<(), AttrWriteError>;

    /// Block IMS reads until the next reset.
    fn disable_ims_access(&mut self);

    /// Block CMS reads until the next reset.
    fn disable_cms_access(&mut self);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EfuseConfig {
    pub derivation: DerivationMode,
    /// Log the full endpoint ID once it is derived. Ignored in release
    /// builds.
    pub log_endpoint_id: bool,
}

impl Default for EfuseConfig {
    fn default() -> Self {
        Self {
            derivation: DerivationMode::Hashed,
            log_endpoint_id: cfg!(debug_assertions),
        }
    }
}

/// Validated identity fuses, kept for the image header checks.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct IdentityFields {
    pub vid: u32,
    pub pid: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EfuseReport {
    pub identity: IdentityFields,
    /// `None` if no IMS is provisioned
    pub endpoint_id: Option<EndpointId>,
}

/// Steps of the e-Fuse bring-up, in the order they run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
pub enum EfuseInitStep {
    NotStarted,
    EccCheck,
    IdentityValidation,
    SecretExtraction,
    SecretValidation,
    IdentifierDerivation,
    Success,
}

pub struct EfuseInit<'a, P: EfusePeripheral, S: Sha256Alg> {
    periph: &'a mut P,
    sha: &'a mut S,
    config: EfuseConfig,
    step: EfuseInitStep,
}

impl<'a, P: EfusePeripheral, S: Sha256Alg> EfuseInit<'a, P, S> {
    pub fn new(periph: &'a mut P, sha: &'a mut S, config: EfuseConfig) -> Self {
        Self {
            periph,
            sha,
            config,
            step: EfuseInitStep::NotStarted,
        }
    }

    /// Last step entered; on failure this is the step that failed.
    pub fn step(&self) -> EfuseInitStep {
        self.step
    }

    /// Validate the e-Fuses and publish the endpoint ID.
    ///
    /// The first failure is recorded in `last_error` and returned. A missing
    /// IMS is not a failure: the report carries no endpoint ID and
    /// `last_error` is left untouched.
    pub fn run(&mut self, last_error: &mut LastError) -> BridgeResult<EfuseReport> {
        let result = self.run_steps();
        if let Err(err) = result {
            last_error.set(err);
        }
        result
    }

    fn run_steps(&mut self) -> BridgeResult<EfuseReport> {
        self.step = EfuseInitStep::EccCheck;
        self.check_ecc()?;

        self.step = EfuseInitStep::IdentityValidation;
        let identity = self.validate_identity()?;

        self.step = EfuseInitStep::SecretExtraction;
        let mut ims = Zeroizing::new([0u8; IMS_MEANINGFUL_BYTES]);
        self.periph.read_ims(ims.as_mut_slice());

        let endpoint_id = if is_buf_const(ims.as_slice(), 0) {
            debug!("[efuse] No IMS provisioned");
            None
        } else {
            self.step = EfuseInitStep::SecretValidation;
            if !valid_hamming_weight(ims.as_slice()) {
                error!("[efuse] Invalid IMS");
                return Err(BridgeError::ROM_EFUSE_BAD_IMS);
            }

            self.step = EfuseInitStep::IdentifierDerivation;
            let endpoint_id = match self.config.derivation {
                DerivationMode::Hashed => derive_endpoint_id(self.sha, &ims)?,
                DerivationMode::Fixed(endpoint_id) => endpoint_id,
            };
            if cfg!(debug_assertions) && self.config.log_endpoint_id {
                info!("[efuse] Endpoint ID: {}", HexQuad(endpoint_id.as_u64()));
            }
            self.publish_endpoint_id(endpoint_id)?;
            Some(endpoint_id)
        };

        self.step = EfuseInitStep::Success;
        debug!("[efuse] OK");
        Ok(EfuseReport {
            identity,
            endpoint_id,
        })
    }

    fn check_ecc(&mut self) -> BridgeResult<()> {
        let status = self.periph.ecc_status();
        if status & ECC_STATUS_ERROR != 0 {
            error!("[efuse] ECC error, status {}", HexWord(status));
            return Err(BridgeError::ROM_EFUSE_ECC);
        }
        Ok(())
    }

    /// Unset (0) and balanced values are the only valid VID/PID encodings.
    fn validate_identity(&mut self) -> BridgeResult<IdentityFields> {
        let vid = self.periph.vid();
        let image: IdentityField = vid.to_le_bytes();
        if !valid_hamming_weight(&image) {
            error!("[efuse] Invalid VID: {}", HexWord(vid));
            return Err(BridgeError::ROM_EFUSE_BAD_VID);
        }

        let pid = self.periph.pid();
        let image: IdentityField = pid.to_le_bytes();
        if !valid_hamming_weight(&image) {
            error!("[efuse] Invalid PID: {}", HexWord(pid));
            return Err(BridgeError::ROM_EFUSE_BAD_PID);
        }

        Ok(IdentityFields { vid, pid })
    }

    /// Either write failing is fatal; a completed low write is left in place.
    fn publish_endpoint_id(&mut self, endpoint_id: EndpointId) -> BridgeResult<()> {
        let writes = [
            (DME_DDBL2_ENDPOINTID_L, endpoint_id.low),
            (DME_DDBL2_ENDPOINTID_H, endpoint_id.high),
        ];
        for (attr, value) in writes {
            self.periph
                .dme_attr_write(attr, value, ATTR_SELECTOR_DEFAULT, AttrScope::Local)
                .map_err(|AttrWriteError(code)| {
                    error!(
                        "[efuse] DME attribute {} write failed: {}",
                        HexWord(attr.into()),
                        HexWord(code)
                    );
                    BridgeError::ROM_EFUSE_ENDPOINT_ID_WRITE
                })?;
        }
        Ok(())
    }
}

/// Validate and publish the e-Fuses as DME attributes.
///
/// # Arguments
///
/// * `periph` - e-Fuse and UniPro attribute access
/// * `sha` - SHA-256 engine for the endpoint ID derivation
/// * `config` - derivation and logging options
/// * `last_error` - receives the first failure
pub fn efuse_init<P: EfusePeripheral, S: Sha256Alg>(
    periph: &mut P,
    sha: &mut S,
    config: EfuseConfig,
    last_error: &mut LastError,
) -> BridgeResult<EfuseReport> {
    EfuseInit::new(periph, sha, config).run(last_error)
}

/// Seal the IMS and CMS from every later boot stage.
pub fn efuse_rig_for_untrusted<P: EfusePeripheral>(periph: &mut P) {
    debug!("[efuse] Locking IMS and CMS");
    periph.disable_ims_access();
    periph.disable_cms_access();
}

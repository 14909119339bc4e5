/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Boot ROM e-Fuse bring-up: identity and secret validation, Endpoint
    Unique ID derivation and publication.

--*/

#![cfg_attr(not(test), no_std)]

mod efuse;
mod endpoint_id;
pub mod fuses;
pub mod io;
pub mod unipro;

pub use efuse::{
    efuse_init, efuse_rig_for_untrusted, EfuseConfig, EfuseInit, EfuseInitStep, EfusePeripheral,
    EfuseReport, IdentityFields, ECC_STATUS_ERROR,
};
pub use endpoint_id::{derive_endpoint_id, DerivationMode, EndpointId};
pub use fuses::{count_ones, hamming_state, is_buf_const, valid_hamming_weight, HammingState};

/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Error codes reported by the bridge boot ROM and the last-error slot
    read back by the boot sequence.

--*/
#![cfg_attr(not(test), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Bridge ROM Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BridgeError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// Takes a list of (name, value, doc) tuples and generates a constant for
/// each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: BridgeError = BridgeError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns every defined error constant for the uniqueness test
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl BridgeError {
    /// Only for const contexts; a zero value fails the build instead of
    /// panicking at runtime. Use `BridgeError::try_from()` for runtime values.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("BridgeError cannot be 0"),
        }
    }

    define_error_constants![
        (ROM_EFUSE_ECC, 0x0001_0001, "e-Fuse ECC error reported by hardware"),
        (
            ROM_EFUSE_BAD_VID,
            0x0001_0002,
            "e-Fuse vendor ID has an invalid Hamming weight"
        ),
        (
            ROM_EFUSE_BAD_PID,
            0x0001_0003,
            "e-Fuse product ID has an invalid Hamming weight"
        ),
        (
            ROM_EFUSE_BAD_IMS,
            0x0001_0004,
            "e-Fuse internal master secret has an invalid Hamming weight"
        ),
        (
            ROM_EFUSE_ENDPOINT_ID_WRITE,
            0x0001_0005,
            "Failed to publish the endpoint unique ID to its DME attributes"
        ),
        (DRIVER_SHA256_MAX_DATA, 0x0002_0001, "SHA256 max data exceeded"),
    ];
}

impl From<NonZeroU32> for BridgeError {
    fn from(val: NonZeroU32) -> Self {
        BridgeError(val)
    }
}

impl From<BridgeError> for NonZeroU32 {
    fn from(val: BridgeError) -> Self {
        val.0
    }
}

impl From<BridgeError> for u32 {
    fn from(val: BridgeError) -> Self {
        NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for BridgeError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        NonZeroU32::try_from(val).map(BridgeError)
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Most specific failure seen during boot.
///
/// Starts out OK. Only the first recorded error is kept, so a caller can
/// tell a benign outcome (still OK) from a failure after the fact.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct LastError(Option<BridgeError>);

impl LastError {
    pub const fn new() -> Self {
        Self(None)
    }

    /// Record `err` unless an earlier error is already held.
    pub fn set(&mut self, err: BridgeError) {
        if self.0.is_none() {
            self.0 = Some(err);
        }
    }

    pub fn get(&self) -> Option<BridgeError> {
        self.0
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_none()
    }

    /// Value for the boot status register; 0 means OK.
    pub fn code(&self) -> u32 {
        self.0.map_or(0, u32::from)
    }
}

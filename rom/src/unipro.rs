// Licensed under the Apache-2.0 license

//! UniPro DME attributes written by the boot ROM.

/// ARA DDB L2 endpoint unique ID, low 32 bits
pub const DME_DDBL2_ENDPOINTID_L: u16 = 0x6104;
/// ARA DDB L2 endpoint unique ID, high 32 bits
pub const DME_DDBL2_ENDPOINTID_H: u16 = 0x6105;

/// Default generation selector for attribute accesses.
pub const ATTR_SELECTOR_DEFAULT: u8 = 0;

/// Which end of the link an attribute access targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttrScope {
    Local,
    Peer,
}

/// Failure reported by the UniPro attribute interface, carrying the
/// controller's result code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttrWriteError(pub u32);

/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the emulated bridge peripherals.

--*/

mod efuse;

pub use efuse::{EmulatedEfuse, FuseImage, FuseImageError, FuseReadCounts, CMS_FUSE_BYTES};

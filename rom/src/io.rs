// Licensed under the Apache-2.0 license.

//! Hex formatting for ROM diagnostics.

use core::fmt::{Display, Formatter, Result, Write};

fn write_hex_byte(f: &mut Formatter<'_>, x: u8) -> Result {
    for c in [x >> 4, x & 0xf] {
        if c < 10 {
            f.write_char((c + b'0') as char)?;
        } else {
            f.write_char((c - 10 + b'a') as char)?;
        }
    }
    Ok(())
}

/// Bytes back to back, in buffer order.
pub struct HexBytes<'a>(pub &'a [u8]);
impl Display for HexBytes<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.0.iter().try_for_each(|&x| write_hex_byte(f, x))
    }
}

/// A 32-bit value, most significant byte first.
pub struct HexWord(pub u32);
impl Display for HexWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        HexBytes(&self.0.to_be_bytes()).fmt(f)
    }
}

/// A 64-bit value, most significant byte first.
pub struct HexQuad(pub u64);
impl Display for HexQuad {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        HexBytes(&self.0.to_be_bytes()).fmt(f)
    }
}

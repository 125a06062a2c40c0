//! Converting octets into hex strings.

use std::fmt;


//------------ Hex -----------------------------------------------------------

/// Displays an octet slice as a sequence of upper case hex digits.
///
/// This is used when printing key identifiers and digests in error
/// messages and log output.
#[derive(Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &ch in self.0 {
            let digits = encode_u8(ch);
            write!(f, "{}{}", digits[0] as char, digits[1] as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Hex({})", self)
    }
}


/// Returns the two hex digits for an octet.
pub fn encode_u8(ch: u8) -> [u8; 2] {
    [DIGITS[usize::from(ch >> 4)], DIGITS[usize::from(ch & 0x0F)]]
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//============ Tests =========================================================

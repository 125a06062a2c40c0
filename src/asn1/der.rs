//! Checking that an object was DER encoded.

use std::io;
use log::{debug, log_enabled, Level};
use crate::error::Error;
use super::AsnType;


//------------ verify_canonical ----------------------------------------------

/// Verifies that `original` is the DER encoding of `object`.
///
/// The first `consumed` octets of `original` are what `object` was
/// decoded from. The function encodes `object` as DER and compares the
/// output against these octets as it is produced. Encoding is aborted at
/// the first difference.
pub fn verify_canonical<T: AsnType>(
    consumed: usize, original: &[u8], object: &T
) -> Result<(), Error> {
    let src = match original.get(..consumed) {
        Some(src) => src,
        None => {
            debug!(
                "'{}' claims to have consumed {} octets of {}",
                T::NAME, consumed, original.len()
            );
            return Err(
                Error::not_canonical(format!("'{}' isn't DER encoded", T::NAME))
            )
        }
    };
    let mut sink = DerSink::new(src);
    let encoded = object.encode_der(&mut sink).map_err(|_| {
        Error::not_canonical(format!("'{}' isn't DER encoded", T::NAME))
    })?;
    if encoded != consumed || sink.consumed != consumed {
        debug!(
            "DER encoding length differs from the source \
             (expected {}, encoded {}, matched {})",
            consumed, encoded, sink.consumed
        );
        return Err(
            Error::not_canonical(format!("'{}' isn't DER encoded", T::NAME))
        )
    }
    Ok(())
}


//------------ DerSink -------------------------------------------------------

/// A writer that compares everything written to it with a source.
///
/// The sink keeps track of how many octets of the source have been matched
/// so far. A write that differs from the source or would go beyond its
/// end fails and leaves the count unchanged.
struct DerSink<'a> {
    src: &'a [u8],
    consumed: usize,
}

impl<'a> DerSink<'a> {
    fn new(src: &'a [u8]) -> Self {
        DerSink { src, consumed: 0 }
    }
}

impl io::Write for DerSink<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        let expected = match self.consumed.checked_add(buf.len()).and_then(
            |end| self.src.get(self.consumed..end)
        ) {
            Some(expected) => expected,
            None => {
                debug!(
                    "DER encoding will consume more bytes than expected \
                     (expected {}, will get {})",
                    self.src.len(), self.consumed.saturating_add(buf.len())
                );
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData, "DER encoding too long"
                ))
            }
        };
        if expected != buf {
            if log_enabled!(Level::Debug) {
                debug_diff(expected, buf, self.consumed);
            }
            return Err(io::Error::new(
                io::ErrorKind::InvalidData, "DER encoding differs"
            ))
        }
        self.consumed += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

/// Logs the position of the first differing octet.
fn debug_diff(src: &[u8], der: &[u8], offset: usize) {
    if let Some((pos, (s, d))) = src.iter().zip(der).enumerate().find(
        |(_, (s, d))| s != d
    ) {
        debug!(
            "Diff starts at byte {}: source '{:02x}', DER '{:02x}'",
            offset + pos, s, d
        );
    }
}


//============ Tests =========================================================

//! Strict decoding of ASN.1 objects.
//!
//! RPKI objects are required to be encoded using the Distinguished
//! Encoding Rules (DER). Since DER is a subset of the much more permissive
//! Basic Encoding Rules (BER), the safest way to make sure an object
//! follows it is to decode it, encode the result as DER, and check that
//! this produces exactly the original bytes. This is what [`decode`] does
//! if asked to. Either way, the object must use up all the bytes it is
//! decoded from, and it has to pass the type’s own constraint checks
//! before it is handed over.
//!
//! Types that can be decoded this way implement [`AsnType`].

use std::io;
use std::convert::Infallible;
use bcder::{Captured, Mode, OctetString};
use bcder::decode::{self, ContentError, DecodeError, SliceSource};
use log::error;
use crate::error::Error;
use crate::file::FileContents;

pub use self::der::verify_canonical;

mod der;


//------------ AsnType -------------------------------------------------------

/// A type that can be decoded strictly.
///
/// The trait provides everything the decoding functions of this module
/// need to know about a type: how to parse it from a BER source, how to
/// produce its DER encoding, and which additional rules a parsed value has
/// to follow.
pub trait AsnType: Sized {
    /// The name of the type for use in diagnostic messages.
    const NAME: &'static str;

    /// Takes a value from the beginning of a constructed value.
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>>;

    /// Writes the DER encoding of the value to `target`.
    ///
    /// Returns the length of the encoding the value thinks it has. If
    /// `target` returns an error, encoding must stop and the error be
    /// returned.
    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error>;

    /// Checks that the value follows the rules of the type.
    ///
    /// The default implementation accepts every value.
    fn check_constraints(&self) -> Result<(), ContentError> {
        Ok(())
    }
}


//------------ DecodeOptions -------------------------------------------------

/// Options for decoding an object.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    /// Reject objects that weren’t DER encoded.
    pub der: bool,

    /// Log the reason for rejecting an object.
    ///
    /// If this is `false`, failures are only reported through the
    /// returned error.
    pub log: bool,
}

impl DecodeOptions {
    pub fn new(der: bool, log: bool) -> Self {
        DecodeOptions { der, log }
    }

    /// Returns options that enforce DER.
    pub fn der() -> Self {
        Self::new(true, true)
    }

    /// Returns options that accept any BER encoding.
    pub fn ber() -> Self {
        Self::new(false, true)
    }

    /// Returns the same options but with logging disabled.
    pub fn quiet(self) -> Self {
        DecodeOptions { log: false, .. self }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::der()
    }
}


//------------ Decoding Functions --------------------------------------------

/// Decodes a buffer into an object of type `T`.
///
/// The buffer must contain exactly one complete value. If `options.der`
/// is set, the buffer must also be the DER encoding of that value. In any
/// case, the value has to pass its type’s constraint checks.
///
/// If any of this fails, the partially constructed value is dropped and
/// an error is returned.
pub fn decode<T: AsnType>(
    buf: &[u8], options: DecodeOptions
) -> Result<T, Error> {
    decode_strict(buf, options).map_err(|err| {
        if options.log {
            error!("{}", err);
        }
        err
    })
}

fn decode_strict<T: AsnType>(
    buf: &[u8], options: DecodeOptions
) -> Result<T, Error> {
    if !options.der {
        let (res, consumed) = parse::<T>(buf, Mode::Ber).map_err(|err| {
            Error::malformed_encoding(format!(
                "Error decoding ASN.1 object '{}': {}", T::NAME, err
            ))
        })?;
        check_trailing::<T>(buf, consumed)?;
        check_constraints(&res)?;
        return Ok(res)
    }

    // Values captured while parsing can only be encoded in the mode they
    // were parsed in, so for DER output we need to parse in DER mode. If
    // that fails, a BER parse tells a non-canonical from a broken object.
    let (res, consumed) = match parse::<T>(buf, Mode::Der) {
        Ok(res) => res,
        Err(der_err) => {
            return match parse::<T>(buf, Mode::Ber) {
                Ok((_, consumed)) => {
                    check_trailing::<T>(buf, consumed)?;
                    Err(Error::not_canonical(format!(
                        "'{}' isn't DER encoded: {}", T::NAME, der_err
                    )))
                }
                Err(err) => {
                    Err(Error::malformed_encoding(format!(
                        "Error decoding ASN.1 object '{}': {}", T::NAME, err
                    )))
                }
            }
        }
    };
    check_trailing::<T>(buf, consumed)?;
    verify_canonical(consumed, buf, &res)?;
    check_constraints(&res)?;
    Ok(res)
}

/// Parses a value from the start of `buf` in the given mode.
///
/// Returns the value and the number of octets it was parsed from.
fn parse<T: AsnType>(
    buf: &[u8], mode: Mode
) -> Result<(T, usize), DecodeError<Infallible>> {
    let mut source = SliceSource::new(buf);
    let res = mode.decode(&mut source, T::take_from)?;
    Ok((res, buf.len() - source.len()))
}

/// Checks that a value parsed from `buf` used all of it.
fn check_trailing<T: AsnType>(
    buf: &[u8], consumed: usize
) -> Result<(), Error> {
    if consumed < buf.len() {
        Err(Error::malformed_encoding(format!(
            "Error decoding ASN.1 object '{}': \
             {} octets of trailing data",
            T::NAME, buf.len() - consumed
        )))
    }
    else {
        Ok(())
    }
}

/// Decodes the content of a captured `ANY` value.
pub fn decode_any<T: AsnType>(
    any: &Captured, options: DecodeOptions
) -> Result<T, Error> {
    decode(any.as_slice(), options)
}

/// Decodes the content of an octet string.
///
/// This is how most extension values and signed object payloads are
/// wrapped.
pub fn decode_octet_string<T: AsnType>(
    string: &OctetString, options: DecodeOptions
) -> Result<T, Error> {
    let bytes = string.to_bytes();
    decode(bytes.as_ref(), options)
}

/// Decodes the complete contents of a file.
///
/// The path of the file is added to the message of any error.
pub fn decode_file<T: AsnType>(
    contents: &FileContents, options: DecodeOptions
) -> Result<T, Error> {
    decode(contents.as_slice(), options).map_err(|err| {
        Error::new(
            err.kind(),
            format!("{}: {}", contents.path().display(), err.message())
        )
    })
}

/// Runs the constraint checks of an object’s type.
///
/// The message of a violation is passed on as is.
pub fn check_constraints<T: AsnType>(object: &T) -> Result<(), Error> {
    object.check_constraints().map_err(|err| {
        Error::constraint_violation(err.to_string())
    })
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::encode;
    use bcder::encode::{PrimitiveContent, Values};
    use bytes::Bytes;
    use crate::error::ErrorKind;
    use super::*;

    /// A test type.
    ///
    /// ```text
    /// Flagged ::= SEQUENCE {
    ///     flag    BOOLEAN DEFAULT FALSE,
    ///     value   OCTET STRING (SIZE (1..MAX)) }
    /// ```
    #[derive(Clone, Debug)]
    pub struct Flagged {
        pub flag: bool,
        pub value: OctetString,
    }

    impl AsnType for Flagged {
        const NAME: &'static str = "Flagged";

        fn take_from<S: decode::Source>(
            cons: &mut decode::Constructed<S>
        ) -> Result<Self, DecodeError<S::Error>> {
            cons.take_sequence(|cons| {
                Ok(Flagged {
                    flag: cons.take_opt_bool()?.unwrap_or(false),
                    value: OctetString::take_from(cons)?,
                })
            })
        }

        fn encode_der<W: io::Write>(
            &self, target: &mut W
        ) -> Result<usize, io::Error> {
            let values = encode::sequence((
                if self.flag { Some(true.encode()) } else { None },
                self.value.encode_ref(),
            ));
            values.write_encoded(Mode::Der, target)?;
            Ok(values.encoded_len(Mode::Der))
        }

        fn check_constraints(&self) -> Result<(), ContentError> {
            if self.value.is_empty() {
                Err(ContentError::from_static("empty value"))
            }
            else {
                Ok(())
            }
        }
    }

    fn value(flagged: &Flagged) -> Bytes {
        flagged.value.to_bytes()
    }

    #[test]
    fn decode_der() {
        let res = decode::<Flagged>(
            b"\x30\x05\x04\x03\x01\x02\x03", DecodeOptions::der()
        ).unwrap();
        assert!(!res.flag);
        assert_eq!(value(&res).as_ref(), b"\x01\x02\x03");

        let res = decode::<Flagged>(
            b"\x30\x08\x01\x01\xFF\x04\x03\x01\x02\x03",
            DecodeOptions::der()
        ).unwrap();
        assert!(res.flag);
    }

    #[test]
    fn reject_long_form_length() {
        let data = b"\x30\x06\x04\x81\x03\x01\x02\x03";
        assert_eq!(
            decode::<Flagged>(data, DecodeOptions::der()).unwrap_err().kind(),
            ErrorKind::NotCanonicallyEncoded
        );
        let res = decode::<Flagged>(data, DecodeOptions::ber()).unwrap();
        assert_eq!(value(&res).as_ref(), b"\x01\x02\x03");
    }

    #[test]
    fn reject_encoded_default() {
        let data = b"\x30\x08\x01\x01\x00\x04\x03\x01\x02\x03";
        assert_eq!(
            decode::<Flagged>(
                data, DecodeOptions::der().quiet()
            ).unwrap_err().kind(),
            ErrorKind::NotCanonicallyEncoded
        );
        assert!(
            !decode::<Flagged>(data, DecodeOptions::ber()).unwrap().flag
        );
    }

    #[test]
    fn reject_constructed_octet_string() {
        let data = b"\x30\x07\x24\x05\x04\x03\x01\x02\x03";
        assert_eq!(
            decode::<Flagged>(data, DecodeOptions::der()).unwrap_err().kind(),
            ErrorKind::NotCanonicallyEncoded
        );
        let res = decode::<Flagged>(data, DecodeOptions::ber()).unwrap();
        assert_eq!(value(&res).as_ref(), b"\x01\x02\x03");
    }

    #[test]
    fn reject_incomplete_and_trailing() {
        for options in [DecodeOptions::der(), DecodeOptions::ber().quiet()] {
            assert_eq!(
                decode::<Flagged>(
                    b"\x30\x05\x04\x03\x01\x02", options
                ).unwrap_err().kind(),
                ErrorKind::MalformedEncoding
            );
            assert_eq!(
                decode::<Flagged>(
                    b"\x30\x05\x04\x03\x01\x02\x03\x00", options
                ).unwrap_err().kind(),
                ErrorKind::MalformedEncoding
            );
            assert_eq!(
                decode::<Flagged>(b"", options).unwrap_err().kind(),
                ErrorKind::MalformedEncoding
            );
        }
    }

    #[test]
    fn trailing_data_is_malformed() {
        let data = b"\x30\x05\x04\x03\x01\x02\x03\x30\x00";
        for options in [DecodeOptions::der(), DecodeOptions::ber().quiet()] {
            let err = decode::<Flagged>(data, options).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
            assert!(err.message().contains("2 octets of trailing data"));
        }

        // Trailing data after a value that isn't DER either.
        let data = b"\x30\x06\x04\x81\x03\x01\x02\x03\x00";
        for options in [DecodeOptions::der(), DecodeOptions::ber().quiet()] {
            assert_eq!(
                decode::<Flagged>(data, options).unwrap_err().kind(),
                ErrorKind::MalformedEncoding
            );
        }
    }

    #[test]
    fn encode_der_after_der_decode() {
        let data = b"\x30\x08\x01\x01\xFF\x04\x03\x01\x02\x03";
        let res = decode::<Flagged>(data, DecodeOptions::der()).unwrap();
        let mut der = Vec::new();
        assert_eq!(res.encode_der(&mut der).unwrap(), data.len());
        assert_eq!(der.as_slice(), data.as_ref());
    }

    #[test]
    fn constraint_message_is_kept() {
        for options in [DecodeOptions::der(), DecodeOptions::ber().quiet()] {
            let err = decode::<Flagged>(
                b"\x30\x02\x04\x00", options
            ).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
            assert_eq!(err.message(), "empty value");
        }
    }

    #[test]
    fn decode_wrapped() {
        let inner = Flagged {
            flag: true,
            value: OctetString::new(Bytes::from_static(b"\x2a")),
        };
        let mut der = Vec::new();
        inner.encode_der(&mut der).unwrap();

        let any = Captured::from_values(
            Mode::Der, OctetString::new(Bytes::from_static(b"\x2a")).encode()
        );
        assert!(decode_any::<Flagged>(&any, DecodeOptions::der()).is_err());

        let any = Captured::from_values(
            Mode::Der,
            encode::sequence((
                true.encode(),
                OctetString::new(Bytes::from_static(b"\x2a")).encode(),
            ))
        );
        let res = decode_any::<Flagged>(&any, DecodeOptions::der()).unwrap();
        assert!(res.flag);
        assert_eq!(any.as_slice(), der.as_slice());

        let string = OctetString::new(Bytes::from(der));
        let res = decode_octet_string::<Flagged>(
            &string, DecodeOptions::der()
        ).unwrap();
        assert_eq!(value(&res).as_ref(), b"\x2a");
    }
}

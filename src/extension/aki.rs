//! The Authority Key Identifier extension.
//!
//! In RPKI, the Authority Key Identifier links a certificate to the key of
//! the certificate that issued it: it has to contain the key identifier of
//! the issuer, i.e., the digest of the issuer’s public key, and nothing
//! else. See [RFC 6487, section 4.8.3] for details.
//!
//! [RFC 6487, section 4.8.3]: https://tools.ietf.org/html/rfc6487#section-4.8.3

use std::io;
use bcder::{decode, encode, Captured, Mode, OctetString, Tag};
use bcder::decode::DecodeError;
use bcder::encode::Values;
use bytes::Bytes;
use log::debug;
use crate::asn1::{decode_octet_string, AsnType, DecodeOptions};
use crate::crypto::{DigestAlgorithm, PublicKey};
use crate::error::Error;
use crate::util::hex::Hex;
use crate::validation::Validation;
use super::{AKI, SKI, Extension, cannot_decode};


/// The largest number of octets of public key bits we are willing to hash.
const MAX_PUBLIC_KEY_LEN: usize = 16 * 1024;


//------------ AuthorityKeyIdentifier ----------------------------------------

/// The value of an Authority Key Identifier extension.
///
/// ```text
/// AuthorityKeyIdentifier ::= SEQUENCE {
///     keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///     authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///     authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL }
/// ```
///
/// Only the key identifier is allowed in RPKI. The other two fields are
/// still parsed so that their presence can be reported properly. Both are
/// kept in their encoded form, so that a serial number that isn’t a valid
/// certificate serial number is still reported as present.
#[derive(Clone, Debug)]
pub struct AuthorityKeyIdentifier {
    key_identifier: Option<OctetString>,
    issuer: Option<Captured>,
    serial_number: Option<Bytes>,
}

impl AuthorityKeyIdentifier {
    pub fn key_identifier(&self) -> Option<&OctetString> {
        self.key_identifier.as_ref()
    }

    pub fn has_issuer(&self) -> bool {
        self.issuer.is_some()
    }

    pub fn has_serial_number(&self) -> bool {
        self.serial_number.is_some()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(AuthorityKeyIdentifier {
                key_identifier: cons.take_opt_value_if(
                    Tag::CTX_0, OctetString::from_content
                )?,
                issuer: cons.take_opt_constructed_if(
                    Tag::CTX_1, |cons| cons.capture_all()
                )?,
                serial_number: cons.take_opt_primitive_if(
                    Tag::CTX_2, |prim| prim.take_all()
                )?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.key_identifier.as_ref().map(|id| {
                id.encode_ref_as(Tag::CTX_0)
            }),
            self.issuer.as_ref().map(|issuer| {
                encode::sequence_as(Tag::CTX_1, issuer)
            }),
            self.serial_number.as_ref().map(|serial| {
                OctetString::encode_slice_as(serial, Tag::CTX_2)
            }),
        ))
    }
}

impl AsnType for AuthorityKeyIdentifier {
    const NAME: &'static str = "AuthorityKeyIdentifier";

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        AuthorityKeyIdentifier::take_from(cons)
    }

    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error> {
        let values = self.encode_ref();
        values.write_encoded(Mode::Der, target)?;
        Ok(values.encoded_len(Mode::Der))
    }
}


//------------ handle_aki ----------------------------------------------------

/// Processes an Authority Key Identifier extension.
///
/// The extension must only contain a key identifier and this identifier
/// must be the digest of the public key of the certificate currently on
/// top of the validation’s certificate stack.
///
/// The function is intended to be used as the callback for [`AKI`] in an
/// [`ExtensionHandlers`][super::ExtensionHandlers] table. Not providing a
/// validation is a usage error reported as
/// [`ErrorKind::MissingContext`][crate::ErrorKind::MissingContext].
pub fn handle_aki(
    ext: &Extension, validation: Option<&Validation>
) -> Result<(), Error> {
    let options = match validation {
        Some(validation) => validation.config().decode_options(),
        None => DecodeOptions::default(),
    };
    let aki = decode_octet_string::<AuthorityKeyIdentifier>(
        ext.value(), options
    ).map_err(|_| cannot_decode(&AKI))?;

    if aki.has_issuer() {
        return Err(Error::unsupported_aki_form(format!(
            "{} extension contains an authorityCertIssuer.", AKI.name()
        )))
    }
    if aki.has_serial_number() {
        return Err(Error::unsupported_aki_form(format!(
            "{} extension contains an authorityCertSerialNumber.",
            AKI.name()
        )))
    }
    let key_id = match aki.key_identifier() {
        Some(key_id) => key_id.to_bytes(),
        None => {
            return Err(Error::unsupported_aki_form(format!(
                "{} extension lacks a keyIdentifier.", AKI.name()
            )))
        }
    };

    let validation = match validation {
        Some(validation) => validation,
        None => {
            return Err(Error::missing_context(format!(
                "{} handler called without a validation.", AKI.name()
            )))
        }
    };
    let parent = match validation.peek_cert() {
        Some(parent) => parent,
        None => {
            return Err(Error::no_parent("Certificate has no parent."))
        }
    };

    validate_public_key_hash(
        parent.subject_public_key_info(),
        key_id.as_ref(),
        validation.config().key_id_digest,
    )
}


//------------ validate_public_key_hash --------------------------------------

/// Checks that `key_id` is the digest of the bits of `key`.
///
/// Both the identifier and the key bits must have a sensible length. The
/// identifier cannot be longer than the longest digest we know of and the
/// key bits are limited to 16 KiB.
pub fn validate_public_key_hash(
    key: &PublicKey, key_id: &[u8], algorithm: DigestAlgorithm,
) -> Result<(), Error> {
    if key_id.is_empty() || key_id.len() > ring::digest::MAX_OUTPUT_LEN {
        return Err(Error::out_of_bounds(format!(
            "{} length ({}) is out of bounds. (1-{})",
            SKI.name(), key_id.len(), ring::digest::MAX_OUTPUT_LEN
        )))
    }
    let bits = key.bits();
    if bits.is_empty() || bits.len() > MAX_PUBLIC_KEY_LEN {
        return Err(Error::out_of_bounds(format!(
            "Subject Public Key length ({}) is out of bounds. (1-{})",
            bits.len(), MAX_PUBLIC_KEY_LEN
        )))
    }
    if !algorithm.digest_matches(key_id, bits.as_ref()) {
        debug!(
            "Key identifier {} doesn't match {} digest {} of the key.",
            Hex(key_id), algorithm, Hex(algorithm.digest(&bits).as_ref())
        );
        return Err(Error::key_id_mismatch(format!(
            "The Subject Public Key's hash does not match the {}.",
            SKI.name()
        )))
    }
    Ok(())
}


//============ Tests =========================================================

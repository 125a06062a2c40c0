//! Types and parameters of keys.

use std::io;
use bcder::{decode, encode};
use bcder::{BitString, Captured, Mode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use crate::oid;
use crate::asn1::AsnType;
use super::digest::{Digest, DigestAlgorithm};


//------------ PublicKeyFormat -----------------------------------------------

/// The formats of public keys used by RPKI.
///
/// The public key formats are currently defined in section 3 of [RFC 7935]
/// for resource certificates and section 3 of [RFC 8608] for BGPSec router
/// certifcates. A variant is defined for each algorithm described in these
/// documents.
///
/// [RFC 7935]: https://tools.ietf.org/html/rfc7935
/// [RFC 8608]: https://tools.ietf.org/html/rfc8608
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PublicKeyFormat {
    /// An RSA public key.
    ///
    /// These keys must be used by all RPKI resource certificates.
    Rsa,

    /// An ECDSA public key for the P-256 elliptic curve.
    ///
    /// These keys must be used by all BGPSec router certificates.
    EcdsaP256,
}

/// # ASN.1 Algorithm Identifiers
///
/// The format of the public key is identified in certificates through a
/// algorithm identifier defined with this ASN.1:
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// For RSA keys, the object identifier needs to be that of `rsaEncryption`
/// defined by [RFC 4055] and the parameters must be present and NULL.
/// When parsing, we generously also allow it to be absent altogether.
///
/// For ECDSA keys, the object identifer needs to be `ecPublicKey` defined
/// in [RFC 5480] with the parameter being the object identifier `secp256r1`
/// defined in the same RFC.
///
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
/// [RFC 5480]: https://tools.ietf.org/html/rfc5480
impl PublicKeyFormat {
    /// Takes and returns a algorithm identifier.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the algorithm identifier from the contents of its sequence.
    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let alg = Oid::take_from(cons)?;
        if alg == oid::RSA_ENCRYPTION {
            cons.take_opt_null()?;
            Ok(PublicKeyFormat::Rsa)
        }
        else if alg == oid::EC_PUBLIC_KEY {
            oid::SECP256R1.skip_if(cons)?;
            Ok(PublicKeyFormat::EcdsaP256)
        }
        else {
            Err(cons.content_err("invalid public key algorithm"))
        }
    }
}


//------------ PublicKey -----------------------------------------------------

/// A public key.
///
/// Public keys are included in X.509 certificates as
/// `SubjectPublicKeyInfo` structures:
///
/// ```txt
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
///
/// The algorithm identifier is kept exactly as it was encoded.
#[derive(Clone, Debug)]
pub struct PublicKey {
    format: PublicKeyFormat,
    algorithm: Captured,
    bits: BitString,
}

impl PublicKey {
    /// Returns the format of this public key.
    pub fn format(&self) -> PublicKeyFormat {
        self.format
    }

    /// Returns the bits of this public key.
    ///
    /// This is the content of the `subjectPublicKey` bit string.
    pub fn bits(&self) -> Bytes {
        self.bits.octet_bytes()
    }

    /// Returns a key identifier for this key.
    ///
    /// The identifier is the digest of the key’s bits.
    pub fn key_identifier(&self, algorithm: DigestAlgorithm) -> Digest {
        algorithm.digest(self.bits().as_ref())
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut format = None;
            let algorithm = cons.capture(|cons| {
                format = Some(PublicKeyFormat::take_from(cons)?);
                Ok(())
            })?;
            let format = match format {
                Some(format) => format,
                None => {
                    return Err(cons.content_err(
                        "missing public key algorithm"
                    ))
                }
            };
            Ok(PublicKey {
                format,
                algorithm,
                bits: BitString::take_from(cons)?
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            &self.algorithm,
            self.bits.encode_ref()
        ))
    }
}


//--- PartialEq and Eq

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm.as_slice() == other.algorithm.as_slice()
            && self.bits() == other.bits()
    }
}

impl Eq for PublicKey { }


//--- AsnType

impl AsnType for PublicKey {
    const NAME: &'static str = "SubjectPublicKeyInfo";

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        PublicKey::take_from(cons)
    }

    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error> {
        let values = self.encode_ref();
        values.write_encoded(Mode::Der, target)?;
        Ok(values.encoded_len(Mode::Der))
    }
}


//============ Tests =========================================================

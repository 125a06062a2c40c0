//! Resource certificates.
//!
//! The certificates used in RPKI are called _resource certificates._ They
//! are defined in [RFC 6487] as a profile on regular Internet PKI
//! certificates defined in [RFC 5280].
//!
//! The [`Cert`] type in this module only decodes as much of a certificate
//! as is needed for validating its extensions and for acting as the issuer
//! of other certificates: the subject public key and the extensions are
//! parsed, all other fields are kept in their encoded form. Signatures are
//! not verified.
//!
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::io;
use std::path::Path;
use bcder::{decode, encode};
use bcder::{BitString, Captured, Mode, Tag, Unsigned};
use bcder::decode::{ContentError, DecodeError};
use bcder::encode::{PrimitiveContent, Values};
use crate::asn1::{decode_file, AsnType, DecodeOptions};
use crate::crypto::PublicKey;
use crate::error::{Error, ErrorKind};
use crate::extension::{Extension, Extensions};
use crate::file::FileContents;


//------------ Cert ----------------------------------------------------------

/// A resource certificate.
///
/// ```text
/// Certificate  ::=  SEQUENCE  {
///     tbsCertificate       TBSCertificate,
///     signatureAlgorithm   AlgorithmIdentifier,
///     signatureValue       BIT STRING  }
/// ```
///
/// If a certificate is stored in a file, use [`load`][Self::load]. If
/// it is in memory already, use [`decode`][Self::decode]. Both enforce the
/// decoding options given and the constraints of the certificate.
#[derive(Clone, Debug)]
pub struct Cert {
    tbs: TbsCert,
    signature_algorithm: Captured,
    signature_value: BitString,
}

impl Cert {
    /// Decodes a certificate from its encoded form.
    pub fn decode(data: &[u8], options: DecodeOptions) -> Result<Self, Error> {
        crate::asn1::decode(data, options)
    }

    /// Reads and decodes a certificate from a file.
    ///
    /// The path of the file is included in the message of any error.
    pub fn load(
        path: impl AsRef<Path>, options: DecodeOptions
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = FileContents::read(path).map_err(|err| {
            Error::new(ErrorKind::Io, format!("{}: {}", path.display(), err))
        })?;
        decode_file(&contents, options)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Cert {
                tbs: TbsCert::take_from(cons)?,
                signature_algorithm: cons.capture_one()?,
                signature_value: BitString::take_from(cons)?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.tbs.encode_ref(),
            &self.signature_algorithm,
            self.signature_value.encode_ref(),
        ))
    }

    /// Returns the version number, i.e., 0 for v1 up to 2 for v3.
    pub fn version(&self) -> u8 {
        self.tbs.version()
    }

    pub fn serial_number(&self) -> &Unsigned {
        &self.tbs.serial_number
    }

    /// Returns the encoded issuer name.
    pub fn issuer(&self) -> &Captured {
        &self.tbs.issuer
    }

    /// Returns the encoded validity.
    pub fn validity(&self) -> &Captured {
        &self.tbs.validity
    }

    /// Returns the encoded subject name.
    pub fn subject(&self) -> &Captured {
        &self.tbs.subject
    }

    pub fn subject_public_key_info(&self) -> &PublicKey {
        &self.tbs.subject_public_key_info
    }

    /// Returns the extensions of the certificate.
    ///
    /// Returns an empty slice if the certificate doesn’t have any.
    pub fn extensions(&self) -> &[Extension] {
        match self.tbs.extensions.as_ref() {
            Some(extensions) => extensions.as_slice(),
            None => &[]
        }
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }
}

impl AsnType for Cert {
    const NAME: &'static str = "Certificate";

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Cert::take_from(cons)
    }

    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error> {
        let values = self.encode_ref();
        values.write_encoded(Mode::Der, target)?;
        Ok(values.encoded_len(Mode::Der))
    }

    fn check_constraints(&self) -> Result<(), ContentError> {
        self.tbs.check_constraints()
    }
}


//------------ TbsCert -------------------------------------------------------

/// The data of a certificate covered by its signature.
///
/// ```text
/// TBSCertificate  ::=  SEQUENCE  {
///     version         [0]  EXPLICIT Version DEFAULT v1,
///     serialNumber         CertificateSerialNumber,
///     signature            AlgorithmIdentifier,
///     issuer               Name,
///     validity             Validity,
///     subject              Name,
///     subjectPublicKeyInfo SubjectPublicKeyInfo,
///     extensions      [3]  EXPLICIT Extensions OPTIONAL }
/// ```
///
/// The unique identifiers are not allowed by RFC 6487 and thus not
/// accepted. Since v1 is the default, an explicit v1 version is never
/// encoded and thus isn’t DER.
#[derive(Clone, Debug)]
struct TbsCert {
    version: Option<Unsigned>,
    serial_number: Unsigned,
    signature: Captured,
    issuer: Captured,
    validity: Captured,
    subject: Captured,
    subject_public_key_info: PublicKey,
    extensions: Option<Extensions>,
}

impl TbsCert {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(TbsCert {
                version: cons.take_opt_constructed_if(
                    Tag::CTX_0, Unsigned::take_from
                )?,
                serial_number: Unsigned::take_from(cons)?,
                signature: cons.capture_one()?,
                issuer: cons.capture_one()?,
                validity: cons.capture_one()?,
                subject: cons.capture_one()?,
                subject_public_key_info: PublicKey::take_from(cons)?,
                extensions: cons.take_opt_constructed_if(
                    Tag::CTX_3, Extensions::take_from
                )?,
            })
        })
    }

    fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.version.as_ref().filter(|version| {
                version.as_slice() != [0]
            }).map(|version| {
                encode::sequence_as(Tag::CTX_0, version.encode())
            }),
            (&self.serial_number).encode(),
            &self.signature,
            &self.issuer,
            &self.validity,
            &self.subject,
            self.subject_public_key_info.encode_ref(),
            self.extensions.as_ref().map(|extensions| {
                encode::sequence_as(Tag::CTX_3, extensions.encode_ref())
            }),
        ))
    }

    fn version(&self) -> u8 {
        match self.version.as_ref() {
            Some(version) => match version.as_slice() {
                [version] => *version,
                _ => u8::MAX,
            }
            None => 0,
        }
    }

    fn check_constraints(&self) -> Result<(), ContentError> {
        if self.version() > 2 {
            return Err(ContentError::from_static(
                "invalid certificate version"
            ))
        }
        if let Some(extensions) = self.extensions.as_ref() {
            if self.version() != 2 {
                return Err(ContentError::from_static(
                    "extensions require a v3 certificate"
                ))
            }
            extensions.check_constraints()?;
        }
        if self.serial_number.as_slice().len() > 20 {
            return Err(ContentError::from_static(
                "serial number longer than 20 octets"
            ))
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::crypto::PublicKeyFormat;
    use crate::error::ErrorKind;
    use crate::extension::KU;
    use crate::test;
    use super::*;

    #[test]
    fn decode_cert() {
        let data = test::cert(
            b"\x01\x02\x03",
            &[
                test::extension(KU.oid().0, true, b"\x03\x02\x01\x06"),
                test::extension(
                    crate::oid::CE_SUBJECT_KEY_IDENTIFIER.0, false,
                    b"\x04\x01\x2a"
                ),
            ]
        );
        let cert = Cert::decode(&data, DecodeOptions::der()).unwrap();
        assert_eq!(cert.version(), 2);
        assert_eq!(cert.serial_number().as_slice(), b"\x01");
        assert_eq!(cert.issuer().as_slice(), cert.subject().as_slice());
        assert_eq!(
            cert.subject_public_key_info().format(), PublicKeyFormat::Rsa
        );
        assert_eq!(
            cert.subject_public_key_info().bits().as_ref(), b"\x01\x02\x03"
        );
        assert_eq!(cert.extensions().len(), 2);
        assert!(cert.extensions()[0].is_critical());
    }

    #[test]
    fn encode_der() {
        let data = test::cert(
            b"\x01\x02\x03",
            &[
                test::extension(KU.oid().0, true, b"\x03\x02\x01\x06"),
                test::extension(
                    crate::oid::CE_AUTHORITY_KEY_IDENTIFIER.0, false,
                    &test::aki(b"\x2a")
                ),
            ]
        );
        let cert = Cert::decode(&data, DecodeOptions::der()).unwrap();
        let mut der = Vec::new();
        assert_eq!(cert.encode_der(&mut der).unwrap(), data.len());
        assert_eq!(der, data);
        assert_eq!(
            cert.subject_public_key_info().bits().as_ref(), b"\x01\x02\x03"
        );
    }

    #[test]
    fn explicit_v1_isnt_der() {
        let data = test::versioned_cert(Some(0), b"\x01", None);
        assert_eq!(
            Cert::decode(&data, DecodeOptions::der()).unwrap_err().kind(),
            ErrorKind::NotCanonicallyEncoded
        );
        let cert = Cert::decode(&data, DecodeOptions::ber()).unwrap();
        assert_eq!(cert.version(), 0);

        let data = test::versioned_cert(None, b"\x01", None);
        let cert = Cert::decode(&data, DecodeOptions::der()).unwrap();
        assert_eq!(cert.version(), 0);
        let mut der = Vec::new();
        cert.encode_der(&mut der).unwrap();
        assert_eq!(der, data);
    }

    #[test]
    fn reject_trailing_data() {
        let mut data = test::cert(b"\x01", &[]);
        data.push(0);
        for options in [DecodeOptions::der(), DecodeOptions::ber().quiet()] {
            assert_eq!(
                Cert::decode(&data, options).unwrap_err().kind(),
                ErrorKind::MalformedEncoding
            );
        }
    }

    #[test]
    fn decode_without_extensions() {
        let cert = Cert::decode(
            &test::cert(b"\x01", &[]), DecodeOptions::der()
        ).unwrap();
        assert!(cert.extensions().is_empty());
    }

    #[test]
    fn reject_empty_extensions() {
        let data = test::raw_cert(
            b"\x01", Some(b"\xa3\x02\x30\x00".to_vec())
        );
        assert_eq!(
            Cert::decode(&data, DecodeOptions::der()).unwrap_err().kind(),
            ErrorKind::ConstraintViolation
        );
    }

    #[test]
    fn reject_non_der() {
        let data = test::cert(
            b"\x01",
            &[test::extension(KU.oid().0, false, b"\x03\x02\x01\x06")]
        );
        Cert::decode(&data, DecodeOptions::der()).unwrap();

        // An explicit FALSE critical flag is not DER.
        let ext = b"\x30\x0e\x06\x03\x55\x1d\x0f\x01\x01\x00\
                    \x04\x04\x03\x02\x01\x06".to_vec();
        let data = test::cert(b"\x01", &[ext]);
        assert_eq!(
            Cert::decode(&data, DecodeOptions::der()).unwrap_err().kind(),
            ErrorKind::NotCanonicallyEncoded
        );
        let cert = Cert::decode(&data, DecodeOptions::ber()).unwrap();
        assert!(!cert.extensions()[0].is_critical());
    }

    #[test]
    fn load_missing_file() {
        let err = Cert::load(
            "/nonexistent/cert.cer", DecodeOptions::der()
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.message().starts_with("/nonexistent/cert.cer: "));
    }

    #[test]
    fn load_reports_path() {
        let path = std::env::temp_dir().join(format!(
            "rpki-trust-cert-{}.cer", std::process::id()
        ));
        let mut data = test::cert(b"\x01", &[]);
        data.push(0);
        std::fs::write(&path, &data).unwrap();
        let err = Cert::load(&path, DecodeOptions::der().quiet()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
        assert!(err.message().starts_with(&format!("{}: ", path.display())));

        let data = test::cert(b"\x01", &[]);
        std::fs::write(&path, &data).unwrap();
        let cert = Cert::load(&path, DecodeOptions::der());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            cert.unwrap().subject_public_key_info().bits().as_ref(), b"\x01"
        );
    }
}

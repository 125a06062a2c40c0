//! Certificate and CRL extensions.
//!
//! Both certificates and CRLs carry a list of extensions. Each of them is
//! identified by an object identifier and can be marked as critical which
//! means that a relying party that doesn’t understand the extension has to
//! reject the object.
//!
//! The RPKI profiles limit which extensions may appear and whether they
//! have to be marked critical. This module provides the [`Extension`] and
//! [`Extensions`] types for the raw extensions as well as
//! [`ExtensionHandlers`] which checks a list of extensions against these
//! rules and hands each known extension to a handler for processing.

use std::{fmt, io};
use bcder::{decode, encode};
use bcder::{ConstOid, Mode, OctetString, Oid};
use bcder::decode::{ContentError, DecodeError};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::asn1::AsnType;
use crate::error::Error;

pub use self::aki::{
    AuthorityKeyIdentifier, handle_aki, validate_public_key_hash
};

pub mod aki;


//------------ ExtensionMetadata ---------------------------------------------

/// Static information about an extension.
pub struct ExtensionMetadata {
    /// The name of the extension for use in messages.
    name: &'static str,

    /// The object identifier of the extension.
    oid: ConstOid,

    /// Whether the extension has to be marked critical.
    ///
    /// If this is `false`, the extension must _not_ be marked critical.
    critical: bool,
}

impl ExtensionMetadata {
    pub const fn new(
        name: &'static str, oid: ConstOid, critical: bool
    ) -> Self {
        ExtensionMetadata { name, oid, critical }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn oid(&self) -> &ConstOid {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the metadata for a known extension.
    pub fn find<T: AsRef<[u8]>>(
        oid: &Oid<T>
    ) -> Option<&'static ExtensionMetadata> {
        KNOWN.iter().copied().find(|meta| *oid == meta.oid)
    }
}

impl fmt::Debug for ExtensionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExtensionMetadata")
            .field("name", &self.name)
            .field("oid", &format_args!("{}", self.oid))
            .field("critical", &self.critical)
            .finish()
    }
}


/// Basic Constraints, RFC 6487, section 4.8.1.
pub static BC: ExtensionMetadata = ExtensionMetadata::new(
    "Basic Constraints", oid::CE_BASIC_CONSTRAINTS, true
);

/// Subject Key Identifier, RFC 6487, section 4.8.2.
pub static SKI: ExtensionMetadata = ExtensionMetadata::new(
    "Subject Key Identifier", oid::CE_SUBJECT_KEY_IDENTIFIER, false
);

/// Authority Key Identifier, RFC 6487, section 4.8.3.
pub static AKI: ExtensionMetadata = ExtensionMetadata::new(
    "Authority Key Identifier", oid::CE_AUTHORITY_KEY_IDENTIFIER, false
);

/// Key Usage, RFC 6487, section 4.8.4.
pub static KU: ExtensionMetadata = ExtensionMetadata::new(
    "Key Usage", oid::CE_KEY_USAGE, true
);

/// CRL Distribution Points, RFC 6487, section 4.8.6.
pub static CDP: ExtensionMetadata = ExtensionMetadata::new(
    "CRL Distribution Points", oid::CE_CRL_DISTRIBUTION_POINTS, false
);

/// Authority Information Access, RFC 6487, section 4.8.7.
pub static AIA: ExtensionMetadata = ExtensionMetadata::new(
    "Authority Information Access", oid::PE_AUTHORITY_INFO_ACCESS, false
);

/// Subject Information Access, RFC 6487, section 4.8.8.
pub static SIA: ExtensionMetadata = ExtensionMetadata::new(
    "Subject Information Access", oid::PE_SUBJECT_INFO_ACCESS, false
);

/// Certificate Policies, RFC 6487, section 4.8.9.
pub static CP: ExtensionMetadata = ExtensionMetadata::new(
    "Certificate Policies", oid::CE_CERTIFICATE_POLICIES, true
);

/// IP Resources, RFC 3779, section 2.2.
pub static IR: ExtensionMetadata = ExtensionMetadata::new(
    "IP Resources", oid::PE_IP_ADDR_BLOCK, true
);

/// AS Resources, RFC 3779, section 3.2.
pub static AR: ExtensionMetadata = ExtensionMetadata::new(
    "AS Resources", oid::PE_AUTONOMOUS_SYS_IDS, true
);

/// CRL Number, RFC 6487, section 5.
pub static CN: ExtensionMetadata = ExtensionMetadata::new(
    "CRL Number", oid::CE_CRL_NUMBER, false
);

static KNOWN: [&ExtensionMetadata; 11] = [
    &BC, &SKI, &AKI, &KU, &CDP, &AIA, &SIA, &CP, &IR, &AR, &CN
];


/// Returns the error for an extension whose value can’t be decoded.
pub fn cannot_decode(meta: &ExtensionMetadata) -> Error {
    Error::malformed_extension(format!(
        "Extension '{}' seems to be malformed. Cannot decode.", meta.name
    ))
}


//------------ Extension -----------------------------------------------------

/// A single raw extension.
///
/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING }
/// ```
///
/// The content of _extnValue_ is the DER encoding of a value whose type
/// depends on _extnID._ It is kept undecoded.
#[derive(Clone, Debug)]
pub struct Extension {
    oid: Oid<Bytes>,
    critical: bool,
    value: OctetString,
}

impl Extension {
    pub fn new(oid: Oid<Bytes>, critical: bool, value: OctetString) -> Self {
        Extension { oid, critical, value }
    }

    pub fn oid(&self) -> &Oid<Bytes> {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn value(&self) -> &OctetString {
        &self.value
    }

    /// Returns the metadata if this is one of the known extensions.
    pub fn metadata(&self) -> Option<&'static ExtensionMetadata> {
        ExtensionMetadata::find(&self.oid)
    }

    /// Returns a string describing the extension for use in messages.
    fn describe(&self) -> String {
        match self.metadata() {
            Some(meta) => meta.name.into(),
            None => self.oid.to_string()
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(Self::from_constructed)
    }

    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(Extension {
            oid: Oid::take_from(cons)?,
            critical: cons.take_opt_bool()?.unwrap_or(false),
            value: OctetString::take_from(cons)?,
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.oid.encode_ref(),
            if self.critical {
                Some(self.critical.encode())
            }
            else {
                None
            },
            self.value.encode_ref(),
        ))
    }
}

impl AsnType for Extension {
    const NAME: &'static str = "Extension";

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Extension::take_from(cons)
    }

    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error> {
        let values = self.encode_ref();
        values.write_encoded(Mode::Der, target)?;
        Ok(values.encoded_len(Mode::Der))
    }
}


//------------ Extensions ----------------------------------------------------

/// The list of extensions of a certificate or CRL.
///
/// ```text
/// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
/// ```
#[derive(Clone, Debug, Default)]
pub struct Extensions(Vec<Extension>);

impl Extensions {
    pub fn as_slice(&self) -> &[Extension] {
        self.0.as_slice()
    }

    pub fn iter(&self) -> std::slice::Iter<Extension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(ext) = Extension::take_opt_from(cons)? {
                res.push(ext)
            }
            Ok(Extensions(res))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(ExtensionList(&self.0))
    }
}

impl From<Vec<Extension>> for Extensions {
    fn from(src: Vec<Extension>) -> Self {
        Extensions(src)
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a Extension;
    type IntoIter = std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsnType for Extensions {
    const NAME: &'static str = "Extensions";

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Extensions::take_from(cons)
    }

    fn encode_der<W: io::Write>(
        &self, target: &mut W
    ) -> Result<usize, io::Error> {
        let values = self.encode_ref();
        values.write_encoded(Mode::Der, target)?;
        Ok(values.encoded_len(Mode::Der))
    }

    fn check_constraints(&self) -> Result<(), ContentError> {
        if self.0.is_empty() {
            Err(ContentError::from_static("empty extension list"))
        }
        else {
            Ok(())
        }
    }
}


//------------ ExtensionList -------------------------------------------------

/// Value encoder for the content of the extension sequence.
struct ExtensionList<'a>(&'a [Extension]);

impl Values for ExtensionList<'_> {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.0.iter().map(|ext| ext.encode_ref().encoded_len(mode)).sum()
    }

    fn write_encoded<W: io::Write>(
        &self, mode: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        for ext in self.0 {
            ext.encode_ref().write_encoded(mode, target)?;
        }
        Ok(())
    }
}


//------------ ExtensionHandlers ---------------------------------------------

/// The callback processing the value of an extension.
type Callback<'a> = Box<dyn FnMut(&Extension) -> Result<(), Error> + 'a>;

/// A handler for one type of extension.
struct ExtensionHandler<'a> {
    meta: &'static ExtensionMetadata,
    mandatory: bool,
    callback: Callback<'a>,
}

/// A table of handlers for processing a list of extensions.
///
/// The table contains one entry per extension that should be processed.
/// Each entry refers to the static metadata of the extension, states
/// whether the extension has to be present, and has a callback for the
/// extension’s value. Whatever else the callback needs, it captures.
///
/// [`handle`][Self::handle] walks a list of extensions and applies the
/// following rules:
///
/// * an extension without a handler is ignored if it isn’t critical and
///   rejected if it is,
/// * an extension with a handler must appear only once and must be marked
///   critical exactly if its metadata says so,
/// * every mandatory extension must be present.
///
/// Processing stops at the first error, including errors returned by a
/// callback. The table can be used for more than one list.
#[derive(Default)]
pub struct ExtensionHandlers<'a> {
    handlers: Vec<ExtensionHandler<'a>>,
}

impl<'a> ExtensionHandlers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler to the end of the table.
    ///
    /// If there already is a handler for the same extension, the new
    /// handler will never be used.
    pub fn push<F>(
        &mut self,
        meta: &'static ExtensionMetadata,
        mandatory: bool,
        callback: F,
    )
    where F: FnMut(&Extension) -> Result<(), Error> + 'a {
        self.handlers.push(ExtensionHandler {
            meta, mandatory, callback: Box::new(callback)
        })
    }

    /// Adds a handler and returns the table.
    pub fn with<F>(
        mut self,
        meta: &'static ExtensionMetadata,
        mandatory: bool,
        callback: F,
    ) -> Self
    where F: FnMut(&Extension) -> Result<(), Error> + 'a {
        self.push(meta, mandatory, callback);
        self
    }

    /// Processes a list of extensions.
    pub fn handle(&mut self, extensions: &[Extension]) -> Result<(), Error> {
        let mut found = vec![false; self.handlers.len()];

        for ext in extensions {
            self.handle_extension(ext, &mut found)?;
        }

        for (handler, found) in self.handlers.iter().zip(found) {
            if handler.mandatory && !found {
                return Err(Error::missing_mandatory(format!(
                    "Object is missing the '{}' extension.",
                    handler.meta.name
                )))
            }
        }
        Ok(())
    }

    fn handle_extension(
        &mut self, ext: &Extension, found: &mut [bool]
    ) -> Result<(), Error> {
        let pos = match self.handlers.iter().position(|handler| {
            *ext.oid() == handler.meta.oid
        }) {
            Some(pos) => pos,
            None => {
                if ext.is_critical() {
                    return Err(Error::unknown_critical(format!(
                        "Object has unknown critical extension '{}'.",
                        ext.describe()
                    )))
                }
                debug!("Ignoring non-critical extension '{}'", ext.describe());
                return Ok(())
            }
        };

        let handler = &mut self.handlers[pos];
        if found[pos] {
            return Err(Error::duplicate_extension(format!(
                "Object has more than one '{}' extension.", handler.meta.name
            )))
        }
        found[pos] = true;

        if handler.meta.critical && !ext.is_critical() {
            return Err(Error::criticality_mismatch(format!(
                "Extension '{}' is supposed to be marked critical.",
                handler.meta.name
            )))
        }
        if !handler.meta.critical && ext.is_critical() {
            return Err(Error::criticality_mismatch(format!(
                "Extension '{}' is not supposed to be marked critical.",
                handler.meta.name
            )))
        }

        (handler.callback)(ext)
    }
}


//============ Tests =========================================================

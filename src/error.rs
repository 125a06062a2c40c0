//! Error handling.
//!
//! All operations of the crate report failure through the single [`Error`]
//! type. It carries an [`ErrorKind`] which callers can use to tell the
//! various reasons for rejecting an object apart, and a message describing
//! the specific problem for human consumption.

use std::{error, fmt, io};
use std::borrow::Cow;


//------------ ErrorKind -----------------------------------------------------

/// The reason an object was rejected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The bytes do not parse as the target type.
    ///
    /// This includes input that ends prematurely.
    MalformedEncoding,

    /// The bytes parse but are not in the distinguished encoding.
    NotCanonicallyEncoded,

    /// The decoded object violates the rules of its type.
    ConstraintViolation,

    /// A critical extension is present that nobody asked for.
    UnknownCriticalExtension,

    /// An extension appears more than once.
    DuplicateExtension,

    /// An extension’s critical flag is not what it is required to be.
    CriticalityMismatch,

    /// A mandatory extension is missing.
    MissingMandatoryExtension,

    /// The value of an extension cannot be decoded.
    MalformedExtension,

    /// The Authority Key Identifier uses a form not allowed in RPKI.
    UnsupportedAuthorityKeyIdForm,

    /// There is no issuer certificate to check the identifier against.
    NoParentCertificate,

    /// The key identifier doesn’t match the issuer’s public key.
    KeyIdentifierMismatch,

    /// A handler requiring a validation context was called without one.
    MissingContext,

    /// A length is outside of the range that can be processed.
    OutOfBounds,

    /// Reading an object’s data failed.
    Io,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedEncoding => "malformed encoding",
            ErrorKind::NotCanonicallyEncoded => "not DER encoded",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::UnknownCriticalExtension => {
                "unknown critical extension"
            }
            ErrorKind::DuplicateExtension => "duplicate extension",
            ErrorKind::CriticalityMismatch => "criticality mismatch",
            ErrorKind::MissingMandatoryExtension => {
                "missing mandatory extension"
            }
            ErrorKind::MalformedExtension => "malformed extension",
            ErrorKind::UnsupportedAuthorityKeyIdForm => {
                "unsupported authority key identifier"
            }
            ErrorKind::NoParentCertificate => "no parent certificate",
            ErrorKind::KeyIdentifierMismatch => "key identifier mismatch",
            ErrorKind::MissingContext => "missing validation context",
            ErrorKind::OutOfBounds => "length out of bounds",
            ErrorKind::Io => "I/O error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ Error ---------------------------------------------------------

/// An object failed decoding or validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl Error {
    /// Creates a new error from a kind and a message.
    pub fn new(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        Error { kind, msg: msg.into() }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message describing the error.
    pub fn message(&self) -> &str {
        self.msg.as_ref()
    }

    pub fn malformed_encoding(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MalformedEncoding, msg)
    }

    pub fn not_canonical(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotCanonicallyEncoded, msg)
    }

    pub fn constraint_violation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ConstraintViolation, msg)
    }

    pub fn unknown_critical(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UnknownCriticalExtension, msg)
    }

    pub fn duplicate_extension(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::DuplicateExtension, msg)
    }

    pub fn criticality_mismatch(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::CriticalityMismatch, msg)
    }

    pub fn missing_mandatory(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MissingMandatoryExtension, msg)
    }

    pub fn malformed_extension(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MalformedExtension, msg)
    }

    pub fn unsupported_aki_form(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UnsupportedAuthorityKeyIdForm, msg)
    }

    pub fn no_parent(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NoParentCertificate, msg)
    }

    pub fn key_id_mismatch(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::KeyIdentifierMismatch, msg)
    }

    pub fn missing_context(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MissingContext, msg)
    }

    pub fn out_of_bounds(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::OutOfBounds, msg)
    }
}


//--- From

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}


//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl error::Error for Error { }


//============ Tests =========================================================

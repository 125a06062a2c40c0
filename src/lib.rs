//! Strict decoding and extension validation for RPKI objects.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. A relying party has to turn untrusted
//! bytes fetched from RPKI repositories into objects it can base routing
//! decisions on. This crate contains the part of that process which is
//! shared by all object types:
//!
//! * the [`asn1`] module decodes a buffer into a typed object and proves
//!   that the buffer was DER encoded by re-encoding the object and
//!   comparing the result byte for byte,
//! * the [`extension`] module walks the extensions of a certificate or
//!   CRL and enforces presence, uniqueness, and criticality rules for each
//!   of them, and
//! * the [`extension::aki`] module links a certificate to its issuer by
//!   checking the Authority Key Identifier against the issuer’s public key.
//!
//! Certificates enter a certification path through a [`Validation`] which
//! keeps track of the ancestors of the certificate currently processed.
//!
//! [`Validation`]: validation::Validation

pub use self::error::{Error, ErrorKind};

pub mod asn1;
pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extension;
pub mod file;
pub mod oid;
pub mod util;
pub mod validation;

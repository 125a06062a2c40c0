//! The state of validating a certification path.
//!
//! Validating an object requires knowledge of the certificates above it in
//! the certification path. A [`Validation`] keeps these certificates in a
//! stack: the driver walking the repository pushes a certificate before
//! processing the objects it issued and pops it afterwards. Handlers only
//! ever look at the top of the stack.
//!
//! A validation belongs to a single certification path. If several paths
//! are validated concurrently, each of them needs its own value.

use crate::cert::Cert;
use crate::config::Config;


//------------ Validation ----------------------------------------------------

/// The state of validating a single certification path.
#[derive(Clone, Debug, Default)]
pub struct Validation {
    /// The configuration in use.
    config: Config,

    /// The ancestors of the object currently validated.
    ///
    /// The trust anchor is at the bottom, the immediate issuer at the top.
    certs: Vec<Cert>,
}

impl Validation {
    pub fn new(config: Config) -> Self {
        Validation { config, certs: Vec::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds a certificate to the top of the stack.
    pub fn push_cert(&mut self, cert: Cert) {
        self.certs.push(cert)
    }

    /// Removes and returns the certificate at the top of the stack.
    pub fn pop_cert(&mut self) -> Option<Cert> {
        self.certs.pop()
    }

    /// Returns the certificate at the top of the stack.
    ///
    /// This is the issuer of the object currently validated.
    pub fn peek_cert(&self) -> Option<&Cert> {
        self.certs.last()
    }

    /// Returns the number of certificates on the stack.
    pub fn depth(&self) -> usize {
        self.certs.len()
    }
}


//============ Tests =========================================================

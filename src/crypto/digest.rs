//! Digest algorithm and operations.

use std::{error, fmt};
use std::str::FromStr;
use ring::digest;

// Re-export the things from ring for actual digest generation.
pub use ring::digest::Digest;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms used for key identifiers.
///
/// [RFC 6487] requires key identifiers to be the SHA-1 hash of the public
/// key, which makes this the default. Since future revisions may change
/// that, the algorithm is selectable.
///
/// [RFC 6487]: https://tools.ietf.org/html/rfc6487
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DigestAlgorithm {
    /// SHA-1 as defined in FIPS 180-4.
    #[default]
    Sha1,

    /// SHA-256 as defined in FIPS 180-4.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    /// Returns the length of a digest in octets.
    pub fn output_len(self) -> usize {
        self.ring_algorithm().output_len()
    }

    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        digest::digest(self.ring_algorithm(), data)
    }

    /// Returns whether the digest of `input` is `expected`.
    pub fn digest_matches(self, expected: &[u8], input: &[u8]) -> bool {
        self.digest(input).as_ref() == expected
    }

    fn ring_algorithm(self) -> &'static digest::Algorithm {
        match self {
            DigestAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => &digest::SHA256,
        }
    }
}


//--- FromStr and Display

impl FromStr for DigestAlgorithm {
    type Err = UnknownDigestAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sha1") || s.eq_ignore_ascii_case("sha-1") {
            Ok(DigestAlgorithm::Sha1)
        }
        else if s.eq_ignore_ascii_case("sha256")
            || s.eq_ignore_ascii_case("sha-256")
        {
            Ok(DigestAlgorithm::Sha256)
        }
        else {
            Err(UnknownDigestAlgorithm)
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ UnknownDigestAlgorithm ----------------------------------------

/// A digest algorithm name wasn’t recognized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownDigestAlgorithm;

impl fmt::Display for UnknownDigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown digest algorithm")
    }
}

impl error::Error for UnknownDigestAlgorithm { }


//============ Tests =========================================================

//! Configuration of the validation process.

use crate::asn1::DecodeOptions;
use crate::crypto::DigestAlgorithm;


//------------ Config --------------------------------------------------------

/// Policy settings for decoding and validating objects.
///
/// With the `serde` feature enabled, the configuration can be deserialized
/// with missing fields taking their default values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Config {
    /// The digest algorithm used for key identifiers.
    pub key_id_digest: DigestAlgorithm,

    /// Whether objects have to be DER encoded.
    pub strict_der: bool,

    /// Whether to log why an object was rejected.
    pub log_failures: bool,
}

impl Config {
    /// Returns the options for decoding objects under this configuration.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new(self.strict_der, self.log_failures)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            key_id_digest: DigestAlgorithm::default(),
            strict_der: true,
            log_failures: true,
        }
    }
}


//============ Tests =========================================================

//! Cryptographic building blocks.
//!
//! The crate doesn’t verify signatures. It only needs digests for linking
//! key identifiers to public keys, and the public keys themselves.

pub use self::digest::{Digest, DigestAlgorithm};
pub use self::keys::{PublicKey, PublicKeyFormat};

pub mod digest;
pub mod keys;

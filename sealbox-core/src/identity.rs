//! Caller identities and the derivation contexts computed from them.
//!
//! Every key the authority derives is bound to a 32-byte context. The
//! context of a caller is its principal packed into a fixed frame:
//!
//! ```text
//! CONTEXT (32) = LENGTH (1) || PRINCIPAL (0..=31) || ZERO PADDING
//! ```
//!
//! Capability redemption uses the context of the anonymous principal, a
//! single `0x04` byte, so that redeemed notes never leak who minted them.

use crate::artifacts::{
    deserialize_bin_or_b64, deserialize_vec_or_b64, serialize_bin_or_b64, serialize_vec_or_b64,
};
use crate::consts::{ANONYMOUS_PRINCIPAL_TAG, CONTEXT_SIZE, MAX_PRINCIPAL_SIZE};
use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque caller identifier of at most 31 bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal(Vec<u8>);

/// The 32-byte identity a derived key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationContext([u8; CONTEXT_SIZE]);

impl Principal {
    /// Wraps raw principal bytes.
    ///
    /// Fails with [`Error::FormatViolation`] when the principal is longer
    /// than [`MAX_PRINCIPAL_SIZE`], since it would not fit the context frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() > MAX_PRINCIPAL_SIZE {
            return Err(Error::FormatViolation(String::from(
                "principal exceeds 31 bytes",
            )));
        }

        Ok(Self(bytes.to_vec()))
    }

    /// The distinguished anonymous principal.
    pub fn anonymous() -> Self {
        Self(vec![ANONYMOUS_PRINCIPAL_TAG])
    }

    /// The raw principal bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Packs this principal into its derivation context.
    pub fn derivation_context(&self) -> DerivationContext {
        let mut buf = [0u8; CONTEXT_SIZE];
        buf[0] = self.0.len() as u8;
        buf[1..1 + self.0.len()].copy_from_slice(&self.0);

        DerivationContext(buf)
    }
}

impl DerivationContext {
    /// The packed context bytes.
    pub fn as_bytes(&self) -> &[u8; CONTEXT_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for DerivationContext {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_vec_or_b64(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserialize_vec_or_b64(deserializer)?;
        Principal::from_bytes(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for DerivationContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_bin_or_b64(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for DerivationContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut buf = [0u8; CONTEXT_SIZE];
        deserialize_bin_or_b64(&mut buf, deserializer)?;

        Ok(Self(buf))
    }
}

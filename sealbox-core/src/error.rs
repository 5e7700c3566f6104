//! Sealbox errors.

use core::fmt;

/// A Sealbox error.
#[derive(Debug)]
pub enum Error {
    /// A session operation was attempted before the session reached `Ready`.
    NotInitialized,
    /// A supplied transport key or encryption seed was not exactly 32 bytes.
    InvalidSeedLength,
    /// An encrypted key did not verify against the verification material.
    ///
    /// Covers both tampered payloads and invalid point encodings inside the
    /// blob; the two are deliberately indistinguishable.
    UnwrapVerificationFailed,
    /// Identity-bound decryption failed.
    ///
    /// Deliberately non-specific: a wrong key and a corrupted ciphertext
    /// body surface identically.
    DecryptionFailed,
    /// The AEAD authentication tag did not verify.
    AuthenticationFailed,
    /// A signature had the wrong length or was not valid hex.
    MalformedSignature,
    /// A well-formed signature failed local verification.
    SignatureInvalid,
    /// The authority rejected a one-time capability operation.
    Capability(CapabilityError),
    /// A remote call failed for reasons unrelated to the protocol.
    ///
    /// Unlike the cryptographic failures above, these may be retried at the
    /// caller's discretion.
    RemoteCall(String),
    /// A byte encoding outside the unwrap path was malformed.
    FormatViolation(String),
}

/// Authority-side failure of a one-time capability redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The capability was already consumed by an earlier redemption.
    AlreadyRedeemed,
    /// The capability's deadline passed before redemption.
    Expired,
    /// No capability is registered under this note id.
    NotFound,
    /// Any other authority-side rejection.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "session is not initialized"),
            Self::InvalidSeedLength => write!(f, "seed must be exactly 32 bytes"),
            Self::UnwrapVerificationFailed => {
                write!(f, "encrypted key failed verification")
            }
            Self::DecryptionFailed => write!(f, "decryption failed"),
            Self::AuthenticationFailed => write!(f, "authentication tag mismatch"),
            Self::MalformedSignature => write!(f, "signature has the wrong length or encoding"),
            Self::SignatureInvalid => write!(f, "signature did not verify"),
            Self::Capability(e) => write!(f, "capability error: {e}"),
            Self::RemoteCall(s) => write!(f, "remote call failed: {s}"),
            Self::FormatViolation(s) => write!(f, "{s} not (correctly) found in format"),
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRedeemed => write!(f, "the one-time link was already redeemed"),
            Self::Expired => write!(f, "the one-time link expired"),
            Self::NotFound => write!(f, "no one-time link exists for this note"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<CapabilityError> for Error {
    fn from(e: CapabilityError) -> Self {
        Self::Capability(e)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Self::MalformedSignature
    }
}

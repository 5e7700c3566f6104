//! Signed one-time authenticator codes.
//!
//! A small demonstration of the transport signing primitive: a six-digit
//! numeric code is drawn at random and signed, so a verifier holding the
//! issuer's transport public key can check the code really came from that
//! session. Callers regenerate on a fixed interval, see
//! [`CODE_REFRESH_SECS`].
//!
//! [`CODE_REFRESH_SECS`]: crate::consts::CODE_REFRESH_SECS

use crate::artifacts::{Signature, TransportPublicKey};
use crate::transport::TransportKeypair;
use rand::{CryptoRng, Rng};

/// A six-digit code and the signature proving its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCode {
    code: String,
    signature: Signature,
}

impl SignedCode {
    /// The code digits, zero padded to six characters.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The signature over the ASCII form of the code.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Draws a fresh code and signs it under `keypair`.
pub fn generate<R: Rng + CryptoRng>(keypair: &TransportKeypair, rng: &mut R) -> SignedCode {
    let n: u32 = rng.gen_range(0..1_000_000);
    let code = format!("{n:06}");
    let signature = keypair.sign(code.as_bytes());

    SignedCode { code, signature }
}

/// Verifies a signed code against the issuer's public key.
pub fn verify(key: &TransportPublicKey, signed: &SignedCode) -> bool {
    key.verify(signed.code.as_bytes(), &signed.signature)
}

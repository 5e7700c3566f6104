//! Symmetric sealing of note contents under AES-256-GCM.
//!
//! Sealed notes carry their nonce inline: `NONCE (12) || CIPHERTEXT || TAG`.
//! A fresh nonce is drawn for every seal, so sealing the same plaintext
//! twice yields different blobs.

use crate::artifacts::SymmetricKey;
use crate::consts::{IV_SIZE, TAG_SIZE};
use crate::error::Error;
use aead::{Aead, KeyInit, Nonce};
use aes_gcm::{Aes256Gcm, Key};
use rand::{CryptoRng, RngCore};

impl From<aead::Error> for Error {
    fn from(_: aead::Error) -> Self {
        Error::AuthenticationFailed
    }
}

/// Seals a plaintext under `key` with a fresh random nonce.
pub fn encrypt<R: RngCore + CryptoRng>(
    key: &SymmetricKey,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    let mut iv = [0u8; IV_SIZE];
    rng.fill_bytes(&mut iv);
    let nonce = Nonce::<Aes256Gcm>::from_slice(&iv);

    let ct = cipher.encrypt(nonce, plaintext)?;

    let mut blob = Vec::with_capacity(IV_SIZE + ct.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ct);

    Ok(blob)
}

/// Opens a sealed blob.
///
/// Fails with [`Error::AuthenticationFailed`] when the blob is too short to
/// carry a nonce and tag, when the key is wrong, or when any byte of the
/// blob was changed.
pub fn decrypt(key: &SymmetricKey, blob: &[u8]) -> Result<Vec<u8>, Error> {
    if blob.len() < IV_SIZE + TAG_SIZE {
        return Err(Error::AuthenticationFailed);
    }

    let (iv, ct) = blob.split_at(IV_SIZE);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
    let nonce = Nonce::<Aes256Gcm>::from_slice(iv);

    Ok(cipher.decrypt(nonce, ct)?)
}

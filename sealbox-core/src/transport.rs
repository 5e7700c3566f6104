//! Transport keypairs.
//!
//! A transport keypair is the ephemeral client-side secret of the protocol.
//! The authority encrypts every derived key it delivers to the transport
//! public key, so only the holder of the secret scalar can unwrap it. The
//! same keypair signs capability messages with a BLS signature in G2.
//!
//! Unwrapping checks two pairing equations before releasing a key:
//!
//! 1. consistency of the delivery, `e(c1, g2) == e(g1, c2)`, and
//! 2. validity of the unwrapped key against the derived public key,
//!    `e(k, g2) == e(H1(dpk || context), dpk)`.
//!
//! Any defect, from an undecodable point to a failed equation, surfaces as
//! [`Error::UnwrapVerificationFailed`] so the error channel does not reveal
//! which stage rejected the blob.

use crate::artifacts::{
    DecryptionKey, DerivedPublicKey, EncryptedKey, Signature, TransportPublicKey,
};
use crate::consts::*;
use crate::error::Error;
use crate::identity::DerivationContext;
use crate::ro::RandomOracle;
use crate::util::open_ct;
use ic_bls12_381::hash_to_curve::{ExpandMsgXmd, HashToCurve};
use ic_bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use rand::{CryptoRng, RngCore};

/// Hashes to G1 with the public key prepended to the message.
pub(crate) fn augmented_hash_to_g1(pk: &G2Affine, data: &[u8]) -> G1Affine {
    let mut input = Vec::with_capacity(G2_SIZE + data.len());
    input.extend_from_slice(&pk.to_compressed());
    input.extend_from_slice(data);

    let pt = <G1Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(
        input,
        G1_HASH_DOMAIN,
    );

    G1Affine::from(pt)
}

/// Hashes to G2 with the public key prepended to the message.
pub(crate) fn augmented_hash_to_g2(pk: &G1Affine, data: &[u8]) -> G2Affine {
    let mut input = Vec::with_capacity(G1_SIZE + data.len());
    input.extend_from_slice(&pk.to_compressed());
    input.extend_from_slice(data);

    let pt = <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(
        input,
        G2_HASH_DOMAIN,
    );

    G2Affine::from(pt)
}

/// An ephemeral keypair for key transport and capability signing.
///
/// The secret scalar is derived from a 32-byte seed, which is retained so a
/// session can be persisted and resumed deterministically.
#[derive(Debug, Clone)]
pub struct TransportKeypair {
    seed: [u8; SEED_SIZE],
    secret: Scalar,
    public: TransportPublicKey,
}

impl TransportKeypair {
    /// Generates a keypair from a fresh random seed.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; SEED_SIZE];
        rng.fill_bytes(&mut seed);

        Self::new(seed)
    }

    /// Rederives the keypair of an earlier seed.
    ///
    /// The same seed always yields the same keypair. Fails with
    /// [`Error::InvalidSeedLength`] unless the seed is exactly 32 bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self, Error> {
        let buf: [u8; SEED_SIZE] = seed.try_into().map_err(|_| Error::InvalidSeedLength)?;

        Ok(Self::new(buf))
    }

    fn new(seed: [u8; SEED_SIZE]) -> Self {
        let mut ro = RandomOracle::new("sealbox-bls12-381-transport-key-seed");
        ro.update_bin(&seed);
        let secret = ro.finalize_to_scalar();

        let public = TransportPublicKey(G1Affine::from(G1Projective::generator() * secret));

        Self {
            seed,
            secret,
            public,
        }
    }

    /// The seed this keypair was derived from.
    pub fn seed(&self) -> &[u8; SEED_SIZE] {
        &self.seed
    }

    /// The public half, safe to send to the authority.
    pub fn public_key(&self) -> TransportPublicKey {
        self.public
    }

    /// Signs a message under this keypair.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let pt = augmented_hash_to_g2(&G1Affine::generator(), message) * self.secret;

        Signature(G2Affine::from(pt).to_compressed())
    }

    /// Unwraps an encrypted key delivered for `context` and verifies it
    /// against the derived public key.
    pub fn decrypt(
        &self,
        encrypted_key: &EncryptedKey,
        derived_public_key: &DerivedPublicKey,
        context: &DerivationContext,
    ) -> Result<DecryptionKey, Error> {
        let c1_bytes: &[u8; G1_SIZE] = encrypted_key.0[..G1_SIZE]
            .try_into()
            .map_err(|_| Error::UnwrapVerificationFailed)?;
        let c2_bytes: &[u8; G2_SIZE] = encrypted_key.0[G1_SIZE..G1_SIZE + G2_SIZE]
            .try_into()
            .map_err(|_| Error::UnwrapVerificationFailed)?;
        let c3_bytes: &[u8; G1_SIZE] = encrypted_key.0[G1_SIZE + G2_SIZE..]
            .try_into()
            .map_err(|_| Error::UnwrapVerificationFailed)?;

        let c1 = open_ct(G1Affine::from_compressed(c1_bytes))
            .ok_or(Error::UnwrapVerificationFailed)?;
        let c2 = open_ct(G2Affine::from_compressed(c2_bytes))
            .ok_or(Error::UnwrapVerificationFailed)?;
        let c3 = open_ct(G1Affine::from_compressed(c3_bytes))
            .ok_or(Error::UnwrapVerificationFailed)?;

        // The two delivery halves must encrypt under the same randomness.
        if pairing(&c1, &G2Affine::generator()) != pairing(&G1Affine::generator(), &c2) {
            return Err(Error::UnwrapVerificationFailed);
        }

        let k = G1Affine::from(G1Projective::from(&c3) - c1 * self.secret);

        let expected = augmented_hash_to_g1(&derived_public_key.0, context.as_bytes());
        if pairing(&k, &G2Affine::generator()) != pairing(&expected, &derived_public_key.0) {
            return Err(Error::UnwrapVerificationFailed);
        }

        Ok(DecryptionKey(k))
    }

    /// Unwraps an encrypted key and hashes it into `length` bytes of
    /// symmetric key material under `domain_sep`.
    pub fn decrypt_and_hash(
        &self,
        encrypted_key: &EncryptedKey,
        derived_public_key: &DerivedPublicKey,
        context: &DerivationContext,
        domain_sep: &str,
        length: usize,
    ) -> Result<Vec<u8>, Error> {
        let key = self.decrypt(encrypted_key, derived_public_key, context)?;

        let mut ro = RandomOracle::new(domain_sep);
        ro.update_bin(&key.0.to_compressed());

        Ok(ro.finalize_to_vec(length))
    }
}

impl TransportPublicKey {
    /// Verifies a signature made by the matching [`TransportKeypair`].
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let sig = match open_ct(G2Affine::from_compressed(&signature.0)) {
            Some(sig) => sig,
            None => return false,
        };

        pairing(&G1Affine::generator(), &sig)
            == pairing(&self.0, &augmented_hash_to_g2(&G1Affine::generator(), message))
    }
}

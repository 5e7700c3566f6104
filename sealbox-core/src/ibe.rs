//! Identity-bound encryption.
//!
//! Encrypts directly against the public parameters of the authority and an
//! identity byte string, with no key exchange beforehand. Whoever obtains
//! the decryption key derived for that identity can open the ciphertext.
//!
//! The scheme is hybrid: a 32-byte seed masks the message, and the seed
//! itself is masked under a pairing that only the derived key can recompute.
//! Decryption rederives the encryption randomness from the recovered seed
//! and message and rejects the ciphertext unless `c1` matches, so a
//! manipulated ciphertext fails closed instead of decrypting to garbage.
//!
//! The wire form is `c1 (G2, 96) || masked seed (32) || masked message`.

use crate::artifacts::{DecryptionKey, DerivedPublicKey};
use crate::consts::{G2_SIZE, SEED_SIZE};
use crate::error::Error;
use crate::ro::RandomOracle;
use crate::transport::augmented_hash_to_g1;
use crate::util::{open_ct, xor_into};
use ic_bls12_381::{pairing, G2Affine, G2Projective, Gt, Scalar};

const HASH_TO_MASK_DOMAIN: &str = "sealbox-bls12-381-ibe-hash-to-mask";
const MASK_SEED_DOMAIN: &str = "sealbox-bls12-381-ibe-mask-seed";
const MASK_MSG_DOMAIN: &str = "sealbox-bls12-381-ibe-mask-msg";

fn hash_to_mask(seed: &[u8; SEED_SIZE], msg: &[u8]) -> Scalar {
    let mut ro = RandomOracle::new(HASH_TO_MASK_DOMAIN);
    ro.update_bin(seed);
    ro.update_bin(msg);

    ro.finalize_to_scalar()
}

fn mask_seed(seed: &[u8; SEED_SIZE], t: &Gt) -> [u8; SEED_SIZE] {
    let mut ro = RandomOracle::new(MASK_SEED_DOMAIN);
    ro.update_bin(&t.to_bytes());

    let mut masked = ro.finalize_to_array::<SEED_SIZE>();
    xor_into(&mut masked, seed);

    masked
}

fn mask_msg(msg: &[u8], seed: &[u8; SEED_SIZE]) -> Vec<u8> {
    let mut ro = RandomOracle::new(MASK_MSG_DOMAIN);
    ro.update_bin(seed);

    let mut masked = ro.finalize_to_vec(msg.len());
    xor_into(&mut masked, msg);

    masked
}

/// A ciphertext bound to an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbeCiphertext {
    c1: G2Affine,
    c2: [u8; SEED_SIZE],
    c3: Vec<u8>,
}

impl IbeCiphertext {
    /// Encrypts `msg` for `identity` under the authority parameters.
    ///
    /// The 32-byte `seed` supplies all encryption randomness; the same
    /// inputs always produce the same ciphertext.
    pub fn encrypt(
        params: &DerivedPublicKey,
        identity: &[u8],
        msg: &[u8],
        seed: &[u8],
    ) -> Result<Self, Error> {
        let seed: &[u8; SEED_SIZE] = seed.try_into().map_err(|_| Error::InvalidSeedLength)?;

        let t = hash_to_mask(seed, msg);

        let pt = augmented_hash_to_g1(&params.0, identity);
        let tsig = pairing(&pt, &params.0) * t;

        let c1 = G2Affine::from(G2Projective::generator() * t);
        let c2 = mask_seed(seed, &tsig);
        let c3 = mask_msg(msg, seed);

        Ok(Self { c1, c2, c3 })
    }

    /// Decrypts with the key derived for the encryption identity.
    ///
    /// Fails with [`Error::DecryptionFailed`] when the key does not match
    /// the identity or the ciphertext was manipulated.
    pub fn decrypt(&self, key: &DecryptionKey) -> Result<Vec<u8>, Error> {
        let t = pairing(&key.0, &self.c1);

        let seed = mask_seed(&self.c2, &t);
        let msg = mask_msg(&self.c3, &seed);

        // Rederive the randomness and check it reproduces c1.
        let t = hash_to_mask(&seed, &msg);
        if G2Affine::from(G2Projective::generator() * t) != self.c1 {
            return Err(Error::DecryptionFailed);
        }

        Ok(msg)
    }

    /// Serializes to the wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(G2_SIZE + SEED_SIZE + self.c3.len());
        buf.extend_from_slice(&self.c1.to_compressed());
        buf.extend_from_slice(&self.c2);
        buf.extend_from_slice(&self.c3);

        buf
    }

    /// Deserializes from the wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < G2_SIZE + SEED_SIZE {
            return Err(Error::FormatViolation(String::from(
                "identity ciphertext too short",
            )));
        }

        let c1_bytes: &[u8; G2_SIZE] = bytes[..G2_SIZE]
            .try_into()
            .map_err(|_| Error::FormatViolation(String::from("identity ciphertext")))?;
        let c1 = open_ct(G2Affine::from_compressed(c1_bytes))
            .ok_or_else(|| Error::FormatViolation(String::from("identity ciphertext")))?;

        let mut c2 = [0u8; SEED_SIZE];
        c2.copy_from_slice(&bytes[G2_SIZE..G2_SIZE + SEED_SIZE]);

        let c3 = bytes[G2_SIZE + SEED_SIZE..].to_vec();

        Ok(Self { c1, c2, c3 })
    }
}

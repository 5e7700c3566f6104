//! The remote authority interface and its wire types.
//!
//! The client never talks to a concrete transport directly; everything it
//! needs from the authority is captured by [`KeyService`]. The HTTP client
//! of the command-line tool and the in-process authority used by the test
//! suite both implement this trait.

use crate::artifacts::{
    deserialize_vec_or_b64, serialize_vec_or_b64, DerivedPublicKey, EncryptedKey, Signature,
    TransportPublicKey,
};
use crate::error::Error;
use crate::identity::{DerivationContext, Principal};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Stable integer identifier of a remote note.
pub type NoteId = u64;

/// Public parameters of the authority, versioned for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters<T> {
    /// Version of the parameter encoding.
    pub format_version: u8,
    /// The authority public key these parameters carry.
    pub public_key: T,
}

/// A remote note record as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Identifier assigned by the authority on save.
    pub id: NoteId,
    /// Seconds since the Unix epoch at which the note was stored.
    pub created_at: u64,
    /// The sealed note contents.
    #[serde(
        serialize_with = "serialize_vec_or_b64",
        deserialize_with = "deserialize_vec_or_b64"
    )]
    pub ciphertext: Vec<u8>,
}

/// Remote key-authority operations consumed by the session and capability
/// protocols.
///
/// Methods that deliver key material take the transport public key the
/// delivery must be encrypted to. Errors of the capability endpoints come
/// back as [`Error::Capability`] so callers can tell a spent capability from
/// a transport failure.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Public parameters of the identity-bound encryption scheme.
    async fn identity_public_parameters(&self) -> Result<Parameters<DerivedPublicKey>, Error>;

    /// Verification material for symmetric key unwrapping.
    async fn symmetric_verification_key(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Parameters<DerivedPublicKey>, Error>;

    /// The caller's symmetric key, encrypted to `transport_key`.
    async fn encrypted_symmetric_key(
        &self,
        transport_key: &TransportPublicKey,
    ) -> Result<EncryptedKey, Error>;

    /// The decryption key for `context`, encrypted to `transport_key`.
    async fn encrypted_identity_key(
        &self,
        transport_key: &TransportPublicKey,
        context: &DerivationContext,
    ) -> Result<EncryptedKey, Error>;

    /// Stores a ciphertext and returns its assigned note id.
    async fn save_note(
        &self,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<NoteId, Error>;

    /// Lists the notes of `owner`, oldest first.
    async fn list_notes(&self, owner: Option<Principal>) -> Result<Vec<NoteRecord>, Error>;

    /// Replaces the ciphertext of an existing note.
    async fn edit_note(
        &self,
        id: NoteId,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<(), Error>;

    /// Registers `verification_key` as the one redemption key for note `id`,
    /// superseding any earlier registration.
    async fn register_capability(
        &self,
        id: NoteId,
        verification_key: TransportPublicKey,
    ) -> Result<(), Error>;

    /// The verification key registered for note `id`.
    async fn capability_key(&self, id: NoteId) -> Result<TransportPublicKey, Error>;

    /// Redeems the capability for note `id`, marking it spent.
    ///
    /// On success returns the note ciphertext together with its decryption
    /// key encrypted to `redeemer_key`.
    async fn redeem_capability(
        &self,
        id: NoteId,
        signature: &Signature,
        redeemer_key: &TransportPublicKey,
    ) -> Result<(Vec<u8>, EncryptedKey), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_bls12_381::G2Affine;

    #[test]
    fn test_parameters_serde() {
        let params = Parameters {
            format_version: 0x00,
            public_key: DerivedPublicKey(G2Affine::generator()),
        };

        let json = serde_json::to_string(&params).unwrap();

        assert!(json.contains("formatVersion"));
        assert!(json.contains("publicKey"));

        let decoded: Parameters<DerivedPublicKey> = serde_json::from_str(&json).unwrap();

        assert_eq!(params, decoded);
    }

    #[test]
    fn test_note_record_serde() {
        let record = NoteRecord {
            id: 7,
            created_at: 1_700_000_000,
            ciphertext: vec![1, 2, 3, 4],
        };

        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("createdAt"));

        let decoded: NoteRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, decoded);

        let bin = bincode::serialize(&record).unwrap();
        let decoded: NoteRecord = bincode::deserialize(&bin[..]).unwrap();

        assert_eq!(record, decoded);
    }
}

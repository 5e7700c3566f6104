//! One-time capabilities for sharing a note by link.
//!
//! A capability authorizes exactly one redemption of one note. Minting
//! draws a keypair that is used for nothing else, signs the note id and
//! registers the public half with the authority; the signature travels in
//! the share link. On the authority's side a capability moves
//! `Registered -> Redeemed` (or `Expired`) and never back, so a link is
//! dead once used.
//!
//! Redemption is not idempotent: retrying a redeemed link fails with
//! [`CapabilityError::AlreadyRedeemed`] instead of returning the note
//! again, so a redemption must never be retried blindly.
//!
//! [`CapabilityError::AlreadyRedeemed`]: crate::error::CapabilityError::AlreadyRedeemed

use crate::api::{KeyService, NoteId};
use crate::artifacts::Signature;
use crate::consts::NOTE_ID_SIZE;
use crate::error::Error;
use crate::ibe::IbeCiphertext;
use crate::identity::Principal;
use crate::transport::TransportKeypair;
use rand::{CryptoRng, RngCore};

/// The canonical byte encoding of a note id for signing, little endian.
pub fn note_id_message(id: NoteId) -> [u8; NOTE_ID_SIZE] {
    id.to_le_bytes()
}

/// A capability registered with the authority, ready to be shared.
#[derive(Debug, Clone)]
pub struct MintedCapability {
    note_id: NoteId,
    signature: Signature,
}

impl MintedCapability {
    /// The note this capability unlocks.
    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    /// The redemption signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The redemption signature in its canonical link form.
    pub fn signature_hex(&self) -> String {
        self.signature.to_hex()
    }

    /// Renders the shareable link under `base_url`.
    pub fn share_link(&self, base_url: &str) -> String {
        format!(
            "{}?id={}&signature={}",
            base_url,
            self.note_id,
            self.signature_hex()
        )
    }
}

/// Extracts `(note id, signature hex)` from a share link.
pub fn parse_link(link: &str) -> Result<(NoteId, String), Error> {
    let (_, query) = link
        .split_once('?')
        .ok_or_else(|| Error::FormatViolation(String::from("share link")))?;

    let mut id = None;
    let mut signature = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("id", v)) => id = Some(v),
            Some(("signature", v)) => signature = Some(v),
            _ => {}
        }
    }

    let id = id
        .and_then(|v| v.parse::<NoteId>().ok())
        .ok_or_else(|| Error::FormatViolation(String::from("share link")))?;
    let signature = signature
        .ok_or_else(|| Error::FormatViolation(String::from("share link")))?
        .to_string();

    Ok((id, signature))
}

/// Mints a one-time capability for note `id`.
///
/// The signing keypair is generated here and dropped on return; once the
/// registration is through, the link signature is the only artifact that
/// can redeem the note. Minting again for the same id supersedes the
/// earlier capability.
pub async fn mint<S, R>(service: &S, rng: &mut R, id: NoteId) -> Result<MintedCapability, Error>
where
    S: KeyService,
    R: RngCore + CryptoRng,
{
    let keypair = TransportKeypair::generate(rng);
    let signature = keypair.sign(&note_id_message(id));

    service.register_capability(id, keypair.public_key()).await?;

    Ok(MintedCapability {
        note_id: id,
        signature,
    })
}

/// Checks a redemption signature against the registered verification key
/// without spending the capability.
pub async fn verify_offline<S: KeyService>(
    service: &S,
    id: NoteId,
    signature: &Signature,
) -> Result<bool, Error> {
    let key = service.capability_key(id).await?;

    Ok(key.verify(&note_id_message(id), signature))
}

/// Redeems a capability and returns the note plaintext.
///
/// The signature is validated in stages so that a bad link cannot burn the
/// capability: a wrong-length signature fails with
/// [`Error::MalformedSignature`] before any remote call, and one that does
/// not verify against the registered key fails with
/// [`Error::SignatureInvalid`] without touching the redemption endpoint.
pub async fn redeem<S, R>(
    service: &S,
    rng: &mut R,
    id: NoteId,
    signature_hex: &str,
) -> Result<Vec<u8>, Error>
where
    S: KeyService,
    R: RngCore + CryptoRng,
{
    let signature = Signature::from_hex(signature_hex)?;

    if !verify_offline(service, id, &signature).await? {
        return Err(Error::SignatureInvalid);
    }

    let keypair = TransportKeypair::generate(rng);

    // Fetched before redeeming; a parameter failure must leave the
    // capability unspent.
    let params = service.identity_public_parameters().await?;

    let (ciphertext, encrypted_key) = service
        .redeem_capability(id, &signature, &keypair.public_key())
        .await?;

    let context = Principal::anonymous().derivation_context();
    let key = keypair.decrypt(&encrypted_key, &params.public_key, &context)?;

    IbeCiphertext::from_bytes(&ciphertext)?.decrypt(&key)
}

//! Test helpers.
//!
//! [`TestAuthority`] is an in-process key authority implementing
//! [`KeyService`] with the same observable contract as a remote one: it
//! derives keys under two master secrets, stores notes, and enforces the
//! at-most-once capability rule, with hooks to steer the clock, the caller
//! identity and simulated outages.

use crate::api::{KeyService, NoteId, NoteRecord, Parameters};
use crate::artifacts::{
    DecryptionKey, DerivedPublicKey, EncryptedKey, Signature, TransportPublicKey,
};
use crate::capability::note_id_message;
use crate::consts::{
    ENCRYPTED_KEY_SIZE, G1_SIZE, G2_SIZE, SEED_SIZE, SYMMETRIC_KEY_DOMAIN, SYMMETRIC_KEY_SIZE,
};
use crate::error::{CapabilityError, Error};
use crate::identity::{DerivationContext, Principal};
use crate::ro::RandomOracle;
use crate::transport::augmented_hash_to_g1;
use async_trait::async_trait;
use ic_bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lifetime of a registered capability.
pub const CAPABILITY_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// A test setup.
#[derive(Debug)]
pub struct TestSetup {
    /// The authority under test.
    pub authority: TestAuthority,

    /// An example authenticated caller.
    pub principal: Principal,

    /// An example session seed.
    pub seed: [u8; SEED_SIZE],
}

impl TestSetup {
    /// Create a new test setup.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let authority = TestAuthority::new(rng);
        let principal = Principal::from_bytes(b"alice").unwrap();

        let mut seed = [0u8; SEED_SIZE];
        rng.fill_bytes(&mut seed);

        Self {
            authority,
            principal,
            seed,
        }
    }
}

#[derive(Debug)]
struct StoredNote {
    ciphertext: Vec<u8>,
    owner: Option<Principal>,
    created_at: u64,
}

#[derive(Debug)]
struct StoredCapability {
    key: TransportPublicKey,
    expires_at: u64,
    redeemed: bool,
}

#[derive(Debug)]
struct AuthorityState {
    notes: BTreeMap<NoteId, StoredNote>,
    next_id: NoteId,
    capabilities: BTreeMap<NoteId, StoredCapability>,
    now: u64,
    caller: Option<Principal>,
    failing: bool,
    requests: u64,
    identity_key_requests: u64,
    redeem_requests: u64,
}

#[derive(Debug)]
struct Inner {
    symmetric_msk: Scalar,
    identity_msk: Scalar,
    state: Mutex<AuthorityState>,
}

/// An in-process key authority.
///
/// Clones share the same state, so a test can hold a handle for its hooks
/// while the session under test owns another.
#[derive(Debug, Clone)]
pub struct TestAuthority {
    inner: Arc<Inner>,
}

fn random_scalar<R: RngCore>(rng: &mut R) -> Scalar {
    let mut wide = [0u8; 64];
    rng.fill_bytes(&mut wide);

    Scalar::from_bytes_wide(&wide)
}

// Derives the key for `context` under `msk` and encrypts it to
// `transport_key` with fresh randomness.
fn encrypt_key(
    msk: &Scalar,
    public_key: &DerivedPublicKey,
    context: &DerivationContext,
    transport_key: &TransportPublicKey,
) -> EncryptedKey {
    let dk = augmented_hash_to_g1(&public_key.0, context.as_bytes()) * msk;

    let r = random_scalar(&mut rand::thread_rng());
    let c1 = G1Affine::from(G1Projective::generator() * r);
    let c2 = G2Affine::from(G2Projective::generator() * r);
    let c3 = G1Affine::from(transport_key.0 * r + dk);

    let mut buf = [0u8; ENCRYPTED_KEY_SIZE];
    buf[..G1_SIZE].copy_from_slice(&c1.to_compressed());
    buf[G1_SIZE..G1_SIZE + G2_SIZE].copy_from_slice(&c2.to_compressed());
    buf[G1_SIZE + G2_SIZE..].copy_from_slice(&c3.to_compressed());

    EncryptedKey(buf)
}

impl TestAuthority {
    /// Create an authority with fresh master secrets.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            inner: Arc::new(Inner {
                symmetric_msk: random_scalar(rng),
                identity_msk: random_scalar(rng),
                state: Mutex::new(AuthorityState {
                    notes: BTreeMap::new(),
                    next_id: 1,
                    capabilities: BTreeMap::new(),
                    now: 1_700_000_000,
                    caller: None,
                    failing: false,
                    requests: 0,
                    identity_key_requests: 0,
                    redeem_requests: 0,
                }),
            }),
        }
    }

    fn begin(&self) -> Result<MutexGuard<'_, AuthorityState>, Error> {
        let mut state = self.inner.state.lock().unwrap();
        state.requests += 1;

        if state.failing {
            return Err(Error::RemoteCall(String::from("authority offline")));
        }

        Ok(state)
    }

    /// The identity-encryption public key.
    pub fn identity_public_key(&self) -> DerivedPublicKey {
        DerivedPublicKey(G2Affine::from(
            G2Projective::generator() * self.inner.identity_msk,
        ))
    }

    /// The symmetric-scheme verification key.
    pub fn symmetric_public_key(&self) -> DerivedPublicKey {
        DerivedPublicKey(G2Affine::from(
            G2Projective::generator() * self.inner.symmetric_msk,
        ))
    }

    /// The symmetric key a successful login as `principal` must produce.
    pub fn expected_symmetric_key(&self, principal: &Principal) -> Vec<u8> {
        let context = principal.derivation_context();
        let dk = G1Affine::from(
            augmented_hash_to_g1(&self.symmetric_public_key().0, context.as_bytes())
                * self.inner.symmetric_msk,
        );

        let mut ro = RandomOracle::new(SYMMETRIC_KEY_DOMAIN);
        ro.update_bin(&dk.to_compressed());

        ro.finalize_to_vec(SYMMETRIC_KEY_SIZE)
    }

    /// Issues the decryption key for `context` directly, without transport
    /// encryption.
    pub fn issue_identity_key(&self, context: &DerivationContext) -> DecryptionKey {
        DecryptionKey(G1Affine::from(
            augmented_hash_to_g1(&self.identity_public_key().0, context.as_bytes())
                * self.inner.identity_msk,
        ))
    }

    /// Stores a note without going through the async interface.
    pub fn save_note_sync(&self, ciphertext: Vec<u8>, owner: Option<Principal>) -> NoteId {
        let mut state = self.inner.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;

        let created_at = state.now;
        state.notes.insert(
            id,
            StoredNote {
                ciphertext,
                owner,
                created_at,
            },
        );

        id
    }

    /// Sets the identity the authority sees as its caller.
    pub fn set_caller(&self, caller: Option<Principal>) {
        self.inner.state.lock().unwrap().caller = caller;
    }

    /// Makes every following request fail, or stops doing so.
    pub fn set_failing(&self, failing: bool) {
        self.inner.state.lock().unwrap().failing = failing;
    }

    /// Moves the authority clock.
    pub fn set_time(&self, now: u64) {
        self.inner.state.lock().unwrap().now = now;
    }

    /// The authority clock, seconds since the Unix epoch.
    pub fn time(&self) -> u64 {
        self.inner.state.lock().unwrap().now
    }

    /// Total requests received, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.inner.state.lock().unwrap().requests
    }

    /// Requests for encrypted identity keys.
    pub fn identity_key_request_count(&self) -> u64 {
        self.inner.state.lock().unwrap().identity_key_requests
    }

    /// Redemption attempts that reached the redemption endpoint.
    pub fn redeem_request_count(&self) -> u64 {
        self.inner.state.lock().unwrap().redeem_requests
    }

    fn caller_context(state: &AuthorityState) -> DerivationContext {
        state
            .caller
            .clone()
            .unwrap_or_else(Principal::anonymous)
            .derivation_context()
    }
}

#[async_trait]
impl KeyService for TestAuthority {
    async fn identity_public_parameters(&self) -> Result<Parameters<DerivedPublicKey>, Error> {
        self.begin()?;

        Ok(Parameters {
            format_version: 0x00,
            public_key: self.identity_public_key(),
        })
    }

    async fn symmetric_verification_key(
        &self,
        _principal: Option<&Principal>,
    ) -> Result<Parameters<DerivedPublicKey>, Error> {
        self.begin()?;

        Ok(Parameters {
            format_version: 0x00,
            public_key: self.symmetric_public_key(),
        })
    }

    async fn encrypted_symmetric_key(
        &self,
        transport_key: &TransportPublicKey,
    ) -> Result<EncryptedKey, Error> {
        let state = self.begin()?;
        let context = Self::caller_context(&state);

        Ok(encrypt_key(
            &self.inner.symmetric_msk,
            &self.symmetric_public_key(),
            &context,
            transport_key,
        ))
    }

    async fn encrypted_identity_key(
        &self,
        transport_key: &TransportPublicKey,
        context: &DerivationContext,
    ) -> Result<EncryptedKey, Error> {
        let mut state = self.begin()?;
        state.identity_key_requests += 1;

        Ok(encrypt_key(
            &self.inner.identity_msk,
            &self.identity_public_key(),
            context,
            transport_key,
        ))
    }

    async fn save_note(
        &self,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<NoteId, Error> {
        let mut state = self.begin()?;
        let id = state.next_id;
        state.next_id += 1;

        let created_at = state.now;
        state.notes.insert(
            id,
            StoredNote {
                ciphertext,
                owner,
                created_at,
            },
        );

        Ok(id)
    }

    async fn list_notes(&self, owner: Option<Principal>) -> Result<Vec<NoteRecord>, Error> {
        let state = self.begin()?;

        Ok(state
            .notes
            .iter()
            .filter(|(_, note)| note.owner == owner)
            .map(|(id, note)| NoteRecord {
                id: *id,
                created_at: note.created_at,
                ciphertext: note.ciphertext.clone(),
            })
            .collect())
    }

    async fn edit_note(
        &self,
        id: NoteId,
        ciphertext: Vec<u8>,
        owner: Option<Principal>,
    ) -> Result<(), Error> {
        let mut state = self.begin()?;
        let note = state
            .notes
            .get_mut(&id)
            .ok_or_else(|| Error::RemoteCall(String::from("no such note")))?;

        if note.owner != owner {
            return Err(Error::RemoteCall(String::from("not the note owner")));
        }

        note.ciphertext = ciphertext;

        Ok(())
    }

    async fn register_capability(
        &self,
        id: NoteId,
        verification_key: TransportPublicKey,
    ) -> Result<(), Error> {
        let mut state = self.begin()?;

        if !state.notes.contains_key(&id) {
            return Err(Error::Capability(CapabilityError::NotFound));
        }

        let expires_at = state.now + CAPABILITY_TTL_SECS;
        state.capabilities.insert(
            id,
            StoredCapability {
                key: verification_key,
                expires_at,
                redeemed: false,
            },
        );

        Ok(())
    }

    async fn capability_key(&self, id: NoteId) -> Result<TransportPublicKey, Error> {
        let mut state = self.begin()?;
        let now = state.now;
        let capability = state
            .capabilities
            .get(&id)
            .ok_or(Error::Capability(CapabilityError::NotFound))?;

        if now >= capability.expires_at {
            state.capabilities.remove(&id);
            return Err(Error::Capability(CapabilityError::Expired));
        }

        Ok(capability.key)
    }

    async fn redeem_capability(
        &self,
        id: NoteId,
        signature: &Signature,
        redeemer_key: &TransportPublicKey,
    ) -> Result<(Vec<u8>, EncryptedKey), Error> {
        let mut state = self.begin()?;
        state.redeem_requests += 1;

        let now = state.now;
        let capability = state
            .capabilities
            .get_mut(&id)
            .ok_or(Error::Capability(CapabilityError::NotFound))?;

        if now >= capability.expires_at {
            state.capabilities.remove(&id);
            return Err(Error::Capability(CapabilityError::Expired));
        }
        if capability.redeemed {
            return Err(Error::Capability(CapabilityError::AlreadyRedeemed));
        }
        if !capability.key.verify(&note_id_message(id), signature) {
            return Err(Error::Capability(CapabilityError::Other(String::from(
                "signature rejected",
            ))));
        }

        // Spent from here on, whatever happens to the delivery.
        capability.redeemed = true;

        let note = state
            .notes
            .get(&id)
            .ok_or(Error::Capability(CapabilityError::NotFound))?;

        let context = Principal::anonymous().derivation_context();
        let encrypted_key = encrypt_key(
            &self.inner.identity_msk,
            &self.identity_public_key(),
            &context,
            redeemer_key,
        );

        Ok((note.ciphertext.clone(), encrypted_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportKeypair;

    #[tokio::test]
    async fn test_authority_delivers_verifiable_keys() {
        let mut rng = rand::thread_rng();
        let setup = TestSetup::new(&mut rng);
        let keypair = TransportKeypair::generate(&mut rng);

        let context = setup.principal.derivation_context();
        let encrypted = setup
            .authority
            .encrypted_identity_key(&keypair.public_key(), &context)
            .await
            .unwrap();

        let key = keypair
            .decrypt(&encrypted, &setup.authority.identity_public_key(), &context)
            .unwrap();

        assert_eq!(key, setup.authority.issue_identity_key(&context));
    }

    #[tokio::test]
    async fn test_note_listing_is_per_owner() {
        let mut rng = rand::thread_rng();
        let setup = TestSetup::new(&mut rng);

        let alice = Some(setup.principal.clone());
        let id = setup
            .authority
            .save_note(vec![1, 2, 3], alice.clone())
            .await
            .unwrap();
        setup.authority.save_note(vec![4, 5], None).await.unwrap();

        let notes = setup.authority.list_notes(alice.clone()).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].ciphertext, vec![1, 2, 3]);

        let anonymous = setup.authority.list_notes(None).await.unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].ciphertext, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_edit_requires_matching_owner() {
        let mut rng = rand::thread_rng();
        let setup = TestSetup::new(&mut rng);

        let alice = Some(setup.principal.clone());
        let id = setup
            .authority
            .save_note(vec![1], alice.clone())
            .await
            .unwrap();

        assert!(setup.authority.edit_note(id, vec![2], None).await.is_err());
        setup
            .authority
            .edit_note(id, vec![2], alice.clone())
            .await
            .unwrap();

        let notes = setup.authority.list_notes(alice).await.unwrap();
        assert_eq!(notes[0].ciphertext, vec![2]);
    }

    #[tokio::test]
    async fn test_capability_requires_existing_note() {
        let mut rng = rand::thread_rng();
        let setup = TestSetup::new(&mut rng);
        let keypair = TransportKeypair::generate(&mut rng);

        assert!(matches!(
            setup
                .authority
                .register_capability(12, keypair.public_key())
                .await,
            Err(Error::Capability(CapabilityError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_redeemed_capability_stays_redeemed() {
        let mut rng = rand::thread_rng();
        let setup = TestSetup::new(&mut rng);
        let keypair = TransportKeypair::generate(&mut rng);
        let redeemer = TransportKeypair::generate(&mut rng);

        let id = setup.authority.save_note_sync(vec![9], None);
        setup
            .authority
            .register_capability(id, keypair.public_key())
            .await
            .unwrap();

        let signature = keypair.sign(&note_id_message(id));
        setup
            .authority
            .redeem_capability(id, &signature, &redeemer.public_key())
            .await
            .unwrap();

        // The entry stays around as redeemed, it is not deleted.
        assert!(matches!(
            setup
                .authority
                .redeem_capability(id, &signature, &redeemer.public_key())
                .await,
            Err(Error::Capability(CapabilityError::AlreadyRedeemed))
        ));
    }
}

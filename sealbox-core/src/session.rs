//! Session lifecycle and cached key material.
//!
//! A [`Session`] owns one transport keypair and the key material unwrapped
//! with it. It moves through three states:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready
//!       ^                             |
//!       '------- disable() -----------'
//! ```
//!
//! `Initializing` holds the keypair while the authority parameters are in
//! flight. A failed or abandoned fetch leaves the session there, and a
//! later [`Session::initialize`] picks the same keypair back up, so a
//! dropped future never corrupts the session. All cached state is written
//! after the last suspension point of each operation.
//!
//! The session requires `&mut self` for every state-changing operation,
//! which rules out interleaved initializations at compile time.

use crate::api::KeyService;
use crate::artifacts::{DecryptionKey, DerivedPublicKey, SymmetricKey, TransportPublicKey};
use crate::consts::{SEED_SIZE, SYMMETRIC_KEY_DOMAIN, SYMMETRIC_KEY_SIZE};
use crate::error::Error;
use crate::identity::{DerivationContext, Principal};
use crate::transport::TransportKeypair;
use core::mem;
use rand::{CryptoRng, RngCore};

/// Externally observable state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No keypair present.
    Uninitialized,
    /// Keypair present, authority parameters not yet cached.
    Initializing,
    /// Fully usable.
    Ready,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Initializing(TransportKeypair),
    Ready(Box<ReadyState>),
}

#[derive(Debug)]
struct ReadyState {
    keypair: TransportKeypair,
    ibe_params: DerivedPublicKey,
    verification_key: DerivedPublicKey,
    symmetric_key: Option<SymmetricKey>,
    identity_key: Option<(DerivationContext, DecryptionKey)>,
}

/// A client session against one key authority.
#[derive(Debug)]
pub struct Session<S> {
    service: S,
    state: State,
}

impl<S: KeyService> Session<S> {
    /// Creates an uninitialized session over `service`.
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: State::Uninitialized,
        }
    }

    /// The authority this session talks to.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        match self.state {
            State::Uninitialized => SessionStatus::Uninitialized,
            State::Initializing(_) => SessionStatus::Initializing,
            State::Ready(_) => SessionStatus::Ready,
        }
    }

    /// Creates the transport keypair and caches the authority parameters.
    ///
    /// With a `seed` the keypair is rederived deterministically, which
    /// resumes an earlier anonymous session; without one a fresh random
    /// keypair is made. Already `Ready` sessions return at once. A session
    /// left `Initializing` by an earlier failure retries the parameter
    /// fetch with the keypair it already has, ignoring `seed`.
    pub async fn initialize<R: RngCore + CryptoRng>(
        &mut self,
        seed: Option<&[u8]>,
        rng: &mut R,
    ) -> Result<(), Error> {
        match &self.state {
            State::Ready(_) => return Ok(()),
            State::Initializing(_) => {}
            State::Uninitialized => {
                let keypair = match seed {
                    Some(seed) => TransportKeypair::from_seed(seed)?,
                    None => TransportKeypair::generate(rng),
                };
                self.state = State::Initializing(keypair);
            }
        }

        let ibe_params = self.service.identity_public_parameters().await?;
        let verification_key = self.service.symmetric_verification_key(None).await?;

        match mem::replace(&mut self.state, State::Uninitialized) {
            State::Initializing(keypair) => {
                self.state = State::Ready(Box::new(ReadyState {
                    keypair,
                    ibe_params: ibe_params.public_key,
                    verification_key: verification_key.public_key,
                    symmetric_key: None,
                    identity_key: None,
                }));

                Ok(())
            }
            state => {
                self.state = state;

                Err(Error::NotInitialized)
            }
        }
    }

    /// Initializes and immediately logs in as `principal`.
    pub async fn initialize_and_login<R: RngCore + CryptoRng>(
        &mut self,
        seed: Option<&[u8]>,
        principal: &Principal,
        rng: &mut R,
    ) -> Result<(), Error> {
        self.initialize(seed, rng).await?;
        self.login(principal).await
    }

    /// Fetches and unwraps the symmetric key of `principal`.
    ///
    /// The unwrap is verified against the cached verification key and the
    /// principal's derivation context; the authority must agree on the
    /// caller identity or [`Error::UnwrapVerificationFailed`] results.
    /// Requires a `Ready` session. Logging in again replaces the cached
    /// key.
    pub async fn login(&mut self, principal: &Principal) -> Result<(), Error> {
        let transport_key = match &self.state {
            State::Ready(ready) => ready.keypair.public_key(),
            _ => return Err(Error::NotInitialized),
        };

        let encrypted = self.service.encrypted_symmetric_key(&transport_key).await?;

        let ready = match &mut self.state {
            State::Ready(ready) => ready,
            _ => return Err(Error::NotInitialized),
        };

        let context = principal.derivation_context();
        let raw = ready.keypair.decrypt_and_hash(
            &encrypted,
            &ready.verification_key,
            &context,
            SYMMETRIC_KEY_DOMAIN,
            SYMMETRIC_KEY_SIZE,
        )?;

        ready.symmetric_key = Some(SymmetricKey::from_slice(&raw)?);

        Ok(())
    }

    /// Fetches and unwraps the identity decryption key for `context`.
    ///
    /// The key of the most recent context is cached, so repeated decrypts
    /// under one identity cost a single remote call.
    pub async fn identity_decryption_key(
        &mut self,
        context: &DerivationContext,
    ) -> Result<DecryptionKey, Error> {
        let transport_key = match &self.state {
            State::Ready(ready) => {
                if let Some((cached, key)) = &ready.identity_key {
                    if cached == context {
                        return Ok(*key);
                    }
                }

                ready.keypair.public_key()
            }
            _ => return Err(Error::NotInitialized),
        };

        let encrypted = self
            .service
            .encrypted_identity_key(&transport_key, context)
            .await?;

        let ready = match &mut self.state {
            State::Ready(ready) => ready,
            _ => return Err(Error::NotInitialized),
        };

        let key = ready.keypair.decrypt(&encrypted, &ready.ibe_params, context)?;
        ready.identity_key = Some((*context, key));

        Ok(key)
    }

    /// The transport public key, available once a keypair exists.
    pub fn public_key(&self) -> Result<TransportPublicKey, Error> {
        match &self.state {
            State::Initializing(keypair) => Ok(keypair.public_key()),
            State::Ready(ready) => Ok(ready.keypair.public_key()),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    /// The seed of the session keypair, for persisting anonymous sessions.
    pub fn seed(&self) -> Result<&[u8; SEED_SIZE], Error> {
        match &self.state {
            State::Initializing(keypair) => Ok(keypair.seed()),
            State::Ready(ready) => Ok(ready.keypair.seed()),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    /// The session keypair, for signing.
    pub fn keypair(&self) -> Result<&TransportKeypair, Error> {
        match &self.state {
            State::Initializing(keypair) => Ok(keypair),
            State::Ready(ready) => Ok(&ready.keypair),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    /// The cached symmetric key, present after a successful [`login`].
    ///
    /// [`login`]: Session::login
    pub fn symmetric_key(&self) -> Result<&SymmetricKey, Error> {
        match &self.state {
            State::Ready(ready) => ready.symmetric_key.as_ref().ok_or(Error::NotInitialized),
            _ => Err(Error::NotInitialized),
        }
    }

    /// The cached identity-encryption parameters.
    pub fn ibe_public_parameters(&self) -> Result<&DerivedPublicKey, Error> {
        match &self.state {
            State::Ready(ready) => Ok(&ready.ibe_params),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Discards the keypair and every unwrapped key.
    ///
    /// The next [`initialize`] starts over with a new transport keypair.
    ///
    /// [`initialize`]: Session::initialize
    pub fn disable(&mut self) {
        self.state = State::Uninitialized;
    }
}

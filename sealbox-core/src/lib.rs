//! # Sealbox core library
#![deny(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links
)]
//! Sealbox is a client protocol for storing and sharing encrypted notes
//! through a key authority that derives keys on demand. The authority never
//! sees a usable key: everything it hands out is encrypted to an ephemeral
//! transport keypair held by the client, which unwraps and verifies the
//! delivery locally.
//!
//! The protocol has three layers:
//!
//! * Transport: a [session][`session::Session`] derives a transport keypair
//!   from a 32-byte seed, sends the public half to the authority, and
//!   unwraps the encrypted keys it gets back. Every unwrap is verified
//!   against the authority's derived public key and the caller's
//!   [derivation context][`identity::DerivationContext`] before any key is
//!   released.
//!
//! * Codecs: notes of an authenticated caller are sealed with
//!   [AES-256-GCM][`aead`] under the unwrapped symmetric key; notes meant
//!   for sharing are encrypted to an identity byte string with
//!   [identity-bound encryption][`ibe::IbeCiphertext`], so the recipient
//!   needs no key of their own until redemption time.
//!
//! * Capabilities: a note can be [shared][`capability`] through a one-time
//!   link carrying a signature over the note id. The authority releases the
//!   decryption material for the anonymous identity exactly once per
//!   registered capability.
//!
//! ## Examples
//!
//! ### Initialize a session and seal a note
//!
//! ```
//! use sealbox_core::aead;
//! use sealbox_core::identity::Principal;
//! use sealbox_core::session::Session;
//! # use sealbox_core::error::Error;
//! # use sealbox_core::test::TestAuthority;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let mut rng = rand::thread_rng();
//! # let authority = TestAuthority::new(&mut rng);
//! let alice = Principal::from_bytes(b"alice")?;
//! # authority.set_caller(Some(alice.clone()));
//!
//! // Connect to the authority and unwrap the symmetric key of `alice`.
//! let mut session = Session::new(authority);
//! session.initialize_and_login(None, &alice, &mut rng).await?;
//!
//! let sealed = aead::encrypt(session.symmetric_key()?, b"my note", &mut rng)?;
//! let opened = aead::decrypt(session.symmetric_key()?, &sealed)?;
//!
//! assert_eq!(&opened, b"my note");
//! # Ok(())
//! # }
//! ```
//!
//! ### Share a note through a one-time link
//!
//! ```
//! use sealbox_core::api::KeyService;
//! use sealbox_core::capability;
//! use sealbox_core::ibe::IbeCiphertext;
//! use sealbox_core::identity::Principal;
//! use sealbox_core::session::Session;
//! use rand::RngCore;
//! # use sealbox_core::error::Error;
//! # use sealbox_core::test::TestAuthority;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let mut rng = rand::thread_rng();
//! # let authority = TestAuthority::new(&mut rng);
//! let mut session = Session::new(authority.clone());
//! session.initialize(None, &mut rng).await?;
//!
//! // Seal the note to the anonymous identity and store it.
//! let context = Principal::anonymous().derivation_context();
//! let mut seed = [0u8; 32];
//! rng.fill_bytes(&mut seed);
//! let ciphertext = IbeCiphertext::encrypt(
//!     session.ibe_public_parameters()?,
//!     context.as_ref(),
//!     b"hello",
//!     &seed,
//! )?;
//! let id = session.service().save_note(ciphertext.to_bytes(), None).await?;
//!
//! // Mint a one-time link; anybody holding it can redeem the note once.
//! let minted = capability::mint(session.service(), &mut rng, id).await?;
//! let link = minted.share_link("https://notes.example/share");
//!
//! let (id, signature) = capability::parse_link(&link)?;
//! let plaintext = capability::redeem(&authority, &mut rng, id, &signature).await?;
//!
//! assert_eq!(&plaintext, b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! ### Wire format
//!
//! The artifacts crossing the wire consist of the following segments,
//! followed by their length in bytes:
//!
//! ```text
//!                  ENCRYPTED KEY (192)
//! = C1 (G1, 48) || C2 (G2, 96) || C3 (G1, 48)
//!
//!                  IDENTITY CIPHERTEXT (*)
//! = C1 (G2, 96) || MASKED SEED (32) || MASKED MESSAGE (*)
//!
//!                  SEALED NOTE (*)
//! = NONCE (12) || CIPHERTEXT (*) || TAG (16)
//! ```

pub mod aead;
pub mod api;
pub mod artifacts;
pub mod capability;
pub mod consts;
pub mod error;
pub mod ibe;
pub mod identity;
pub mod otp;
pub mod session;
pub mod transport;

#[doc(hidden)]
pub use consts::*;

#[doc(hidden)]
pub mod test;

mod ro;
mod util;

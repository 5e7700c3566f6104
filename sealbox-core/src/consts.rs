//! Constants used in the Sealbox protocol.

/// The size of a compressed G1 element.
///
/// Transport public keys and unwrapped decryption keys live in G1.
pub const G1_SIZE: usize = 48;

/// The size of a compressed G2 element.
///
/// Derived public keys and signatures live in G2.
pub const G2_SIZE: usize = 96;

/// The size of an encrypted key delivery from the authority.
///
/// Three concatenated compressed points: `c1 (G1) || c2 (G2) || c3 (G1)`.
pub const ENCRYPTED_KEY_SIZE: usize = 2 * G1_SIZE + G2_SIZE;

/// The size of a transport key seed and of an IBE encryption seed.
pub const SEED_SIZE: usize = 32;

/// The size of the symmetric key derived by the hash-to-symmetric unwrap.
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// The size of the nonce prepended to every symmetric ciphertext.
pub const IV_SIZE: usize = 12;

/// The size of the authentication tag appended by the AEAD.
pub const TAG_SIZE: usize = 16;

/// The size of a raw signature.
pub const SIGNATURE_SIZE: usize = G2_SIZE;

/// The length of a hex-encoded signature, the form carried in share links.
pub const SIGNATURE_HEX_SIZE: usize = 2 * SIGNATURE_SIZE;

/// The size of the canonical note identifier encoding (little-endian u64).
pub const NOTE_ID_SIZE: usize = 8;

/// The size of a derivation context.
///
/// Layout: one length byte, the principal's raw bytes, zero padding.
pub const CONTEXT_SIZE: usize = 32;

/// The longest principal that fits a derivation context.
pub const MAX_PRINCIPAL_SIZE: usize = CONTEXT_SIZE - 1;

/// The single tag byte of the anonymous principal.
pub const ANONYMOUS_PRINCIPAL_TAG: u8 = 0x04;

/// The key-derivation label for the AEAD codec.
///
/// The symmetric unwrap must always be called with this label and
/// [`SYMMETRIC_KEY_SIZE`] to produce keys interoperable with
/// [`crate::aead`].
pub const SYMMETRIC_KEY_DOMAIN: &str = "aes-256-gcm";

/// Refresh interval of the signed authenticator codes, in seconds.
pub const CODE_REFRESH_SECS: u64 = 30;

/// Domain tag for the augmented hash to G1 (derived keys).
pub const G1_HASH_DOMAIN: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_AUG_";

/// Domain tag for the augmented hash to G2 (signatures).
pub const G2_HASH_DOMAIN: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_AUG_";

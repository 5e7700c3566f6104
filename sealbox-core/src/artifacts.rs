//! Artifacts of the Sealbox protocol.
//!
//! This module implements constant-time serde serialization and
//! deserialization for the fixed-size byte strings that cross the wire
//! between client and authority.
//!
//! # Notes
//!
//! Public keys are validated curve points once deserialized. Encrypted keys
//! and signatures deliberately stay opaque byte strings: they are decoded at
//! the point of use so that a tampered blob cannot be told apart from an
//! invalid one through the error surface.

use crate::consts::*;
use crate::error::Error;
use crate::util::open_ct;
use base64ct::{Base64, Encoding};
use core::fmt;
use ic_bls12_381::{G1Affine, G2Affine};
use serde::de::{Error as SerdeError, SeqAccess, Visitor};
use serde::{ser::SerializeTuple, Deserialize, Deserializer, Serialize, Serializer};

// Computes the byte length of raw bytes encoded in (padded) b64.
// We use this to preallocate a buffer to encode into.
const fn b64len(raw_len: usize) -> usize {
    (((raw_len - 1) / 3) + 1) * 4
}

pub(crate) fn serialize_bin_or_b64<S, T>(val: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    if serializer.is_human_readable() {
        let mut enc_buf = vec![0u8; b64len(val.as_ref().len())];
        let encoded = Base64::encode(val.as_ref(), &mut enc_buf)
            .map_err(|e| serde::ser::Error::custom(format!("base64ct serialization error: {e}")))?;
        serializer.serialize_str(encoded)
    } else {
        let mut seq = serializer.serialize_tuple(val.as_ref().len())?;
        for b in val.as_ref() {
            seq.serialize_element(b)?;
        }
        seq.end()
    }
}

pub(crate) fn deserialize_bin_or_b64<'de, D: Deserializer<'de>>(
    buf: &mut [u8],
    deserializer: D,
) -> Result<(), D::Error> {
    if deserializer.is_human_readable() {
        struct StrVisitor<'b>(&'b mut [u8]);

        impl<'de> Visitor<'de> for StrVisitor<'_> {
            type Value = ();

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "a string of length {}", b64len(self.0.len()))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: SerdeError,
            {
                if v.len() != b64len(self.0.len()) {
                    return Err(SerdeError::invalid_length(v.len(), &self));
                }

                Base64::decode(v, self.0)
                    .map_err(|e| SerdeError::custom(format!("base64ct decoding error: {e}")))?;

                Ok(())
            }
        }

        deserializer.deserialize_str(StrVisitor(buf))
    } else {
        struct ArrayVisitor<'b>(&'b mut [u8]);

        impl<'de> Visitor<'de> for ArrayVisitor<'_> {
            type Value = ();

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "an array of length {}", self.0.len())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                for (index, byte) in self.0.iter_mut().enumerate() {
                    *byte = match seq.next_element()? {
                        Some(byte) => byte,
                        None => return Err(SerdeError::invalid_length(index, &self)),
                    };
                }

                Ok(())
            }
        }

        deserializer.deserialize_tuple(buf.len(), ArrayVisitor(buf))
    }
}

/// Serializes variable-length bytes, as base64 in human-readable formats.
///
/// Counterpart of the fixed-size artifact encodings above, usable with
/// `#[serde(serialize_with)]` on ciphertext and principal fields.
pub fn serialize_vec_or_b64<S>(val: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&Base64::encode_string(val))
    } else {
        serializer.serialize_bytes(val)
    }
}

/// Deserializes variable-length bytes, from base64 in human-readable
/// formats.
pub fn deserialize_vec_or_b64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<u8>, D::Error> {
    if deserializer.is_human_readable() {
        struct VecStrVisitor;

        impl Visitor<'_> for VecStrVisitor {
            type Value = Vec<u8>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "a base64 string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: SerdeError,
            {
                Base64::decode_vec(v)
                    .map_err(|e| SerdeError::custom(format!("base64ct decoding error: {e}")))
            }
        }

        deserializer.deserialize_str(VecStrVisitor)
    } else {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = Vec<u8>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "a byte buffer")
            }

            fn visit_bytes<E: SerdeError>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(v.to_vec())
            }

            fn visit_byte_buf<E: SerdeError>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(v)
            }
        }

        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}

/// A transport public key, the G1 half of a [`TransportKeypair`].
///
/// Sent to the authority on every request that needs key delivery, and
/// registered as the verification key of a one-time capability.
///
/// [`TransportKeypair`]: crate::transport::TransportKeypair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPublicKey(pub G1Affine);

/// A derived public key of the authority, in G2.
///
/// Doubles as the public parameters of the identity-bound encryption scheme
/// and as the verification material for encrypted-key unwrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedPublicKey(pub G2Affine);

/// An encrypted key delivery: `c1 (G1) || c2 (G2) || c3 (G1)`.
///
/// Opaque until unwrapped by [`TransportKeypair::decrypt`]; the points are
/// decoded there so that malformed and tampered blobs fail identically.
///
/// [`TransportKeypair::decrypt`]: crate::transport::TransportKeypair::decrypt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedKey(pub [u8; ENCRYPTED_KEY_SIZE]);

/// A transport-key signature over a short message, compressed G2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_SIZE]);

/// An unwrapped identity decryption key, consumable by the IBE codec.
///
/// Local key material only; it never crosses the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionKey(pub(crate) G1Affine);

/// An unwrapped raw symmetric key for the AEAD codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricKey(pub [u8; SYMMETRIC_KEY_SIZE]);

impl TransportPublicKey {
    /// Serializes to the 48-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; G1_SIZE] {
        self.0.to_compressed()
    }

    /// Deserializes from the compressed encoding, validating the point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let buf: &[u8; G1_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::FormatViolation(String::from("transport public key")))?;
        open_ct(G1Affine::from_compressed(buf))
            .map(Self)
            .ok_or_else(|| Error::FormatViolation(String::from("transport public key")))
    }
}

impl DerivedPublicKey {
    /// Serializes to the 96-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; G2_SIZE] {
        self.0.to_compressed()
    }

    /// Deserializes from the compressed encoding, validating the point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let buf: &[u8; G2_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::FormatViolation(String::from("derived public key")))?;
        open_ct(G2Affine::from_compressed(buf))
            .map(Self)
            .ok_or_else(|| Error::FormatViolation(String::from("derived public key")))
    }
}

impl EncryptedKey {
    /// Wraps a 192-byte delivery without decoding it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let buf: [u8; ENCRYPTED_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::FormatViolation(String::from("encrypted key")))?;
        Ok(Self(buf))
    }
}

impl Signature {
    /// Wraps a 96-byte raw signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let buf: [u8; SIGNATURE_SIZE] =
            bytes.try_into().map_err(|_| Error::MalformedSignature)?;
        Ok(Self(buf))
    }

    /// Decodes the canonical link form: exactly 192 hex characters.
    ///
    /// The length is checked before decoding, so oversized and truncated
    /// inputs fail with [`Error::MalformedSignature`] without further work.
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        if hex_str.len() != SIGNATURE_HEX_SIZE {
            return Err(Error::MalformedSignature);
        }

        let raw = hex::decode(hex_str)?;
        Self::from_bytes(&raw)
    }

    /// Encodes to the canonical link form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl SymmetricKey {
    /// Copies a 32-byte slice into a key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let buf: [u8; SYMMETRIC_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::FormatViolation(String::from("symmetric key")))?;
        Ok(Self(buf))
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl DecryptionKey {
    /// Serializes to the 48-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; G1_SIZE] {
        self.0.to_compressed()
    }
}

/// Implements [`serde::ser::Serialize`] and [`serde::de::Deserialize`] for
/// point-backed artifacts, validating the point on the way in.
macro_rules! impl_serialize_point {
    ($type: ty, $affine: ty, $size: expr) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_bin_or_b64(&self.0.to_compressed(), serializer)
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let mut buf = [0u8; $size];
                deserialize_bin_or_b64(&mut buf, deserializer)?;

                let artifact = open_ct(<$affine>::from_compressed(&buf)).ok_or(
                    serde::de::Error::custom(format!("not a valid {}", stringify!($type))),
                )?;

                Ok(Self(artifact))
            }
        }
    };
}

/// Implements [`serde::ser::Serialize`] and [`serde::de::Deserialize`] for
/// opaque fixed-size artifacts.
macro_rules! impl_serialize_bytes {
    ($type: ty, $size: expr) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_bin_or_b64(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let mut buf = [0u8; $size];
                deserialize_bin_or_b64(&mut buf, deserializer)?;

                Ok(Self(buf))
            }
        }
    };
}

impl_serialize_point!(TransportPublicKey, G1Affine, G1_SIZE);
impl_serialize_point!(DerivedPublicKey, G2Affine, G2_SIZE);
impl_serialize_bytes!(EncryptedKey, ENCRYPTED_KEY_SIZE);
impl_serialize_bytes!(Signature, SIGNATURE_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportKeypair;

    fn example_keys() -> (TransportPublicKey, DerivedPublicKey) {
        let keypair = TransportKeypair::from_seed(&[7u8; SEED_SIZE]).unwrap();
        (keypair.public_key(), DerivedPublicKey(G2Affine::generator()))
    }

    #[test]
    fn test_serialize_transport_key_json() {
        let (tpk, _) = example_keys();

        let encoded = serde_json::to_string(&tpk).unwrap();
        let decoded: TransportPublicKey = serde_json::from_str(&encoded).unwrap();

        assert_eq!(tpk, decoded);
    }

    #[test]
    fn test_serialize_transport_key_bin() {
        let (tpk, _) = example_keys();

        let encoded = bincode::serialize(&tpk).unwrap();
        let decoded: TransportPublicKey = bincode::deserialize(&encoded[..]).unwrap();

        assert_eq!(tpk, decoded);
    }

    #[test]
    fn test_serialize_derived_key_json() {
        let (_, dpk) = example_keys();

        let encoded = serde_json::to_string(&dpk).unwrap();
        let decoded: DerivedPublicKey = serde_json::from_str(&encoded).unwrap();

        assert_eq!(dpk, decoded);
    }

    #[test]
    fn test_serialize_derived_key_bin() {
        let (_, dpk) = example_keys();

        let encoded = bincode::serialize(&dpk).unwrap();
        let decoded: DerivedPublicKey = bincode::deserialize(&encoded[..]).unwrap();

        assert_eq!(dpk, decoded);
    }

    #[test]
    fn test_deserialize_invalid_point_fails() {
        // 0xFF in every byte sets impossible flag bits for a compressed G1.
        let bogus = format!("\"{}\"", Base64::encode_string(&[0xFFu8; G1_SIZE]));
        let res: Result<TransportPublicKey, _> = serde_json::from_str(&bogus);

        assert!(res.is_err());
    }

    #[test]
    fn test_serialize_encrypted_key_roundtrip() {
        let ek = EncryptedKey([0xAB; ENCRYPTED_KEY_SIZE]);

        let json = serde_json::to_string(&ek).unwrap();
        let from_json: EncryptedKey = serde_json::from_str(&json).unwrap();
        let bin = bincode::serialize(&ek).unwrap();
        let from_bin: EncryptedKey = bincode::deserialize(&bin[..]).unwrap();

        assert_eq!(ek, from_json);
        assert_eq!(ek, from_bin);
    }

    #[test]
    fn test_encrypted_key_wrong_length() {
        assert!(matches!(
            EncryptedKey::from_bytes(&[0u8; ENCRYPTED_KEY_SIZE - 1]),
            Err(Error::FormatViolation(_))
        ));
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Signature([0x5A; SIGNATURE_SIZE]);
        let hex_str = sig.to_hex();

        assert_eq!(hex_str.len(), SIGNATURE_HEX_SIZE);
        assert_eq!(Signature::from_hex(&hex_str).unwrap(), sig);
    }

    #[test]
    fn test_signature_wrong_length_rejected() {
        // 95 and 97 byte signatures, in hex.
        let short = "ab".repeat(SIGNATURE_SIZE - 1);
        let long = "ab".repeat(SIGNATURE_SIZE + 1);

        assert!(matches!(
            Signature::from_hex(&short),
            Err(Error::MalformedSignature)
        ));
        assert!(matches!(
            Signature::from_hex(&long),
            Err(Error::MalformedSignature)
        ));
    }

    #[test]
    fn test_signature_non_hex_rejected() {
        let bad = "zz".repeat(SIGNATURE_SIZE);

        assert!(matches!(
            Signature::from_hex(&bad),
            Err(Error::MalformedSignature)
        ));
    }
}

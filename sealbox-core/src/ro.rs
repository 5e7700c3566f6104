//! Domain-separated random oracle over SHAKE-256.
//!
//! Every input is framed with its length so that update boundaries are
//! unambiguous: `update_bin(a); update_bin(b)` never collides with
//! `update_bin(ab)`.

use ic_bls12_381::Scalar;
use tiny_keccak::{Hasher, Shake, Xof};

pub(crate) struct RandomOracle {
    shake: Shake,
}

impl RandomOracle {
    pub(crate) fn new(domain_sep: &str) -> Self {
        let mut ro = Self {
            shake: Shake::v256(),
        };
        ro.update_bin(domain_sep.as_bytes());
        ro
    }

    pub(crate) fn update_bin(&mut self, input: &[u8]) {
        self.shake.update(&(input.len() as u64).to_be_bytes());
        self.shake.update(input);
    }

    pub(crate) fn finalize_to_array<const N: usize>(mut self) -> [u8; N] {
        let mut output = [0u8; N];
        self.shake.squeeze(&mut output);
        output
    }

    pub(crate) fn finalize_to_vec(mut self, len: usize) -> Vec<u8> {
        let mut output = vec![0u8; len];
        self.shake.squeeze(&mut output);
        output
    }

    /// Finalizes to a uniform scalar via wide reduction of 64 squeezed bytes.
    pub(crate) fn finalize_to_scalar(self) -> Scalar {
        let wide: [u8; 64] = self.finalize_to_array();
        Scalar::from_bytes_wide(&wide)
    }
}

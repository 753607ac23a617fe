//! Commitment and Secret for the commit-reveal scheme.
//!
//! Byte layout of the hashed input (64 bytes, fixed):
//!
//! ```text
//! [0..32)   move code as a big-endian uint256 (1..=5)
//! [32..64)  secret
//! ```
//!
//! `commitment = keccak256(layout)`. This is the `abi.encodePacked(uint256, bytes32)`
//! encoding, so a commitment computed here verifies against any other
//! implementation hashing the same layout.

use crate::games::Move;
use crate::protocol::GameError;
use alloy_primitives::{keccak256, B256};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the hashed commitment input.
pub const COMMITMENT_INPUT_LEN: usize = 64;

/// 256-bit secret that blinds a committed move.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(B256);

impl Secret {
    /// Create a new random secret
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(B256::from(bytes))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::from(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({}..)", hex::encode(&self.as_bytes()[..4]))
    }
}

/// Commitment = keccak256(move_be32 || secret)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(B256);

impl Commitment {
    /// Commit to a move under the given secret
    pub fn new(mv: Move, secret: &Secret) -> Self {
        Self(keccak256(encode(mv, secret)))
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::from(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// The all-zero digest never comes out of keccak256 in practice and is
    /// reserved as "no commitment".
    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }

    /// Verify that the given move and secret produce this commitment
    pub fn verify(&self, mv: Move, secret: &Secret) -> bool {
        let candidate = Self::new(mv, secret);
        constant_time_eq(self.as_bytes(), candidate.as_bytes())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.as_bytes()[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

/// Commit to a raw move code.
///
/// The code is validated before hashing so that no commitment ever exists for
/// a move outside 1..=5.
pub fn commit(move_code: u8, secret: &Secret) -> Result<Commitment, GameError> {
    let mv = Move::try_from(move_code)?;
    Ok(Commitment::new(mv, secret))
}

/// Recompute and compare. An out-of-range move code never verifies.
pub fn verify(move_code: u8, secret: &Secret, commitment: &Commitment) -> bool {
    match Move::try_from(move_code) {
        Ok(mv) => commitment.verify(mv, secret),
        Err(_) => false,
    }
}

fn encode(mv: Move, secret: &Secret) -> [u8; COMMITMENT_INPUT_LEN] {
    let mut input = [0u8; COMMITMENT_INPUT_LEN];
    input[31] = mv.code();
    input[32..].copy_from_slice(secret.as_bytes());
    input
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

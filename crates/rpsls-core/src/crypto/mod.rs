//! Cryptographic primitives for the commit-reveal scheme.
//!
//! This module provides:
//! - Secret, the 256-bit blinding value chosen by the first mover
//! - Commitment, the keccak256 digest binding a move to a secret

mod commitment;

pub use commitment::{commit, verify, Commitment, Secret};

//! Game definitions and logic.

mod rpsls;

pub use rpsls::{resolve, Move, RpslsGame};

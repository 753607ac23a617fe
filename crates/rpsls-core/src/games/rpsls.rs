//! Rock-Paper-Scissors-Spock-Lizard rules.

use crate::protocol::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A move, encoded on the wire as 1..=5. Code 0 is reserved for "no move".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Rock = 1,
    Paper = 2,
    Scissors = 3,
    Spock = 4,
    Lizard = 5,
}

impl Move {
    pub const ALL: [Move; 5] = [
        Move::Rock,
        Move::Paper,
        Move::Scissors,
        Move::Spock,
        Move::Lizard,
    ];

    /// Wire code of this move
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// The two moves this one defeats
    pub fn beaten_set(&self) -> [Move; 2] {
        match self {
            Move::Rock => [Move::Scissors, Move::Lizard],
            Move::Paper => [Move::Rock, Move::Spock],
            Move::Scissors => [Move::Paper, Move::Lizard],
            Move::Spock => [Move::Rock, Move::Scissors],
            Move::Lizard => [Move::Paper, Move::Spock],
        }
    }

    /// Check if this move beats the other
    pub fn beats(&self, other: &Move) -> bool {
        self.beaten_set().contains(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
            Move::Spock => "Spock",
            Move::Lizard => "Lizard",
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            4 => Ok(Move::Spock),
            5 => Ok(Move::Lizard),
            other => Err(GameError::InvalidMove(other)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rock-Paper-Scissors-Spock-Lizard judge
pub struct RpslsGame;

impl RpslsGame {
    /// Determine the outcome for side A against side B
    pub fn judge(a: Move, b: Move) -> GameResult {
        if a == b {
            GameResult::Draw
        } else if a.beats(&b) {
            GameResult::AWins
        } else {
            GameResult::BWins
        }
    }
}

/// Resolve two raw move codes. Codes outside 1..=5 are rejected before lookup.
pub fn resolve(move_a: u8, move_b: u8) -> Result<GameResult, GameError> {
    let a = Move::try_from(move_a)?;
    let b = Move::try_from(move_b)?;
    Ok(RpslsGame::judge(a, b))
}

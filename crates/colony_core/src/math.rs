//! World-space math utilities.
//!
//! The simulation tolerates coarse wall-clock timing and uses plain floats
//! for positions and rates; there is no lockstep or replay requirement.

use serde::{Deserialize, Serialize};

/// Half-extent of the playable field. Positions fall inside
/// `[-FIELD_HALF_EXTENT, FIELD_HALF_EXTENT]` on both axes.
pub const FIELD_HALF_EXTENT: f32 = 90.0;

/// A position on the colony field (ground plane).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

/// Simple deterministic RNG for field placement.
///
/// Collaborators own the visual scatter; the core only needs repeatable
/// positions for tests and headless runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRng {
    state: u64,
}

impl FieldRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// Next float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0
    }

    /// Random position on the playable field.
    pub fn next_position(&mut self) -> Position {
        let x = self.next_f32() * 2.0 * FIELD_HALF_EXTENT - FIELD_HALF_EXTENT;
        let z = self.next_f32() * 2.0 * FIELD_HALF_EXTENT - FIELD_HALF_EXTENT;
        Position::new(x, z)
    }
}

//! Subsongs: timing, orders, grooves and patterns

use super::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// One subsong of a module
///
/// The driver plays exactly one; extra subsongs in a module are reported and
/// discarded during encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub timing: Timing,

    /// Explicit per-row speed pattern; empty means the timing speeds apply
    #[serde(default)]
    pub speed_pattern: Vec<u8>,

    #[serde(default)]
    pub grooves: Vec<Groove>,

    /// One order list per channel; entries are pattern indices and may repeat
    pub orders: Vec<Vec<u8>>,

    pub pattern_length: u16,

    pub patterns: Vec<Pattern>,
}

/// Timing parameters of a [`Song`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Engine ticks per second
    pub tick_rate: f64,

    pub time_base: u8,

    /// The default speed cycle (ticks per row)
    pub speeds: Vec<u8>,

    /// Numerator/denominator pair scaling the effective tempo
    pub virtual_tempo: (u16, u16),
}

/// A cyclic sequence of per-row speed values overriding the default speed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groove {
    pub steps: Vec<u8>,
}

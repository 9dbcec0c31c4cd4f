//! The source object model: a fully-parsed tracker module
//!
//! Everything in this module is a read-only view as far as the encoder is
//! concerned. The model is usually materialized from JSON (see the tools
//! crate), or built up directly by whatever did the tracker-file parsing.

pub mod instrument;
pub mod pattern;
pub mod song;
pub mod wavetable;

use instrument::Instrument;
use serde::{Deserialize, Serialize};
use song::Song;
use wavetable::Wavetable;

/// A fully-parsed tracker module: chips, instruments, wavetables and subsongs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub chips: Vec<Chip>,
    pub instruments: Vec<Instrument>,
    pub wavetables: Vec<Wavetable>,
    pub subsongs: Vec<Song>,
}

impl Module {
    /// The number of DMG channels the driver plays (PU1, PU2, WAV, NOI)
    pub const CHANNEL_COUNT: usize = 4;
}

/// A sound-generating hardware unit targeted by the module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub kind: ChipKind,

    #[serde(default)]
    pub flags: ChipFlags,
}

/// The kind of a [`Chip`]; only the Game Boy family is playable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipKind {
    GameBoy,

    /// Any chip the driver cannot target, with its tracker type id
    Other(u16),
}

/// Optional per-chip flags carried over from the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipFlags {
    /// Chip sub-variant selector
    #[serde(default)]
    pub chip_type: Option<u32>,

    /// Wave polarity flag; inverted when absent
    #[serde(default)]
    pub invert_wave: Option<bool>,
}

impl ChipFlags {
    /// The `chip_type` value marking the GBA sub-variant
    pub const GBA_CHIP_TYPE: u32 = 3;

    /// Does this chip target the GBA sub-variant of the hardware?
    pub fn is_gba(&self) -> bool {
        self.chip_type == Some(Self::GBA_CHIP_TYPE)
    }

    /// The raw wave polarity flag, with its implicit default applied
    pub fn wave_inverted(&self) -> bool {
        self.invert_wave.unwrap_or(true)
    }
}

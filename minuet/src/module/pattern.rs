//! Pattern grids and the rows they're made of

use serde::{Deserialize, Serialize};

/// A fixed-length grid of rows for one channel, referenced by order slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// The channel this pattern belongs to, `0..4`
    pub channel: u8,

    /// The index order slots use to refer to this pattern
    pub index: u8,

    pub rows: Vec<Row>,
}

/// A single pattern row; every field may be absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
    pub note: Note,

    /// Row volume, or [`Row::EMPTY`] when the column is blank
    pub volume: u16,

    /// Instrument index, or [`Row::EMPTY`] when the column is blank
    pub instrument: u16,

    pub effects: Vec<Effect>,
}

impl Row {
    /// The tracker's "nothing here" sentinel for volume, instrument and
    /// effect columns
    pub const EMPTY: u16 = 0xFFFF;
}

impl Default for Row {
    fn default() -> Self {
        Self {
            note: Note::None,
            volume: Self::EMPTY,
            instrument: Self::EMPTY,
            effects: Vec::new(),
        }
    }
}

/// An effect (code, value) pair in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect code, or [`Row::EMPTY`] for a blank column
    pub code: u16,

    /// Effect value, or [`Row::EMPTY`] when the code has no argument
    pub value: u16,
}

/// The note column of a [`Row`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Note {
    /// Blank column
    #[default]
    None,

    Off,
    OffRelease,
    Release,

    /// A pitched note: semitone within the octave (0 = C) and octave number
    On { semitone: u8, octave: i8 },
}

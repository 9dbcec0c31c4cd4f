//! Per-channel pattern row compaction
//!
//! Rather than storing every column of every row, a pattern first gets
//! scanned for which columns are used at all. The scan result decides one
//! fixed row stride for the whole pattern, so the driver can index rows
//! without per-row bookkeeping.

use super::note::{UnsupportedNoteError, encode_note};
use crate::module::pattern::{Note, Pattern, Row};

/// Pattern-wide booleans deciding which row fields are physically stored
///
/// This is the single source of truth for the pattern's row byte width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub has_volume: bool,
    pub has_note: bool,
    pub has_instrument: bool,

    /// The largest number of used effect columns in any row
    pub max_effects: usize,
}

impl PatternFlags {
    /// The most effect columns a pattern record can declare
    pub const MAX_EFFECTS: usize = 8;

    /// Scan every row once to find which columns are used anywhere
    pub fn scan(pattern: &Pattern) -> Self {
        let mut flags = Self::default();

        for row in &pattern.rows {
            flags.has_volume |= row.volume != Row::EMPTY;
            flags.has_note |= row.note != Note::None;
            flags.has_instrument |= row.instrument != Row::EMPTY;

            let effects = row
                .effects
                .iter()
                .filter(|effect| effect.code != Row::EMPTY)
                .count();
            flags.max_effects = flags.max_effects.max(effects);
        }

        assert!(
            flags.max_effects <= Self::MAX_EFFECTS,
            "pattern {} uses {} effect columns",
            pattern.index,
            flags.max_effects,
        );

        flags
    }

    /// Is there nothing to store for any row?
    pub fn is_empty(&self) -> bool {
        !self.has_volume && !self.has_note && !self.has_instrument && self.max_effects == 0
    }

    /// The fixed byte stride shared by every row of the pattern
    pub fn row_size(&self) -> usize {
        2 * usize::from(self.has_volume)
            + usize::from(self.has_note)
            + usize::from(self.has_instrument)
            + 2 * self.max_effects
    }
}

/// A pattern compacted to its flags and fixed-stride row data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPattern {
    /// The index order slots use to refer to this pattern
    pub index: u8,

    pub flags: PatternFlags,

    /// `None` for patterns with nothing to store (the common case for
    /// silent patterns)
    pub data: Option<Vec<u8>>,
}

/// The artifact footprint of a pattern record (flags + data pointer)
pub const PATTERN_RECORD_SIZE: usize = 8;

/// The byte for an unused instrument column within a present field
const INSTRUMENT_NONE: u8 = 0xFF;

/// The byte pair filling a vacant effect slot
const EFFECT_VACANT: [u8; 2] = [0xAA, 0xAA];

/// Compact one pattern
pub fn encode_pattern(pattern: &Pattern) -> Result<EncodedPattern, UnsupportedNoteError> {
    let flags = PatternFlags::scan(pattern);

    if flags.is_empty() {
        return Ok(EncodedPattern {
            index: pattern.index,
            flags,
            data: None,
        });
    }

    let mut data = Vec::with_capacity(flags.row_size() * pattern.rows.len());

    for row in &pattern.rows {
        let start = data.len();

        if flags.has_volume {
            // The empty-volume sentinel passes through unmapped
            data.extend_from_slice(&row.volume.to_le_bytes());
        }

        if flags.has_note {
            data.push(encode_note(row.note)?);
        }

        if flags.has_instrument {
            data.push(if row.instrument == Row::EMPTY {
                INSTRUMENT_NONE
            } else {
                assert!(
                    row.instrument < u16::from(INSTRUMENT_NONE),
                    "instrument index {} collides with the sentinel",
                    row.instrument,
                );
                row.instrument as u8
            });
        }

        let mut used = 0;
        for effect in row.effects.iter().filter(|effect| effect.code != Row::EMPTY) {
            used += 1;
            assert!(used <= flags.max_effects);
            assert!(effect.code <= 0xFF, "effect code {:#X} is not a byte", effect.code);

            data.push(effect.code as u8);
            data.push(if effect.value == Row::EMPTY {
                0x00
            } else {
                effect.value as u8
            });
        }
        for _ in used..flags.max_effects {
            data.extend_from_slice(&EFFECT_VACANT);
        }

        assert_eq!(data.len() - start, flags.row_size());
    }

    Ok(EncodedPattern {
        index: pattern.index,
        flags,
        data: Some(data),
    })
}

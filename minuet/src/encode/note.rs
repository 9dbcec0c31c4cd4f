//! The symbolic note ↔ single-byte contract

use crate::module::pattern::Note;
use thiserror::Error;

/// The byte for a blank note column
pub const NOTE_NONE: u8 = 0xFF;

/// The byte for a note-off row
pub const NOTE_OFF: u8 = 180;

/// The byte for a note-off-with-release row
pub const NOTE_OFF_RELEASE: u8 = 181;

/// The byte for a note-release row
pub const NOTE_RELEASE: u8 = 182;

/// Encode a row's note column into the driver's single-byte contract
///
/// Pitched notes map to `12 * (5 + octave) + semitone`, which only covers
/// octaves `-5..=9`; anything outside that range has no byte encoding and is
/// rejected rather than wrapped.
pub fn encode_note(note: Note) -> Result<u8, UnsupportedNoteError> {
    match note {
        Note::None => Ok(NOTE_NONE),
        Note::Off => Ok(NOTE_OFF),
        Note::OffRelease => Ok(NOTE_OFF_RELEASE),
        Note::Release => Ok(NOTE_RELEASE),
        Note::On { semitone, octave } => {
            let value = 12 * (5 + i32::from(octave)) + i32::from(semitone % 12);
            if !(0..i32::from(NOTE_OFF)).contains(&value) {
                return Err(UnsupportedNoteError { semitone, octave });
            }

            Ok(value as u8)
        }
    }
}

/// A pitched note whose byte value would collide with the reserved range
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Note with semitone {semitone} in octave {octave} has no single-byte encoding")]
pub struct UnsupportedNoteError {
    pub semitone: u8,
    pub octave: i8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specials() {
        assert_eq!(encode_note(Note::None), Ok(0xFF));
        assert_eq!(encode_note(Note::Off), Ok(180));
        assert_eq!(encode_note(Note::OffRelease), Ok(181));
        assert_eq!(encode_note(Note::Release), Ok(182));
    }

    #[test]
    fn pitched() {
        // Lowest and highest representable notes
        assert_eq!(
            encode_note(Note::On {
                semitone: 0,
                octave: -5
            }),
            Ok(0)
        );
        assert_eq!(
            encode_note(Note::On {
                semitone: 11,
                octave: 9
            }),
            Ok(179)
        );

        // Middle C
        assert_eq!(
            encode_note(Note::On {
                semitone: 0,
                octave: 0
            }),
            Ok(60)
        );
    }

    #[test]
    fn injective_over_supported_range() {
        let mut seen = [false; 256];

        for octave in -5..=9i8 {
            for semitone in 0..12u8 {
                let byte = encode_note(Note::On { semitone, octave }).expect("in range");
                assert!(byte < 180);
                assert!(!seen[byte as usize], "duplicate byte {byte}");
                seen[byte as usize] = true;
            }
        }

        // Every byte below the reserved range is hit exactly once
        assert!(seen[..180].iter().all(|hit| *hit));
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            encode_note(Note::On {
                semitone: 0,
                octave: 10
            }),
            Err(UnsupportedNoteError {
                semitone: 0,
                octave: 10
            })
        );

        assert_eq!(
            encode_note(Note::On {
                semitone: 0,
                octave: -6
            }),
            Err(UnsupportedNoteError {
                semitone: 0,
                octave: -6
            })
        );

        // 180 would collide with the note-off byte
        assert!(
            encode_note(Note::On {
                semitone: 0,
                octave: 10
            })
            .is_err()
        );
    }
}

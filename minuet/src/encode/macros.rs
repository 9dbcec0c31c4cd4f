//! Macro normalization and typed packing
//!
//! Raw macro sequences interleave integer steps with loop/release markers.
//! The driver wants a dense data array plus the marker positions on the
//! side, with the element type fixed per macro kind.

use crate::module::instrument::{Macro, MacroKind, MacroStep};

/// A macro with its markers stripped out and its steps packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMacro {
    pub kind: MacroKind,
    pub mode: u8,
    pub delay: u8,
    pub speed: u8,

    /// Step index to loop back to, if any (serialized as `0xFF` when absent)
    pub loop_pos: Option<u8>,

    /// Step index to jump to on release, if any
    pub release_pos: Option<u8>,

    pub data: MacroData,
}

/// The artifact footprint of a macro's metadata record
pub const MACRO_RECORD_SIZE: usize = 16;

/// Typed macro step data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroData {
    /// Volume, duty and wave macros
    U8(Vec<u8>),

    /// Pan macros
    I8(Vec<i8>),

    /// Pitch macros
    I16(Vec<i16>),

    /// Phase-reset macros
    Bool(Vec<bool>),

    /// Arpeggio macros
    Arpeggio(Vec<ArpStep>),
}

impl MacroData {
    pub fn len(&self) -> usize {
        match self {
            MacroData::U8(data) => data.len(),
            MacroData::I8(data) => data.len(),
            MacroData::I16(data) => data.len(),
            MacroData::Bool(data) => data.len(),
            MacroData::Arpeggio(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Artifact bytes per step (arpeggio steps store an offset and a flag)
    pub fn element_size(&self) -> usize {
        match self {
            MacroData::I16(_) | MacroData::Arpeggio(_) => 2,
            _ => 1,
        }
    }
}

/// One arpeggio step: a signed note offset plus the fixed-arpeggio flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpStep {
    pub magnitude: u8,
    pub negative: bool,
    pub fixed: bool,
}

impl ArpStep {
    /// Bit of the raw absolute value marking a fixed (absolute-pitch) step
    const FIXED_BIT: u32 = 1 << 30;

    fn from_raw(raw: i32) -> Self {
        let abs = raw.unsigned_abs();

        Self {
            magnitude: (abs & 0xFF) as u8,
            negative: raw < 0,
            fixed: abs & Self::FIXED_BIT != 0,
        }
    }

    /// The signed note offset emitted into the artifact
    pub fn offset(&self) -> i16 {
        let magnitude = i16::from(self.magnitude);
        if self.negative { -magnitude } else { magnitude }
    }
}

/// Normalize one macro's step sequence and pack it per its kind
pub fn encode_macro(r#macro: &Macro) -> EncodedMacro {
    let (loop_pos, release_pos) = marker_positions(&r#macro.steps);

    let values: Vec<i32> = r#macro
        .steps
        .iter()
        .filter_map(|step| match step {
            MacroStep::Value(value) => Some(*value),
            MacroStep::Loop | MacroStep::Release => None,
        })
        .collect();

    let data = match r#macro.kind {
        MacroKind::Volume | MacroKind::Duty | MacroKind::Wave => {
            MacroData::U8(values.iter().map(|value| *value as u8).collect())
        }
        MacroKind::PanLeft | MacroKind::PanRight => {
            MacroData::I8(values.iter().map(|value| *value as i8).collect())
        }
        MacroKind::Pitch => MacroData::I16(values.iter().map(|value| *value as i16).collect()),
        MacroKind::PhaseReset => MacroData::Bool(values.iter().map(|value| *value != 0).collect()),
        MacroKind::Arpeggio => {
            MacroData::Arpeggio(values.iter().map(|value| ArpStep::from_raw(*value)).collect())
        }
    };

    EncodedMacro {
        kind: r#macro.kind,
        mode: r#macro.mode,
        delay: r#macro.delay,
        speed: r#macro.speed,
        loop_pos: narrow_position(loop_pos),
        release_pos: narrow_position(release_pos),
        data,
    }
}

/// Locate the loop/release markers in the raw sequence
///
/// When both markers are present, removing the earlier one shifts every later
/// index left by one, so the later marker's position is decremented; the
/// earlier one is unaffected.
fn marker_positions(steps: &[MacroStep]) -> (Option<usize>, Option<usize>) {
    let mut loop_pos = steps.iter().position(|step| matches!(step, MacroStep::Loop));
    let mut release_pos = steps
        .iter()
        .position(|step| matches!(step, MacroStep::Release));

    if let (Some(l), Some(r)) = (loop_pos, release_pos) {
        if l > r {
            loop_pos = Some(l - 1);
        } else {
            release_pos = Some(r - 1);
        }
    }

    (loop_pos, release_pos)
}

fn narrow_position(position: Option<usize>) -> Option<u8> {
    position.map(|position| {
        assert!(position < 0xFF, "marker position {position} collides with the sentinel");
        position as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arp_macro(steps: Vec<MacroStep>) -> Macro {
        Macro {
            kind: MacroKind::Arpeggio,
            mode: 0,
            delay: 0,
            speed: 1,
            steps,
        }
    }

    #[test]
    fn no_markers() {
        let encoded = encode_macro(&Macro {
            kind: MacroKind::Volume,
            mode: 0,
            delay: 2,
            speed: 3,
            steps: vec![
                MacroStep::Value(15),
                MacroStep::Value(10),
                MacroStep::Value(5),
            ],
        });

        assert_eq!(encoded.loop_pos, None);
        assert_eq!(encoded.release_pos, None);
        assert_eq!(encoded.data, MacroData::U8(vec![15, 10, 5]));
        assert_eq!(encoded.delay, 2);
        assert_eq!(encoded.speed, 3);
    }

    #[test]
    fn later_marker_shifts_left() {
        // Release first, loop later: the loop index is the one decremented
        let encoded = encode_macro(&arp_macro(vec![
            MacroStep::Value(0),
            MacroStep::Release,
            MacroStep::Value(1),
            MacroStep::Loop,
            MacroStep::Value(2),
        ]));

        assert_eq!(encoded.release_pos, Some(1));
        assert_eq!(encoded.loop_pos, Some(2));
        assert_eq!(encoded.data.len(), 3);

        // Loop first, release later: now the release index is decremented
        let encoded = encode_macro(&arp_macro(vec![
            MacroStep::Loop,
            MacroStep::Value(0),
            MacroStep::Value(1),
            MacroStep::Release,
            MacroStep::Value(2),
        ]));

        assert_eq!(encoded.loop_pos, Some(0));
        assert_eq!(encoded.release_pos, Some(2));
    }

    #[test]
    fn single_marker_keeps_its_index() {
        let encoded = encode_macro(&arp_macro(vec![
            MacroStep::Value(0),
            MacroStep::Value(1),
            MacroStep::Loop,
        ]));

        assert_eq!(encoded.loop_pos, Some(2));
        assert_eq!(encoded.release_pos, None);
    }

    #[test]
    fn typed_packing() {
        let pitch = encode_macro(&Macro {
            kind: MacroKind::Pitch,
            mode: 1,
            delay: 0,
            speed: 1,
            steps: vec![MacroStep::Value(-2048), MacroStep::Value(2047)],
        });
        assert_eq!(pitch.data, MacroData::I16(vec![-2048, 2047]));
        assert_eq!(pitch.data.element_size(), 2);

        let pan = encode_macro(&Macro {
            kind: MacroKind::PanLeft,
            mode: 0,
            delay: 0,
            speed: 1,
            steps: vec![MacroStep::Value(-3), MacroStep::Value(3)],
        });
        assert_eq!(pan.data, MacroData::I8(vec![-3, 3]));
        assert_eq!(pan.data.element_size(), 1);

        let phase_reset = encode_macro(&Macro {
            kind: MacroKind::PhaseReset,
            mode: 0,
            delay: 0,
            speed: 1,
            steps: vec![MacroStep::Value(0), MacroStep::Value(1)],
        });
        assert_eq!(phase_reset.data, MacroData::Bool(vec![false, true]));
    }

    #[test]
    fn arpeggio_splits_sign_and_fixed_flag() {
        let encoded = encode_macro(&arp_macro(vec![
            MacroStep::Value(-0x40000041),
            MacroStep::Value(12),
            MacroStep::Value(-7),
        ]));

        assert_eq!(
            encoded.data,
            MacroData::Arpeggio(vec![
                ArpStep {
                    magnitude: 0x41,
                    negative: true,
                    fixed: true,
                },
                ArpStep {
                    magnitude: 12,
                    negative: false,
                    fixed: false,
                },
                ArpStep {
                    magnitude: 7,
                    negative: true,
                    fixed: false,
                },
            ])
        );

        assert_eq!(encoded.data.element_size(), 2);
    }

    #[test]
    fn arp_step_offset() {
        assert_eq!(ArpStep::from_raw(-7).offset(), -7);
        assert_eq!(ArpStep::from_raw(12).offset(), 12);

        // Magnitudes above i8::MAX survive as i16 offsets
        assert_eq!(ArpStep::from_raw(-200).offset(), -200);
    }
}

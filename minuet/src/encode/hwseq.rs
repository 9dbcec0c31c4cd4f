//! Hardware envelope/sweep sequence commands
//!
//! The tracker stores each step as a tag plus two packed payload bytes; the
//! driver wants the fields pulled apart. In the artifact every command takes
//! eight bytes (a four-byte kind selector and a four-byte payload, unused
//! payload bytes zero).

use crate::module::instrument::{HwCommandKind, HwStep};

/// One decoded hardware-sequence command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCommand {
    Envelope {
        volume: u8,
        envelope_length: u8,
        sound_length: u8,
        direction_up: bool,
    },
    Sweep {
        shift: u8,
        speed: u8,
        direction_down: bool,
    },
    Wait {
        /// `1..=256`; the tracker stores this zero-based
        length: u16,
    },
    WaitForRelease,
    Loop {
        position: u16,
    },
    LoopUntilRelease {
        position: u16,
    },
}

/// The artifact footprint of one command
pub const HW_COMMAND_SIZE: usize = 8;

/// Pull a raw step's payload fields apart
pub fn decode_step(step: &HwStep) -> HwCommand {
    let [byte0, byte1] = step.data;

    match step.command {
        HwCommandKind::Envelope => HwCommand::Envelope {
            volume: (byte0 & 0b1111_0000) >> 4,
            envelope_length: byte0 & 0b111,
            sound_length: byte1,
            direction_up: byte0 & 0b1000 != 0,
        },
        HwCommandKind::Sweep => HwCommand::Sweep {
            shift: byte0 & 0b111,
            speed: (byte0 & 0b111_0000) >> 4,
            direction_down: byte0 & 0b1000 != 0,
        },
        HwCommandKind::Wait => HwCommand::Wait {
            length: u16::from(byte0) + 1,
        },
        HwCommandKind::WaitForRelease => HwCommand::WaitForRelease,
        HwCommandKind::Loop => HwCommand::Loop {
            position: u16::from_le_bytes([byte0, byte1]),
        },
        HwCommandKind::LoopUntilRelease => HwCommand::LoopUntilRelease {
            position: u16::from_le_bytes([byte0, byte1]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(command: HwCommandKind, data: [u8; 2]) -> HwStep {
        HwStep { command, data }
    }

    #[test]
    fn envelope() {
        assert_eq!(
            decode_step(&step(HwCommandKind::Envelope, [0x4B, 0x07])),
            HwCommand::Envelope {
                volume: 4,
                envelope_length: 3,
                sound_length: 7,
                direction_up: true,
            }
        );

        assert_eq!(
            decode_step(&step(HwCommandKind::Envelope, [0xF0, 0x40])),
            HwCommand::Envelope {
                volume: 15,
                envelope_length: 0,
                sound_length: 64,
                direction_up: false,
            }
        );
    }

    #[test]
    fn sweep() {
        assert_eq!(
            decode_step(&step(HwCommandKind::Sweep, [0x5A, 0x00])),
            HwCommand::Sweep {
                shift: 2,
                speed: 5,
                direction_down: true,
            }
        );
    }

    #[test]
    fn wait_is_zero_based() {
        assert_eq!(
            decode_step(&step(HwCommandKind::Wait, [0x00, 0x00])),
            HwCommand::Wait { length: 1 }
        );
        assert_eq!(
            decode_step(&step(HwCommandKind::Wait, [0xFF, 0x00])),
            HwCommand::Wait { length: 256 }
        );
    }

    #[test]
    fn loop_position_is_little_endian() {
        assert_eq!(
            decode_step(&step(HwCommandKind::Loop, [0x34, 0x12])),
            HwCommand::Loop { position: 0x1234 }
        );
        assert_eq!(
            decode_step(&step(HwCommandKind::LoopUntilRelease, [0x02, 0x01])),
            HwCommand::LoopUntilRelease { position: 0x0102 }
        );
    }

    #[test]
    fn wait_for_release_has_no_payload() {
        assert_eq!(
            decode_step(&step(HwCommandKind::WaitForRelease, [0xAB, 0xCD])),
            HwCommand::WaitForRelease
        );
    }
}

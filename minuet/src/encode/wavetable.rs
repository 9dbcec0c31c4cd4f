//! Waveform sample packing for the wave channel
//!
//! Samples leave the tracker as one value per column in `[0,16)`. The driver
//! wants them eight to a 32-bit word, and depending on the hardware
//! sub-variant with their polarity flipped.

use crate::module::{ChipFlags, wavetable::Wavetable};
use thiserror::Error;
use ux::u4;

/// A wavetable packed into the driver's nibble format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedWavetable {
    pub width: u16,
    pub height: u16,

    /// `width / 8` little-endian words, nibble `i` at bit `4 * i`
    pub words: Vec<u32>,
}

/// The only sample value range the hardware supports
pub const WAVETABLE_HEIGHT: u16 = 16;

/// Pack one wavetable, validating it against the target format's widths
pub fn pack_wavetable(
    index: usize,
    wavetable: &Wavetable,
    flags: &ChipFlags,
    supported_widths: &[u16],
) -> Result<PackedWavetable, WavetableError> {
    if wavetable.height != WAVETABLE_HEIGHT || !supported_widths.contains(&wavetable.width) {
        return Err(WavetableError::UnsupportedSize {
            index,
            width: wavetable.width,
            height: wavetable.height,
        });
    }

    assert_eq!(
        wavetable.data.len(),
        wavetable.width as usize,
        "wavetable {index} carries {} samples for width {}",
        wavetable.data.len(),
        wavetable.width,
    );

    let invert = effective_invert(flags);

    let mut words = Vec::with_capacity(wavetable.width as usize / 8);
    for chunk in wavetable.data.chunks_exact(8) {
        let mut word = 0u32;
        for (i, &sample) in chunk.iter().enumerate() {
            if sample >= 16 {
                return Err(WavetableError::UnsupportedValue { value: sample });
            }

            let sample = invert_sample(u4::new(sample), invert);
            word |= u32::from(u8::from(sample)) << (4 * i);
        }
        words.push(word);
    }

    Ok(PackedWavetable {
        width: wavetable.width,
        height: wavetable.height,
        words,
    })
}

/// Whether samples need their polarity flipped for this chip
///
/// The GBA variant of the hardware reads wave RAM with opposite polarity, so
/// the chip's raw invert flag and the GBA marker cancel each other out.
pub fn effective_invert(flags: &ChipFlags) -> bool {
    !(flags.is_gba() ^ flags.wave_inverted())
}

fn invert_sample(sample: u4, invert: bool) -> u4 {
    if invert {
        u4::new(0xF - u8::from(sample))
    } else {
        sample
    }
}

/// An error describing what made a wavetable unencodable
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WavetableError {
    /// The dimensions are outside what the target format supports
    #[error("Wavetable {index} is {width}x{height}, which the target format does not support")]
    UnsupportedSize {
        index: usize,
        width: u16,
        height: u16,
    },

    /// A sample value does not fit in a nibble
    #[error("Wavetable sample value {value} does not fit in 4 bits")]
    UnsupportedValue { value: u8 },
}

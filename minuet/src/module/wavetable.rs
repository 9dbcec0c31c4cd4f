//! Custom waveforms for the wave channel

use serde::{Deserialize, Serialize};

/// A fixed-size table of 4-bit amplitude samples defining a custom waveform
///
/// `data` holds one sample per column; `height` is the sample value range
/// (always 16 for the target hardware).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wavetable {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

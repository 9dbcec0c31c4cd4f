//! Instruments and the features that shape their sound

use serde::{Deserialize, Serialize};

/// A reusable sound-shaping definition referenced by pattern rows
///
/// An instrument is a kind tag plus an unordered set of optional features.
/// The tracker stores at most one envelope feature, one macro list and one
/// wave-synth feature per instrument; more than one of any is a defect in
/// the layer that built the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub kind: InstrumentKind,

    #[serde(default)]
    pub features: Vec<Feature>,
}

/// The kind of an [`Instrument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Driven by the hardware envelope/sweep units
    Gb,

    /// Sample playback on the wave channel
    Sample,

    /// Any instrument type the driver cannot play, with its tracker type id
    Other(u16),
}

/// One optional feature of an [`Instrument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Feature {
    /// Display name; trackers carry it, the driver does not
    Name(String),
    Envelope(Envelope),
    Macros(Vec<Macro>),
    WaveSynth(WaveSynth),

    /// Sample data reference; accepted but not encoded yet
    Sample,
}

/// Hardware envelope parameters plus the command sequence that reprograms
/// the envelope/sweep units over time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub initial_volume: u8,
    pub envelope_length: u8,
    pub sound_length: u8,
    pub direction_up: bool,
    pub always_init: bool,
    pub software_envelope: bool,

    #[serde(default)]
    pub hw_seq: Vec<HwStep>,
}

/// One raw hardware-sequence step as the tracker stores it
///
/// The payload stays in its packed two-byte form here; the encoder pulls the
/// fields apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwStep {
    pub command: HwCommandKind,
    pub data: [u8; 2],
}

/// The tag of a [`HwStep`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HwCommandKind {
    Envelope,
    Sweep,
    Wait,
    WaitForRelease,
    Loop,
    LoopUntilRelease,
}

/// A per-tick automation curve attached to an instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    pub kind: MacroKind,
    pub mode: u8,
    pub delay: u8,
    pub speed: u8,
    pub steps: Vec<MacroStep>,
}

/// What a [`Macro`] automates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroKind {
    Volume,
    Arpeggio,
    Duty,
    Wave,
    PanLeft,
    PanRight,
    Pitch,
    PhaseReset,
}

/// One entry in a macro's raw step sequence
///
/// A sequence contains at most one `Loop` and at most one `Release` marker,
/// interleaved with the integer steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroStep {
    Value(i32),
    Loop,
    Release,
}

/// Wave-synthesis parameters for the wave channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSynth {
    pub enabled: bool,
    pub kind: WaveSynthKind,
    pub global: bool,
    pub wave_1: u8,
    pub wave_2: u8,
    pub rate_divider: u8,
    pub speed: u8,
    pub amount: u8,
    pub power: u8,
}

/// The wave-synthesis effect selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveSynthKind {
    // Single-waveform effects
    None,
    Invert,
    Add,
    Subtract,
    Average,
    Phase,
    Chorus,

    // Dual-waveform effects
    NoneDual,
    Wipe,
    Fade,
    PingPong,
    Overlay,
    NegativeOverlay,
    Slide,
    Mix,
    PhaseMod,
}

//! The encoding engine: validation, per-entity encoders and the root
//! aggregator
//!
//! [`encode()`] is the single entry point. It validates the module against a
//! [`Format`] descriptor, drives the sub-encoders over every instrument,
//! wavetable and pattern, and assembles a [`Music`] value: in-memory tables
//! addressed by stable indices. Serialization of those tables is a separate
//! concern (see [`crate::emit`]), so nothing in here depends on where records
//! end up in the artifact.

pub mod hwseq;
pub mod macros;
pub mod note;
pub mod pattern;
pub mod wavetable;

use crate::{
    diag::{Diagnostics, Warning},
    module::{
        ChipKind, Module,
        instrument::{Feature, Instrument, InstrumentKind, WaveSynth},
        song::Song,
    },
};
use hwseq::{HW_COMMAND_SIZE, HwCommand, decode_step};
use macros::{EncodedMacro, MACRO_RECORD_SIZE, encode_macro};
use note::UnsupportedNoteError;
use pattern::{EncodedPattern, PATTERN_RECORD_SIZE, encode_pattern};
use thiserror::Error;
use wavetable::{PackedWavetable, WavetableError, pack_wavetable};

/// The most chips a module may carry
pub const MAX_CHIPS: usize = 1;

/// The most instruments a module may carry (0xFF is the "no instrument" byte)
pub const MAX_INSTRUMENTS: usize = 254;

/// The most wavetables a module may carry
pub const MAX_WAVETABLES: usize = 255;

// Artifact footprints of the fixed records, for size reporting
const GB_RECORD_SIZE: usize = 12;
const WAVE_SYNTH_RECORD_SIZE: usize = 11;
const INSTRUMENT_RECORD_SIZE: usize = 24;
const WAVETABLE_RECORD_SIZE: usize = 8;
const ORDER_ENTRY_SIZE: usize = 4;
const GROOVE_RECORD_SIZE: usize = 5;
const MUSIC_RECORD_SIZE: usize = 44;

/// Capability descriptor for one generation of the driver format
///
/// The encoder is parameterized by data rather than by per-generation code:
/// picking a format only changes which tables exist and which wavetable
/// widths pass validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Wavetable widths the driver accepts
    pub wavetable_widths: &'static [u16],

    /// Whether the root record carries an instrument table
    pub instrument_table: bool,

    /// Whether the root record carries a groove table
    pub groove_table: bool,

    /// Whether the root record carries a virtual-tempo fraction and a full
    /// speed list (older generations store a single speed byte)
    pub virtual_tempo: bool,

    /// Whether the module must run at the fixed 60 Hz tick rate
    pub fixed_tick_rate: bool,
}

impl Format {
    pub const V1: Format = Format {
        wavetable_widths: &[32],
        instrument_table: false,
        groove_table: false,
        virtual_tempo: false,
        fixed_tick_rate: true,
    };

    pub const V2: Format = Format {
        instrument_table: true,
        ..Self::V1
    };

    pub const V3: Format = Format {
        groove_table: true,
        ..Self::V2
    };

    pub const V4: Format = Format {
        wavetable_widths: &[32, 64],
        virtual_tempo: true,
        fixed_tick_rate: false,
        ..Self::V3
    };

    /// The newest format generation
    pub const LATEST: Format = Self::V4;
}

/// The encoded root record and every table it references
///
/// All cross-references are indices into the vectors here, resolved before
/// any serialization happens. `size` tracks the artifact footprint in bytes;
/// it is reporting only and never feeds back into encoding decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Music {
    pub format: Format,
    pub instruments: Vec<EncodedInstrument>,
    pub wavetables: Vec<PackedWavetable>,

    /// One entry per DMG channel, in channel order
    pub channels: Vec<Channel>,

    /// The normalized speed sequence (explicit per-row speed pattern when the
    /// song has one, the default speed cycle otherwise)
    pub speeds: Vec<u8>,

    pub virtual_tempo: (u16, u16),
    pub grooves: Vec<Vec<u8>>,
    pub order_length: usize,
    pub pattern_length: u16,

    size: usize,
}

impl Music {
    /// The total artifact footprint in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}

/// One channel's encoded patterns and its order table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Encoded patterns, sorted by pattern index
    pub patterns: Vec<EncodedPattern>,

    /// One entry per order slot, indexing into `patterns`; duplicate slots
    /// share the same record
    pub order: Vec<usize>,
}

/// One encoded instrument: its kind plus whichever features it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInstrument {
    pub kind: InstrumentKind,
    pub gb: Option<GbInstrument>,
    pub macros: Vec<EncodedMacro>,
    pub wave_synth: Option<WaveSynth>,
}

/// The hardware envelope record plus its decoded command sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbInstrument {
    pub initial_volume: u8,
    pub envelope_length: u8,
    pub sound_length: u8,
    pub direction_up: bool,
    pub always_init: bool,
    pub software_envelope: bool,
    pub hw_seq: Vec<HwCommand>,
}

/// Encode a module for the given format generation
///
/// Returns the encoded music plus the warnings gathered along the way.
///
/// ```no_run
/// # use minuet::{encode::{encode, Format}, module::Module};
/// # let module: Module = todo!();
/// let (music, diagnostics) = encode(&module, Format::LATEST)?;
///
/// for warning in diagnostics.warnings() {
///     eprintln!("warning: {warning}");
/// }
///
/// println!("{} bytes in ROM", music.size());
/// # Ok::<(), minuet::encode::EncodeError>(())
/// ```
pub fn encode(module: &Module, format: Format) -> Result<(Music, Diagnostics), EncodeError> {
    let mut diagnostics = Diagnostics::default();
    let song = validate(module, format, &mut diagnostics)?;

    let mut size = 0;

    // Instruments
    let mut instruments = Vec::with_capacity(module.instruments.len());
    for (index, instrument) in module.instruments.iter().enumerate() {
        instruments.push(encode_instrument(
            index,
            instrument,
            &mut size,
            &mut diagnostics,
        ));
    }

    // Wavetables, inverted per the chip's polarity flags
    let flags = &module
        .chips
        .iter()
        .find(|chip| chip.kind == ChipKind::GameBoy)
        .expect("validated")
        .flags;

    let mut wavetables = Vec::with_capacity(module.wavetables.len());
    for (index, wavetable) in module.wavetables.iter().enumerate() {
        let packed = pack_wavetable(index, wavetable, flags, format.wavetable_widths)?;
        size += packed.words.len() * 4 + WAVETABLE_RECORD_SIZE;
        wavetables.push(packed);
    }

    // Per-channel patterns and order tables
    let mut channels = Vec::with_capacity(Module::CHANNEL_COUNT);
    for channel in 0..Module::CHANNEL_COUNT {
        let mut patterns = Vec::new();
        for pattern in song.patterns.iter().filter(|p| usize::from(p.channel) == channel) {
            let encoded = encode_pattern(pattern)?;
            size += encoded.data.as_ref().map_or(0, Vec::len) + PATTERN_RECORD_SIZE;
            patterns.push(encoded);
        }

        patterns.sort_by_key(|pattern| pattern.index);
        assert!(
            patterns.windows(2).all(|w| w[0].index != w[1].index),
            "channel {channel} has duplicate pattern indices",
        );

        let order = song.orders[channel]
            .iter()
            .map(|index| {
                patterns
                    .binary_search_by_key(index, |pattern| pattern.index)
                    .expect("validated")
            })
            .collect::<Vec<_>>();
        size += order.len() * ORDER_ENTRY_SIZE;

        channels.push(Channel { patterns, order });
    }

    // Speeds
    let speeds = if song.speed_pattern.is_empty() {
        song.timing.speeds.clone()
    } else {
        song.speed_pattern.clone()
    };
    assert!(!speeds.is_empty(), "song carries no speed values");
    size += if format.virtual_tempo { speeds.len() } else { 1 };

    // Grooves
    let mut grooves = Vec::with_capacity(song.grooves.len());
    for (index, groove) in song.grooves.iter().enumerate() {
        assert!(!groove.steps.is_empty(), "groove 0x{index:02X} is empty");
        size += groove.steps.len() + GROOVE_RECORD_SIZE;
        grooves.push(groove.steps.clone());
    }

    size += MUSIC_RECORD_SIZE;

    Ok((
        Music {
            format,
            instruments,
            wavetables,
            channels,
            speeds,
            virtual_tempo: song.timing.virtual_tempo,
            grooves,
            order_length: song.orders[0].len(),
            pattern_length: song.pattern_length,
            size,
        },
        diagnostics,
    ))
}

/// Run every validation check before any encoding work happens
fn validate<'a>(
    module: &'a Module,
    format: Format,
    diagnostics: &mut Diagnostics,
) -> Result<&'a Song, EncodeError> {
    if module.chips.len() > MAX_CHIPS {
        return Err(EncodeError::TooManyChips {
            count: module.chips.len(),
        });
    }

    for (index, chip) in module.chips.iter().enumerate() {
        if chip.kind != ChipKind::GameBoy {
            return Err(EncodeError::UnsupportedChipType { index });
        }
    }

    let gb_chips = module
        .chips
        .iter()
        .filter(|chip| chip.kind == ChipKind::GameBoy)
        .count();
    if gb_chips > 1 {
        return Err(EncodeError::TooManyGbChips { count: gb_chips });
    }
    if gb_chips == 0 {
        return Err(EncodeError::NoGbChip);
    }

    if module.instruments.len() > MAX_INSTRUMENTS {
        return Err(EncodeError::TooManyInstruments {
            count: module.instruments.len(),
        });
    }

    if module.wavetables.len() > MAX_WAVETABLES {
        return Err(EncodeError::TooManyWavetables {
            count: module.wavetables.len(),
        });
    }

    for (index, instrument) in module.instruments.iter().enumerate() {
        if let InstrumentKind::Other(_) = instrument.kind {
            return Err(EncodeError::UnsupportedInstrumentType { index });
        }
    }

    let song = module.subsongs.first().ok_or(EncodeError::NoSubsongs)?;
    if module.subsongs.len() > 1 {
        diagnostics.warn(Warning::SubsongsIgnored {
            count: module.subsongs.len() - 1,
        });
    }

    if format.fixed_tick_rate && song.timing.tick_rate != 60.0 {
        return Err(EncodeError::UnsupportedTickRate {
            tick_rate: song.timing.tick_rate,
        });
    }
    if song.timing.time_base != 1 {
        return Err(EncodeError::InvalidTimeBase {
            time_base: song.timing.time_base,
        });
    }

    if !format.instrument_table && !module.instruments.is_empty() {
        return Err(EncodeError::InstrumentsNotSupported);
    }
    if !format.groove_table && !song.grooves.is_empty() {
        return Err(EncodeError::GroovesNotSupported);
    }

    assert_eq!(
        song.orders.len(),
        Module::CHANNEL_COUNT,
        "song carries {} order lists",
        song.orders.len(),
    );
    assert!(
        song.orders
            .windows(2)
            .all(|w| w[0].len() == w[1].len()),
        "order lists have mismatched lengths",
    );

    // Every order slot must point at a pattern that actually exists
    for (channel, order) in song.orders.iter().enumerate() {
        for &index in order {
            if !song
                .patterns
                .iter()
                .any(|p| usize::from(p.channel) == channel && p.index == index)
            {
                return Err(EncodeError::MissingPattern {
                    channel,
                    pattern: index,
                });
            }
        }
    }

    Ok(song)
}

/// Encode one instrument's feature set
fn encode_instrument(
    index: usize,
    instrument: &Instrument,
    size: &mut usize,
    diagnostics: &mut Diagnostics,
) -> EncodedInstrument {
    let mut gb = None;
    let mut macros = Vec::new();
    let mut has_macros = false;
    let mut wave_synth = None;

    for feature in &instrument.features {
        match feature {
            Feature::Name(_) => (),

            Feature::Envelope(envelope) => {
                assert!(
                    gb.is_none(),
                    "instrument 0x{index:02X} has more than one envelope feature",
                );

                let hw_seq: Vec<HwCommand> = envelope.hw_seq.iter().map(decode_step).collect();
                *size += hw_seq.len() * HW_COMMAND_SIZE + GB_RECORD_SIZE;

                gb = Some(GbInstrument {
                    initial_volume: envelope.initial_volume,
                    envelope_length: envelope.envelope_length,
                    sound_length: envelope.sound_length,
                    direction_up: envelope.direction_up,
                    always_init: envelope.always_init,
                    software_envelope: envelope.software_envelope,
                    hw_seq,
                });
            }

            Feature::Macros(list) => {
                assert!(
                    !has_macros,
                    "instrument 0x{index:02X} has more than one macro feature",
                );
                has_macros = true;

                for r#macro in list {
                    let encoded = encode_macro(r#macro);
                    *size += encoded.data.len() * encoded.data.element_size() + MACRO_RECORD_SIZE;
                    macros.push(encoded);
                }
            }

            Feature::WaveSynth(synth) => {
                assert!(
                    wave_synth.is_none(),
                    "instrument 0x{index:02X} has more than one wave-synth feature",
                );

                if synth.enabled {
                    *size += WAVE_SYNTH_RECORD_SIZE;
                    wave_synth = Some(*synth);
                }
            }

            Feature::Sample => diagnostics.warn(Warning::FeatureIgnored {
                instrument: index,
                feature: "sample",
            }),
        }
    }

    *size += INSTRUMENT_RECORD_SIZE;

    EncodedInstrument {
        kind: instrument.kind,
        gb,
        macros,
        wave_synth,
    }
}

/// An error describing why a module cannot be encoded
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    #[error("The module has {count} chips; the driver supports at most {MAX_CHIPS}")]
    TooManyChips { count: usize },

    /// Only the Game Boy chip family is playable
    #[error("Chip {index} is not a Game Boy chip")]
    UnsupportedChipType { index: usize },

    #[error("The module has {count} Game Boy chips; the driver plays exactly one")]
    TooManyGbChips { count: usize },

    #[error("The module has no Game Boy chip to target")]
    NoGbChip,

    #[error("The module has {count} instruments; at most {MAX_INSTRUMENTS} fit the index byte")]
    TooManyInstruments { count: usize },

    #[error("The module has {count} wavetables; at most {MAX_WAVETABLES} fit the index byte")]
    TooManyWavetables { count: usize },

    #[error("Instrument {index} has a type the driver cannot play")]
    UnsupportedInstrumentType { index: usize },

    #[error("The module has no subsongs")]
    NoSubsongs,

    /// Strict format generations drive the engine straight off the 60 Hz
    /// vblank interrupt
    #[error("Tick rate {tick_rate} is not supported; the driver runs at 60 Hz")]
    UnsupportedTickRate { tick_rate: f64 },

    #[error("Time base {time_base} is not supported")]
    InvalidTimeBase { time_base: u8 },

    /// The chosen format generation has no instrument table
    #[error("The target format cannot store instruments")]
    InstrumentsNotSupported,

    /// The chosen format generation has no groove table
    #[error("The target format cannot store grooves")]
    GroovesNotSupported,

    /// An order slot references a pattern the module does not contain
    #[error("Channel {channel} order references missing pattern 0x{pattern:02X}")]
    MissingPattern { channel: usize, pattern: u8 },

    #[error("Encoding a wavetable failed")]
    Wavetable(#[from] WavetableError),

    #[error("Encoding a note failed")]
    Note(#[from] UnsupportedNoteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{
        Chip, ChipFlags,
        instrument::{Envelope, HwCommandKind, HwStep, Macro, MacroKind, MacroStep},
        pattern::{Note, Pattern, Row},
        song::{Groove, Timing},
        wavetable::Wavetable,
    };

    fn gb_instrument() -> Instrument {
        Instrument {
            kind: InstrumentKind::Gb,
            features: vec![],
        }
    }

    fn wavetable() -> Wavetable {
        Wavetable {
            width: 32,
            height: 16,
            data: (0..32u8).map(|i| i % 16).collect(),
        }
    }

    fn silent_patterns() -> Vec<Pattern> {
        (0..4)
            .map(|channel| Pattern {
                channel,
                index: 0,
                rows: vec![Row::default(); 64],
            })
            .collect()
    }

    fn module() -> Module {
        Module {
            chips: vec![Chip {
                kind: ChipKind::GameBoy,
                flags: ChipFlags::default(),
            }],
            instruments: vec![],
            wavetables: vec![],
            subsongs: vec![Song {
                timing: Timing {
                    tick_rate: 60.0,
                    time_base: 1,
                    speeds: vec![6],
                    virtual_tempo: (150, 150),
                },
                speed_pattern: vec![],
                grooves: vec![],
                orders: vec![vec![0]; 4],
                pattern_length: 64,
                patterns: silent_patterns(),
            }],
        }
    }

    #[test]
    fn capacity_boundaries() {
        let mut ok = module();
        ok.instruments = (0..254).map(|_| gb_instrument()).collect();
        assert!(encode(&ok, Format::LATEST).is_ok());

        let mut too_many = module();
        too_many.instruments = (0..255).map(|_| gb_instrument()).collect();
        assert_eq!(
            encode(&too_many, Format::LATEST).unwrap_err(),
            EncodeError::TooManyInstruments { count: 255 }
        );

        let mut ok = module();
        ok.wavetables = (0..255).map(|_| wavetable()).collect();
        assert!(encode(&ok, Format::LATEST).is_ok());

        let mut too_many = module();
        too_many.wavetables = (0..256).map(|_| wavetable()).collect();
        assert_eq!(
            encode(&too_many, Format::LATEST).unwrap_err(),
            EncodeError::TooManyWavetables { count: 256 }
        );
    }

    #[test]
    fn chip_validation() {
        let mut two_chips = module();
        two_chips.chips.push(two_chips.chips[0].clone());
        assert_eq!(
            encode(&two_chips, Format::LATEST).unwrap_err(),
            EncodeError::TooManyChips { count: 2 }
        );

        let mut wrong_chip = module();
        wrong_chip.chips[0].kind = ChipKind::Other(5);
        assert_eq!(
            encode(&wrong_chip, Format::LATEST).unwrap_err(),
            EncodeError::UnsupportedChipType { index: 0 }
        );

        let mut no_chips = module();
        no_chips.chips.clear();
        assert_eq!(
            encode(&no_chips, Format::LATEST).unwrap_err(),
            EncodeError::NoGbChip
        );
    }

    #[test]
    fn timing_validation() {
        let mut pal = module();
        pal.subsongs[0].timing.tick_rate = 50.0;
        assert_eq!(
            encode(&pal, Format::V3).unwrap_err(),
            EncodeError::UnsupportedTickRate { tick_rate: 50.0 }
        );

        // The newest generation rescales through the virtual tempo instead
        assert!(encode(&pal, Format::V4).is_ok());

        let mut time_base = module();
        time_base.subsongs[0].timing.time_base = 2;
        assert_eq!(
            encode(&time_base, Format::LATEST).unwrap_err(),
            EncodeError::InvalidTimeBase { time_base: 2 }
        );
    }

    #[test]
    fn format_capabilities() {
        let mut with_instruments = module();
        with_instruments.instruments.push(gb_instrument());
        assert_eq!(
            encode(&with_instruments, Format::V1).unwrap_err(),
            EncodeError::InstrumentsNotSupported
        );
        assert!(encode(&with_instruments, Format::V2).is_ok());

        let mut with_grooves = module();
        with_grooves.subsongs[0].grooves.push(Groove {
            steps: vec![6, 5],
        });
        assert_eq!(
            encode(&with_grooves, Format::V2).unwrap_err(),
            EncodeError::GroovesNotSupported
        );
        assert!(encode(&with_grooves, Format::V3).is_ok());

        // Wide wavetables only fit the newest generation
        let mut wide = module();
        wide.wavetables.push(Wavetable {
            width: 64,
            height: 16,
            data: vec![0; 64],
        });
        assert!(matches!(
            encode(&wide, Format::V3).unwrap_err(),
            EncodeError::Wavetable(WavetableError::UnsupportedSize { .. })
        ));
        assert!(encode(&wide, Format::V4).is_ok());
    }

    #[test]
    fn dangling_order_slot() {
        let mut dangling = module();
        dangling.subsongs[0].orders[2] = vec![0, 1];
        dangling.subsongs[0].orders[0] = vec![0, 0];
        dangling.subsongs[0].orders[1] = vec![0, 0];
        dangling.subsongs[0].orders[3] = vec![0, 0];

        assert_eq!(
            encode(&dangling, Format::LATEST).unwrap_err(),
            EncodeError::MissingPattern {
                channel: 2,
                pattern: 1
            }
        );
    }

    #[test]
    fn extra_subsongs_warn() {
        let mut extra = module();
        let subsong = extra.subsongs[0].clone();
        extra.subsongs.push(subsong.clone());
        extra.subsongs.push(subsong);

        let (_, diagnostics) = encode(&extra, Format::LATEST).unwrap();
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::SubsongsIgnored { count: 2 }]
        );
    }

    #[test]
    fn speed_normalization() {
        let (music, _) = encode(&module(), Format::LATEST).unwrap();
        assert_eq!(music.speeds, vec![6]);

        let mut with_pattern = module();
        with_pattern.subsongs[0].speed_pattern = vec![6, 5, 6, 4];
        let (music, _) = encode(&with_pattern, Format::LATEST).unwrap();
        assert_eq!(music.speeds, vec![6, 5, 6, 4]);
    }

    #[test]
    fn order_slots_share_pattern_records() {
        let mut shared = module();
        shared.subsongs[0].patterns.push(Pattern {
            channel: 0,
            index: 1,
            rows: vec![
                Row {
                    note: Note::On {
                        semitone: 9,
                        octave: 0,
                    },
                    ..Row::default()
                };
                64
            ],
        });
        shared.subsongs[0].orders = vec![vec![0, 1, 1, 0], vec![0; 4], vec![0; 4], vec![0; 4]];

        let (music, _) = encode(&shared, Format::LATEST).unwrap();
        let channel = &music.channels[0];

        assert_eq!(channel.patterns.len(), 2);
        assert_eq!(channel.order, vec![0, 1, 1, 0]);
        assert_eq!(music.order_length, 4);
    }

    #[test]
    fn footprint_accounting() {
        let mut module = module();
        module.instruments.push(Instrument {
            kind: InstrumentKind::Gb,
            features: vec![
                Feature::Envelope(Envelope {
                    initial_volume: 15,
                    envelope_length: 2,
                    sound_length: 64,
                    direction_up: false,
                    always_init: false,
                    software_envelope: false,
                    hw_seq: vec![
                        HwStep {
                            command: HwCommandKind::Envelope,
                            data: [0x4B, 0x07],
                        },
                        HwStep {
                            command: HwCommandKind::Wait,
                            data: [0x03, 0x00],
                        },
                    ],
                }),
                Feature::Macros(vec![Macro {
                    kind: MacroKind::Volume,
                    mode: 0,
                    delay: 0,
                    speed: 1,
                    steps: vec![
                        MacroStep::Value(15),
                        MacroStep::Value(10),
                        MacroStep::Value(5),
                    ],
                }]),
            ],
        });
        module.wavetables.push(wavetable());

        let (music, diagnostics) = encode(&module, Format::LATEST).unwrap();
        assert!(diagnostics.is_empty());

        // instrument record + gb record + 2 hardware commands
        let instruments = INSTRUMENT_RECORD_SIZE + GB_RECORD_SIZE + 2 * HW_COMMAND_SIZE;
        // macro record + 3 one-byte steps
        let macros = MACRO_RECORD_SIZE + 3;
        // 4 words of packed samples + the wavetable record
        let wavetables = 4 * 4 + WAVETABLE_RECORD_SIZE;
        // 4 silent patterns (no data) + 4 one-slot order tables
        let patterns = 4 * PATTERN_RECORD_SIZE + 4 * ORDER_ENTRY_SIZE;
        let speeds = 1;

        assert_eq!(
            music.size(),
            instruments + macros + wavetables + patterns + speeds + MUSIC_RECORD_SIZE
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut module = module();
        module.instruments.push(gb_instrument());
        module.wavetables.push(wavetable());

        let (first, _) = encode(&module, Format::LATEST).unwrap();
        let (second, _) = encode(&module, Format::LATEST).unwrap();
        assert_eq!(first, second);
    }
}

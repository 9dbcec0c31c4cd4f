//! C source emission for encoded music
//!
//! Everything here is a pure writer: the values were all computed by
//! [`crate::encode`], and the only decisions left are formatting ones. One
//! symbol (the caller-chosen name) gets external linkage; every table it
//! references is written as an internal `static const` with a name derived
//! from it.

use crate::{
    encode::{
        EncodedInstrument, Format, GbInstrument, Music,
        hwseq::HwCommand,
        macros::{EncodedMacro, MacroData},
        pattern::EncodedPattern,
    },
    module::instrument::{InstrumentKind, MacroKind, WaveSynth, WaveSynthKind},
};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Serialize music to an arbitrary I/O writer
pub fn to_writer<W>(music: &Music, name: &str, mut writer: W) -> io::Result<()>
where
    W: Write,
{
    let w = &mut writer;

    writeln!(w, "#include \"mnt_music.h\"")?;
    writeln!(w)?;
    writeln!(w, "#include <stddef.h>")?;
    writeln!(w)?;
    writeln!(w, "// declare this variable as extern in your source.")?;
    writeln!(w, "extern const mnt_music {name};")?;
    writeln!(w)?;
    writeln!(w)?;
    writeln!(w)?;
    writeln!(w, "// ======== internal data ========")?;
    writeln!(w)?;

    if music.format.instrument_table {
        write_instruments(w, music, name)?;
    }
    write_wavetables(w, music, name)?;
    write_channels(w, music, name)?;
    if music.format.virtual_tempo {
        write_speeds(w, music, name)?;
    }
    if music.format.groove_table {
        write_grooves(w, music, name)?;
    }
    write_music(w, music, name)?;

    Ok(())
}

/// Serialize music to a file on disk
///
/// Downstream build tooling must never pick up a truncated artifact, so on
/// any failure after the file was created it is removed again.
pub fn to_path<P>(music: &Music, name: &str, path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let result = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        to_writer(music, name, &mut writer)?;
        writer.flush()
    });

    if result.is_err() {
        let _ = fs::remove_file(path);
    }

    result
}

fn write_instruments<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    for (index, instrument) in music.instruments.iter().enumerate() {
        write_instrument(w, instrument, index, name)?;
    }

    if music.instruments.is_empty() {
        writeln!(
            w,
            "static const mnt_instrument *const {name}_instruments = NULL;"
        )?;
    } else {
        write!(w, "static const mnt_instrument {name}_instruments[] = {{")?;
        for index in 0..music.instruments.len() {
            if index % 4 == 0 {
                writeln!(w)?;
            }
            write!(w, "{name}_inst{index:02X},")?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;
    }

    Ok(())
}

fn write_instrument<W: Write>(
    w: &mut W,
    instrument: &EncodedInstrument,
    index: usize,
    name: &str,
) -> io::Result<()> {
    if let Some(gb) = &instrument.gb {
        write_gb(w, gb, index, name)?;
    }

    for (m, r#macro) in instrument.macros.iter().enumerate() {
        write_macro(w, r#macro, index, m, name)?;
    }

    if !instrument.macros.is_empty() {
        write!(w, "static const mnt_inst_macro {name}_inst{index:02X}_macros[] = {{")?;
        for m in 0..instrument.macros.len() {
            if m % 4 == 0 {
                writeln!(w)?;
            }
            write!(w, "{name}_inst{index:02X}_macro{m},")?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;
    }

    if let Some(synth) = &instrument.wave_synth {
        write_wave_synth(w, synth, index, name)?;
    }

    writeln!(w, "static const mnt_instrument {name}_inst{index:02X} = {{")?;
    writeln!(w, ".kind=MNT_INST_KIND_{},", instrument_kind_name(instrument.kind))?;
    writeln!(w, ".macros_count={},", instrument.macros.len())?;
    if instrument.gb.is_some() {
        writeln!(w, ".gb=&{name}_inst{index:02X}_gb,")?;
    } else {
        writeln!(w, ".gb=NULL,")?;
    }
    if instrument.macros.is_empty() {
        writeln!(w, ".macros=NULL,")?;
    } else {
        writeln!(w, ".macros={name}_inst{index:02X}_macros,")?;
    }
    if instrument.wave_synth.is_some() {
        writeln!(w, ".wave_synth=&{name}_inst{index:02X}_wave_synth,")?;
    } else {
        writeln!(w, ".wave_synth=NULL,")?;
    }
    writeln!(w, ".sample=NULL,")?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_gb<W: Write>(w: &mut W, gb: &GbInstrument, index: usize, name: &str) -> io::Result<()> {
    if gb.hw_seq.is_empty() {
        writeln!(
            w,
            "static const mnt_gb_hw_cmd *const {name}_inst{index:02X}_gb_hw_seq = NULL;"
        )?;
    } else {
        writeln!(
            w,
            "static const mnt_gb_hw_cmd {name}_inst{index:02X}_gb_hw_seq[] = {{"
        )?;
        for command in &gb.hw_seq {
            write_hw_command(w, command)?;
        }
        writeln!(w, "}};")?;
    }

    writeln!(w, "static const mnt_inst_gb {name}_inst{index:02X}_gb = {{")?;
    writeln!(w, ".initial_volume={},", gb.initial_volume)?;
    writeln!(w, ".envelope_length={},", gb.envelope_length)?;
    writeln!(w, ".sound_length={},", gb.sound_length)?;
    writeln!(w, ".envelope_direction_up={},", gb.direction_up)?;
    writeln!(w, ".always_init_envelope={},", gb.always_init)?;
    writeln!(w, ".software_envelope={},", gb.software_envelope)?;
    writeln!(w, ".hardware_sequence_length={},", gb.hw_seq.len())?;
    writeln!(w, ".hardware_sequence={name}_inst{index:02X}_gb_hw_seq,")?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_hw_command<W: Write>(w: &mut W, command: &HwCommand) -> io::Result<()> {
    write!(w, "{{.kind=MNT_GB_HW_CMD_KIND_")?;

    match command {
        HwCommand::Envelope {
            volume,
            envelope_length,
            sound_length,
            direction_up,
        } => {
            writeln!(w, "ENVELOPE,")?;
            writeln!(w, ".envelope={{")?;
            writeln!(w, ".volume={volume},")?;
            writeln!(w, ".envelope_length={envelope_length},")?;
            writeln!(w, ".sound_length={sound_length},")?;
            writeln!(w, ".direction_up={direction_up},")?;
            write!(w, "}},")?;
        }
        HwCommand::Sweep {
            shift,
            speed,
            direction_down,
        } => {
            writeln!(w, "SWEEP,")?;
            writeln!(w, ".sweep={{")?;
            writeln!(w, ".shift={shift},")?;
            writeln!(w, ".speed={speed},")?;
            writeln!(w, ".direction_down={direction_down},")?;
            write!(w, "}},")?;
        }
        HwCommand::Wait { length } => {
            writeln!(w, "WAIT,")?;
            writeln!(w, ".wait={{")?;
            writeln!(w, ".length={length},")?;
            write!(w, "}},")?;
        }
        HwCommand::WaitForRelease => {
            write!(w, "WAIT_FOR_RELEASE,")?;
        }
        HwCommand::Loop { position } => {
            writeln!(w, "LOOP,")?;
            writeln!(w, ".loop={{")?;
            writeln!(w, ".position={position},")?;
            write!(w, "}},")?;
        }
        HwCommand::LoopUntilRelease { position } => {
            writeln!(w, "LOOP_UNTIL_RELEASE,")?;
            writeln!(w, ".loop_until_release={{")?;
            writeln!(w, ".position={position},")?;
            write!(w, "}},")?;
        }
    }

    writeln!(w, "}},")
}

fn write_macro<W: Write>(
    w: &mut W,
    r#macro: &EncodedMacro,
    index: usize,
    m: usize,
    name: &str,
) -> io::Result<()> {
    write!(
        w,
        "static const {} {name}_inst{index:02X}_macro{m}_data[] = {{",
        macro_element_type(&r#macro.data)
    )?;

    match &r#macro.data {
        MacroData::U8(data) => write_macro_steps(w, data)?,
        MacroData::I8(data) => write_macro_steps(w, data)?,
        MacroData::I16(data) => write_macro_steps(w, data)?,
        MacroData::Bool(data) => write_macro_steps(w, data)?,
        MacroData::Arpeggio(data) => {
            for (k, step) in data.iter().enumerate() {
                if k % 16 == 0 {
                    writeln!(w)?;
                }
                write!(w, "{},{},", step.offset(), step.fixed)?;
            }
        }
    }

    writeln!(w)?;
    writeln!(w, "}};")?;

    writeln!(w, "static const mnt_inst_macro {name}_inst{index:02X}_macro{m} = {{")?;
    writeln!(w, ".kind=MNT_MACRO_KIND_{},", macro_kind_name(r#macro.kind))?;
    writeln!(w, ".mode={},", r#macro.mode)?;
    writeln!(w, ".length={},", r#macro.data.len())?;
    writeln!(w, ".loop_pos={},", r#macro.loop_pos.unwrap_or(0xFF))?;
    writeln!(w, ".release_pos={},", r#macro.release_pos.unwrap_or(0xFF))?;
    writeln!(w, ".delay={},", r#macro.delay)?;
    writeln!(w, ".speed={},", r#macro.speed)?;
    writeln!(w, ".data={name}_inst{index:02X}_macro{m}_data,")?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_macro_steps<W: Write, T: std::fmt::Display>(w: &mut W, data: &[T]) -> io::Result<()> {
    for (k, value) in data.iter().enumerate() {
        if k % 16 == 0 {
            writeln!(w)?;
        }
        write!(w, "{value},")?;
    }

    Ok(())
}

fn write_wave_synth<W: Write>(
    w: &mut W,
    synth: &WaveSynth,
    index: usize,
    name: &str,
) -> io::Result<()> {
    writeln!(
        w,
        "static const mnt_inst_wave_synth {name}_inst{index:02X}_wave_synth = {{"
    )?;
    writeln!(w, ".kind=MNT_WAVE_SYNTH_KIND_{},", wave_synth_kind_name(synth.kind))?;
    writeln!(w, ".global={},", synth.global)?;
    writeln!(w, ".wave_1={},", synth.wave_1)?;
    writeln!(w, ".wave_2={},", synth.wave_2)?;
    writeln!(w, ".rate_divider={},", synth.rate_divider)?;
    writeln!(w, ".speed={},", synth.speed)?;
    writeln!(w, ".amount={},", synth.amount)?;
    writeln!(w, ".power={},", synth.power)?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_wavetables<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    for (index, wavetable) in music.wavetables.iter().enumerate() {
        write!(w, "static const uint32_t {name}_wt{index}_data[] = {{")?;
        for (i, word) in wavetable.words.iter().enumerate() {
            if i % 4 == 0 {
                writeln!(w)?;
            }
            write!(w, "0x{word:08x},")?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;
    }

    if music.wavetables.is_empty() {
        writeln!(
            w,
            "static const mnt_wavetable *const {name}_wavetables = NULL;"
        )?;
    } else {
        writeln!(w, "static const mnt_wavetable {name}_wavetables[] = {{")?;
        for (index, wavetable) in music.wavetables.iter().enumerate() {
            writeln!(
                w,
                "{{.width={}, .height={}, .data={name}_wt{index}_data}},",
                wavetable.width, wavetable.height
            )?;
        }
        writeln!(w, "}};")?;
    }

    Ok(())
}

fn write_channels<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    for (c, channel) in music.channels.iter().enumerate() {
        // Channels are 1-based in the driver (PU1, PU2, WAV, NOI)
        let c = c + 1;

        for pattern in &channel.patterns {
            write_pattern(w, pattern, c, name)?;
        }

        write!(w, "static const mnt_pattern *const {name}_ch{c}_ord[] = {{")?;
        for (i, &slot) in channel.order.iter().enumerate() {
            if i % 4 == 0 {
                writeln!(w)?;
            }
            write!(w, "&{name}_ch{c}_pt{:02X},", channel.patterns[slot].index)?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;
    }

    Ok(())
}

fn write_pattern<W: Write>(
    w: &mut W,
    pattern: &EncodedPattern,
    c: usize,
    name: &str,
) -> io::Result<()> {
    let index = pattern.index;

    match &pattern.data {
        None => writeln!(
            w,
            "static const uint8_t *const {name}_ch{c}_pt{index:02X}_data = NULL;"
        )?,
        Some(data) => {
            writeln!(
                w,
                "_Alignas(2) static const uint8_t {name}_ch{c}_pt{index:02X}_data[] = {{"
            )?;
            for row in data.chunks(pattern.flags.row_size()) {
                for byte in row {
                    write!(w, "0x{byte:02X},")?;
                }
                writeln!(w)?;
            }
            writeln!(w, "}};")?;
        }
    }

    writeln!(w, "static const mnt_pattern {name}_ch{c}_pt{index:02X} = {{")?;
    writeln!(
        w,
        ".has_volume={}, .has_note={}, .has_instrument={},",
        pattern.flags.has_volume, pattern.flags.has_note, pattern.flags.has_instrument
    )?;
    writeln!(
        w,
        ".max_effects_count={}, .data={name}_ch{c}_pt{index:02X}_data,",
        pattern.flags.max_effects
    )?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_speeds<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    writeln!(w, "static const uint8_t {name}_speeds[] = {{")?;
    for speed in &music.speeds {
        write!(w, "{speed},")?;
    }
    writeln!(w)?;
    writeln!(w, "}};")?;

    Ok(())
}

fn write_grooves<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    for (index, groove) in music.grooves.iter().enumerate() {
        writeln!(w, "static const uint8_t {name}_grv{index}_data[] = {{")?;
        for step in groove {
            write!(w, "{step},")?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;

        writeln!(w, "static const mnt_groove {name}_grv{index} = {{")?;
        writeln!(w, ".length={},", groove.len())?;
        writeln!(w, ".data={name}_grv{index}_data,")?;
        writeln!(w, "}};")?;
    }

    if music.grooves.is_empty() {
        writeln!(w, "static const mnt_groove *const {name}_grooves = NULL;")?;
    } else {
        write!(w, "static const mnt_groove {name}_grooves[] = {{")?;
        for index in 0..music.grooves.len() {
            if index % 4 == 0 {
                writeln!(w)?;
            }
            write!(w, "{name}_grv{index},")?;
        }
        writeln!(w)?;
        writeln!(w, "}};")?;
    }

    Ok(())
}

fn write_music<W: Write>(w: &mut W, music: &Music, name: &str) -> io::Result<()> {
    let Format {
        instrument_table,
        groove_table,
        virtual_tempo,
        ..
    } = music.format;

    writeln!(w)?;
    writeln!(w)?;
    writeln!(w, "// ======== result ========")?;
    writeln!(w, "const mnt_music {name} = {{")?;

    if virtual_tempo {
        writeln!(w, ".speeds={name}_speeds,")?;
        writeln!(w, ".speeds_length={},", music.speeds.len())?;
        writeln!(w, ".virtual_tempo_numerator={},", music.virtual_tempo.0)?;
        writeln!(w, ".virtual_tempo_denominator={},", music.virtual_tempo.1)?;
    } else {
        writeln!(w, ".speed={},", music.speeds[0])?;
    }

    if groove_table {
        writeln!(w, ".grooves_count={},", music.grooves.len())?;
        writeln!(w, ".grooves={name}_grooves,")?;
    }

    if instrument_table {
        writeln!(w, ".instruments_count={},", music.instruments.len())?;
    }
    writeln!(w, ".wavetables_count={},", music.wavetables.len())?;
    if instrument_table {
        writeln!(w, ".instruments={name}_instruments,")?;
    }
    writeln!(w, ".wavetables={name}_wavetables,")?;

    writeln!(w, ".order_length={},", music.order_length)?;
    writeln!(w, ".pattern_length={},", music.pattern_length)?;

    for c in 1..=music.channels.len() {
        writeln!(w, ".ch{c}_order={name}_ch{c}_ord,")?;
    }

    writeln!(w, "}};")?;

    Ok(())
}

fn instrument_kind_name(kind: InstrumentKind) -> &'static str {
    match kind {
        InstrumentKind::Gb => "GB",
        InstrumentKind::Sample => "SAMPLE",
        InstrumentKind::Other(_) => unreachable!("rejected during validation"),
    }
}

fn macro_kind_name(kind: MacroKind) -> &'static str {
    match kind {
        MacroKind::Volume => "VOL",
        MacroKind::Arpeggio => "ARP",
        MacroKind::Duty => "DUTY",
        MacroKind::Wave => "WAVE",
        MacroKind::PanLeft => "PAN_L",
        MacroKind::PanRight => "PAN_R",
        MacroKind::Pitch => "PITCH",
        MacroKind::PhaseReset => "PHASE_RESET",
    }
}

fn macro_element_type(data: &MacroData) -> &'static str {
    match data {
        MacroData::U8(_) => "uint8_t",
        MacroData::I8(_) | MacroData::Arpeggio(_) => "int8_t",
        MacroData::I16(_) => "int16_t",
        MacroData::Bool(_) => "bool",
    }
}

fn wave_synth_kind_name(kind: WaveSynthKind) -> &'static str {
    match kind {
        WaveSynthKind::None => "NONE",
        WaveSynthKind::Invert => "INVERT",
        WaveSynthKind::Add => "ADD",
        WaveSynthKind::Subtract => "SUBTRACT",
        WaveSynthKind::Average => "AVERAGE",
        WaveSynthKind::Phase => "PHASE",
        WaveSynthKind::Chorus => "CHORUS",
        WaveSynthKind::NoneDual => "NONE_DUAL",
        WaveSynthKind::Wipe => "WIPE",
        WaveSynthKind::Fade => "FADE",
        WaveSynthKind::PingPong => "PING_PONG",
        WaveSynthKind::Overlay => "OVERLAY",
        WaveSynthKind::NegativeOverlay => "NEGATIVE_OVERLAY",
        WaveSynthKind::Slide => "SLIDE",
        WaveSynthKind::Mix => "MIX",
        WaveSynthKind::PhaseMod => "PHASE_MOD",
    }
}

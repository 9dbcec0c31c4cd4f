use crate::utils::check_for_overwrite;
use anyhow::{Context, Result};
use clap::{ArgEnum, Args};
use minuet::{
    emit,
    encode::{encode, Format},
    module::Module,
};
use std::{fs::File, path::PathBuf};

/// Convert a tracker module into a compilable driver source file
#[derive(Args)]
#[clap(author, version)]
pub struct ConvertArgs {
    /// The path to the module to convert (a .json materialization)
    path: PathBuf,

    /// The output path; defaults to the input path with a .c extension
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// The exported C identifier; defaults to the output file stem
    #[clap(short, long)]
    name: Option<String>,

    /// The driver format generation to target
    #[clap(arg_enum, short, long, default_value = "v4")]
    format: FormatArg,
}

#[derive(ArgEnum, Clone, Copy)]
pub enum FormatArg {
    V1,
    V2,
    V3,
    V4,
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::V1 => Format::V1,
            FormatArg::V2 => Format::V2,
            FormatArg::V3 => Format::V3,
            FormatArg::V4 => Format::V4,
        }
    }
}

pub fn convert(args: ConvertArgs) -> Result<()> {
    let file = File::open(&args.path).context("Opening the module file failed")?;
    let module: Module = serde_json::from_reader(file).context("Parsing the module file failed")?;

    let output = match args.output {
        Some(output) => output,
        None => args.path.with_extension("c"),
    };

    let name = match args.name {
        Some(name) => name,
        None => output
            .file_stem()
            .context("Could not derive a variable name from the output path")?
            .to_string_lossy()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
    };

    check_for_overwrite(&output)?;

    let (music, diagnostics) = encode(&module, args.format.into())
        .context("The module cannot be encoded for the driver")?;

    for warning in diagnostics.warnings() {
        eprintln!("warning: {warning}");
    }

    emit::to_path(&music, &name, &output).context("Writing the output file failed")?;

    println!(
        "{} => {} ({} bytes in ROM)",
        args.path.to_string_lossy(),
        output.to_string_lossy(),
        music.size()
    );

    Ok(())
}

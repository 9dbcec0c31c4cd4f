use crate::utils::iter_files;
use anyhow::{Context, Result};
use clap::Args;
use minuet::{
    encode::{encode, Format},
    module::Module,
};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Inspect tracker modules for what the driver will store
#[derive(Args)]
pub struct InspectArgs {
    /// The path(s) to inspect
    path: Vec<PathBuf>,

    /// Search folders recursively
    #[clap(short, long)]
    recursive: bool,
}

pub fn inspect(args: &InspectArgs) -> Result<()> {
    for entry in iter_files(&args.path, args.recursive, &["json"]) {
        print(entry.path())?;
    }

    Ok(())
}

fn print(path: &Path) -> Result<()> {
    let file = File::open(path).context("Opening the module file failed")?;
    let module: Module = serde_json::from_reader(file).context("Parsing the module file failed")?;

    let filename = path.file_name().unwrap().to_string_lossy();

    match encode(&module, Format::LATEST) {
        Ok((music, diagnostics)) => {
            println!(
                "{filename:<32}{:>3} inst | {:>3} wt | {:>3} orders | {} bytes",
                music.instruments.len(),
                music.wavetables.len(),
                music.order_length,
                music.size()
            );

            for warning in diagnostics.warnings() {
                println!("    warning: {warning}");
            }
        }
        Err(error) => println!("{filename:<32}not encodable: {error}"),
    }

    Ok(())
}

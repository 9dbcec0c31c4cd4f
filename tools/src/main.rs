use anyhow::Result;
use clap::Parser;

use minuet_tools::convert::{convert, ConvertArgs};
use minuet_tools::inspect::{inspect, InspectArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
enum Cli {
    Convert(ConvertArgs),
    Inspect(InspectArgs),
}

fn main() -> Result<()> {
    match Cli::parse_from(wild::args()) {
        Cli::Convert(args) => convert(args),
        Cli::Inspect(args) => inspect(&args),
    }
}

//! # Minuet Tools
//!
//! The minuet sound driver plays tracker music on the [Game Boy Advance](https://en.wikipedia.org/wiki/Game_Boy_Advance) from compact, pointer-linked tables compiled straight into the ROM. This crate provides the command-line utility that produces those tables: it takes a parsed tracker module (as a `.json` materialization of the object model) and writes out a C source file for the driver to link against.
//!
//! ## Convert
//!
//! ```console
//! minuet-tools convert [OPTIONS] <PATH>
//!
//! ARGS:
//!     <PATH>    The path to the module to convert (a .json materialization)
//!
//! OPTIONS:
//!     -f, --format <FORMAT>    The driver format generation to target [default: v4]
//!     -h, --help               Print help information
//!     -n, --name <NAME>        The exported C identifier; defaults to the output file stem
//!     -o, --output <OUTPUT>    The output path; defaults to the input path with a .c extension
//! ```
//!
//! ### Example
//!
//! ```console
//! > minuet-tools convert overworld.json
//! overworld.json => overworld.c (3518 bytes in ROM)
//! ```
//!
//! ## Inspect
//!
//! ```console
//! minuet-tools inspect [OPTIONS] [PATH]...
//!
//! ARGS:
//!     <PATH>...    The path(s) to inspect
//!
//! OPTIONS:
//!     -h, --help         Print help information
//!     -r, --recursive    Search folders recursively
//! ```
//!
//! ### Example
//!
//! ```console
//! > minuet-tools inspect tracks/
//! overworld.json    2 inst |   1 wt |  14 orders | 3518 bytes
//! boss.json         5 inst |   3 wt |   9 orders | 5107 bytes
//! ```

pub mod convert;
pub mod inspect;
pub(crate) mod utils;

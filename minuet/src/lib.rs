//! Encoding parsed tracker modules into the compact, pointer-linked tables the
//! minuet sound driver plays back on Game Boy Advance hardware.
//!
//! This crate does not read any tracker file format itself. It starts from an
//! already-materialized [`module::Module`] object model, runs it through
//! [`encode::encode()`] and serializes the result with [`emit`] into a C
//! source file the driver links against.

pub mod diag;
pub mod emit;
pub mod encode;
pub mod module;

pub use ux::u4;

//! Provides input/output functionality for molecular file formats.
//!
//! This module contains file-format guessing from extensions and streaming
//! readers for multi-frame coordinate files. The readers share a trait-based
//! interface so that a host backend can pick one by [`formats::FileFormat`].

pub mod formats;
pub mod pdb;
pub mod traits;
pub mod xyz;

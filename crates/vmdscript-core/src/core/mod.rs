//! # Core Module
//!
//! This module provides the scripting layer over a molecular-visualization
//! host: the host capability itself, file-format handling, and the proxy
//! objects that give host handles an object-oriented interface.
//!
//! ## Architecture
//!
//! - **Host Boundary** ([`host`]) - The `HostBackend` trait and an in-memory host
//! - **File I/O** ([`io`]) - Format guessing and streaming trajectory readers
//! - **Proxy Objects** ([`objects`]) - Molecules, frames, selections and atoms
//! - **Selection Language** ([`select`]) - Parsing and evaluating selection text

pub mod host;
pub mod io;
pub mod objects;
pub mod select;

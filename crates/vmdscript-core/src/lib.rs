//! # vmdscript Core Library
//!
//! A scripting layer over molecular-visualization hosts, centered on a
//! bounded-memory trajectory analysis driver.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** The host capability ([`core::host::backend::HostBackend`])
//!   with an in-memory implementation, trajectory readers and format guessing,
//!   the atom selection language, and the thin proxy objects (`Molecule`,
//!   `Frames`, `Selection`, `Atom`, `MoleculeManager`) that forward every call
//!   to the host.
//!
//! - **[`engine`]: The Logic Core.** The `Analyzer` streams trajectory files
//!   through a frame container in windows of bounded size and hands every
//!   frame to registered observers and datasets through a `Step` cursor.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the two
//!   layers below, such as loading a structure, analyzing trajectories and
//!   writing the collected datasets.

pub mod core;
pub mod engine;
pub mod workflows;

//! # Host Module
//!
//! The boundary between the proxy objects and the visualization host that
//! actually owns molecular state.
//!
//! - [`backend`] defines the [`backend::HostBackend`] capability, the
//!   [`backend::MolId`] handle and the [`backend::HostError`] taxonomy.
//! - [`memory`] provides [`memory::MemoryHost`], an in-process host that keeps
//!   molecules in memory and reads XYZ and PDB trajectories itself. It backs
//!   the command-line tool and lets everything above the host be tested
//!   without a running visualization program.

pub mod backend;
pub mod memory;

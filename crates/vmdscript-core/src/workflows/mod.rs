//! # Workflows Module
//!
//! High-level entry points that tie the proxy layer in [`crate::core`] and
//! the analysis driver in [`crate::engine`] together.
//!
//! - **Analysis Workflow** ([`analyze`]) - Loads a structure into a fresh
//!   molecule, streams trajectories through it and writes the collected
//!   datasets.

pub mod analyze;

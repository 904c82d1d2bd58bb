//! # Proxy Objects
//!
//! Object-oriented wrappers over host handles. None of these types caches
//! mutable host state: each accessor is translated into a [`HostBackend`]
//! call, so a proxy is cheap to copy and always observes the host as it is.
//!
//! - [`molecule`] - [`molecule::Molecule`] and its [`molecule::LoadOptions`]
//! - [`frames`] - [`frames::Frames`], the frame list of a molecule
//! - [`manager`] - [`manager::MoleculeManager`], lookup by id or name
//! - [`selection`] - [`selection::Selection`], [`selection::Atom`] and
//!   [`selection::FrameRef`]
//!
//! [`HostBackend`]: crate::core::host::backend::HostBackend

pub mod frames;
pub mod manager;
pub mod molecule;
pub mod selection;

//! # Engine Module
//!
//! This module drives trajectory analyses: trajectory files are streamed
//! through a [`container::FrameContainer`] in bounded windows and every frame
//! is handed to user observers.
//!
//! ## Overview
//!
//! An [`analyzer::Analyzer`] owns a container (usually a
//! [`Molecule`](crate::core::objects::molecule::Molecule) proxy) and an
//! [`config::AnalyzerConfig`]. For each input file it loads a window of
//! `sampling_step * window_size` source frames, keeping every
//! `sampling_step`-th frame, walks the resident frames with a
//! [`step::Step`] cursor, and drops them again before the next window.
//! Memory use therefore never exceeds `window_size` frames, however long the
//! trajectories are.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Input files, sampling step and window size
//! - **Containers** ([`container`]) - Window requests and the container abstraction
//! - **Cursor** ([`step`]) - Global and in-window frame counters
//! - **Observers** ([`observer`], [`dataset`]) - Per-frame callbacks and collected datasets
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Analysis error types

pub mod analyzer;
pub mod config;
pub mod container;
pub mod dataset;
pub mod error;
pub mod observer;
pub mod progress;
pub mod step;

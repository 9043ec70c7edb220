//! # Snaplog
//!
//! Composition root: loads configuration, initialises tracing, wires the
//! infrastructure and platform adapters into the use cases and drives the
//! process lifecycle.

pub mod bootstrap;

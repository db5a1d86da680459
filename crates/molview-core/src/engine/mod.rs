//! # Measurement Engine
//!
//! Combinatorial enumeration of distance, angle, and torsion measurements
//! over atom selections (see [`measure`]), with the option set and unit
//! handling in [`config`] and the resolved tuple type in [`measurement`].

pub mod config;
pub mod measure;
pub mod measurement;

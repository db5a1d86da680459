//! # Core Module
//!
//! The fundamental building blocks of the visualization data model.
//!
//! ## Overview
//!
//! - **Molecular representation** ([`models`]) - atoms, bonds, groups,
//!   chains, models, and the arena that owns them
//! - **Selections** ([`selection`]) - dense bit-set membership structures
//!   over atom and bond indices
//! - **Geometry** ([`utils`]) - distance/angle/torsion math shared by the
//!   measurement engine

pub mod models;
pub mod selection;
pub mod utils;

//! # molview Core Library
//!
//! The structural backbone of a molecular visualization tool: a hierarchical
//! data model of atoms, bonds, groups (residues), chains, and models/frames,
//! together with an engine that derives geometric measurements (distances,
//! angles, torsions) from atom *selections* rather than fixed atom indices.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency direction:
//!
//! - **[`core`]: The Foundation.** Arena-owned data models
//!   (`MolecularSystem` and its atoms, bonds, chains, models), bit-set
//!   selections, and pure geometry helpers. Atoms and bonds live in flat
//!   arrays and are addressed by stable integer indices everywhere; deletion
//!   is a single index-rewrite pass rather than a pointer-chasing hazard.
//!
//! - **[`engine`]: The Measurement Logic.** A recursive, constraint-filtered
//!   enumerator that expands ordered selection specs into concrete atom
//!   tuples, applies connectivity/intramolecular/range filters, and reports
//!   either formatted measurement strings or per-atom minimum distances.
//!
//! File parsing, secondary-structure assignment, rendering, and scripting are
//! external collaborators: they hand this crate pre-built selections and
//! consume measurement results.

pub mod core;
pub mod engine;

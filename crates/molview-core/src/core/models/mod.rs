//! # Core Models Module
//!
//! Data structures representing molecular structure for visualization.
//!
//! ## Overview
//!
//! All atoms and bonds of a loaded structure are kept as flat arrays owned by
//! [`system::MolecularSystem`]. A [`model::Model`] is therefore *not* atoms
//! and bonds: it is a description of the chains (as defined in the source
//! file) and their associated groups, plus trajectory linkage and per-frame
//! metadata. Bonds, chains, and models hold integer indices into the shared
//! arrays, never owning copies, so deleting atoms is a pure index-rewrite
//! pass (`fix_indices`) over the whole hierarchy.
//!
//! ## Key Components
//!
//! - [`atom`] - a single arena entry with element, coordinates, and bond list
//! - [`bond`] - an edge between two atoms with a bit-packed order field
//! - [`group`] - the residue-level selection glue (seqcode + atom range)
//! - [`chain`] - ordered groups sharing one chain identifier within a model
//! - [`model`] - one structural/coordinate frame
//! - [`bio`] - default no-op hooks overridden by the bio-structure layer
//! - [`system`] - the arena owner and mutation entry point
//! - [`builder`] - fluent programmatic construction
//! - [`element`] - element-number to symbol lookup

pub mod atom;
pub mod bio;
pub mod bond;
pub mod builder;
pub mod chain;
pub mod element;
pub mod group;
pub mod model;
pub mod system;

use thiserror::Error;

/// Errors raised by structural mutation of a [`system::MolecularSystem`].
///
/// Query paths never produce these; malformed queries degrade to empty
/// results instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("model {model_index} is frozen; no chains may be added")]
    ModelFrozen { model_index: usize },

    #[error("atom index {index} out of range (atom count {count})")]
    AtomOutOfRange { index: usize, count: usize },

    #[error("bond index {index} out of range (bond count {count})")]
    BondOutOfRange { index: usize, count: usize },

    #[error("model index {index} out of range (model count {count})")]
    ModelOutOfRange { index: usize, count: usize },
}

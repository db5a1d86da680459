//! # Selection Module
//!
//! Bit-set membership structures over atom and bond indices. Selections are
//! produced by external query layers (the script compiler, picking, etc.)
//! and consumed read-only by the measurement engine; index-fixup after atom
//! deletion re-packs them via [`AtomSet::delete_bits`].

pub mod atom_set;
pub mod bond_set;

pub use atom_set::AtomSet;
pub use bond_set::BondSet;

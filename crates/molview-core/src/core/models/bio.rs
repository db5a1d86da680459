//! # Biopolymer Hooks
//!
//! Seam between the plain structural model and a richer biopolymer-aware
//! model. Secondary-structure assignment, hydrogen-bond calculation, and
//! sequence queries are owned by an external collaborator; the defaults
//! here are the no-op behavior of a model with no polymers.

use super::model::Model;
use crate::core::selection::AtomSet;

pub trait BioModelHooks {
    /// Recomputes secondary structure for the model's polymers.
    fn calculate_structures(&mut self, _as_dssp: bool) -> String {
        String::new()
    }

    fn bio_polymer_count(&self) -> usize {
        0
    }

    /// Rasmol-style backbone hydrogen bonds between the two selections.
    fn rasmol_hydrogen_bonds(
        &mut self,
        _bs_a: &AtomSet,
        _bs_b: &AtomSet,
        _nucleic_only: bool,
    ) -> usize {
        0
    }

    fn clear_bio_polymers(&mut self) {}

    fn calc_selected_monomers_count(&mut self, _selection: &AtomSet) {}

    /// Atoms of all groups within `distance` residues of the selection.
    fn groups_within(&self, _distance: i32, _selection: &AtomSet, _result: &mut AtomSet) {}

    /// Atoms whose one-letter sequence matches `spec`.
    fn sequence_bits(&self, _spec: &str, _selection: &AtomSet, _result: &mut AtomSet) {}

    /// Atoms belonging to the given alternate conformation.
    fn pdb_conformation(&self, _conformation_index: i32, _result: &mut AtomSet) {}
}

impl BioModelHooks for Model {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn plain_models_have_no_polymers() {
        let mut model = Model::new(0, None, None, HashMap::new());
        assert_eq!(model.bio_polymer_count(), 0);
        assert_eq!(model.calculate_structures(true), "");
        let mut result = AtomSet::new();
        model.sequence_bits("GA", &AtomSet::new(), &mut result);
        assert!(result.is_empty());
    }
}

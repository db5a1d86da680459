use super::atom::Atom;
use super::bond::BondOrder;
use super::chain::Chain;
use super::group::{Group, seqcode_of};
use super::model::Model;
use super::system::MolecularSystem;
use nalgebra::Point3;
use serde_json::Value;
use std::collections::HashMap;

/// Fluent, programmatic construction of a [`MolecularSystem`].
///
/// Call order is model, then chain, then group, then atoms;
/// `build()` finalizes every model (sizing, bit-sets, freeze) and runs
/// molecule assignment. Misuse (adding an atom with no open group) is a
/// programming error and panics.
pub struct SystemBuilder {
    system: MolecularSystem,

    // --- Builder-specific state for efficient construction ---
    chain_id_map: HashMap<(usize, char), usize>,
    current_model_idx: Option<usize>,
    current_chain_idx: Option<usize>,
    group_open: bool,
}

impl Default for SystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self {
            system: MolecularSystem::new(),
            chain_id_map: HashMap::new(),
            current_model_idx: None,
            current_chain_idx: None,
            group_open: false,
        }
    }

    /// Opens a new model/frame. `trajectory_base` links a trajectory frame
    /// to an earlier topology; `data_remark` marks a data frame.
    pub fn start_model(
        &mut self,
        trajectory_base: Option<usize>,
        data_remark: Option<&str>,
    ) -> &mut Self {
        let model_index = self.system.models().len();
        let mut model = Model::new(model_index, trajectory_base, data_remark, HashMap::new());
        model.first_atom_index = self.system.atom_count();
        self.system.push_model(model);
        self.current_model_idx = Some(model_index);
        self.current_chain_idx = None;
        self.group_open = false;
        self
    }

    pub fn with_auxiliary_info(&mut self, key: &str, value: Value) -> &mut Self {
        let model_idx = self
            .current_model_idx
            .expect("Must start a model before attaching auxiliary info");
        self.system.models[model_idx]
            .auxiliary_info
            .insert(key.to_string(), value);
        self
    }

    /// Opens (or re-enters) the chain `id` in the current model.
    pub fn start_chain(&mut self, id: char) -> &mut Self {
        let model_idx = self
            .current_model_idx
            .expect("Must start a model before starting a chain");
        let model = &mut self.system.models[model_idx];
        let idx = *self.chain_id_map.entry((model_idx, id)).or_insert_with(|| {
            let index = model.chains.len();
            model.chains.push(Chain::new(model_idx, id));
            index
        });
        self.current_chain_idx = Some(idx);
        self.group_open = false;
        self
    }

    pub fn start_group(
        &mut self,
        name: &str,
        sequence_number: i32,
        insertion_code: char,
        is_hetero: bool,
    ) -> &mut Self {
        let model_idx = self
            .current_model_idx
            .expect("Must start a model before starting a group");
        let chain_idx = self
            .current_chain_idx
            .expect("Must start a chain before starting a group");
        let first = self.system.atom_count();
        let mut group = Group::new(name, seqcode_of(sequence_number, insertion_code), first, first);
        group.is_hetero = is_hetero;
        if insertion_code != '\0' {
            self.system.models[model_idx].n_insertions += 1;
        }
        self.system.models[model_idx].chains[chain_idx].groups.push(group);
        self.group_open = true;
        self
    }

    /// Adds an atom to the open group; returns the builder, the atom's
    /// arena index being the current atom count minus one.
    pub fn add_atom(&mut self, element: u8, position: Point3<f64>) -> &mut Self {
        let model_idx = self
            .current_model_idx
            .expect("Cannot add atom without a current model");
        let chain_idx = self
            .current_chain_idx
            .expect("Cannot add atom without a current chain");
        assert!(self.group_open, "Cannot add atom without a current group");

        let mut atom = Atom::new(element, model_idx, position);
        let is_hetero = self.system.models[model_idx].chains[chain_idx]
            .groups
            .last()
            .expect("group was opened")
            .is_hetero;
        atom.is_hetero = is_hetero;
        let atom_idx = self.system.push_atom(atom);
        self.system.models[model_idx].chains[chain_idx]
            .groups
            .last_mut()
            .expect("group was opened")
            .last_atom_index = atom_idx;
        if element == 1 {
            self.system.models[model_idx].hydrogen_count += 1;
        }
        let model = &mut self.system.models[model_idx];
        model.bs_atoms.set(atom_idx);
        model.atom_count += 1;
        self
    }

    pub fn add_bond(&mut self, atom1: usize, atom2: usize, order: BondOrder) -> &mut Self {
        self.system
            .add_bond(atom1, atom2, order, 0, 0)
            .expect("Atom for bond not found");
        self
    }

    /// Freezes every model and assigns molecule indices.
    pub fn build(mut self) -> MolecularSystem {
        for model in &mut self.system.models {
            model.freeze();
        }
        self.system.assign_molecule_indices();
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Point3<f64> {
        Point3::new(x, 0.0, 0.0)
    }

    #[test]
    fn builds_a_two_model_system() {
        let mut builder = SystemBuilder::new();
        builder
            .start_model(None, None)
            .start_chain('A')
            .start_group("GLY", 1, '\0', false)
            .add_atom(7, p(0.0))
            .add_atom(6, p(1.0))
            .start_group("HOH", 2, '\0', true)
            .add_atom(8, p(5.0));
        builder
            .start_model(None, None)
            .start_chain('A')
            .start_group("ALA", 1, '\0', false)
            .add_atom(6, p(0.0))
            .add_atom(6, p(1.5));
        builder.add_bond(0, 1, BondOrder::COVALENT_SINGLE);
        builder.add_bond(3, 4, BondOrder::COVALENT_SINGLE);
        let system = builder.build();

        assert_eq!(system.atom_count(), 5);
        assert_eq!(system.model_count(), 2);
        let model0 = system.model(0).unwrap();
        assert_eq!(model0.first_atom_index, 0);
        assert_eq!(model0.atom_count, 3);
        assert!(model0.is_frozen());
        assert_eq!(model0.hydrogen_count, 0);
        let model1 = system.model(1).unwrap();
        assert_eq!(model1.first_atom_index, 3);
        assert_eq!(model1.atom_set().iter().collect::<Vec<_>>(), vec![3, 4]);

        let chain = model0.chain_by_id('A').unwrap();
        assert_eq!(chain.group_count(), 2);
        assert_eq!(chain.group(0).unwrap().atom_count(), 2);
        assert!(chain.group(1).unwrap().is_hetero);
        assert!(system.atom(2).unwrap().is_hetero);

        // Molecules: {0,1}, {2}, {3,4}.
        assert_eq!(system.atom(2).unwrap().molecule_index, 1);
        assert_eq!(system.model(1).unwrap().first_molecule_index, 2);
    }

    #[test]
    fn reentering_a_chain_appends_to_it() {
        let mut builder = SystemBuilder::new();
        builder
            .start_model(None, None)
            .start_chain('A')
            .start_group("GLY", 1, '\0', false)
            .add_atom(6, p(0.0))
            .start_chain('B')
            .start_group("ALA", 1, '\0', false)
            .add_atom(6, p(1.0))
            .start_chain('A')
            .start_group("SER", 2, '\0', false)
            .add_atom(6, p(2.0));
        let system = builder.build();
        let model = system.model(0).unwrap();
        assert_eq!(model.chain_count(true), 2);
        assert_eq!(model.chain_by_id('A').unwrap().group_count(), 2);
    }

    #[test]
    #[should_panic(expected = "Cannot add atom without a current chain")]
    fn add_atom_requires_a_chain() {
        let mut builder = SystemBuilder::new();
        builder.start_model(None, None).add_atom(6, p(0.0));
    }
}

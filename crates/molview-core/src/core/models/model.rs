use super::StructureError;
use super::chain::Chain;
use crate::core::selection::AtomSet;
use serde_json::Value;
use std::collections::HashMap;

/// One structural/coordinate frame.
///
/// All atoms and bonds live in the arenas owned by
/// [`MolecularSystem`](super::system::MolecularSystem); a model is a
/// description of the chains defined in the source file plus trajectory
/// linkage, per-frame metadata, and atom-count bookkeeping. A trajectory
/// frame shares its topology (chains, bonds) with the frame at
/// `trajectory_base_index` and differs only in coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// 0-based index of this model within the system.
    pub model_index: usize,
    /// 0-based index of the source file this model came from.
    pub file_index: usize,
    pub(crate) chains: Vec<Chain>,

    pub is_trajectory: bool,
    /// Equals `model_index` unless this frame shares topology with an
    /// earlier frame.
    pub trajectory_base_index: usize,
    /// The frame this model's data was derived from; starts at
    /// `model_index`.
    pub data_source_frame: usize,

    pub is_bio_model: bool,
    pub is_model_kit: bool,
    pub is_data_frame: bool,
    /// `"modelSet"`, or for data frames `"ramachandran"`, `"quaternion"`,
    /// or `"data"`.
    pub frame_type: String,

    /// First index of this model's atoms in the shared arena.
    pub first_atom_index: usize,
    /// Atom count including deleted atoms.
    pub atom_count: usize,
    pub(crate) bs_atoms: AtomSet,
    pub(crate) bs_atoms_deleted: AtomSet,

    pub hydrogen_count: usize,
    pub n_alt_locs: usize,
    pub n_insertions: usize,
    pub first_molecule_index: usize,
    pub molecule_count: usize,

    /// Loosely-typed per-frame annotations handed over by the loader.
    pub auxiliary_info: HashMap<String, Value>,

    pub(crate) group_count: Option<usize>,
    pub(crate) bond_count: Option<usize>,
    pub(crate) frozen: bool,
}

impl Model {
    /// Creates a model. `trajectory_base_index` is `Some` only for frames
    /// sharing an earlier frame's topology; `data_remark` marks data frames
    /// (e.g. a ramachandran or quaternion plot) and classifies
    /// [`frame_type`](Self::frame_type).
    pub fn new(
        model_index: usize,
        trajectory_base_index: Option<usize>,
        data_remark: Option<&str>,
        mut auxiliary_info: HashMap<String, Value>,
    ) -> Self {
        let is_trajectory = trajectory_base_index.is_some();
        let frame_type = match data_remark {
            None => "modelSet".to_string(),
            Some(remark) => {
                auxiliary_info.insert("dataRemark".to_string(), Value::String(remark.to_string()));
                auxiliary_info.insert("title".to_string(), Value::String(remark.to_string()));
                if remark.contains("ramachandran") {
                    "ramachandran".to_string()
                } else if remark.contains("quaternion") {
                    "quaternion".to_string()
                } else {
                    "data".to_string()
                }
            }
        };
        Self {
            model_index,
            file_index: 0,
            chains: Vec::new(),
            is_trajectory,
            trajectory_base_index: trajectory_base_index.unwrap_or(model_index),
            data_source_frame: model_index,
            is_bio_model: false,
            is_model_kit: false,
            is_data_frame: data_remark.is_some(),
            frame_type,
            first_atom_index: 0,
            atom_count: 0,
            bs_atoms: AtomSet::new(),
            bs_atoms_deleted: AtomSet::new(),
            hydrogen_count: 0,
            n_alt_locs: 0,
            n_insertions: 0,
            first_molecule_index: 0,
            molecule_count: 0,
            auxiliary_info,
            group_count: None,
            bond_count: None,
            frozen: false,
        }
    }

    pub fn chain(&self, chain_index: usize) -> Option<&Chain> {
        self.chains.get(chain_index)
    }

    pub fn chain_mut(&mut self, chain_index: usize) -> Option<&mut Chain> {
        self.chains.get_mut(chain_index)
    }

    pub fn chain_by_id(&self, chain_id: char) -> Option<&Chain> {
        self.chains.iter().rev().find(|c| c.chain_id == chain_id)
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Chain count; the solvent chain (`'\0'`) is hidden unless
    /// `count_solvent` is set and there is more than one chain.
    pub fn chain_count(&self, count_solvent: bool) -> usize {
        if self.chains.len() > 1
            && !count_solvent
            && self.chains.iter().any(|c| c.chain_id == '\0')
        {
            self.chains.len() - 1
        } else {
            self.chains.len()
        }
    }

    pub(crate) fn add_chain(&mut self, chain: Chain) -> Result<usize, StructureError> {
        if self.frozen {
            return Err(StructureError::ModelFrozen {
                model_index: self.model_index,
            });
        }
        self.group_count = None;
        self.chains.push(chain);
        Ok(self.chains.len() - 1)
    }

    /// Atom bit-set of this model (deleted atoms still present).
    pub fn atom_set(&self) -> &AtomSet {
        &self.bs_atoms
    }

    pub fn deleted_atom_set(&self) -> &AtomSet {
        &self.bs_atoms_deleted
    }

    pub fn true_atom_count(&self) -> usize {
        self.bs_atoms.cardinality() - self.bs_atoms_deleted.cardinality()
    }

    /// Total group count across chains; memoized until the next structural
    /// change.
    pub fn group_count(&mut self) -> usize {
        match self.group_count {
            Some(n) => n,
            None => {
                let n = self.chains.iter().map(Chain::group_count).sum();
                self.group_count = Some(n);
                n
            }
        }
    }

    /// Group count filtered by hetero flag; never cached.
    pub fn group_count_hetero(&self, is_hetero: bool) -> usize {
        self.chains
            .iter()
            .flat_map(|c| c.groups())
            .filter(|g| g.is_hetero == is_hetero)
            .count()
    }

    pub fn invalidate_group_count(&mut self) {
        self.group_count = None;
    }

    /// Drops the memoized per-model bond count; must be called on every
    /// bond mutation.
    pub fn reset_bond_count(&mut self) {
        self.bond_count = None;
    }

    /// Fills each chain's selected-group scratch counts.
    pub fn calc_selected_groups_count(&mut self, selection: &AtomSet) {
        for chain in &mut self.chains {
            chain.calc_selected_groups_count(selection);
        }
    }

    /// Finalizes sizing after load: trims over-allocated chain and group
    /// arrays and fixes the group-count cache. No chains may be added
    /// afterwards.
    pub fn freeze(&mut self) {
        self.chains.shrink_to_fit();
        for chain in &mut self.chains {
            chain.groups.shrink_to_fit();
        }
        self.group_count = None;
        self.group_count();
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Index fixup after `n_deleted` atoms were removed from the model at
    /// `deleted_model_index` (which precedes this one): frame references
    /// above the deleted model shift down, atom indices shrink by the
    /// deleted count, and the atom bit-sets are re-packed.
    pub fn fix_indices(
        &mut self,
        deleted_model_index: usize,
        n_deleted: usize,
        bs_deleted: &AtomSet,
    ) {
        if self.data_source_frame > deleted_model_index {
            self.data_source_frame -= 1;
        }
        if self.trajectory_base_index > deleted_model_index {
            self.trajectory_base_index -= 1;
        }
        self.first_atom_index -= n_deleted;
        for chain in &mut self.chains {
            chain.fix_indices(n_deleted);
        }
        self.bs_atoms.delete_bits(bs_deleted);
        self.bs_atoms_deleted.delete_bits(bs_deleted);
        self.reset_bond_count();
    }

    /// Informational text summary for the whole system, rendered from this
    /// model's point of view.
    pub fn chime_info(
        &self,
        atom_count: usize,
        bond_count: usize,
        model_count: usize,
        n_hetero: usize,
    ) -> String {
        let mut info = format!("\nNumber of Atoms ..... {}", atom_count - n_hetero);
        if n_hetero > 0 {
            info.push_str(&format!(" ({})", n_hetero));
        }
        info.push_str(&format!("\nNumber of Bonds ..... {}", bond_count));
        info.push_str(&format!("\nNumber of Models ...... {}", model_count));
        info
    }
}

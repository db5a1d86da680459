//! # Molecular System
//!
//! ## Overview
//!
//! Owner of the three arenas (atoms, bonds, models). Everything else in the
//! crate refers to entries by 0-based arena index, so any mutation that
//! moves entries (atom or bond deletion) runs its index-rewrite pass here,
//! in one place, before control returns to the caller. All cached counts
//! are invalidated by the mutation that makes them stale.

use super::StructureError;
use super::atom::Atom;
use super::bond::{Bond, BondOrder, STICKS_VISIBILITY_FLAG};
use super::element;
use super::model::Model;
use crate::core::selection::{AtomSet, BondSet};
use tracing::{debug, instrument};

/// The shared arenas plus every operation that must keep them consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolecularSystem {
    pub(crate) atoms: Vec<Atom>,
    pub(crate) bonds: Vec<Bond>,
    pub(crate) models: Vec<Model>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its arena index.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based atom index to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Retrieves an immutable reference to a bond by its arena index.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based bond index to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Bond)` if the bond exists, otherwise `None`.
    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    /// Retrieves an immutable reference to a model by its index.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based model index to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Model)` if the model exists, otherwise `None`.
    pub fn model(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    /// Retrieves a mutable reference to a model by its index.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based model index to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&mut Model)` if the model exists, otherwise `None`.
    pub fn model_mut(&mut self, index: usize) -> Option<&mut Model> {
        self.models.get_mut(index)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn hetero_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.is_hetero).count()
    }

    pub(crate) fn push_atom(&mut self, mut atom: Atom) -> usize {
        atom.index = self.atoms.len();
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub(crate) fn push_model(&mut self, model: Model) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    fn check_atom(&self, index: usize) -> Result<(), StructureError> {
        if index < self.atoms.len() {
            Ok(())
        } else {
            Err(StructureError::AtomOutOfRange {
                index,
                count: self.atoms.len(),
            })
        }
    }

    fn check_bond(&self, index: usize) -> Result<(), StructureError> {
        if index < self.bonds.len() {
            Ok(())
        } else {
            Err(StructureError::BondOutOfRange {
                index,
                count: self.bonds.len(),
            })
        }
    }

    fn is_sulfur_pair(&self, atom1: usize, atom2: usize) -> bool {
        self.atoms[atom1].element == element::SULFUR
            && self.atoms[atom2].element == element::SULFUR
    }

    /// Creates a bond between two existing atoms. The order is normalized
    /// (sulfur-pair flag, aromatic collapse), the bond is registered in both
    /// atoms' bond lists, and a nonzero `mad` makes it visible immediately.
    ///
    /// # Arguments
    ///
    /// * `atom1` - The index of the first endpoint atom.
    /// * `atom2` - The index of the second endpoint atom.
    /// * `order` - The requested bond order, normalized before storage.
    /// * `mad` - The visual diameter in milli-angstroms; `0` keeps the bond hidden.
    /// * `colix` - The palette color index for rendering.
    ///
    /// # Return
    ///
    /// Returns `Ok(index)` with the new bond's arena index, or a
    /// `StructureError` if either endpoint is out of range.
    pub fn add_bond(
        &mut self,
        atom1: usize,
        atom2: usize,
        order: BondOrder,
        mad: i16,
        colix: u16,
    ) -> Result<usize, StructureError> {
        self.check_atom(atom1)?;
        self.check_atom(atom2)?;
        let order = BondOrder::normalized(
            order.raw(),
            self.is_sulfur_pair(atom1, atom2),
            order,
        );
        let index = self.bonds.len();
        let mut bond = Bond::new(atom1, atom2, order, mad, colix);
        bond.index = index;
        self.bonds.push(bond);
        self.atoms[atom1].bonds.push(index);
        self.atoms[atom2].bonds.push(index);
        self.reset_bond_counts();
        if mad != 0 {
            self.set_bond_visibility(index, true)?;
        }
        Ok(index)
    }

    /// Re-sets a bond's order, keeping the packed-order invariants: the
    /// sulfur-pair flag is re-applied, a bare aromatic mask collapses, and
    /// the previous order's NEW flag is carried forward.
    pub fn set_bond_order(&mut self, index: usize, order: BondOrder) -> Result<(), StructureError> {
        self.check_bond(index)?;
        let bond = &self.bonds[index];
        let sulfur_pair = match (bond.atom1, bond.atom2) {
            (Some(a1), Some(a2)) => self.is_sulfur_pair(a1, a2),
            _ => false,
        };
        let previous = bond.order;
        self.bonds[index].order = BondOrder::normalized(order.raw(), sulfur_pair, previous);
        Ok(())
    }

    /// Sets a bond's visual diameter; a nonzero value displays the bond,
    /// zero hides it.
    pub fn set_bond_mad(&mut self, index: usize, mad: i16) -> Result<(), StructureError> {
        self.check_bond(index)?;
        self.bonds[index].mad = mad;
        self.set_bond_visibility(index, mad != 0)
    }

    pub fn set_bond_colix(&mut self, index: usize, colix: u16) -> Result<(), StructureError> {
        self.check_bond(index)?;
        self.bonds[index].colix = colix;
        Ok(())
    }

    /// Flips a bond's sticks visibility. Endpoint displayed-bond counters
    /// move only on an actual transition, so repeated calls with the same
    /// state are no-ops.
    pub fn set_bond_visibility(
        &mut self,
        index: usize,
        visible: bool,
    ) -> Result<(), StructureError> {
        self.check_bond(index)?;
        let bond = &mut self.bonds[index];
        if bond.is_visible() == visible {
            return Ok(());
        }
        if visible {
            bond.shape_visibility_flags |= STICKS_VISIBILITY_FLAG;
        } else {
            bond.shape_visibility_flags &= !STICKS_VISIBILITY_FLAG;
        }
        let endpoints = [bond.atom1, bond.atom2];
        for endpoint in endpoints.into_iter().flatten() {
            if visible {
                self.atoms[endpoint].displayed_bonds += 1;
            } else {
                self.atoms[endpoint].displayed_bonds -= 1;
            }
        }
        Ok(())
    }

    /// Debug identity line for a bond, 1-based:
    /// `"1 1 C#1 -- O#3 1.5"` (index, order number, endpoints, distance).
    pub fn bond_identity(&self, index: usize) -> Option<String> {
        let bond = self.bonds.get(index)?;
        let a1 = self.atoms.get(bond.atom1?)?;
        let a2 = self.atoms.get(bond.atom2?)?;
        Some(format!(
            "{} {} {} -- {} {}",
            index + 1,
            bond.order().number_string(),
            a1.info(),
            a2.info(),
            a1.distance(a2)
        ))
    }

    pub fn is_bonded(&self, atom1: usize, atom2: usize) -> bool {
        self.bond_between(atom1, atom2).is_some()
    }

    pub fn bond_between(&self, atom1: usize, atom2: usize) -> Option<usize> {
        let a = self.atoms.get(atom1)?;
        a.bonds
            .iter()
            .copied()
            .find(|&b| self.bonds[b].contains(atom2))
    }

    /// Per-model bond count, memoized on the model until the next bond
    /// mutation. A bond is counted for the model of its first endpoint.
    ///
    /// # Arguments
    ///
    /// * `model_index` - The 0-based model whose bonds are counted.
    ///
    /// # Return
    ///
    /// Returns `Ok(count)`, or `StructureError::ModelOutOfRange` for an
    /// unknown model.
    pub fn model_bond_count(&mut self, model_index: usize) -> Result<usize, StructureError> {
        let count = self.models.len();
        let model = self
            .models
            .get(model_index)
            .ok_or(StructureError::ModelOutOfRange {
                index: model_index,
                count,
            })?;
        if let Some(n) = model.bond_count {
            return Ok(n);
        }
        let n = self
            .bonds
            .iter()
            .filter(|b| {
                b.atom1
                    .is_some_and(|a| self.atoms[a].model_index == model_index)
            })
            .count();
        self.models[model_index].bond_count = Some(n);
        Ok(n)
    }

    fn reset_bond_counts(&mut self) {
        for model in &mut self.models {
            model.reset_bond_count();
        }
    }

    /// Removes the given bonds, compacts the bond arena, and rewrites every
    /// surviving bond index (arena positions and atom bond lists).
    #[instrument(skip_all, fields(n_bonds = bond_set.cardinality()))]
    pub fn delete_bonds(&mut self, bond_set: &BondSet) {
        if bond_set.cardinality() == 0 {
            return;
        }
        let deleted = bond_set.bonds();
        // Hidden bonds first so endpoint counters stay balanced, then the
        // endpoint references are dropped for good.
        for index in deleted.iter() {
            if index >= self.bonds.len() {
                continue;
            }
            // Infallible: index checked above.
            let _ = self.set_bond_visibility(index, false);
            self.bonds[index].delete_atom_references();
        }
        let mut remap = vec![usize::MAX; self.bonds.len()];
        let mut kept = Vec::with_capacity(self.bonds.len());
        for (old_index, mut bond) in std::mem::take(&mut self.bonds).into_iter().enumerate() {
            if deleted.get(old_index) {
                continue;
            }
            remap[old_index] = kept.len();
            bond.index = kept.len();
            kept.push(bond);
        }
        self.bonds = kept;
        for atom in &mut self.atoms {
            atom.bonds.retain(|&b| remap[b] != usize::MAX);
            for b in &mut atom.bonds {
                *b = remap[*b];
            }
        }
        self.reset_bond_counts();
        debug!(remaining = self.bonds.len(), "deleted bonds");
    }

    /// Removes the model at `model_index` together with the given atoms.
    /// Bonds touching a deleted atom are dropped first, both arenas are
    /// compacted, and every model after the deleted one is index-fixed.
    ///
    /// # Arguments
    ///
    /// * `model_index` - The model being removed.
    /// * `bs_deleted` - The atoms to delete, normally the model's full atom set.
    ///
    /// # Return
    ///
    /// Returns `Ok(())`, or a `StructureError` when the model or any listed
    /// atom is out of range.
    #[instrument(skip_all, fields(model_index = model_index, n_atoms = bs_deleted.cardinality()))]
    pub fn delete_atoms(
        &mut self,
        model_index: usize,
        bs_deleted: &AtomSet,
    ) -> Result<(), StructureError> {
        if model_index >= self.models.len() {
            return Err(StructureError::ModelOutOfRange {
                index: model_index,
                count: self.models.len(),
            });
        }
        let mut doomed_bonds = AtomSet::new();
        for atom_index in bs_deleted.iter() {
            self.check_atom(atom_index)?;
            for &b in &self.atoms[atom_index].bonds {
                doomed_bonds.set(b);
            }
        }
        self.delete_bonds(&BondSet::new(doomed_bonds));

        let n_deleted = bs_deleted.cardinality();
        let mut remap = vec![usize::MAX; self.atoms.len()];
        let mut kept = Vec::with_capacity(self.atoms.len() - n_deleted);
        for (old_index, mut atom) in std::mem::take(&mut self.atoms).into_iter().enumerate() {
            if bs_deleted.get(old_index) {
                continue;
            }
            remap[old_index] = kept.len();
            atom.index = kept.len();
            if atom.model_index > model_index {
                atom.model_index -= 1;
            }
            kept.push(atom);
        }
        self.atoms = kept;
        for bond in &mut self.bonds {
            bond.atom1 = bond.atom1.map(|a| remap[a]);
            bond.atom2 = bond.atom2.map(|a| remap[a]);
        }

        self.models.remove(model_index);
        for model in &mut self.models[model_index..] {
            model.model_index -= 1;
            model.fix_indices(model_index, n_deleted, bs_deleted);
        }
        debug!(
            atoms = self.atoms.len(),
            models = self.models.len(),
            "deleted model atoms"
        );
        Ok(())
    }

    /// Model membership of an arbitrary atom selection: bit `m` is set when
    /// the selection contains at least one atom of model `m`.
    ///
    /// # Arguments
    ///
    /// * `selection` - The atom selection to classify; out-of-range bits are ignored.
    ///
    /// # Return
    ///
    /// Returns a bitset over model indices.
    pub fn model_bitset(&self, selection: &AtomSet) -> AtomSet {
        let mut models = AtomSet::new();
        for atom_index in selection.iter() {
            if let Some(atom) = self.atoms.get(atom_index) {
                models.set(atom.model_index);
            }
        }
        models
    }

    /// Connected-component labeling over covalent bonds. Components never
    /// cross a model boundary; molecule indices ascend with the lowest atom
    /// index of each component.
    #[instrument(skip_all)]
    pub fn assign_molecule_indices(&mut self) {
        let mut visited = vec![false; self.atoms.len()];
        let mut molecule = 0usize;
        let mut stack = Vec::new();
        for start in 0..self.atoms.len() {
            if visited[start] {
                continue;
            }
            let model_index = self.atoms[start].model_index;
            visited[start] = true;
            stack.push(start);
            while let Some(i) = stack.pop() {
                self.atoms[i].molecule_index = molecule;
                for b in self.atoms[i].bonds.clone() {
                    let bond = &self.bonds[b];
                    if !bond.is_covalent() {
                        continue;
                    }
                    if let Some(j) = bond.other_atom(i)
                        && !visited[j]
                        && self.atoms[j].model_index == model_index
                    {
                        visited[j] = true;
                        stack.push(j);
                    }
                }
            }
            molecule += 1;
        }
        for m in 0..self.models.len() {
            let mut first = None;
            let mut count = 0;
            let mut last = None;
            for atom in self.atoms.iter().filter(|a| a.model_index == m) {
                if first.is_none() {
                    first = Some(atom.molecule_index);
                }
                if last != Some(atom.molecule_index) {
                    count += 1;
                    last = Some(atom.molecule_index);
                }
            }
            self.models[m].first_molecule_index = first.unwrap_or(0);
            self.models[m].molecule_count = count;
        }
        debug!(molecules = molecule, "assigned molecule indices");
    }
}

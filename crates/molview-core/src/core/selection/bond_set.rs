use super::atom_set::AtomSet;

/// A selection of bond indices, optionally paired with the atom indices the
/// selection was derived from.
///
/// The associated-atom projection is a convenience for callers that built
/// the selection from an atom-pair expression; it carries no ownership and
/// is not kept in sync with later mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondSet {
    bonds: AtomSet,
    associated_atoms: Option<Vec<usize>>,
}

impl BondSet {
    pub fn new(bonds: AtomSet) -> Self {
        Self {
            bonds,
            associated_atoms: None,
        }
    }

    pub fn with_associated_atoms(bonds: AtomSet, atoms: Vec<usize>) -> Self {
        Self {
            bonds,
            associated_atoms: Some(atoms),
        }
    }

    pub fn bonds(&self) -> &AtomSet {
        &self.bonds
    }

    pub fn associated_atoms(&self) -> Option<&[usize]> {
        self.associated_atoms.as_deref()
    }

    pub fn cardinality(&self) -> usize {
        self.bonds.cardinality()
    }
}

impl FromIterator<usize> for BondSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

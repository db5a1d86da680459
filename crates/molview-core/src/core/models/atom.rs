use super::element;
use nalgebra::Point3;

/// A single entry in the shared atom arena.
///
/// Atoms are owned exclusively by
/// [`MolecularSystem`](super::system::MolecularSystem) and addressed by their
/// 0-based `index` everywhere else in the crate; bonds, groups, and
/// selections never copy atom data. The color token and displayed-bond
/// counter are rendering bookkeeping that this crate stores but never
/// interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Position in the arena; rewritten when atoms are deleted and the arena
    /// is compacted.
    pub index: usize,
    /// Element number (16 = sulfur).
    pub element: u8,
    /// Index of the model/frame this atom belongs to.
    pub model_index: usize,
    /// Connected-component id, assigned by
    /// [`MolecularSystem::assign_molecule_indices`](super::system::MolecularSystem::assign_molecule_indices).
    pub molecule_index: usize,
    /// 3D coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Color-inheritance token.
    pub colix: u16,
    /// Whether this atom came from a hetero record.
    pub is_hetero: bool,
    /// Indices into the shared bond arena for every bond touching this atom.
    pub(crate) bonds: Vec<usize>,
    /// Number of currently displayed bonds touching this atom.
    pub displayed_bonds: u32,
}

impl Atom {
    pub fn new(element: u8, model_index: usize, position: Point3<f64>) -> Self {
        Self {
            index: 0,
            element,
            model_index,
            molecule_index: 0,
            position,
            colix: 0,
            is_hetero: false,
            bonds: Vec::new(),
            displayed_bonds: 0,
        }
    }

    /// Bond-arena indices of every bond touching this atom.
    pub fn bonds(&self) -> &[usize] {
        &self.bonds
    }

    /// Short identity label, e.g. `"C#5"` (1-based display index).
    pub fn info(&self) -> String {
        format!("{}#{}", element::symbol(self.element), self.index + 1)
    }

    pub fn distance(&self, other: &Atom) -> f64 {
        (self.position - other.position).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_defaults() {
        let atom = Atom::new(6, 0, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.element, 6);
        assert_eq!(atom.model_index, 0);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert!(atom.bonds().is_empty());
        assert_eq!(atom.displayed_bonds, 0);
        assert!(!atom.is_hetero);
    }

    #[test]
    fn info_uses_symbol_and_one_based_index() {
        let mut atom = Atom::new(8, 0, Point3::origin());
        atom.index = 4;
        assert_eq!(atom.info(), "O#5");
    }

    #[test]
    fn distance_between_atoms() {
        let a = Atom::new(6, 0, Point3::new(0.0, 0.0, 0.0));
        let b = Atom::new(6, 0, Point3::new(3.0, 4.0, 0.0));
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }
}

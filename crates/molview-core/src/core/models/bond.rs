use std::fmt;

/// Bit-packed bond order.
///
/// The low ten bits form the covalent field (including the aromatic and
/// sulfur flags), so aromatic and sulfur-marked bonds still count as
/// covalent. The NEW flag sits above everything else and survives every
/// re-set of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BondOrder(pub u32);

impl BondOrder {
    pub const COVALENT_SINGLE: BondOrder = BondOrder(1);
    pub const COVALENT_DOUBLE: BondOrder = BondOrder(2);
    pub const COVALENT_TRIPLE: BondOrder = BondOrder(3);

    pub const PARTIAL01: BondOrder = BondOrder(0x21);
    pub const PARTIAL12: BondOrder = BondOrder(0x42);
    pub const PARTIAL23: BondOrder = BondOrder(0x61);
    pub const PARTIAL32: BondOrder = BondOrder(0x64);
    pub const PARTIAL_MASK: u32 = 0x60;

    pub const SULFUR_MASK: u32 = 0x100;

    pub const AROMATIC_MASK: u32 = 0x200;
    pub const AROMATIC_SINGLE: BondOrder = BondOrder(0x201);
    pub const AROMATIC_DOUBLE: BondOrder = BondOrder(0x202);
    /// Canonical generic aromatic order; a raw order exactly equal to
    /// [`AROMATIC_MASK`](Self::AROMATIC_MASK) collapses to this value.
    pub const AROMATIC: BondOrder = BondOrder(0x203);

    pub const COVALENT_MASK: u32 = 0x3FF;

    pub const STEREO_MASK: u32 = 0x400;
    pub const STEREO_NEAR: BondOrder = BondOrder(0x401);
    pub const STEREO_FAR: BondOrder = BondOrder(0x402);

    pub const HYDROGEN_SHIFT: u32 = 11;
    pub const HYDROGEN_MASK: u32 = 0xF << Self::HYDROGEN_SHIFT;
    pub const HYDROGEN_REGULAR: BondOrder = BondOrder(1 << Self::HYDROGEN_SHIFT);

    /// Marks a bond created after load; carried forward across re-sets.
    pub const NEW: u32 = 0x20000;

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_covalent(self) -> bool {
        self.0 & Self::COVALENT_MASK != 0
    }

    pub fn is_hydrogen(self) -> bool {
        self.0 & Self::HYDROGEN_MASK != 0
    }

    pub fn is_stereo(self) -> bool {
        self.0 & Self::STEREO_MASK != 0
    }

    pub fn is_partial(self) -> bool {
        self.0 & Self::PARTIAL_MASK != 0
    }

    pub fn is_aromatic(self) -> bool {
        self.0 & Self::AROMATIC_MASK != 0
    }

    pub fn is_new(self) -> bool {
        self.0 & Self::NEW != 0
    }

    /// Compares bond types ignoring the NEW flag.
    pub fn is(self, order: BondOrder) -> bool {
        self.0 & !Self::NEW == order.0
    }

    /// 0 if not covalent; 1 for partial or generic-aromatic bonds;
    /// otherwise the low three bits of the order.
    pub fn valence(self) -> u32 {
        if !self.is_covalent() {
            0
        } else if self.is_partial() || self.is(Self::AROMATIC) {
            1
        } else {
            self.0 & 7
        }
    }

    /// Applies the normalization rules for (re)setting an order: the sulfur
    /// flag is forced for a sulfur-sulfur pair, a bare aromatic mask
    /// collapses to the canonical aromatic value, and the previous order's
    /// NEW flag is carried forward.
    pub fn normalized(raw: u32, sulfur_pair: bool, previous: BondOrder) -> BondOrder {
        let mut order = raw;
        if sulfur_pair {
            order |= Self::SULFUR_MASK;
        }
        if order == Self::AROMATIC_MASK {
            order = Self::AROMATIC.0;
        }
        BondOrder(order | (previous.0 & Self::NEW))
    }

    /// Conventional bond-order number used in identity strings.
    pub fn number_string(self) -> &'static str {
        if self.is_partial() {
            match BondOrder(self.0 & !Self::NEW & !Self::SULFUR_MASK) {
                Self::PARTIAL01 => "0.5",
                Self::PARTIAL12 => "1.5",
                Self::PARTIAL23 => "2.5",
                _ => "3.5",
            }
        } else if self.is_aromatic() {
            match BondOrder(self.0 & !Self::NEW & !Self::SULFUR_MASK) {
                Self::AROMATIC_SINGLE => "1",
                Self::AROMATIC_DOUBLE => "2",
                _ => "1.5",
            }
        } else if self.is_hydrogen() {
            "1"
        } else {
            match self.0 & 7 {
                2 => "2",
                3 => "3",
                _ => "1",
            }
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.number_string())
    }
}

/// The flag a bond sets in its `shape_visibility_flags` while its sticks
/// representation is displayed.
pub const STICKS_VISIBILITY_FLAG: u32 = 1;

/// An edge between two atoms in the shared arenas.
///
/// Endpoints are stored as arena indices and become `None` only through
/// [`delete_atom_references`](Bond::delete_atom_references); a deleted bond
/// never dangles. Mutations that must uphold cross-arena invariants (order
/// normalization, visibility counters) go through
/// [`MolecularSystem`](super::system::MolecularSystem).
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub(crate) atom1: Option<usize>,
    pub(crate) atom2: Option<usize>,
    pub(crate) order: BondOrder,
    /// Visual diameter, fixed-point (radius = mad / 2000).
    pub(crate) mad: i16,
    pub(crate) colix: u16,
    pub(crate) shape_visibility_flags: u32,
    pub(crate) index: usize,
}

impl Bond {
    pub(crate) fn new(atom1: usize, atom2: usize, order: BondOrder, mad: i16, colix: u16) -> Self {
        Self {
            atom1: Some(atom1),
            atom2: Some(atom2),
            order,
            mad,
            colix,
            shape_visibility_flags: 0,
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn atom1(&self) -> Option<usize> {
        self.atom1
    }

    pub fn atom2(&self) -> Option<usize> {
        self.atom2
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub fn mad(&self) -> i16 {
        self.mad
    }

    pub fn colix(&self) -> u16 {
        self.colix
    }

    pub fn shape_visibility_flags(&self) -> u32 {
        self.shape_visibility_flags
    }

    pub fn is_visible(&self) -> bool {
        self.shape_visibility_flags & STICKS_VISIBILITY_FLAG != 0
    }

    pub fn radius(&self) -> f64 {
        self.mad as f64 / 2000.0
    }

    pub fn contains(&self, atom_index: usize) -> bool {
        self.atom1 == Some(atom_index) || self.atom2 == Some(atom_index)
    }

    /// Returns the endpoint that is not `atom_index`, or `None` when the
    /// argument is neither endpoint.
    pub fn other_atom(&self, atom_index: usize) -> Option<usize> {
        if self.atom1 == Some(atom_index) {
            self.atom2
        } else if self.atom2 == Some(atom_index) {
            self.atom1
        } else {
            None
        }
    }

    pub fn is_covalent(&self) -> bool {
        self.order.is_covalent()
    }

    pub fn is_hydrogen(&self) -> bool {
        self.order.is_hydrogen()
    }

    pub fn valence(&self) -> u32 {
        self.order.valence()
    }

    /// Drops both endpoint references. Idempotent; the arena owner is
    /// responsible for removing this bond from the atoms' bond lists first.
    pub(crate) fn delete_atom_references(&mut self) {
        self.atom1 = None;
        self.atom2 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covalent_predicates_track_the_mask() {
        assert!(BondOrder::COVALENT_SINGLE.is_covalent());
        assert!(BondOrder::AROMATIC.is_covalent());
        assert!(!BondOrder::HYDROGEN_REGULAR.is_covalent());
        assert!(BondOrder::HYDROGEN_REGULAR.is_hydrogen());
        assert!(BondOrder::STEREO_NEAR.is_stereo());
        assert!(BondOrder::PARTIAL12.is_partial());
        assert!(BondOrder::AROMATIC_DOUBLE.is_aromatic());
    }

    #[test]
    fn valence_of_common_orders() {
        assert_eq!(BondOrder::COVALENT_SINGLE.valence(), 1);
        assert_eq!(BondOrder::COVALENT_DOUBLE.valence(), 2);
        assert_eq!(BondOrder::COVALENT_TRIPLE.valence(), 3);
        assert_eq!(BondOrder::AROMATIC.valence(), 1);
        assert_eq!(BondOrder::PARTIAL23.valence(), 1);
        assert_eq!(BondOrder::HYDROGEN_REGULAR.valence(), 0);
    }

    #[test]
    fn normalized_collapses_bare_aromatic_mask() {
        let order = BondOrder::normalized(BondOrder::AROMATIC_MASK, false, BondOrder::default());
        assert_eq!(order, BondOrder::AROMATIC);
    }

    #[test]
    fn normalized_forces_sulfur_flag_for_sulfur_pairs() {
        for raw in [
            BondOrder::COVALENT_SINGLE.0,
            BondOrder::COVALENT_DOUBLE.0,
            BondOrder::AROMATIC_MASK,
            BondOrder::PARTIAL01.0,
        ] {
            let order = BondOrder::normalized(raw, true, BondOrder::default());
            assert_ne!(order.0 & BondOrder::SULFUR_MASK, 0, "raw order {raw:#x}");
        }
    }

    #[test]
    fn normalized_carries_the_new_flag_forward() {
        let fresh = BondOrder(BondOrder::COVALENT_SINGLE.0 | BondOrder::NEW);
        let reset = BondOrder::normalized(BondOrder::COVALENT_DOUBLE.0, false, fresh);
        assert!(reset.is_new());
        assert!(reset.is(BondOrder::COVALENT_DOUBLE));
        let reset_again = BondOrder::normalized(BondOrder::AROMATIC_MASK, false, reset);
        assert!(reset_again.is_new());
        assert!(reset_again.is(BondOrder::AROMATIC));
    }

    #[test]
    fn is_ignores_the_new_flag() {
        let order = BondOrder(BondOrder::COVALENT_TRIPLE.0 | BondOrder::NEW);
        assert!(order.is(BondOrder::COVALENT_TRIPLE));
        assert!(!order.is(BondOrder::COVALENT_DOUBLE));
    }

    #[test]
    fn other_atom_returns_none_for_strangers() {
        let bond = Bond::new(3, 7, BondOrder::COVALENT_SINGLE, 200, 0);
        assert_eq!(bond.other_atom(3), Some(7));
        assert_eq!(bond.other_atom(7), Some(3));
        assert_eq!(bond.other_atom(11), None);
    }

    #[test]
    fn radius_is_half_the_fixed_point_diameter() {
        let bond = Bond::new(0, 1, BondOrder::COVALENT_SINGLE, 300, 0);
        assert!((bond.radius() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn delete_atom_references_is_idempotent() {
        let mut bond = Bond::new(0, 1, BondOrder::COVALENT_SINGLE, 0, 0);
        bond.delete_atom_references();
        assert_eq!(bond.atom1(), None);
        assert_eq!(bond.atom2(), None);
        bond.delete_atom_references();
        assert_eq!(bond.atom1(), None);
        assert_eq!(bond.atom2(), None);
    }
}

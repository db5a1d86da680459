use crate::core::selection::AtomSet;

const INSERTION_CODE_MASK: i32 = 0x7F;
const SEQUENCE_NUMBER_SHIFT: i32 = 8;

/// Sentinel seqcode: "no sequence code assigned".
pub const SEQCODE_NONE: i32 = i32::MIN;
/// Sentinel upper bound for range queries: "to the end of the chain".
pub const SEQCODE_UNBOUNDED: i32 = i32::MAX;

/// Packs a residue sequence number and insertion code into one seqcode.
pub fn seqcode_of(sequence_number: i32, insertion_code: char) -> i32 {
    (sequence_number << SEQUENCE_NUMBER_SHIFT) | (insertion_code as i32 & INSERTION_CODE_MASK)
}

pub fn sequence_number_of(seqcode: i32) -> i32 {
    if seqcode == SEQCODE_NONE {
        0
    } else {
        seqcode >> SEQUENCE_NUMBER_SHIFT
    }
}

pub fn insertion_code_of(seqcode: i32) -> char {
    if seqcode == SEQCODE_NONE {
        '\0'
    } else {
        char::from_u32((seqcode & INSERTION_CODE_MASK) as u32).unwrap_or('\0')
    }
}

/// Renders a seqcode as `"10"` or `"10^A"` when an insertion code is set.
pub fn seqcode_string(seqcode: i32) -> String {
    if seqcode == SEQCODE_NONE {
        return String::new();
    }
    let number = seqcode >> SEQUENCE_NUMBER_SHIFT;
    match seqcode & INSERTION_CODE_MASK {
        0 => number.to_string(),
        code => format!("{}^{}", number, char::from_u32(code as u32).unwrap_or('\0')),
    }
}

/// The residue-level selection glue.
///
/// A group owns a contiguous atom-index range within the shared arena plus
/// its sequence code; the chemistry of residues (monomer typing, polymer
/// membership) lives in an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Three-letter residue name from the source file (e.g. "GLY").
    pub name: String,
    /// Packed sequence number + insertion code.
    pub seqcode: i32,
    pub first_atom_index: usize,
    pub last_atom_index: usize,
    pub is_hetero: bool,
    /// Scratch slot filled by `Chain::calc_selected_groups_count`; -1 when
    /// the group is not in the current selection.
    pub selected_index: i32,
}

impl Group {
    pub fn new(name: &str, seqcode: i32, first_atom_index: usize, last_atom_index: usize) -> Self {
        Self {
            name: name.to_string(),
            seqcode,
            first_atom_index,
            last_atom_index,
            is_hetero: false,
            selected_index: -1,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.last_atom_index - self.first_atom_index + 1
    }

    /// Marks every atom of this group in `selection`.
    pub fn select_atoms(&self, selection: &mut AtomSet) {
        selection.set_range(self.first_atom_index, self.last_atom_index);
    }

    /// True when any atom of this group is in `selection`.
    pub fn is_selected(&self, selection: &AtomSet) -> bool {
        selection
            .next_set_bit(self.first_atom_index)
            .is_some_and(|bit| bit <= self.last_atom_index)
    }

    /// Shifts the atom range down after `n_deleted` atoms were removed
    /// below it.
    pub fn fix_indices(&mut self, n_deleted: usize) {
        self.first_atom_index -= n_deleted;
        self.last_atom_index -= n_deleted;
    }
}

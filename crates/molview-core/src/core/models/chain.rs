use super::group::{Group, SEQCODE_UNBOUNDED};
use crate::core::selection::AtomSet;

/// Outcome of [`Chain::select_seqcode_range`].
///
/// `Exact` carries `end_index + 1`, usable as the `start_index` of a
/// follow-up range query on the same chain. The other two variants are
/// terminal: an inexact fallback match cannot seed further chained queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqcodeRangeMatch {
    Exact(usize),
    Inexact,
    NotFound,
}

/// An ordered sequence of groups sharing one chain identifier within a
/// model. Groups are stored in file/sequence order; sequence codes are
/// normally monotonic but the range selection tolerates exceptions.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Index of the owning model.
    pub model_index: usize,
    /// Chain identifier; `'\0'` is reserved for solvent / "no chain".
    pub chain_id: char,
    pub(crate) groups: Vec<Group>,
    /// Scratch count filled by [`calc_selected_groups_count`](Self::calc_selected_groups_count).
    pub selected_group_count: usize,
    pub is_dna: bool,
    pub is_rna: bool,
}

impl Chain {
    pub fn new(model_index: usize, chain_id: char) -> Self {
        Self {
            model_index,
            chain_id,
            groups: Vec::new(),
            selected_group_count: 0,
            is_dna: false,
            is_rna: false,
        }
    }

    pub fn group(&self, group_index: usize) -> Option<&Group> {
        self.groups.get(group_index)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Resolves the sequence-code range `[seqcode_a, seqcode_b]` to a
    /// contiguous group-index range and marks every atom of every group in
    /// range into `out`.
    ///
    /// The start is found by a linear scan from `start_index`; when the scan
    /// misses and `start_index == 0`, the group with the smallest code
    /// strictly greater than `seqcode_a` is used instead (inexact). The end
    /// works symmetrically with the nearest code strictly less than
    /// `seqcode_b`; a `seqcode_b` of [`SEQCODE_UNBOUNDED`] means "last group"
    /// (inexact). Fallbacks never apply when `start_index > 0`; chained
    /// queries are strict.
    pub fn select_seqcode_range(
        &self,
        start_index: usize,
        seqcode_a: i32,
        seqcode_b: i32,
        out: &mut AtomSet,
    ) -> SeqcodeRangeMatch {
        let n = self.groups.len();
        if n == 0 {
            return SeqcodeRangeMatch::NotFound;
        }
        let mut inexact = false;

        let mut index_a = start_index;
        while index_a < n && self.groups[index_a].seqcode != seqcode_a {
            index_a += 1;
        }
        if index_a == n {
            if start_index > 0 {
                return SeqcodeRangeMatch::NotFound;
            }
            inexact = true;
            let mut min_diff = i64::MAX;
            let mut nearest = None;
            for (i, group) in self.groups.iter().enumerate().rev() {
                let diff = group.seqcode as i64 - seqcode_a as i64;
                if diff > 0 && diff < min_diff {
                    nearest = Some(i);
                    min_diff = diff;
                }
            }
            match nearest {
                Some(i) => index_a = i,
                None => return SeqcodeRangeMatch::NotFound,
            }
        }

        let index_b;
        if seqcode_b == SEQCODE_UNBOUNDED {
            index_b = n - 1;
            inexact = true;
        } else {
            let mut i = index_a;
            while i < n && self.groups[i].seqcode != seqcode_b {
                i += 1;
            }
            if i == n {
                if start_index > 0 {
                    return SeqcodeRangeMatch::NotFound;
                }
                inexact = true;
                let mut min_diff = i64::MAX;
                let mut nearest = None;
                for (j, group) in self.groups.iter().enumerate().skip(index_a) {
                    let diff = seqcode_b as i64 - group.seqcode as i64;
                    if diff > 0 && diff < min_diff {
                        nearest = Some(j);
                        min_diff = diff;
                    }
                }
                match nearest {
                    Some(j) => i = j,
                    None => return SeqcodeRangeMatch::NotFound,
                }
            }
            index_b = i;
        }

        for group in &self.groups[index_a..=index_b] {
            group.select_atoms(out);
        }
        if inexact {
            SeqcodeRangeMatch::Inexact
        } else {
            SeqcodeRangeMatch::Exact(index_b + 1)
        }
    }

    /// Fills each group's `selected_index` scratch slot and counts the
    /// selected groups, for coloring-by-group passes.
    pub fn calc_selected_groups_count(&mut self, selection: &AtomSet) {
        self.selected_group_count = 0;
        for group in &mut self.groups {
            group.selected_index = if group.is_selected(selection) {
                let index = self.selected_group_count as i32;
                self.selected_group_count += 1;
                index
            } else {
                -1
            };
        }
    }

    /// Marks every atom of every group of this chain into `out`.
    pub fn set_atom_bit_set(&self, out: &mut AtomSet) {
        for group in &self.groups {
            group.select_atoms(out);
        }
    }

    pub(crate) fn fix_indices(&mut self, n_deleted: usize) {
        for group in &mut self.groups {
            group.fix_indices(n_deleted);
        }
    }
}

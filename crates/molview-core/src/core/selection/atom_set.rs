use std::fmt;

const BITS: usize = 64;

/// A dense bit-set over 0-based arena indices.
///
/// This is the membership structure behind every selection in the crate:
/// ordered iteration, membership test, cardinality, boolean combination, and
/// the delete-bits compaction used when atoms are removed from the arena.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AtomSet {
    words: Vec<u64>,
}

impl AtomSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, index: usize) {
        let word = index / BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
    }

    pub fn set(&mut self, index: usize) {
        self.ensure(index);
        self.words[index / BITS] |= 1 << (index % BITS);
    }

    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / BITS) {
            *word &= !(1 << (index % BITS));
        }
    }

    pub fn get(&self, index: usize) -> bool {
        self.words
            .get(index / BITS)
            .is_some_and(|word| word & (1 << (index % BITS)) != 0)
    }

    /// Sets every index in `first..=last`.
    pub fn set_range(&mut self, first: usize, last: usize) {
        for i in first..=last {
            self.set(i);
        }
    }

    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// The smallest set index `>= from`, if any.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let mut word_index = from / BITS;
        if word_index >= self.words.len() {
            return None;
        }
        let mut word = self.words[word_index] & (!0u64 << (from % BITS));
        loop {
            if word != 0 {
                return Some(word_index * BITS + word.trailing_zeros() as usize);
            }
            word_index += 1;
            if word_index >= self.words.len() {
                return None;
            }
            word = self.words[word_index];
        }
    }

    /// Iterates set indices in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { set: self, next: 0 }
    }

    pub fn or(&mut self, other: &AtomSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    pub fn and(&mut self, other: &AtomSet) {
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= other.words.get(i).copied().unwrap_or(0);
        }
    }

    pub fn and_not(&mut self, other: &AtomSet) {
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= !other.words.get(i).copied().unwrap_or(0);
        }
    }

    pub fn intersects(&self, other: &AtomSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(w, o)| w & o != 0)
    }

    /// Removes the positions in `deleted` and re-packs the remaining bits:
    /// every surviving index shifts down by the number of deleted positions
    /// below it.
    pub fn delete_bits(&mut self, deleted: &AtomSet) {
        let deleted_positions: Vec<usize> = deleted.iter().collect();
        if deleted_positions.is_empty() {
            return;
        }
        let mut result = AtomSet::new();
        for i in self.iter() {
            if deleted.get(i) {
                continue;
            }
            let shift = deleted_positions.partition_point(|&d| d < i);
            result.set(i - shift);
        }
        *self = result;
    }
}

pub struct Iter<'a> {
    set: &'a AtomSet,
    next: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self.set.next_set_bit(self.next)?;
        self.next = found + 1;
        Some(found)
    }
}

impl FromIterator<usize> for AtomSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = AtomSet::new();
        for i in iter {
            set.set(i);
        }
        set
    }
}

impl Extend<usize> for AtomSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for i in iter {
            self.set(i);
        }
    }
}

impl fmt::Debug for AtomSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

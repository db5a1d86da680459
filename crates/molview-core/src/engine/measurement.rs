//! # Measurement Record
//!
//! A single resolved tuple of 2 to 4 measurement points plus its scalar
//! value. Records are transient: the enumeration in
//! [`measure`](crate::engine::measure) builds, scores, reports, and
//! discards them without retaining any.

use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry;
use crate::engine::config::{DistanceUnit, RangeFilter};
use nalgebra::Point3;

/// A concrete measurement tuple.
///
/// Each slot is either a resolved atom (`indices[i] >= 0`), unset (`-1`),
/// or a literal coordinate (`indices[i] <= -2`, with the coordinate in
/// `points[i]`). The literal encoding `-2 - i` keeps slots distinct so the
/// validity check can compare slots uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub(crate) indices: Vec<isize>,
    pub(crate) points: Vec<Option<Point3<f64>>>,
    pub value: f64,
}

impl Measurement {
    pub fn new(count: usize) -> Self {
        Self {
            indices: vec![-1; count],
            points: vec![None; count],
            value: f64::NAN,
        }
    }

    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &[isize] {
        &self.indices
    }

    /// Resolved atom index of a slot, or `None` for unset/literal slots.
    pub fn atom_index(&self, slot: usize) -> Option<usize> {
        match self.indices.get(slot) {
            Some(&i) if i >= 0 => Some(i as usize),
            _ => None,
        }
    }

    pub(crate) fn set_atom(&mut self, slot: usize, atom_index: usize) {
        self.indices[slot] = atom_index as isize;
    }

    pub(crate) fn set_literal(&mut self, slot: usize, point: Point3<f64>) {
        self.indices[slot] = -2 - slot as isize;
        self.points[slot] = Some(point);
    }

    fn coordinate(&self, system: &MolecularSystem, slot: usize) -> Option<Point3<f64>> {
        match self.indices[slot] {
            i if i >= 0 => system.atom(i as usize).map(|a| a.position),
            -1 => None,
            _ => self.points[slot],
        }
    }

    /// Scalar value in Angstroms (count 2) or degrees (count 3 and 4); NaN
    /// when the tuple is incomplete or the count is out of range.
    pub fn measure(&self, system: &MolecularSystem) -> f64 {
        let count = self.count();
        if !(2..=4).contains(&count) || self.indices.iter().any(|&i| i == -1) {
            return f64::NAN;
        }
        let mut pts = Vec::with_capacity(count);
        for slot in 0..count {
            match self.coordinate(system, slot) {
                Some(p) => pts.push(p),
                None => return f64::NAN,
            }
        }
        match count {
            2 => geometry::distance(&pts[0], &pts[1]),
            3 => geometry::angle_degrees(&pts[0], &pts[1], &pts[2]),
            _ => geometry::torsion_degrees(&pts[0], &pts[1], &pts[2], &pts[3]),
        }
    }

    /// Two literals closer than 0.01 A count as the same point.
    fn same_slot(&self, a: usize, b: usize) -> bool {
        let (ia, ib) = (self.indices[a], self.indices[b]);
        if ia >= 0 || ib >= 0 {
            return ia == ib;
        }
        match (self.points[a], self.points[b]) {
            (Some(p), Some(q)) => geometry::distance(&p, &q) < 0.01,
            (pa, pb) => pa == pb,
        }
    }

    /// Rejects the degenerate shapes A-A, A-B-A, and A-B-C-B.
    pub fn is_valid(&self) -> bool {
        let count = self.count();
        !(self.same_slot(0, 1)
            || count > 2 && self.same_slot(0, 2)
            || count == 4 && self.same_slot(1, 3))
    }

    /// Whether every adjacent pair of resolved atoms is bonded. Literal and
    /// unset slots are skipped, so a chain of atoms interrupted by a
    /// literal is still "connected".
    pub fn is_connected(&self, system: &MolecularSystem) -> bool {
        let mut last: Option<usize> = None;
        for slot in 0..self.count() {
            let Some(atom_index) = self.atom_index(slot) else {
                continue;
            };
            if let Some(previous) = last
                && !system.is_bonded(atom_index, previous)
            {
                return false;
            }
            last = Some(atom_index);
        }
        true
    }

    /// Whether all resolved atoms belong to one molecule.
    pub fn is_intramolecular(&self, system: &MolecularSystem) -> bool {
        let mut molecule: Option<usize> = None;
        for slot in 0..self.count() {
            let Some(atom_index) = self.atom_index(slot) else {
                continue;
            };
            let Some(atom) = system.atom(atom_index) else {
                continue;
            };
            match molecule {
                None => molecule = Some(atom.molecule_index),
                Some(m) if m != atom.molecule_index => return false,
                Some(_) => {}
            }
        }
        true
    }

    pub fn in_range(&self, filter: &RangeFilter, value: f64) -> bool {
        filter.accepts(value)
    }

    /// Distance values convert to the requested unit; angles and torsions
    /// pass through unchanged.
    pub fn fix_value(&self, unit: DistanceUnit, round: bool) -> f64 {
        if self.count() != 2 {
            return self.value;
        }
        if round {
            unit.round(self.value)
        } else {
            unit.convert(self.value)
        }
    }

    fn slot_label(&self, system: &MolecularSystem, slot: usize) -> String {
        match self.indices[slot] {
            i if i >= 0 => system
                .atom(i as usize)
                .map(|a| a.info())
                .unwrap_or_else(|| "?".to_string()),
            -1 => "?".to_string(),
            _ => match self.points[slot] {
                Some(p) => format!("{{{:.2} {:.2} {:.2}}}", p.x, p.y, p.z),
                None => "?".to_string(),
            },
        }
    }

    /// Formatted report line, e.g. `"distance 2.00 Å C#1 -- O#3"`. An
    /// explicit format template may reference `%VALUE` and `%UNIT`.
    pub fn info_string(
        &self,
        system: &MolecularSystem,
        unit: DistanceUnit,
        format: Option<&str>,
    ) -> String {
        let count = self.count();
        let (kind, value_string, unit_symbol) = if count == 2 {
            let decimals = match unit {
                DistanceUnit::Angstroms => 2,
                DistanceUnit::Nanometers => 3,
                DistanceUnit::Picometers => 1,
                DistanceUnit::Bohr => 3,
            };
            (
                "distance",
                format!("{:.*}", decimals, self.fix_value(unit, true)),
                unit.symbol(),
            )
        } else {
            let kind = if count == 3 { "angle" } else { "dihedral" };
            (kind, format!("{:.1}", self.value), "\u{00B0}")
        };
        if let Some(template) = format {
            return template
                .replace("%VALUE", &value_string)
                .replace("%UNIT", unit_symbol);
        }
        let labels: Vec<String> = (0..count).map(|s| self.slot_label(system, s)).collect();
        format!("{} {} {} {}", kind, value_string, unit_symbol, labels.join(" -- "))
    }
}

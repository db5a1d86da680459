//! # Measurement Enumeration
//!
//! ## Overview
//!
//! Depth-first backtracking over an ordered list of measurement points,
//! each either an atom selection or a literal coordinate. Every selection
//! slot is resolved in order; completed tuples run the filter chain
//! (validity, connectivity, intramolecularity, range) and the survivors are
//! streamed to a [`MeasurementClient`]. The enumeration is synchronous and
//! exhaustive; pruning happens only through the single-model constraint and
//! the filters. Malformed requests (fewer than two points, an empty
//! selection) produce no measurements rather than an error.

use crate::core::models::system::MolecularSystem;
use crate::core::selection::AtomSet;
use crate::engine::config::MeasureOptions;
use crate::engine::measurement::Measurement;
use nalgebra::Point3;
use tracing::{debug, instrument};

/// One position in a measurement request.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurePoint {
    /// Candidate atoms; the enumeration branches over every set bit.
    Selection(AtomSet),
    /// A fixed coordinate; contributes one value and never branches.
    Literal(Point3<f64>),
}

/// Receives each accepted tuple as it is produced. `i_first_atom` is the
/// ordinal of the first selection point's current atom within its own
/// bit-set, which min-array reporting uses as its slot index.
pub trait MeasurementClient {
    fn process_next_measure(&mut self, measurement: &Measurement, i_first_atom: usize);
}

/// Per-branch state of the single-model constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ModelConstraint {
    /// Never armed: selections are single-atom or span disjoint models.
    Off,
    /// Armed; the first selection candidate will lock the model.
    Armed,
    Locked(usize),
}

/// A measurement request: ordered points plus filters.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureDefinition {
    pub points: Vec<MeasurePoint>,
    pub options: MeasureOptions,
}

impl MeasureDefinition {
    /// Creates a measurement request over the given points.
    ///
    /// # Arguments
    ///
    /// * `points` - The ordered measurement points, two to four of them.
    /// * `options` - The connectivity, range, and unit filters to apply.
    pub fn new(points: Vec<MeasurePoint>, options: MeasureOptions) -> Self {
        Self { points, options }
    }

    fn selection(&self, point_index: usize) -> Option<&AtomSet> {
        match &self.points[point_index] {
            MeasurePoint::Selection(bs) => Some(bs),
            MeasurePoint::Literal(_) => None,
        }
    }

    /// Whether the first two points' selections reach into a common model.
    /// Defaults to true when either of them is a literal.
    fn just_one_model(&self, system: &MolecularSystem) -> bool {
        match (self.points.first(), self.points.get(1)) {
            (Some(MeasurePoint::Selection(a)), Some(MeasurePoint::Selection(b))) => {
                system.model_bitset(a).intersects(&system.model_bitset(b))
            }
            _ => true,
        }
    }

    /// Runs the enumeration, streaming every accepted tuple to `client`.
    /// Returns silently on a malformed request.
    ///
    /// # Arguments
    ///
    /// * `system` - The molecular system the point selections refer to.
    /// * `client` - The sink that receives each surviving measurement.
    #[instrument(skip_all, fields(n_points = self.points.len()))]
    pub fn define(&self, system: &MolecularSystem, client: &mut dyn MeasurementClient) {
        let n_points = self.points.len();
        if n_points < 2 {
            return;
        }
        let just_one_model = self.just_one_model(system);
        let mut constraint = ModelConstraint::Off;
        let mut measurement = Measurement::new(n_points);
        let mut last_selection_point = None;
        let mut first_selection_point = None;
        for (i, point) in self.points.iter().enumerate() {
            match point {
                MeasurePoint::Selection(bs) => {
                    let n_atoms = bs.cardinality();
                    if n_atoms == 0 {
                        debug!(point = i, "empty selection, no measurements");
                        return;
                    }
                    if n_atoms > 1 && just_one_model {
                        constraint = ModelConstraint::Armed;
                    }
                    last_selection_point = Some(i);
                    first_selection_point.get_or_insert(i);
                    // Pre-fill so a missing leg leaves a resolved slot.
                    if let Some(first) = bs.next_set_bit(0) {
                        measurement.set_atom(i, first);
                    }
                }
                MeasurePoint::Literal(p) => measurement.set_literal(i, *p),
            }
        }
        let mut enumeration = Enumeration {
            definition: self,
            system,
            client,
            measurement,
            last_selection_point,
            first_selection_point,
        };
        enumeration.next_measure(0, constraint, 0);
    }

    /// Formatted report lines, one per accepted and range-passing tuple, in
    /// enumeration order.
    ///
    /// # Arguments
    ///
    /// * `system` - The molecular system the point selections refer to.
    ///
    /// # Return
    ///
    /// Returns one formatted line per measurement, possibly empty.
    pub fn strings(&self, system: &MolecularSystem) -> Vec<String> {
        let mut collector = StringCollector {
            system,
            options: &self.options,
            lines: Vec::new(),
        };
        self.define(system, &mut collector);
        collector.lines
    }

    /// Per-first-atom minimum values: one slot per atom of the first
    /// selection, `-0.0` meaning "no value seen". Values are converted to
    /// the requested unit but never rounded.
    pub fn min_array(&self, system: &MolecularSystem) -> Vec<f64> {
        let Some(MeasurePoint::Selection(first)) = self.points.first() else {
            return Vec::new();
        };
        let mut collector = MinArrayCollector {
            options: &self.options,
            minima: vec![-0.0; first.cardinality()],
        };
        self.define(system, &mut collector);
        collector.minima
    }
}

/// One in-flight `define` call: the request, the arenas, the client, and
/// the partially resolved tuple being backtracked over.
struct Enumeration<'a> {
    definition: &'a MeasureDefinition,
    system: &'a MolecularSystem,
    client: &'a mut dyn MeasurementClient,
    measurement: Measurement,
    last_selection_point: Option<usize>,
    first_selection_point: Option<usize>,
}

impl Enumeration<'_> {
    fn next_measure(&mut self, point_index: usize, constraint: ModelConstraint, i_first_atom: usize) {
        if self
            .last_selection_point
            .is_none_or(|last| point_index > last)
        {
            self.deliver(i_first_atom);
            return;
        }
        let Some(bs) = self.definition.selection(point_index) else {
            // Literal slots were filled up front and never branch.
            self.next_measure(point_index + 1, constraint, i_first_atom);
            return;
        };
        let is_first = self.first_selection_point == Some(point_index);
        let previous_atom = if point_index == 0 {
            None
        } else {
            self.measurement.atom_index(point_index - 1)
        };
        let mut have_next = false;
        for (ordinal, candidate) in bs.iter().enumerate() {
            if previous_atom == Some(candidate) {
                continue;
            }
            let Some(atom) = self.system.atom(candidate) else {
                continue;
            };
            let branch_constraint = match constraint {
                ModelConstraint::Off => ModelConstraint::Off,
                ModelConstraint::Armed | ModelConstraint::Locked(_) if is_first => {
                    ModelConstraint::Locked(atom.model_index)
                }
                ModelConstraint::Armed => ModelConstraint::Locked(atom.model_index),
                ModelConstraint::Locked(model) => {
                    if atom.model_index != model {
                        continue;
                    }
                    constraint
                }
            };
            self.measurement.set_atom(point_index, candidate);
            have_next = true;
            self.next_measure(
                point_index + 1,
                branch_constraint,
                if is_first { ordinal } else { i_first_atom },
            );
        }
        if !have_next {
            // A fully pruned leg keeps its pre-filled slot and the
            // enumeration continues.
            self.next_measure(point_index + 1, constraint, i_first_atom);
        }
    }

    /// Terminal: run the filter chain and hand survivors to the client.
    fn deliver(&mut self, i_first_atom: usize) {
        let options = &self.definition.options;
        let m = &mut self.measurement;
        if m.is_valid()
            && (!options.must_be_connected || m.is_connected(self.system))
            && (!options.must_not_be_connected || !m.is_connected(self.system))
            && options
                .intramolecular
                .is_none_or(|intra| m.is_intramolecular(self.system) == intra)
        {
            m.value = m.measure(self.system);
            self.client.process_next_measure(m, i_first_atom);
        }
    }
}

struct StringCollector<'a> {
    system: &'a MolecularSystem,
    options: &'a MeasureOptions,
    lines: Vec<String>,
}

impl MeasurementClient for StringCollector<'_> {
    fn process_next_measure(&mut self, measurement: &Measurement, _i_first_atom: usize) {
        if let Some(range) = &self.options.range
            && !measurement.in_range(range, measurement.value)
        {
            return;
        }
        self.lines.push(measurement.info_string(
            self.system,
            self.options.unit,
            self.options.format.as_deref(),
        ));
    }
}

struct MinArrayCollector<'a> {
    options: &'a MeasureOptions,
    minima: Vec<f64>,
}

impl MeasurementClient for MinArrayCollector<'_> {
    fn process_next_measure(&mut self, measurement: &Measurement, i_first_atom: usize) {
        if let Some(range) = &self.options.range
            && !measurement.in_range(range, measurement.value)
        {
            return;
        }
        let value = measurement.fix_value(self.options.unit, false);
        let slot = &mut self.minima[i_first_atom];
        // -0.0 is the untouched sentinel; 1/x distinguishes it from +0.0.
        if 1.0 / *slot == f64::NEG_INFINITY {
            *slot = value;
        } else {
            *slot = slot.min(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::bond::BondOrder;
    use crate::core::models::model::Model;
    use crate::engine::config::{DistanceUnit, MeasureOptionsBuilder};
    use std::collections::HashMap;

    struct TupleCollector {
        tuples: Vec<Vec<isize>>,
        values: Vec<f64>,
    }

    impl TupleCollector {
        fn new() -> Self {
            Self {
                tuples: Vec::new(),
                values: Vec::new(),
            }
        }
    }

    impl MeasurementClient for TupleCollector {
        fn process_next_measure(&mut self, measurement: &Measurement, _i_first_atom: usize) {
            self.tuples.push(measurement.indices().to_vec());
            self.values.push(measurement.value);
        }
    }

    /// Atoms 0..=4 on the x axis at 1 A spacing, one model.
    fn line_system(n: usize) -> MolecularSystem {
        let mut system = MolecularSystem::new();
        system.push_model(Model::new(0, None, None, HashMap::new()));
        for i in 0..n {
            system.push_atom(Atom::new(6, 0, Point3::new(i as f64, 0.0, 0.0)));
        }
        system.assign_molecule_indices();
        system
    }

    fn selections(sets: &[&[usize]]) -> Vec<MeasurePoint> {
        sets.iter()
            .map(|s| MeasurePoint::Selection(s.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn two_selections_enumerate_the_cross_product_in_order() {
        let system = line_system(5);
        let def = MeasureDefinition::new(
            selections(&[&[1, 2], &[3, 4]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(
            collector.tuples,
            vec![vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4]]
        );
        assert!(collector.values.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn must_be_connected_keeps_only_bonded_tuples() {
        let mut system = line_system(5);
        system
            .add_bond(1, 3, BondOrder::COVALENT_SINGLE, 0, 0)
            .unwrap();
        let def = MeasureDefinition::new(
            selections(&[&[1, 2], &[3, 4]]),
            MeasureOptionsBuilder::new().must_be_connected(true).build(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(collector.tuples, vec![vec![1, 3]]);
    }

    #[test]
    fn must_not_be_connected_is_the_complement() {
        let mut system = line_system(5);
        system
            .add_bond(1, 3, BondOrder::COVALENT_SINGLE, 0, 0)
            .unwrap();
        let def = MeasureDefinition::new(
            selections(&[&[1, 2], &[3, 4]]),
            MeasureOptionsBuilder::new()
                .must_not_be_connected(true)
                .build(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(
            collector.tuples,
            vec![vec![1, 4], vec![2, 3], vec![2, 4]]
        );
    }

    #[test]
    fn self_reuse_guard_suppresses_the_degenerate_pair() {
        let system = line_system(8);
        let def = MeasureDefinition::new(
            selections(&[&[7], &[7]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert!(collector.tuples.is_empty());
    }

    #[test]
    fn empty_selection_produces_nothing() {
        let system = line_system(3);
        let def = MeasureDefinition::new(
            selections(&[&[0], &[]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert!(collector.tuples.is_empty());
        assert!(MeasureDefinition::new(selections(&[&[0]]), MeasureOptions::default())
            .strings(&system)
            .is_empty());
    }

    #[test]
    fn literal_points_never_branch() {
        let system = line_system(2);
        let def = MeasureDefinition::new(
            vec![
                MeasurePoint::Selection([0, 1].into_iter().collect()),
                MeasurePoint::Literal(Point3::new(0.0, 3.0, 0.0)),
                MeasurePoint::Selection([0, 1].into_iter().collect()),
            ],
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        // 2 x 2 atom choices around the fixed middle point, minus the two
        // A-B-A duplicates.
        assert_eq!(collector.tuples.len(), 2);
        for tuple in &collector.tuples {
            assert_eq!(tuple[1], -3);
        }
    }

    #[test]
    fn single_model_constraint_prunes_cross_model_tuples() {
        let mut system = MolecularSystem::new();
        system.push_model(Model::new(0, None, None, HashMap::new()));
        system.push_model(Model::new(1, None, None, HashMap::new()));
        for i in 0..2 {
            system.push_atom(Atom::new(6, 0, Point3::new(i as f64, 0.0, 0.0)));
        }
        for i in 0..2 {
            system.push_atom(Atom::new(6, 1, Point3::new(i as f64, 5.0, 0.0)));
        }
        system.assign_molecule_indices();
        // Both selections span both models, so each tuple stays within the
        // model chosen by its first atom.
        let def = MeasureDefinition::new(
            selections(&[&[0, 2], &[1, 3]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(collector.tuples, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn fully_pruned_leg_keeps_its_prefilled_slot() {
        let mut system = MolecularSystem::new();
        system.push_model(Model::new(0, None, None, HashMap::new()));
        system.push_model(Model::new(1, None, None, HashMap::new()));
        system.push_atom(Atom::new(6, 0, Point3::new(0.0, 0.0, 0.0)));
        system.push_atom(Atom::new(6, 0, Point3::new(1.0, 0.0, 0.0)));
        system.push_atom(Atom::new(6, 1, Point3::new(0.0, 5.0, 0.0)));
        system.push_atom(Atom::new(6, 1, Point3::new(1.0, 5.0, 0.0)));
        system.assign_molecule_indices();
        // The branch through atom 0 locks model 0 and prunes every
        // candidate of the second selection (all model 1); the tuple still
        // completes with the second slot's pre-filled atom.
        let def = MeasureDefinition::new(
            selections(&[&[0, 2], &[3]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(collector.tuples, vec![vec![0, 3], vec![2, 3]]);
    }

    #[test]
    fn disjoint_model_selections_disable_the_constraint() {
        let mut system = MolecularSystem::new();
        system.push_model(Model::new(0, None, None, HashMap::new()));
        system.push_model(Model::new(1, None, None, HashMap::new()));
        system.push_atom(Atom::new(6, 0, Point3::new(0.0, 0.0, 0.0)));
        system.push_atom(Atom::new(6, 0, Point3::new(1.0, 0.0, 0.0)));
        system.push_atom(Atom::new(6, 1, Point3::new(0.0, 5.0, 0.0)));
        system.push_atom(Atom::new(6, 1, Point3::new(1.0, 5.0, 0.0)));
        system.assign_molecule_indices();
        let def = MeasureDefinition::new(
            selections(&[&[0, 1], &[2, 3]]),
            MeasureOptions::default(),
        );
        let mut collector = TupleCollector::new();
        def.define(&system, &mut collector);
        assert_eq!(collector.tuples.len(), 4);
    }

    #[test]
    fn strings_report_in_enumeration_order() {
        let system = line_system(5);
        let def = MeasureDefinition::new(
            selections(&[&[0], &[2, 4]]),
            MeasureOptions::default(),
        );
        assert_eq!(
            def.strings(&system),
            vec![
                "distance 2.00 \u{00C5} C#1 -- C#3",
                "distance 4.00 \u{00C5} C#1 -- C#5",
            ]
        );
    }

    #[test]
    fn range_filter_drops_out_of_window_tuples() {
        let system = line_system(5);
        let def = MeasureDefinition::new(
            selections(&[&[0], &[2, 4]]),
            MeasureOptionsBuilder::new().range(3.0, 10.0).build(),
        );
        assert_eq!(
            def.strings(&system),
            vec!["distance 4.00 \u{00C5} C#1 -- C#5"]
        );
    }

    #[test]
    fn min_array_folds_minimum_per_first_atom() {
        let mut system = MolecularSystem::new();
        system.push_model(Model::new(0, None, None, HashMap::new()));
        // d(1,3)=2.0, d(1,4)=1.5, d(2,3)=3.0, d(2,4)=2.5
        let positions = [
            [50.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [2.0, 3.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 1.5, 0.0],
        ];
        for p in positions {
            system.push_atom(Atom::new(6, 0, Point3::new(p[0], p[1], p[2])));
        }
        system.assign_molecule_indices();
        let def = MeasureDefinition::new(
            selections(&[&[1, 2], &[3, 4]]),
            MeasureOptions::default(),
        );
        let minima = def.min_array(&system);
        assert_eq!(minima.len(), 2);
        assert!((minima[0] - 1.5).abs() < 1e-9);
        assert!((minima[1] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn min_array_sentinel_survives_when_nothing_accepted() {
        let system = line_system(8);
        let def = MeasureDefinition::new(
            selections(&[&[7], &[7]]),
            MeasureOptions::default(),
        );
        let minima = def.min_array(&system);
        assert_eq!(minima.len(), 1);
        assert_eq!(minima[0], 0.0);
        assert!(minima[0].is_sign_negative());
    }

    #[test]
    fn min_array_converts_without_rounding() {
        let system = line_system(3);
        let def = MeasureDefinition::new(
            selections(&[&[0], &[2]]),
            MeasureOptionsBuilder::new()
                .unit(DistanceUnit::Nanometers)
                .build(),
        );
        let minima = def.min_array(&system);
        assert!((minima[0] - 0.2).abs() < 1e-12);
    }
}

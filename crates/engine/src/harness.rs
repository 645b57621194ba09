//! Test harness for chart operations with event tracking.
//!
//! `ChartHarness` wraps a `Chart`, applies scripted `Op`s, records every
//! event, and checks the structural invariants after each step. The
//! property tests at the bottom drive it with random op sequences.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::TokenId;
use crate::chart::{Chart, UndoOutcome};
use crate::events::EventCollector;
use crate::palette::ColorSelector;

/// Operation to apply to a chart.
#[derive(Debug, Clone)]
pub enum Op {
    AddColumn(String),
    AddRow(String),
    RemoveRow(usize),
    RemoveColumn(usize),
    /// Place and settle immediately.
    Place { row: usize, col: usize },
    /// Request a placement, leave it landing.
    Launch { row: usize, col: usize },
    /// Settle the n-th launched token (modulo the launched count).
    Settle(usize),
    Undo,
    ClearStars,
    ClearChart,
}

/// Test harness wrapping Chart with event tracking.
pub struct ChartHarness {
    chart: Chart,
    events: Rc<RefCell<EventCollector>>,
    launched: Vec<TokenId>,
}

impl ChartHarness {
    /// A harness in show mode with a seeded selector.
    pub fn new() -> Self {
        let mut chart = Chart::with_selector(ColorSelector::with_seed(0));
        chart.set_show_mode(true);
        let events = Rc::new(RefCell::new(EventCollector::new()));
        let sink = Rc::clone(&events);
        chart.subscribe(Box::new(move |e| sink.borrow_mut().push(e.clone())));
        Self { chart, events, launched: Vec::new() }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    pub fn events(&self) -> std::cell::Ref<'_, EventCollector> {
        self.events.borrow()
    }

    /// Apply one op, then verify invariants. Panics with context on violation.
    pub fn apply(&mut self, op: &Op) {
        match op {
            Op::AddColumn(label) => {
                self.chart.add_column(label);
            }
            Op::AddRow(label) => {
                self.chart.add_row(label);
            }
            Op::RemoveRow(i) => {
                self.chart.remove_row(*i);
            }
            Op::RemoveColumn(i) => {
                self.chart.remove_column(*i);
            }
            Op::Place { row, col } => {
                self.chart.place_token(*row, *col, None);
            }
            Op::Launch { row, col } => {
                if let Some(id) = self.chart.begin_placement(*row, *col, None) {
                    self.launched.push(id);
                }
            }
            Op::Settle(n) => {
                if !self.launched.is_empty() {
                    let id = self.launched[n % self.launched.len()];
                    self.chart.settle_token(id);
                }
            }
            Op::Undo => {
                self.chart.undo();
            }
            Op::ClearStars => self.chart.clear_stars(),
            Op::ClearChart => self.chart.clear_chart(),
        }

        if let Err(msg) = self.chart.check_invariants() {
            panic!("invariant violated after {:?}: {}", op, msg);
        }
        if let Some(pending) = self.events.borrow().last_pending() {
            assert_eq!(pending, self.chart.history().len(), "stale HistoryChanged after {:?}", op);
        }
    }

    pub fn apply_all(&mut self, ops: &[Op]) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Undo until history is empty, returning tokens in undo order.
    pub fn undo_all(&mut self) -> Vec<TokenId> {
        let mut undone = Vec::new();
        while let UndoOutcome::Undone { token, .. } = self.chart.undo() {
            undone.push(token);
        }
        undone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scripted_session() {
        let mut h = ChartHarness::new();
        h.apply_all(&[
            Op::AddColumn("HW1".into()),
            Op::AddRow("Ana".into()),
            Op::AddRow("Ben".into()),
            Op::AddColumn("HW2".into()),
            Op::Place { row: 0, col: 0 },
            Op::Launch { row: 1, col: 1 },
            Op::Place { row: 1, col: 0 },
            Op::RemoveColumn(0),
            Op::Settle(0),
        ]);

        // Only the landed token in (Ben, HW2) survives
        assert_eq!(h.chart().total_stars(), 1);
        assert_eq!(h.chart().star_count(1), Some(1));
        assert_eq!(h.undo_all().len(), 1);
        assert_eq!(h.chart().total_stars(), 0);
    }

    #[test]
    fn test_cascade_purge_leaves_nothing_to_undo() {
        let mut h = ChartHarness::new();
        h.apply_all(&[
            Op::AddColumn("HW1".into()),
            Op::AddRow("Ana".into()),
            Op::Place { row: 0, col: 0 },
            Op::Launch { row: 0, col: 0 },
            Op::RemoveRow(0),
        ]);
        assert!(h.undo_all().is_empty());
    }

    // -------------------------------------------------------------------------
    // Property tests
    // -------------------------------------------------------------------------

    fn config() -> ProptestConfig {
        ProptestConfig {
            cases: std::env::var("PROPTEST_CASES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
            failure_persistence: None,
            ..ProptestConfig::default()
        }
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => "[A-Za-z]{0,6}".prop_map(Op::AddColumn),
            3 => "[A-Za-z]{0,6}".prop_map(Op::AddRow),
            1 => (0usize..6).prop_map(Op::RemoveRow),
            1 => (0usize..6).prop_map(Op::RemoveColumn),
            5 => (0usize..6, 0usize..6).prop_map(|(row, col)| Op::Place { row, col }),
            3 => (0usize..6, 0usize..6).prop_map(|(row, col)| Op::Launch { row, col }),
            2 => (0usize..8).prop_map(Op::Settle),
            3 => Just(Op::Undo),
            1 => Just(Op::ClearStars),
        ]
    }

    proptest! {
        #![proptest_config(config())]

        /// Row cell counts and star counts hold after every step.
        #[test]
        fn prop_invariants_hold(ops in prop::collection::vec(arb_op(), 0..60)) {
            let mut h = ChartHarness::new();
            h.apply_all(&ops);
            prop_assert!(h.chart().check_invariants().is_ok());
            for row in h.chart().rows() {
                prop_assert_eq!(row.cells().len(), h.chart().column_count());
            }
        }

        /// Undoing everything removes every token that was placed through history.
        #[test]
        fn prop_undo_all_drains_history(ops in prop::collection::vec(arb_op(), 0..60)) {
            let mut h = ChartHarness::new();
            h.apply_all(&ops);
            let pending = h.chart().history().len();
            let undone = h.undo_all();
            prop_assert_eq!(undone.len(), pending);
            prop_assert!(!h.chart().has_pending());
            prop_assert!(h.chart().check_invariants().is_ok());
        }

        /// Undo pops in exact reverse placement order.
        #[test]
        fn prop_undo_reverses_placement(cells in prop::collection::vec((0usize..3, 0usize..3), 1..30)) {
            let mut h = ChartHarness::new();
            for i in 0..3 {
                h.apply(&Op::AddColumn(format!("C{i}")));
                h.apply(&Op::AddRow(format!("R{i}")));
            }
            let mut placed = Vec::new();
            for (row, col) in cells {
                if let Some(id) = h.chart_mut().place_token(row, col, None) {
                    placed.push(id);
                }
            }
            placed.reverse();
            prop_assert_eq!(h.undo_all(), placed);
        }
    }
}

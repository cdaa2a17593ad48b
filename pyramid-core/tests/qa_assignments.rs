//! QA tests for pyramid geometry and the assignment store.
//!
//! Run with: `cargo test -p pyramid-core --test qa_assignments`

use pyramid_core::{Chart, ChartError, Position, PyramidLayout, MAX_ROWS};

// =============================================================================
// TEST 1: Layout totals
// =============================================================================

#[test]
fn every_valid_row_count_yields_a_triangular_number_of_positions() {
    for rows in 1..=MAX_ROWS {
        let layout = PyramidLayout::new(rows).expect("valid row count");
        assert_eq!(
            layout.total_positions(),
            rows * (rows + 1) / 2,
            "rows = {rows}"
        );
    }
}

#[test]
fn head_count_layouts_hold_exactly_that_many_people() {
    for people in 1..=60 {
        let layout = PyramidLayout::with_capacity(people).expect("valid head count");
        assert_eq!(layout.total_positions(), people, "people = {people}");
    }
}

// =============================================================================
// TEST 2: Uniqueness invariant
// =============================================================================

#[test]
fn a_person_occupies_at_most_one_position() {
    let mut chart = Chart::new(PyramidLayout::new(4).expect("layout"));

    chart.assign(Position(0), "Petra").expect("assign");
    chart.assign(Position(7), "Petra").expect("reassign");

    let petras: Vec<_> = chart
        .assignments()
        .filter(|(_, name)| *name == "Petra")
        .map(|(position, _)| position)
        .collect();
    assert_eq!(petras, vec![Position(7)]);
}

#[test]
fn uniqueness_holds_across_many_moves() {
    let mut chart = Chart::new(PyramidLayout::new(5).expect("layout"));

    // Walk one person through every slot; the chart must never hold more
    // than that one assignment for them.
    for index in 0..chart.layout().total_positions() {
        chart.assign(Position(index), "Nomad").expect("assign");
        assert_eq!(chart.assigned_count(), 1);
        assert_eq!(chart.position_of("Nomad"), Some(Position(index)));
    }
}

// =============================================================================
// TEST 3: Range guards
// =============================================================================

#[test]
fn operations_reject_out_of_range_positions() {
    let mut chart = Chart::new(PyramidLayout::new(3).expect("layout"));
    let beyond = Position(chart.layout().total_positions());

    assert!(matches!(
        chart.assign(beyond, "Alice"),
        Err(ChartError::InvalidPosition { .. })
    ));
    assert!(matches!(
        chart.unassign(beyond),
        Err(ChartError::InvalidPosition { .. })
    ));
    assert_eq!(chart.get(beyond), None);
}

#[test]
fn failed_operations_leave_the_chart_unchanged() {
    let mut chart = Chart::new(PyramidLayout::new(3).expect("layout"));
    chart.assign(Position(2), "Alice").expect("assign");

    let before = chart.clone();
    let _ = chart.assign(Position(100), "Bob");
    let _ = chart.unassign(Position(100));
    assert_eq!(chart, before);
}

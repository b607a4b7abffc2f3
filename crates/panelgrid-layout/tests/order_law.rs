//! Property invariants for the stored-order merge and grid cell math.
//!
//! The merge must always produce a permutation of the live items, honor the
//! stored relative order of every live id it mentions, and keep unmentioned
//! items in document order after them.

use panelgrid_layout::{GridMetrics, ItemId, Point, merge_order, order_signature};
use proptest::prelude::*;

fn live_ids(count: usize) -> Vec<ItemId> {
    (0..count)
        .filter_map(|i| ItemId::new(format!("w{i}")))
        .collect()
}

fn stored_strategy() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..12).prop_flat_map(|count| {
        (
            Just(count),
            // Indices past `count` stand for stale ids no longer mounted.
            prop::collection::vec(0usize..count + 4, 0..16),
        )
    })
}

proptest! {
    #[test]
    fn merge_is_a_permutation_of_live_items((count, picks) in stored_strategy()) {
        let current = live_ids(count);
        let stored: Vec<ItemId> = picks
            .iter()
            .filter_map(|i| ItemId::new(format!("w{i}")))
            .collect();
        let merged = merge_order(&current, &stored);

        let mut sorted_merged = merged.clone();
        sorted_merged.sort();
        let mut sorted_current = current.clone();
        sorted_current.sort();
        prop_assert_eq!(sorted_merged, sorted_current);
    }

    #[test]
    fn merge_honors_stored_then_document_order((count, picks) in stored_strategy()) {
        let current = live_ids(count);
        let stored: Vec<ItemId> = picks
            .iter()
            .filter_map(|i| ItemId::new(format!("w{i}")))
            .collect();
        let merged = merge_order(&current, &stored);

        let mut expected_head: Vec<ItemId> = Vec::new();
        for id in &stored {
            if current.contains(id) && !expected_head.contains(id) {
                expected_head.push(id.clone());
            }
        }
        let expected_tail: Vec<ItemId> = current
            .iter()
            .filter(|id| !expected_head.contains(id))
            .cloned()
            .collect();

        prop_assert_eq!(&merged[..expected_head.len()], expected_head.as_slice());
        prop_assert_eq!(&merged[expected_head.len()..], expected_tail.as_slice());
    }

    #[test]
    fn merge_is_idempotent((count, picks) in stored_strategy()) {
        let current = live_ids(count);
        let stored: Vec<ItemId> = picks
            .iter()
            .filter_map(|i| ItemId::new(format!("w{i}")))
            .collect();
        let once = merge_order(&current, &stored);
        let twice = merge_order(&once, &stored);
        prop_assert_eq!(order_signature(&once), order_signature(&twice));
    }

    #[test]
    fn cell_column_stays_in_range(
        x in -5_000.0f64..5_000.0,
        y in -5_000.0f64..5_000.0,
        columns in 1u32..8,
        gap in 0.0f64..40.0,
    ) {
        let metrics = GridMetrics {
            col_width: 320.0,
            row_height: 260.0,
            gap,
            columns,
        };
        let cell = metrics.cell_at(Point::new(x, y), 320.0, 260.0);
        prop_assert!(cell.col < columns);
        prop_assert_eq!(cell.index, cell.row as usize * columns as usize + cell.col as usize);
    }

    #[test]
    fn snapped_offsets_are_step_multiples(x in -2_000.0f64..2_000.0, gap in 0.0f64..32.0) {
        let metrics = GridMetrics {
            col_width: 100.0,
            row_height: 80.0,
            gap,
            columns: 3,
        };
        let snapped = metrics.snap(Point::new(x, x));
        let steps_x = snapped.x / metrics.step_x();
        let steps_y = snapped.y / metrics.step_y();
        prop_assert!((steps_x - steps_x.round()).abs() < 1e-9);
        prop_assert!((steps_y - steps_y.round()).abs() < 1e-9);
        prop_assert!((snapped.x - x).abs() <= metrics.step_x() / 2.0 + 1e-9);
    }
}

#[test]
fn stale_ids_are_dropped() {
    let current = live_ids(3);
    let stored: Vec<ItemId> = ["w9", "w2", "gone", "w0"]
        .iter()
        .filter_map(ItemId::new)
        .collect();
    assert_eq!(
        order_signature(&merge_order(&current, &stored)),
        "w2|w0|w1"
    );
}

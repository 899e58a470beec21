use super::*;
use std::time::{Duration, Instant};

impl LineMarkers for Vec<DiffMask> {
    fn marker(&self, line: usize) -> DiffMask {
        self.get(line).copied().unwrap_or_default()
    }

    fn clear_marker(&mut self, line: usize) {
        if let Some(mask) = self.get_mut(line) {
            *mask = DiffMask::empty();
        }
    }

    fn add_marker(&mut self, line: usize, mask: DiffMask) {
        if let Some(slot) = self.get_mut(line) {
            *slot |= mask;
        }
    }
}

fn ledger() -> DeletedSectionLedger {
    DeletedSectionLedger::new(Duration::from_millis(40))
}

fn marked(lines: usize, marked: std::ops::RangeInclusive<usize>, mask: DiffMask) -> Vec<DiffMask> {
    (0..lines)
        .map(|i| if marked.contains(&i) { mask } else { DiffMask::empty() })
        .collect()
}

#[test]
fn test_push_captures_and_pop_restores() {
    let t0 = Instant::now();
    let mut markers = marked(10, 3..=6, DiffMask::CHANGED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 3, 6, &mut markers, t0);

    let top = ledger.top().unwrap();
    assert_eq!(top.start_line, 3);
    assert_eq!(top.restore_action, EditAction::Undo);
    assert_eq!(top.markers, vec![DiffMask::CHANGED; 4]);
    assert!(markers[3..6].iter().all(|m| m.is_empty()));

    ledger.pop(EditAction::Undo, 3, &mut markers, t0 + Duration::from_millis(5));

    assert!(ledger.is_empty());
    assert_eq!(markers, marked(10, 3..=6, DiffMask::CHANGED));
}

#[test]
fn test_single_line_delete_ignored() {
    let mut markers = marked(5, 1..=1, DiffMask::ADDED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 1, 1, &mut markers, Instant::now());

    assert!(ledger.is_empty());
    assert_eq!(markers[1], DiffMask::ADDED);
}

#[test]
fn test_pop_on_empty_increments_skip_and_next_push_is_spent() {
    let now = Instant::now();
    let mut markers = marked(8, 2..=4, DiffMask::REMOVED);
    let mut ledger = ledger();

    ledger.pop(EditAction::User, 2, &mut markers, now);
    assert_eq!(ledger.skip_push(), 1);

    ledger.push(EditAction::User, 2, 4, &mut markers, now);
    assert_eq!(ledger.skip_push(), 0);
    assert!(ledger.is_empty());
    assert_eq!(markers, marked(8, 2..=4, DiffMask::REMOVED));
}

#[test]
fn test_mismatched_action_within_window_marks_line_replace() {
    let t0 = Instant::now();
    let mut markers = marked(8, 2..=3, DiffMask::CHANGED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 2, 3, &mut markers, t0);
    ledger.pop(EditAction::User, 2, &mut markers, t0 + Duration::from_millis(10));

    assert!(ledger.top().unwrap().is_line_replace);
    assert_eq!(ledger.skip_push(), 0);
    assert_eq!(ledger.len(), 1);

    // revert of the replace deletes again with the restoring action: absorbed
    ledger.push(EditAction::Undo, 2, 3, &mut markers, t0 + Duration::from_millis(500));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_mismatched_action_after_window_skips() {
    let t0 = Instant::now();
    let mut markers = marked(8, 2..=3, DiffMask::CHANGED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 2, 3, &mut markers, t0);
    ledger.pop(EditAction::User, 2, &mut markers, t0 + Duration::from_millis(41));

    assert!(!ledger.top().unwrap().is_line_replace);
    assert_eq!(ledger.skip_push(), 1);
}

#[test]
fn test_pop_at_other_line_keeps_record() {
    let t0 = Instant::now();
    let mut markers = marked(8, 2..=3, DiffMask::CHANGED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 2, 3, &mut markers, t0);
    ledger.pop(EditAction::Undo, 5, &mut markers, t0);

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.skip_push(), 0);
}

#[test]
fn test_pop_clears_residual_markers() {
    let t0 = Instant::now();
    let mut markers = marked(6, 1..=2, DiffMask::MOVED);
    let mut ledger = ledger();

    ledger.push(EditAction::Redo, 1, 2, &mut markers, t0);
    markers[1] = DiffMask::ADDED;
    ledger.pop(EditAction::Undo, 1, &mut markers, t0);

    assert_eq!(markers[1], DiffMask::MOVED);
    assert_eq!(markers[2], DiffMask::MOVED);
}

#[test]
fn test_nested_sections_restore_in_reverse_order() {
    let t0 = Instant::now();
    let mut markers: Vec<DiffMask> = vec![
        DiffMask::empty(),
        DiffMask::ADDED,
        DiffMask::ADDED,
        DiffMask::empty(),
        DiffMask::REMOVED,
        DiffMask::REMOVED | DiffMask::MOVED,
        DiffMask::empty(),
    ];
    let before = markers.clone();
    let mut ledger = ledger();

    ledger.push(EditAction::User, 4, 5, &mut markers, t0);
    ledger.push(EditAction::User, 1, 2, &mut markers, t0);
    assert_eq!(ledger.len(), 2);

    ledger.pop(EditAction::Undo, 1, &mut markers, t0);
    ledger.pop(EditAction::Undo, 4, &mut markers, t0);

    assert!(ledger.is_empty());
    assert_eq!(markers, before);
}

#[test]
fn test_clear_resets_everything() {
    let t0 = Instant::now();
    let mut markers = marked(6, 0..=3, DiffMask::CHANGED);
    let mut ledger = ledger();

    ledger.push(EditAction::User, 0, 3, &mut markers, t0);
    ledger.pop(EditAction::Redo, 9, &mut markers, t0 + Duration::from_secs(1));
    assert_eq!(ledger.skip_push(), 1);

    ledger.clear();
    assert!(ledger.is_empty());
    assert_eq!(ledger.skip_push(), 0);
}

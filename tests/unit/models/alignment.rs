use super::*;

fn anchor(old: usize, new: usize) -> AlignmentEntry {
    AlignmentEntry::new(old, DiffMask::empty(), new, DiffMask::empty())
}

#[test]
fn test_push_rejects_non_monotone() {
    let mut info = AlignmentInfo::new();
    assert!(info.push(anchor(0, 0)));
    assert!(info.push(anchor(3, 5)));
    assert!(!info.push(anchor(4, 4)));
    assert!(!info.push(anchor(2, 6)));
    assert!(info.push(anchor(3, 5)));
    assert_eq!(info.len(), 3);
    assert!(AlignmentInfo::is_monotone(info.entries()));
}

#[test]
fn test_from_entries_validates() {
    assert!(AlignmentInfo::from_entries(vec![anchor(0, 0), anchor(1, 2)]).is_some());
    assert!(AlignmentInfo::from_entries(vec![anchor(2, 0), anchor(1, 2)]).is_none());
}

#[test]
fn test_anchor_and_first_diff() {
    let changed = AlignmentEntry::new(5, DiffMask::CHANGED, 5, DiffMask::CHANGED);
    let removed = AlignmentEntry::new(8, DiffMask::REMOVED, 8, DiffMask::empty());
    assert!(changed.is_anchor());
    assert!(!removed.is_anchor());

    let info = AlignmentInfo::from_entries(vec![anchor(0, 0), changed, removed]).unwrap();
    assert_eq!(info.first_diff(), Some(&changed));
}

#[test]
fn test_offset_shifts_both_sides() {
    let info = AlignmentInfo::from_entries(vec![anchor(0, 1), anchor(2, 3)])
        .unwrap()
        .offset(10, 20);
    assert_eq!(info.entries(), &[anchor(10, 21), anchor(12, 23)]);
}

#[test]
fn test_splice_replaces_section_and_shifts_tail() {
    let mut info = AlignmentInfo::from_entries(vec![
        anchor(1, 1),
        AlignmentEntry::new(5, DiffMask::CHANGED, 5, DiffMask::CHANGED),
        anchor(6, 6),
        AlignmentEntry::new(12, DiffMask::REMOVED, 12, DiffMask::empty()),
        anchor(14, 12),
    ])
    .unwrap();

    // 旧侧在第 4 行附近新增了 2 行，区间 [4, 9)，新侧区间 [4, 7)
    let replacement = AlignmentInfo::from_entries(vec![AlignmentEntry::new(
        4,
        DiffMask::ADDED,
        4,
        DiffMask::empty(),
    )])
    .unwrap();
    assert!(info.splice(
        LineRange::new(4, 5),
        2,
        LineRange::new(4, 3),
        0,
        replacement
    ));

    assert_eq!(
        info.entries(),
        &[
            anchor(1, 1),
            AlignmentEntry::new(4, DiffMask::ADDED, 4, DiffMask::empty()),
            AlignmentEntry::new(14, DiffMask::REMOVED, 12, DiffMask::empty()),
            anchor(16, 12),
        ]
    );
}

#[test]
fn test_splice_refuses_to_break_monotonicity() {
    let original = AlignmentInfo::from_entries(vec![anchor(0, 0), anchor(10, 10)]).unwrap();
    let mut info = original.clone();
    let bogus = AlignmentInfo::from_entries(vec![anchor(20, 20)]).unwrap();

    assert!(!info.splice(LineRange::new(2, 2), 0, LineRange::new(2, 2), 0, bogus));
    assert_eq!(info, original);
}

use super::*;

#[test]
fn test_line_mask_excludes_blank() {
    assert!(DiffMask::CHANGED.is_line_diff());
    assert!(DiffMask::MOVED.is_line_diff());
    assert!(!DiffMask::BLANK.is_line_diff());
    assert!(!DiffMask::empty().is_line_diff());
}

#[test]
fn test_all_covers_every_flag() {
    let every = DiffMask::CHANGED
        | DiffMask::ADDED
        | DiffMask::REMOVED
        | DiffMask::MOVED
        | DiffMask::BLANK;
    assert_eq!(DiffMask::ALL, every);
    assert_eq!(DiffMask::ALL & !DiffMask::BLANK, DiffMask::LINE);
}

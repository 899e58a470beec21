use super::*;

#[test]
fn test_view_other() {
    assert_eq!(ViewId::Main.other(), ViewId::Sub);
    assert_eq!(ViewId::Sub.other(), ViewId::Main);
    assert_eq!(ViewId::Sub.other().other(), ViewId::Sub);
}

#[test]
fn test_restoring_action_is_opposite() {
    assert_eq!(EditAction::Undo.restoring(), EditAction::Redo);
    assert_eq!(EditAction::Redo.restoring(), EditAction::Undo);
    assert_eq!(EditAction::User.restoring(), EditAction::Undo);
}

#[test]
fn test_line_range_inclusive() {
    let range = LineRange::inclusive(6, 3);
    assert_eq!(range, LineRange::new(3, 4));
    assert_eq!(range.end(), 7);
    assert_eq!(range.last(), Some(6));
    assert!(range.contains(3));
    assert!(!range.contains(7));
    assert_eq!(LineRange::new(5, 0).last(), None);
}

#[test]
fn test_temp_kind_labels() {
    assert!(!TempKind::None.is_temp());
    assert!(TempKind::SnapshotOfLastSave.is_temp());
    assert_eq!(
        TempKind::SnapshotOfVcsRevision(VcsKind::Git).label_suffix(),
        " ** Git"
    );
}

#[test]
fn test_view_id_serde() {
    let json = serde_json::to_string(&ViewId::Sub).unwrap();
    assert_eq!(json, "\"sub\"");
    let view: ViewId = serde_json::from_str("\"main\"").unwrap();
    assert_eq!(view, ViewId::Main);
}

use super::*;

fn modified(notification: &Notification) -> Modification {
    match notification {
        Notification::Modified(modification) => *modification,
        other => panic!("expected modification, got {:?}", other),
    }
}

#[test]
fn test_open_activates_and_reports() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "/tmp/a.txt", "one\ntwo");

    assert_eq!(host.current_buffer(), Some(a));
    assert_eq!(host.current_view(), ViewId::Main);
    assert_eq!(host.label(a), "a.txt");
    assert_eq!(host.line_count(ViewId::Main), 2);
    assert_eq!(host.line_text(ViewId::Main, 1), "two");
    assert_eq!(host.drain_notifications(), vec![Notification::BufferActivated(a)]);
    assert!(host.is_single_view());
}

#[test]
fn test_visual_mapping_with_padding_and_folds() {
    let mut host = MemoryHost::new();
    host.open(ViewId::Main, "a.txt", "a\nb\nc\nd");
    host.set_padding_before(ViewId::Main, 1, 2);
    host.fold(ViewId::Main, LineRange::new(2, 1));

    assert_eq!(host.visible_from_doc_line(ViewId::Main, 0), 0);
    assert_eq!(host.visible_from_doc_line(ViewId::Main, 1), 3);
    assert_eq!(host.visible_from_doc_line(ViewId::Main, 3), 4);
    assert_eq!(host.doc_line_from_visible(ViewId::Main, 4), 3);
    assert_eq!(host.doc_line_from_visible(ViewId::Main, 2), 0);

    host.unfold_all(ViewId::Main);
    assert_eq!(host.visible_from_doc_line(ViewId::Main, 3), 5);
}

#[test]
fn test_delete_reports_before_and_after() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a\nb\nc\nd");
    host.drain_notifications();

    host.delete_lines(ViewId::Main, 1, 2);

    let events = host.drain_notifications();
    assert_eq!(events.len(), 2);
    let before = modified(&events[0]);
    assert_eq!(before.kind, ModificationKind::BeforeDelete);
    assert_eq!((before.start_line, before.end_line), (1, 3));
    assert_eq!(before.lines_added, -2);
    assert_eq!(before.buffer, a);
    assert_eq!(modified(&events[1]).kind, ModificationKind::Delete);
    assert_eq!(host.text(a).as_deref(), Some("a\nd"));
}

#[test]
fn test_undo_and_redo_report_their_action() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a\nb\nc\nd");
    host.delete_lines(ViewId::Main, 1, 2);
    host.drain_notifications();

    assert!(host.undo(ViewId::Main));
    let events = host.drain_notifications();
    let insert = modified(&events[0]);
    assert_eq!(insert.kind, ModificationKind::Insert);
    assert_eq!(insert.action, EditAction::Undo);
    assert_eq!(insert.start_line, 1);
    assert_eq!(insert.lines_added, 2);
    assert_eq!(host.text(a).as_deref(), Some("a\nb\nc\nd"));

    assert!(host.redo(ViewId::Main));
    let events = host.drain_notifications();
    assert_eq!(modified(&events[0]).action, EditAction::Redo);
    assert_eq!(host.text(a).as_deref(), Some("a\nd"));
    assert!(!host.redo(ViewId::Main));
}

#[test]
fn test_markers_follow_line_edits() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a\nb\nc");
    host.add_markers(ViewId::Main, 2, DiffMask::ADDED);

    host.insert_lines(ViewId::Main, 0, &["x", "y"]);
    assert_eq!(host.markers(ViewId::Main, 4), DiffMask::ADDED);

    host.delete_lines(ViewId::Main, 0, 1);
    assert_eq!(host.all_markers(a)[3], DiffMask::ADDED);
    assert_eq!(host.all_markers(a).len(), 4);
}

#[test]
fn test_notifications_dropped_while_locked() {
    let mut host = MemoryHost::new();
    let lock = NotificationLock::new();
    host.attach_lock(lock.clone());
    host.open(ViewId::Main, "a.txt", "a\nb");
    host.drain_notifications();

    {
        let _guard = lock.acquire();
        host.insert_lines(ViewId::Main, 1, &["x"]);
        host.scroll(ViewId::Main, 1);
        host.paint();
    }
    assert!(host.poll_notification().is_none());

    host.paint();
    assert_eq!(host.poll_notification(), Some(Notification::Painted));
}

#[test]
fn test_restore_window_ignores_lock() {
    let mut host = MemoryHost::new();
    let lock = NotificationLock::new();
    host.attach_lock(lock.clone());
    let _guard = lock.acquire();

    host.minimize();
    host.restore_window();

    assert_eq!(host.drain_notifications(), vec![Notification::Restored]);
}

#[test]
fn test_shutdown_ignores_lock() {
    let mut host = MemoryHost::new();
    let lock = NotificationLock::new();
    host.attach_lock(lock.clone());
    let _guard = lock.acquire();

    host.minimize();
    host.shutdown();

    assert_eq!(host.drain_notifications(), vec![Notification::BeforeShutdown]);
}

#[test]
fn test_move_to_other_view_assigns_new_slot() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a");
    let b = host.open(ViewId::Main, "b.txt", "b");
    let slot = host.slot_in_view(ViewId::Main).unwrap();

    host.move_to_other_view();

    assert_eq!(host.view_of(b), Some(ViewId::Sub));
    assert_eq!(host.current_view(), ViewId::Sub);
    assert_ne!(host.slot_in_view(ViewId::Sub), Some(slot));
    assert_eq!(host.buffer_in_view(ViewId::Main), Some(a));
    assert!(!host.is_single_view());
}

#[test]
fn test_move_tab_backward_and_adjacent() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a");
    let b = host.open(ViewId::Main, "b.txt", "b");
    let c = host.open(ViewId::Main, "c.txt", "c");

    host.move_tab_backward();
    assert_eq!(host.tabs(ViewId::Main), &[a, c, b]);
    assert_eq!(host.position_of(c), Some(1));

    host.activate_adjacent(false);
    assert_eq!(host.current_buffer(), Some(b));
    host.activate_adjacent(false);
    assert_eq!(host.current_buffer(), Some(a));
    host.activate_adjacent(true);
    assert_eq!(host.current_buffer(), Some(b));
}

#[test]
fn test_close_last_tab_moves_focus_to_other_view() {
    let mut host = MemoryHost::new();
    let a = host.open(ViewId::Main, "a.txt", "a");
    let b = host.open(ViewId::Sub, "b.txt", "b");
    host.drain_notifications();

    host.close(b);

    assert_eq!(
        host.drain_notifications(),
        vec![
            Notification::FileBeforeClose(b),
            Notification::BufferActivated(a)
        ]
    );
    assert!(!host.is_open(b));
    assert_eq!(host.current_view(), ViewId::Main);
    assert_eq!(host.current_buffer(), Some(a));
}

#[test]
fn test_open_snapshot_of_last_save() {
    let mut host = MemoryHost::new();
    let a = host.open_saved(ViewId::Main, "/tmp/a.txt", "x\ny");
    host.replace_line(ViewId::Main, 0, "changed");
    assert!(!host.is_saved(a));

    let snapshot = host.open_snapshot(a, TempKind::SnapshotOfLastSave).unwrap();

    assert_eq!(host.text(snapshot).as_deref(), Some("x\ny"));
    assert_eq!(host.label(snapshot), "a.txt");
    assert_eq!(host.current_buffer(), Some(snapshot));
    assert_eq!(host.view_of(snapshot), Some(ViewId::Main));
    assert!(host.is_saved(snapshot));
}

#[test]
fn test_open_snapshot_requires_source_content() {
    let mut host = MemoryHost::new();
    let unsaved = host.open(ViewId::Main, "new 1", "x");
    let saved = host.open_saved(ViewId::Main, "/tmp/b.txt", "y");

    assert_eq!(host.open_snapshot(unsaved, TempKind::SnapshotOfLastSave), None);
    let git = TempKind::SnapshotOfVcsRevision(crate::models::VcsKind::Git);
    assert_eq!(host.open_snapshot(saved, git), None);

    host.set_vcs_revision(saved, git, "old y");
    let snapshot = host.open_snapshot(saved, git).unwrap();
    assert_eq!(host.text(snapshot).as_deref(), Some("old y"));
}

#[test]
fn test_zoom_and_scroll_report_only_changes() {
    let mut host = MemoryHost::new();
    host.open(ViewId::Main, "a.txt", "a\nb\nc");
    host.drain_notifications();

    host.set_zoom(ViewId::Main, 0);
    host.scroll(ViewId::Main, 0);
    assert!(host.poll_notification().is_none());

    host.set_zoom(ViewId::Main, 3);
    host.scroll(ViewId::Main, 2);
    assert_eq!(
        host.drain_notifications(),
        vec![
            Notification::Zoom,
            Notification::UpdateUi {
                view: ViewId::Main
            }
        ]
    );
}

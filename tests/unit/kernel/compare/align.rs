use super::*;
use crate::kernel::services::adapters::MemoryHost;
use crate::kernel::services::ports::{DocumentControl, HostShell, Notification};
use crate::models::{DiffMask, LineRange};

fn none() -> DiffMask {
    DiffMask::empty()
}

/// 旧文件在主视图：a b c d e；新文件在副视图：a d e
fn deleted_block() -> (MemoryHost, AlignmentInfo) {
    let mut host = MemoryHost::new();
    host.open(ViewId::Main, "old.txt", "a\nb\nc\nd\ne");
    host.open(ViewId::Sub, "new.txt", "a\nd\ne");
    let alignment = AlignmentInfo::from_entries(vec![
        AlignmentEntry::new(1, DiffMask::REMOVED, 1, none()),
        AlignmentEntry::new(3, none(), 1, none()),
    ])
    .unwrap();
    (host, alignment)
}

#[test]
fn test_align_diffs_pads_lagging_view() {
    let (mut host, alignment) = deleted_block();

    assert!(is_alignment_needed(&host, ViewId::Main, &alignment, Side::Old));

    align_diffs(&mut host, &alignment, Side::Old);

    assert_eq!(host.padding_before(ViewId::Sub, 1), 2);
    assert_eq!(host.total_padding(ViewId::Main), 0);
    assert_eq!(
        host.visible_from_doc_line(ViewId::Main, 3),
        host.visible_from_doc_line(ViewId::Sub, 1)
    );
    assert!(!is_alignment_needed(&host, ViewId::Main, &alignment, Side::Old));
    assert!(!is_alignment_needed(&host, ViewId::Sub, &alignment, Side::Old));
}

#[test]
fn test_align_diffs_with_old_side_in_sub_view() {
    let mut host = MemoryHost::new();
    host.open(ViewId::Main, "new.txt", "a\nd\ne");
    host.open(ViewId::Sub, "old.txt", "a\nb\nc\nd\ne");
    let alignment = AlignmentInfo::from_entries(vec![
        AlignmentEntry::new(1, DiffMask::REMOVED, 1, none()),
        AlignmentEntry::new(3, none(), 1, none()),
    ])
    .unwrap();

    align_diffs(&mut host, &alignment, Side::New);

    assert_eq!(host.padding_before(ViewId::Main, 1), 2);
    assert_eq!(host.total_padding(ViewId::Sub), 0);
}

#[test]
fn test_align_diffs_is_idempotent_and_unfolds() {
    let (mut host, alignment) = deleted_block();
    host.fold(ViewId::Main, LineRange::new(0, 2));

    align_diffs(&mut host, &alignment, Side::Old);
    align_diffs(&mut host, &alignment, Side::Old);

    assert_eq!(host.padding_before(ViewId::Sub, 1), 2);
    assert_eq!(host.total_padding(ViewId::Sub), 2);
    assert_eq!(host.visible_from_doc_line(ViewId::Main, 1), 1);
}

#[test]
fn test_align_diffs_stops_at_lines_past_end() {
    let (mut host, _) = deleted_block();
    let alignment = AlignmentInfo::from_entries(vec![
        AlignmentEntry::new(3, none(), 1, none()),
        AlignmentEntry::new(40, none(), 40, none()),
    ])
    .unwrap();

    align_diffs(&mut host, &alignment, Side::Old);

    assert_eq!(host.total_padding(ViewId::Sub), 2);
}

#[test]
fn test_sync_views_follows_bias_once() {
    let (mut host, _) = deleted_block();
    let lock = NotificationLock::new();
    host.attach_lock(lock.clone());
    host.scroll(ViewId::Main, 3);
    host.drain_notifications();

    assert!(sync_views(&mut host, ViewId::Main, &lock));
    assert_eq!(host.first_visible_line(ViewId::Sub), 3);
    assert!(host.drain_notifications().is_empty());
    assert!(!lock.is_locked());

    assert!(!sync_views(&mut host, ViewId::Main, &lock));
}

#[test]
fn test_user_scroll_is_reported_when_unlocked() {
    let (mut host, _) = deleted_block();
    host.attach_lock(NotificationLock::new());
    host.drain_notifications();

    host.scroll(ViewId::Sub, 2);

    assert_eq!(
        host.drain_notifications(),
        vec![Notification::UpdateUi { view: ViewId::Sub }]
    );
}

#[test]
fn test_view_location_survives_padding() {
    let (mut host, alignment) = deleted_block();
    host.scroll(ViewId::Sub, 2);
    let location = ViewLocation::capture(&host, ViewId::Sub);
    assert_eq!(location.doc_line, 2);

    align_diffs(&mut host, &alignment, Side::Old);
    location.restore(&mut host);

    assert_eq!(host.first_visible_line(ViewId::Sub), 4);
}

fn marked_host() -> MemoryHost {
    let mut host = MemoryHost::new();
    host.open(ViewId::Sub, "new.txt", "0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
    host.open(ViewId::Main, "old.txt", "0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
    host.add_markers(ViewId::Main, 2, DiffMask::CHANGED);
    host.add_markers(ViewId::Main, 3, DiffMask::CHANGED);
    host.add_markers(ViewId::Main, 7, DiffMask::REMOVED);
    host
}

#[test]
fn test_jump_next_and_prev_without_wrap() {
    let mut host = marked_host();
    assert_eq!(host.current_view(), ViewId::Main);

    assert_eq!(jump_to_change(&mut host, Jump::Next, false), Some(ViewId::Main));
    assert_eq!(host.caret_line(ViewId::Main), 2);
    assert_eq!(jump_to_change(&mut host, Jump::Next, false), Some(ViewId::Main));
    assert_eq!(host.caret_line(ViewId::Main), 7);
    assert_eq!(jump_to_change(&mut host, Jump::Next, false), None);
    assert_eq!(host.caret_line(ViewId::Main), 7);

    assert_eq!(jump_to_change(&mut host, Jump::Prev, false), Some(ViewId::Main));
    assert_eq!(host.caret_line(ViewId::Main), 2);
    assert_eq!(jump_to_change(&mut host, Jump::Prev, false), None);
}

#[test]
fn test_jump_wraps_around() {
    let mut host = marked_host();
    jump_to_change(&mut host, Jump::Last, false);
    assert_eq!(host.caret_line(ViewId::Main), 7);

    jump_to_change(&mut host, Jump::Next, true);
    assert_eq!(host.caret_line(ViewId::Main), 2);

    jump_to_change(&mut host, Jump::Prev, true);
    assert_eq!(host.caret_line(ViewId::Main), 7);
}

#[test]
fn test_jump_without_markers() {
    let mut host = MemoryHost::new();
    host.open(ViewId::Main, "a.txt", "x\ny");
    host.open(ViewId::Sub, "b.txt", "x\ny");

    assert_eq!(jump_to_change(&mut host, Jump::First, true), None);
}

#[test]
fn test_center_at_scrolls_line_to_middle() {
    let mut host = MemoryHost::new();
    let text: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    host.open(ViewId::Main, "a.txt", &text.join("\n"));
    host.set_lines_on_screen(ViewId::Main, 10);

    center_at(&mut host, ViewId::Main, 50);

    assert_eq!(host.first_visible_line(ViewId::Main), 45);
}

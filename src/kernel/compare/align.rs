//! 对齐与滚动同步
//!
//! 对齐信息按旧/新两侧记录行号，视图上的行号通过 `main_side`
//! （比较期间位于主视图的一侧）换算。

use crate::kernel::services::ports::EditorHost;
use crate::models::{AlignmentEntry, AlignmentInfo, Side, ViewId};

use super::lock::NotificationLock;

fn view_line(entry: &AlignmentEntry, main_side: Side, view: ViewId) -> usize {
    match view {
        ViewId::Main => entry.side(main_side).line,
        ViewId::Sub => entry.side(main_side.opposite()).line,
    }
}

/// `view` 的可见窗口内，是否有锚点项在两个视图中的显示行不一致
pub fn is_alignment_needed(
    host: &dyn EditorHost,
    view: ViewId,
    alignment: &AlignmentInfo,
    main_side: Side,
) -> bool {
    let first_visual = host.first_visible_line(view);
    let last_visual = first_visual + host.lines_on_screen(view);
    let first_line = host.doc_line_from_visible(view, first_visual);
    let last_line = host.doc_line_from_visible(view, last_visual);

    for entry in alignment {
        let line = view_line(entry, main_side, view);
        if line >= first_line && entry.is_anchor() {
            let main_visual =
                host.visible_from_doc_line(ViewId::Main, view_line(entry, main_side, ViewId::Main));
            let sub_visual =
                host.visible_from_doc_line(ViewId::Sub, view_line(entry, main_side, ViewId::Sub));
            if main_visual != sub_visual {
                return true;
            }
        }
        if line > last_line {
            break;
        }
    }
    false
}

/// 展开折叠后按对齐信息在落后一侧插入空白填充
pub fn align_diffs(host: &mut dyn EditorHost, alignment: &AlignmentInfo, main_side: Side) {
    host.unfold_all(ViewId::Main);
    host.unfold_all(ViewId::Sub);

    let main_count = host.line_count(ViewId::Main);
    let sub_count = host.line_count(ViewId::Sub);
    let entries = alignment.entries();

    for (i, entry) in entries.iter().enumerate() {
        let main_line = view_line(entry, main_side, ViewId::Main);
        let sub_line = view_line(entry, main_side, ViewId::Sub);
        if main_line >= main_count || sub_line >= sub_count {
            break;
        }

        host.set_padding_before(ViewId::Main, main_line, 0);
        host.set_padding_before(ViewId::Sub, sub_line, 0);

        let mismatch = host.visible_from_doc_line(ViewId::Main, main_line) as isize
            - host.visible_from_doc_line(ViewId::Sub, sub_line) as isize;
        let next = entries.get(i + 1);

        if mismatch > 0 {
            if next.is_some_and(|n| view_line(n, main_side, ViewId::Sub) == sub_line) {
                continue;
            }
            host.set_padding_before(ViewId::Sub, sub_line, mismatch as usize);
        } else if mismatch < 0 {
            if next.is_some_and(|n| view_line(n, main_side, ViewId::Main) == main_line) {
                continue;
            }
            host.set_padding_before(ViewId::Main, main_line, (-mismatch) as usize);
        }
    }
}

/// 让另一视图的首个显示行与 `bias` 视图一致；有改动时返回 true
pub fn sync_views(host: &mut dyn EditorHost, bias: ViewId, lock: &NotificationLock) -> bool {
    let other = bias.other();
    let first_visual = host.first_visible_line(bias);
    if first_visual == host.first_visible_line(other) {
        return false;
    }

    tracing::debug!(
        doc_line = host.doc_line_from_visible(bias, first_visual),
        "Syncing to {} view",
        bias.name()
    );

    let _guard = lock.acquire();
    host.set_first_visible_line(other, first_visual);
    true
}

/// 视图的滚动位置（以文档行记录，填充变化后依然有效）
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewLocation {
    pub view: ViewId,
    pub doc_line: usize,
}

impl ViewLocation {
    pub fn capture(host: &dyn EditorHost, view: ViewId) -> Self {
        Self {
            view,
            doc_line: host.doc_line_from_visible(view, host.first_visible_line(view)),
        }
    }

    pub fn restore(&self, host: &mut dyn EditorHost) {
        let visual = host.visible_from_doc_line(self.view, self.doc_line);
        host.set_first_visible_line(self.view, visual);
    }
}

/// 把 `line` 滚动到视图中央
pub fn center_at(host: &mut dyn EditorHost, view: ViewId, line: usize) {
    let visual = host.visible_from_doc_line(view, line);
    let half = host.lines_on_screen(view) / 2;
    host.set_first_visible_line(view, visual.saturating_sub(half));
}

/// 两个视图中差异块起点的显示行，升序去重
fn diff_block_starts(host: &dyn EditorHost) -> Vec<usize> {
    let mut starts = Vec::new();
    for view in [ViewId::Main, ViewId::Sub] {
        let mut previous_marked = false;
        for line in 0..host.line_count(view) {
            let marked = host.markers(view, line).is_line_diff();
            if marked && !previous_marked {
                starts.push(host.visible_from_doc_line(view, line));
            }
            previous_marked = marked;
        }
    }
    starts.sort_unstable();
    starts.dedup();
    starts
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    First,
    Prev,
    Next,
    Last,
}

/// 跳到差异块；返回跳转所在视图，没有可跳目标时返回 None
pub fn jump_to_change(host: &mut dyn EditorHost, jump: Jump, wrap_around: bool) -> Option<ViewId> {
    let starts = diff_block_starts(host);
    let view = host.current_view();
    let caret_visual = host.visible_from_doc_line(view, host.caret_line(view));

    let target = match jump {
        Jump::First => starts.first().copied(),
        Jump::Last => starts.last().copied(),
        Jump::Next => starts
            .iter()
            .copied()
            .find(|&v| v > caret_visual)
            .or_else(|| wrap_around.then(|| starts.first().copied()).flatten()),
        Jump::Prev => starts
            .iter()
            .rev()
            .copied()
            .find(|&v| v < caret_visual)
            .or_else(|| wrap_around.then(|| starts.last().copied()).flatten()),
    }?;

    let line = host.doc_line_from_visible(view, target);
    host.set_caret_line(view, line);
    center_at(host, view, line);
    tracing::debug!(view = view.name(), line, ?jump, "jump to diff");
    Some(view)
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/align.rs"]
mod tests;

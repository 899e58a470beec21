//! 被删除行的标记台账
//!
//! 多行删除发生前，把这些行上的 diff 标记压栈；删除被撤销（或重做）时
//! 原样写回。普通输入不会触发写回。

use std::time::{Duration, Instant};

use crate::kernel::services::ports::LineMarkers;
use crate::models::{DiffMask, EditAction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedSection {
    pub start_line: usize,
    /// 能恢复这段删除的动作
    pub restore_action: EditAction,
    /// 这段删除是一次“整行替换”的前半部分
    pub is_line_replace: bool,
    /// 下标为相对 `start_line` 的偏移
    pub markers: Vec<DiffMask>,
}

#[derive(Clone, Debug)]
pub struct DeletedSectionLedger {
    sections: Vec<DeletedSection>,
    skip_push: usize,
    last_push: Option<Instant>,
    replace_window: Duration,
}

impl DeletedSectionLedger {
    pub fn new(replace_window: Duration) -> Self {
        Self {
            sections: Vec::new(),
            skip_push: 0,
            last_push: None,
            replace_window,
        }
    }

    /// 多行删除即将发生：`[start_line, end_line]`，`end_line` 为删除终点所在行
    ///
    /// 终点行在删除后依然存在，因此它的标记只记录不清除。
    pub fn push(
        &mut self,
        action: EditAction,
        start_line: usize,
        end_line: usize,
        markers: &mut impl LineMarkers,
        now: Instant,
    ) {
        if end_line <= start_line {
            return;
        }

        if self.skip_push > 0 {
            self.skip_push -= 1;
            tracing::trace!(skip_push = self.skip_push, "ledger push skipped");
            return;
        }

        if let Some(top) = self.sections.last() {
            if top.restore_action == action && top.is_line_replace {
                return;
            }
        }

        let mut snapshot = Vec::with_capacity(end_line - start_line + 1);
        for line in start_line..=end_line {
            snapshot.push(markers.marker(line) & DiffMask::ALL);
            if line != end_line {
                markers.clear_marker(line);
            }
        }

        tracing::trace!(start_line, lines = snapshot.len(), ?action, "ledger push");

        self.sections.push(DeletedSection {
            start_line,
            restore_action: action.restoring(),
            is_line_replace: false,
            markers: snapshot,
        });
        self.last_push = Some(now);
    }

    /// 在 `start_line` 处插入了新行
    pub fn pop(
        &mut self,
        action: EditAction,
        start_line: usize,
        markers: &mut impl LineMarkers,
        now: Instant,
    ) {
        let Some(top) = self.sections.last_mut() else {
            self.skip_push += 1;
            return;
        };

        if top.restore_action != action {
            let within_window = self
                .last_push
                .is_some_and(|pushed| now.saturating_duration_since(pushed) < self.replace_window);
            if within_window {
                top.is_line_replace = true;
            } else {
                self.skip_push += 1;
            }
            return;
        }

        if top.start_line != start_line {
            return;
        }

        let Some(section) = self.sections.pop() else {
            return;
        };

        for (offset, mask) in section.markers.iter().enumerate() {
            let line = section.start_line + offset;
            markers.clear_marker(line);
            if !mask.is_empty() {
                markers.add_marker(line, *mask);
            }
        }

        tracing::trace!(start_line, lines = section.markers.len(), "ledger pop");
    }

    pub fn clear(&mut self) {
        self.skip_push = 0;
        self.sections.clear();
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn top(&self) -> Option<&DeletedSection> {
        self.sections.last()
    }

    pub fn skip_push(&self) -> usize {
        self.skip_push
    }

    pub fn replace_window(&self) -> Duration {
        self.replace_window
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/ledger.rs"]
mod tests;

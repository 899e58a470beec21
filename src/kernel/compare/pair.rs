//! 比较对：旧/新两侧文档 + 对齐信息 + 上次比较用的选项

use crate::kernel::services::ports::{CompareOptions, EditorHost};
use crate::models::{AlignmentInfo, BufferId, DocSlot, LineRange, Side, ViewId};

use super::document::ComparedDocument;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PairState {
    /// 两侧都已确定，尚未运行 diff
    Unresolved,
    Mismatch,
    Match,
}

#[derive(Clone, Debug)]
pub struct ComparedPair {
    pub old: ComparedDocument,
    pub new: ComparedDocument,
    /// 比较前两侧在同一视图中的槽位差，用于拆除时保持原有顺序
    pub relative_position: isize,
    pub alignment: AlignmentInfo,
    pub options: CompareOptions,
    pub is_full_compare: bool,
    /// 按视图（`ViewId::index`）存放的选区
    pub selections: Option<[LineRange; 2]>,
    pub state: PairState,
}

impl ComparedPair {
    /// 两侧按 `side` 区分，传入顺序无关
    pub fn new(first: ComparedDocument, second: ComparedDocument) -> Self {
        let (old, new) = match first.side {
            Side::Old => (first, second),
            Side::New => (second, first),
        };
        Self {
            old,
            new,
            relative_position: 0,
            alignment: AlignmentInfo::new(),
            options: CompareOptions::default(),
            is_full_compare: true,
            selections: None,
            state: PairState::Unresolved,
        }
    }

    pub fn side(&self, side: Side) -> &ComparedDocument {
        match side {
            Side::Old => &self.old,
            Side::New => &self.new,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut ComparedDocument {
        match side {
            Side::Old => &mut self.old,
            Side::New => &mut self.new,
        }
    }

    pub fn contains(&self, buffer: BufferId) -> bool {
        self.old.buffer == buffer || self.new.buffer == buffer
    }

    pub fn side_of(&self, buffer: BufferId) -> Option<Side> {
        if self.old.buffer == buffer {
            Some(Side::Old)
        } else if self.new.buffer == buffer {
            Some(Side::New)
        } else {
            None
        }
    }

    pub fn document(&self, buffer: BufferId) -> Option<&ComparedDocument> {
        self.side_of(buffer).map(|side| self.side(side))
    }

    pub fn document_mut(&mut self, buffer: BufferId) -> Option<&mut ComparedDocument> {
        self.side_of(buffer).map(move |side| self.side_mut(side))
    }

    pub fn other(&self, buffer: BufferId) -> Option<&ComparedDocument> {
        self.side_of(buffer).map(|side| self.side(side.opposite()))
    }

    pub fn other_mut(&mut self, buffer: BufferId) -> Option<&mut ComparedDocument> {
        self.side_of(buffer)
            .map(move |side| self.side_mut(side.opposite()))
    }

    pub fn contains_slot(&self, slot: DocSlot) -> bool {
        self.old.slot == slot || self.new.slot == slot
    }

    pub fn document_by_slot(&self, slot: DocSlot) -> Option<&ComparedDocument> {
        [&self.old, &self.new].into_iter().find(|d| d.slot == slot)
    }

    /// 比较期间位于 `view` 的一侧
    pub fn side_in_view(&self, view: ViewId) -> Side {
        if self.old.compare_view == view {
            Side::Old
        } else {
            Side::New
        }
    }

    /// 当前实际位于 `view` 中的文档
    pub fn document_in_view(&self, host: &dyn EditorHost, view: ViewId) -> &ComparedDocument {
        if host.view_of(self.old.buffer) == Some(view) {
            &self.old
        } else {
            &self.new
        }
    }

    pub fn has_temp(&self) -> bool {
        self.old.is_temp() || self.new.is_temp()
    }

    pub fn clear_documents(&mut self, host: &mut dyn EditorHost) {
        self.old.clear(host);
        self.new.clear(host);
    }

    /// 把两侧移到各自的比较视图，同步缩放
    pub fn position_files(&mut self, host: &mut dyn EditorHost, old_file_view: ViewId) {
        let current_view = host.current_view();
        let zoom = host.zoom(current_view);
        host.set_zoom(current_view.other(), zoom);

        let current = host.current_buffer();

        self.old.assign_compare_view(old_file_view);
        self.new.assign_compare_view(old_file_view);

        self.relative_position = if self.old.home_view != self.new.home_view {
            0
        } else if self.old.home_view == self.old.compare_view {
            self.new.home_position as isize - self.old.home_position as isize
        } else {
            self.old.home_position as isize - self.new.home_position as isize
        };

        for side in [Side::Old, Side::New] {
            let doc = self.side_mut(side);
            if host.view_of(doc.buffer) != Some(doc.compare_view) {
                host.activate(doc.buffer);
                host.move_to_other_view();
                doc.refresh_from_host(host);
            }
        }

        for side in [Side::Old, Side::New] {
            let doc = self.side(side);
            if host.buffer_in_view(doc.compare_view) != Some(doc.buffer) {
                host.activate(doc.buffer);
            }
        }

        if let Some(current) = current {
            host.activate(current);
        }

        tracing::debug!(
            old = %self.old.buffer,
            new = %self.new.buffer,
            relative_position = self.relative_position,
            "compare files positioned"
        );
    }

    /// 关闭 `closed` 之前修正另一侧的原位置，使两者恢复后的相对顺序不变
    pub fn correct_home_position(
        &mut self,
        closed: BufferId,
        closed_view: Option<ViewId>,
        closed_position: usize,
    ) {
        if self.relative_position == 0 {
            return;
        }
        let Some(closed_doc) = self.document(closed) else {
            return;
        };
        if Some(closed_doc.home_view) != closed_view {
            return;
        }

        let step = if self.relative_position > 0 { -1 } else { 1 };
        let position = closed_position as isize + self.relative_position + step;
        if let Some(other) = self.other_mut(closed) {
            other.home_position = position.max(0) as usize;
        }
    }

    /// 拆除：两侧各自还原。`current` 给出时先还原另一侧再还原它
    pub fn restore_files(&mut self, host: &mut dyn EditorHost, current: Option<BufferId>) {
        if self.relative_position != 0 {
            let (bias, moved) = if host.view_of(self.old.buffer) == Some(self.old.home_view) {
                (Side::Old, Side::New)
            } else {
                (Side::New, Side::Old)
            };

            let bias_home = self.side(bias).home_position;
            let moved_home = self.side(moved).home_position;
            if bias_home > moved_home {
                if let Some(now_at) = host.position_of(self.side(bias).buffer) {
                    if now_at != bias_home && now_at < moved_home {
                        self.side_mut(moved).home_position = now_at;
                    }
                }
            }
        }

        match current.and_then(|buffer| self.side_of(buffer)) {
            Some(side) => {
                self.side(side.opposite()).restore(host);
                self.side(side).restore(host);
            }
            None => {
                self.old.restore(host);
                self.new.restore(host);
            }
        }
    }

    pub fn status_text(&self) -> String {
        let compare_type = match self.selections {
            Some(sel) if !self.is_full_compare => {
                let main = sel[ViewId::Main.index()];
                let sub = sel[ViewId::Sub.index()];
                format!(
                    "Sel: {}-{} vs. {}-{}",
                    main.start + 1,
                    main.last().unwrap_or(main.start) + 1,
                    sub.start + 1,
                    sub.last().unwrap_or(sub.start) + 1
                )
            }
            _ => "Full".to_string(),
        };
        let flag = |on: bool| if on { "Y" } else { "N" };
        format!(
            "Compare ({})    Ignore Spaces ({})    Ignore Case ({})    Detect Moves ({})",
            compare_type,
            flag(self.options.ignore_spaces),
            flag(self.options.ignore_case),
            flag(self.options.detect_moves)
        )
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/pair.rs"]
mod tests;

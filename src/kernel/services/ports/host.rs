//! 宿主编辑器契约
//!
//! - `DocumentControl`: 针对某个视图中当前文档的操作（行、标记、滚动、折叠）
//! - `HostShell`: 文档在两个视图间的打开/关闭/移动、标签、编码等
//!
//! 行号均为文档行号；"visual" 行号指折叠与填充之后的显示行。

use crate::models::{BufferId, DiffMask, DocSlot, LineRange, TempKind, ViewId};

pub trait DocumentControl {
    fn line_count(&self, view: ViewId) -> usize;
    fn line_text(&self, view: ViewId, line: usize) -> String;

    fn first_visible_line(&self, view: ViewId) -> usize;
    fn set_first_visible_line(&mut self, view: ViewId, visual: usize);
    fn lines_on_screen(&self, view: ViewId) -> usize;
    fn doc_line_from_visible(&self, view: ViewId, visual: usize) -> usize;
    fn visible_from_doc_line(&self, view: ViewId, line: usize) -> usize;

    fn zoom(&self, view: ViewId) -> i32;
    fn set_zoom(&mut self, view: ViewId, zoom: i32);

    fn markers(&self, view: ViewId, line: usize) -> DiffMask;
    fn add_markers(&mut self, view: ViewId, line: usize, mask: DiffMask);
    fn clear_markers(&mut self, view: ViewId, line: usize);

    /// 显示在 `line` 之上的空白填充行数
    fn padding_before(&self, view: ViewId, line: usize) -> usize;
    /// 设置 `line` 之上的填充行数，0 表示清除
    fn set_padding_before(&mut self, view: ViewId, line: usize, count: usize);
    fn unfold_all(&mut self, view: ViewId);

    fn caret_line(&self, view: ViewId) -> usize;
    fn set_caret_line(&mut self, view: ViewId, line: usize);
    /// 选中的整行区间；无选区返回 None
    fn selection_lines(&self, view: ViewId) -> Option<LineRange>;
    fn clear_selection(&mut self, view: ViewId);

    /// 把当前文档标为已保存（关闭临时文档时不再询问保存）
    fn set_save_point(&mut self, view: ViewId);
}

pub trait HostShell {
    fn current_buffer(&self) -> Option<BufferId>;
    fn current_view(&self) -> ViewId;
    fn activate(&mut self, buffer: BufferId);
    fn focus_view(&mut self, view: ViewId);

    /// 文档已关闭时返回 None
    fn view_of(&self, buffer: BufferId) -> Option<ViewId>;
    fn position_of(&self, buffer: BufferId) -> Option<usize>;
    fn buffer_in_view(&self, view: ViewId) -> Option<BufferId>;
    fn slot_in_view(&self, view: ViewId) -> Option<DocSlot>;
    fn document_count(&self, view: ViewId) -> usize;
    fn is_view_visible(&self, view: ViewId) -> bool;

    fn move_to_other_view(&mut self);
    fn move_tab_backward(&mut self);
    fn activate_adjacent(&mut self, previous: bool);
    fn switch_to_other_view(&mut self);
    fn new_document(&mut self) -> BufferId;
    fn close(&mut self, buffer: BufferId);
    fn discard_storage(&mut self, path: &str);

    fn full_path(&self, buffer: BufferId) -> String;
    fn label(&self, buffer: BufferId) -> String;
    fn set_label(&mut self, buffer: BufferId, label: &str);
    fn encoding(&self, buffer: BufferId) -> String;
    fn is_on_disk(&self, buffer: BufferId) -> bool;

    /// 打开 `source` 的快照（上次保存 / 版本库版本），成功后快照成为当前文档
    fn open_snapshot(&mut self, source: BufferId, kind: TempKind) -> Option<BufferId>;

    fn set_status(&mut self, _text: &str) {}
    fn set_compare_mode(&mut self, _enabled: bool) {}

    fn is_single_view(&self) -> bool {
        !self.is_view_visible(ViewId::Sub) || !self.is_view_visible(ViewId::Main)
    }
}

pub trait EditorHost: DocumentControl + HostShell {}

impl<T: DocumentControl + HostShell + ?Sized> EditorHost for T {}

/// 按行读写 diff 标记
pub trait LineMarkers {
    fn marker(&self, line: usize) -> DiffMask;
    fn clear_marker(&mut self, line: usize);
    fn add_marker(&mut self, line: usize, mask: DiffMask);
}

/// 某个视图上的 `LineMarkers`
pub struct ViewMarkers<'a> {
    host: &'a mut dyn EditorHost,
    view: ViewId,
}

impl<'a> ViewMarkers<'a> {
    pub fn new(host: &'a mut dyn EditorHost, view: ViewId) -> Self {
        Self { host, view }
    }
}

impl LineMarkers for ViewMarkers<'_> {
    fn marker(&self, line: usize) -> DiffMask {
        self.host.markers(self.view, line)
    }

    fn clear_marker(&mut self, line: usize) {
        self.host.clear_markers(self.view, line);
    }

    fn add_marker(&mut self, line: usize, mask: DiffMask) {
        self.host.add_markers(self.view, line, mask);
    }
}

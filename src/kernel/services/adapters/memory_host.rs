//! 内存中的双视图宿主
//!
//! 职责：
//! - 两个固定视图，各自一组标签页；文档文本存放在 Rope 中
//! - 每行的 diff 标记、行上方的空白填充、折叠
//! - 显示行 ↔ 文档行换算（计入填充，跳过折叠行）
//! - 简单的撤销/重做栈，编辑时产生修改通知
//!
//! 比较核心主动操作（滚动、激活、关闭）期间持有通知锁，此时产生的通知直接丢弃；
//! 其余通知排队，由调用方 `poll_notification` 取出后交给会话。

use std::borrow::Cow;
use std::collections::VecDeque;

use ropey::{Rope, RopeSlice};
use rustc_hash::FxHashMap;

use crate::kernel::compare::NotificationLock;
use crate::kernel::services::ports::{
    DocumentControl, HostShell, Modification, ModificationKind, Notification,
};
use crate::models::{BufferId, DiffMask, DocSlot, EditAction, LineRange, TempKind, ViewId};

const DEFAULT_LINES_ON_SCREEN: usize = 20;
const DEFAULT_ENCODING: &str = "UTF-8";

fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

#[derive(Clone, Debug)]
enum EditRecord {
    Insert { at: usize, lines: Vec<String> },
    Delete { at: usize, lines: Vec<String> },
    Replace { line: usize, old: String, new: String },
}

#[derive(Clone, Debug)]
struct Doc {
    rope: Rope,
    markers: Vec<DiffMask>,
    /// 长度为行数 + 1，最后一项为文末之后的填充
    padding: Vec<usize>,
    hidden: Vec<bool>,
    slot: DocSlot,
    path: String,
    label: String,
    encoding: String,
    on_disk: bool,
    saved_text: Option<String>,
    first_visible: usize,
    caret: usize,
    selection: Option<LineRange>,
    undo: Vec<EditRecord>,
    redo: Vec<EditRecord>,
}

impl Doc {
    fn new(path: &str, text: &str, slot: DocSlot) -> Self {
        let rope = Rope::from_str(text);
        let lines = rope.len_lines();
        let label = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path)
            .to_string();
        Self {
            rope,
            markers: vec![DiffMask::empty(); lines],
            padding: vec![0; lines + 1],
            hidden: vec![false; lines],
            slot,
            path: path.to_string(),
            label,
            encoding: DEFAULT_ENCODING.to_string(),
            on_disk: false,
            saved_text: None,
            first_visible: 0,
            caret: 0,
            selection: None,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_text(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let text = slice_to_cow(self.rope.line(line));
        text.trim_end_matches(['\n', '\r']).to_string()
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn insert_lines(&mut self, at: usize, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let at = at.min(self.line_count());
        let joined = lines.join("\n");
        if at < self.line_count() {
            let char_idx = self.rope.line_to_char(at);
            self.rope.insert(char_idx, &format!("{}\n", joined));
        } else {
            let char_idx = self.rope.len_chars();
            self.rope.insert(char_idx, &format!("\n{}", joined));
        }

        let n = lines.len();
        self.markers
            .splice(at..at, std::iter::repeat(DiffMask::empty()).take(n));
        self.padding.splice(at..at, std::iter::repeat(0).take(n));
        self.hidden.splice(at..at, std::iter::repeat(false).take(n));
        self.sync_lengths();
    }

    fn delete_lines(&mut self, start: usize, count: usize) -> Vec<String> {
        let total = self.line_count();
        if start >= total || count == 0 {
            return Vec::new();
        }
        let end = (start + count).min(total);
        let removed: Vec<String> = (start..end).map(|line| self.line_text(line)).collect();

        if end < total {
            let from = self.rope.line_to_char(start);
            let to = self.rope.line_to_char(end);
            self.rope.remove(from..to);
        } else if start > 0 {
            let from = self.rope.line_to_char(start) - 1;
            let to = self.rope.len_chars();
            self.rope.remove(from..to);
        } else {
            let to = self.rope.len_chars();
            self.rope.remove(0..to);
        }

        self.markers.drain(start..end.min(self.markers.len()));
        self.padding.drain(start..end.min(self.padding.len()));
        self.hidden.drain(start..end.min(self.hidden.len()));
        self.sync_lengths();
        removed
    }

    fn replace_line(&mut self, line: usize, text: &str) -> String {
        let old = self.line_text(line);
        if line >= self.line_count() {
            return old;
        }
        let from = self.rope.line_to_char(line);
        let to = from + old.chars().count();
        self.rope.remove(from..to);
        self.rope.insert(from, text);
        old
    }

    fn sync_lengths(&mut self) {
        let lines = self.line_count();
        self.markers.resize(lines, DiffMask::empty());
        self.padding.resize(lines + 1, 0);
        self.hidden.resize(lines, false);
        self.caret = self.caret.min(lines.saturating_sub(1));
    }

    fn visible_from_doc_line(&self, line: usize) -> usize {
        let line = line.min(self.line_count());
        let mut visual = 0;
        for k in 0..line {
            visual += self.padding[k];
            if !self.hidden[k] {
                visual += 1;
            }
        }
        visual + self.padding[line]
    }

    fn doc_line_from_visible(&self, visual: usize) -> usize {
        let mut row = 0;
        let mut result = 0;
        for line in 0..self.line_count() {
            row += self.padding[line];
            if self.hidden[line] {
                continue;
            }
            if row > visual {
                break;
            }
            result = line;
            row += 1;
        }
        result
    }
}

#[derive(Clone, Debug)]
struct ViewState {
    tabs: Vec<BufferId>,
    active: Option<BufferId>,
    zoom: i32,
    lines_on_screen: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            zoom: 0,
            lines_on_screen: DEFAULT_LINES_ON_SCREEN,
        }
    }
}

#[derive(Default)]
pub struct MemoryHost {
    docs: FxHashMap<BufferId, Doc>,
    views: [ViewState; 2],
    current_view: Option<ViewId>,
    next_buffer: u64,
    next_slot: u64,
    lock: Option<NotificationLock>,
    pending: VecDeque<Notification>,
    vcs_revisions: FxHashMap<(BufferId, TempKind), String>,
    status: String,
    compare_mode: bool,
    discarded: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 与会话共享通知锁
    pub fn attach_lock(&mut self, lock: NotificationLock) {
        self.lock = Some(lock);
    }

    pub fn poll_notification(&mut self) -> Option<Notification> {
        self.pending.pop_front()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    fn emit(&mut self, notification: Notification) {
        if self.lock.as_ref().is_some_and(NotificationLock::is_locked) {
            return;
        }
        self.pending.push_back(notification);
    }

    fn view_state(&self, view: ViewId) -> &ViewState {
        &self.views[view.index()]
    }

    fn view_state_mut(&mut self, view: ViewId) -> &mut ViewState {
        &mut self.views[view.index()]
    }

    fn active_doc(&self, view: ViewId) -> Option<&Doc> {
        self.view_state(view)
            .active
            .and_then(|buffer| self.docs.get(&buffer))
    }

    fn active_doc_mut(&mut self, view: ViewId) -> Option<&mut Doc> {
        let buffer = self.view_state(view).active?;
        self.docs.get_mut(&buffer)
    }

    fn alloc_slot(&mut self) -> DocSlot {
        self.next_slot += 1;
        DocSlot(self.next_slot)
    }

    /// 在 `view` 末尾打开文档并激活
    pub fn open(&mut self, view: ViewId, path: &str, text: &str) -> BufferId {
        self.next_buffer += 1;
        let buffer = BufferId(self.next_buffer);
        let slot = self.alloc_slot();
        self.docs.insert(buffer, Doc::new(path, text, slot));
        self.view_state_mut(view).tabs.push(buffer);
        self.activate_in(view, buffer);
        buffer
    }

    /// 打开磁盘上已保存的文档
    pub fn open_saved(&mut self, view: ViewId, path: &str, text: &str) -> BufferId {
        let buffer = self.open(view, path, text);
        if let Some(doc) = self.docs.get_mut(&buffer) {
            doc.on_disk = true;
            doc.saved_text = Some(text.to_string());
        }
        buffer
    }

    fn activate_in(&mut self, view: ViewId, buffer: BufferId) {
        let previous = self.current_buffer();
        self.view_state_mut(view).active = Some(buffer);
        self.current_view = Some(view);
        if previous != Some(buffer) {
            self.emit(Notification::BufferActivated(buffer));
        }
    }

    pub fn text(&self, buffer: BufferId) -> Option<String> {
        self.docs.get(&buffer).map(Doc::text)
    }

    pub fn tabs(&self, view: ViewId) -> &[BufferId] {
        &self.view_state(view).tabs
    }

    pub fn is_open(&self, buffer: BufferId) -> bool {
        self.docs.contains_key(&buffer)
    }

    pub fn set_encoding(&mut self, buffer: BufferId, encoding: &str) {
        if let Some(doc) = self.docs.get_mut(&buffer) {
            doc.encoding = encoding.to_string();
        }
    }

    pub fn set_lines_on_screen(&mut self, view: ViewId, lines: usize) {
        self.view_state_mut(view).lines_on_screen = lines.max(1);
    }

    /// 登记某个文档的版本库版本内容
    pub fn set_vcs_revision(&mut self, buffer: BufferId, kind: TempKind, text: &str) {
        self.vcs_revisions.insert((buffer, kind), text.to_string());
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn compare_mode(&self) -> bool {
        self.compare_mode
    }

    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    pub fn is_saved(&self, buffer: BufferId) -> bool {
        self.docs
            .get(&buffer)
            .is_some_and(|doc| doc.saved_text.as_deref() == Some(doc.text().as_str()))
    }

    /// 整篇文档的标记（测试与输出用）
    pub fn all_markers(&self, buffer: BufferId) -> Vec<DiffMask> {
        self.docs
            .get(&buffer)
            .map(|doc| doc.markers.clone())
            .unwrap_or_default()
    }

    pub fn total_padding(&self, view: ViewId) -> usize {
        self.active_doc(view)
            .map(|doc| doc.padding.iter().sum())
            .unwrap_or(0)
    }

    // ---- 用户操作 ----

    /// 用户滚动
    pub fn scroll(&mut self, view: ViewId, visual: usize) {
        self.set_first_visible_line(view, visual);
    }

    pub fn select_lines(&mut self, view: ViewId, range: LineRange) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.selection = Some(range);
        }
    }

    pub fn fold(&mut self, view: ViewId, range: LineRange) {
        if let Some(doc) = self.active_doc_mut(view) {
            for line in range.start..range.end().min(doc.hidden.len()) {
                doc.hidden[line] = true;
            }
        }
    }

    pub fn paint(&mut self) {
        self.emit(Notification::Painted);
    }

    pub fn save(&mut self, buffer: BufferId) {
        if let Some(doc) = self.docs.get_mut(&buffer) {
            doc.saved_text = Some(doc.text());
            doc.on_disk = true;
        }
        self.emit(Notification::FileSaved(buffer));
    }

    pub fn minimize(&mut self) {
        self.emit(Notification::Minimized);
    }

    /// 恢复窗口的通知不受通知锁影响
    pub fn restore_window(&mut self) {
        self.pending.push_back(Notification::Restored);
    }

    /// 关闭前通知同样不受通知锁影响
    pub fn shutdown(&mut self) {
        self.pending.push_back(Notification::BeforeShutdown);
    }

    /// 关闭的第一阶段：只发出关闭前通知，文档仍在
    pub fn begin_close(&mut self, buffer: BufferId) {
        if self.docs.contains_key(&buffer) {
            self.emit(Notification::FileBeforeClose(buffer));
        }
    }

    /// 关闭的第二阶段：移除文档
    pub fn complete_close(&mut self, buffer: BufferId) {
        let Some(view) = self.view_of(buffer) else {
            return;
        };
        let was_current = self.current_buffer() == Some(buffer);
        let state = self.view_state_mut(view);
        let Some(index) = state.tabs.iter().position(|b| *b == buffer) else {
            return;
        };
        state.tabs.remove(index);
        if state.active == Some(buffer) {
            state.active = if state.tabs.is_empty() {
                None
            } else {
                Some(state.tabs[index.min(state.tabs.len() - 1)])
            };
        }
        self.docs.remove(&buffer);

        if self.view_state(view).tabs.is_empty() && self.current_view == Some(view) {
            self.current_view = Some(view.other()).filter(|v| self.is_view_visible(*v));
        }
        if was_current {
            if let Some(current) = self.current_buffer() {
                self.emit(Notification::BufferActivated(current));
            }
        }
    }

    pub fn insert_lines(&mut self, view: ViewId, at: usize, lines: &[&str]) {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        if self.apply_insert(view, at, &lines, EditAction::User) {
            self.record(view, EditRecord::Insert { at, lines });
        }
    }

    pub fn delete_lines(&mut self, view: ViewId, start: usize, count: usize) {
        let lines = self.apply_delete(view, start, count, EditAction::User);
        if !lines.is_empty() {
            self.record(view, EditRecord::Delete { at: start, lines });
        }
    }

    pub fn replace_line(&mut self, view: ViewId, line: usize, text: &str) {
        if let Some(old) = self.apply_replace(view, line, text, EditAction::User) {
            self.record(
                view,
                EditRecord::Replace {
                    line,
                    old,
                    new: text.to_string(),
                },
            );
        }
    }

    pub fn undo(&mut self, view: ViewId) -> bool {
        let Some(record) = self.active_doc_mut(view).and_then(|doc| doc.undo.pop()) else {
            return false;
        };
        match &record {
            EditRecord::Insert { at, lines } => {
                self.apply_delete(view, *at, lines.len(), EditAction::Undo);
            }
            EditRecord::Delete { at, lines } => {
                self.apply_insert(view, *at, lines, EditAction::Undo);
            }
            EditRecord::Replace { line, old, .. } => {
                self.apply_replace(view, *line, old, EditAction::Undo);
            }
        }
        if let Some(doc) = self.active_doc_mut(view) {
            doc.redo.push(record);
        }
        true
    }

    pub fn redo(&mut self, view: ViewId) -> bool {
        let Some(record) = self.active_doc_mut(view).and_then(|doc| doc.redo.pop()) else {
            return false;
        };
        match &record {
            EditRecord::Insert { at, lines } => {
                self.apply_insert(view, *at, lines, EditAction::Redo);
            }
            EditRecord::Delete { at, lines } => {
                self.apply_delete(view, *at, lines.len(), EditAction::Redo);
            }
            EditRecord::Replace { line, new, .. } => {
                self.apply_replace(view, *line, new, EditAction::Redo);
            }
        }
        if let Some(doc) = self.active_doc_mut(view) {
            doc.undo.push(record);
        }
        true
    }

    fn record(&mut self, view: ViewId, record: EditRecord) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.undo.push(record);
            doc.redo.clear();
        }
    }

    fn modification(
        &self,
        view: ViewId,
        kind: ModificationKind,
        action: EditAction,
        start_line: usize,
        end_line: usize,
        lines_added: isize,
    ) -> Option<Notification> {
        let buffer = self.view_state(view).active?;
        Some(Notification::Modified(Modification {
            view,
            buffer,
            kind,
            action,
            start_line,
            end_line,
            lines_added,
        }))
    }

    fn apply_insert(
        &mut self,
        view: ViewId,
        at: usize,
        lines: &[String],
        action: EditAction,
    ) -> bool {
        let Some(doc) = self.active_doc_mut(view) else {
            return false;
        };
        if lines.is_empty() {
            return false;
        }
        let at = at.min(doc.line_count());
        doc.insert_lines(at, lines);
        let n = lines.len();
        if let Some(event) =
            self.modification(view, ModificationKind::Insert, action, at, at + n, n as isize)
        {
            self.emit(event);
        }
        true
    }

    fn apply_delete(
        &mut self,
        view: ViewId,
        start: usize,
        count: usize,
        action: EditAction,
    ) -> Vec<String> {
        let Some(total) = self.active_doc(view).map(Doc::line_count) else {
            return Vec::new();
        };
        if start >= total || count == 0 {
            return Vec::new();
        }
        let count = count.min(total - start);
        let lines_added = -(count as isize);

        if let Some(event) = self.modification(
            view,
            ModificationKind::BeforeDelete,
            action,
            start,
            start + count,
            lines_added,
        ) {
            self.emit(event);
        }

        let removed = match self.active_doc_mut(view) {
            Some(doc) => doc.delete_lines(start, count),
            None => return Vec::new(),
        };

        if let Some(event) = self.modification(
            view,
            ModificationKind::Delete,
            action,
            start,
            start,
            lines_added,
        ) {
            self.emit(event);
        }
        removed
    }

    fn apply_replace(
        &mut self,
        view: ViewId,
        line: usize,
        text: &str,
        action: EditAction,
    ) -> Option<String> {
        let total = self.active_doc(view).map(Doc::line_count)?;
        if line >= total {
            return None;
        }
        if let Some(event) =
            self.modification(view, ModificationKind::BeforeDelete, action, line, line, 0)
        {
            self.emit(event);
        }
        let old = self.active_doc_mut(view)?.replace_line(line, text);
        for kind in [ModificationKind::Delete, ModificationKind::Insert] {
            if let Some(event) = self.modification(view, kind, action, line, line, 0) {
                self.emit(event);
            }
        }
        Some(old)
    }
}

impl DocumentControl for MemoryHost {
    fn line_count(&self, view: ViewId) -> usize {
        self.active_doc(view).map(Doc::line_count).unwrap_or(0)
    }

    fn line_text(&self, view: ViewId, line: usize) -> String {
        self.active_doc(view)
            .map(|doc| doc.line_text(line))
            .unwrap_or_default()
    }

    fn first_visible_line(&self, view: ViewId) -> usize {
        self.active_doc(view).map(|doc| doc.first_visible).unwrap_or(0)
    }

    fn set_first_visible_line(&mut self, view: ViewId, visual: usize) {
        let changed = match self.active_doc_mut(view) {
            Some(doc) if doc.first_visible != visual => {
                doc.first_visible = visual;
                true
            }
            _ => false,
        };
        if changed {
            self.emit(Notification::UpdateUi { view });
        }
    }

    fn lines_on_screen(&self, view: ViewId) -> usize {
        self.view_state(view).lines_on_screen
    }

    fn doc_line_from_visible(&self, view: ViewId, visual: usize) -> usize {
        self.active_doc(view)
            .map(|doc| doc.doc_line_from_visible(visual))
            .unwrap_or(0)
    }

    fn visible_from_doc_line(&self, view: ViewId, line: usize) -> usize {
        self.active_doc(view)
            .map(|doc| doc.visible_from_doc_line(line))
            .unwrap_or(line)
    }

    fn zoom(&self, view: ViewId) -> i32 {
        self.view_state(view).zoom
    }

    fn set_zoom(&mut self, view: ViewId, zoom: i32) {
        if self.view_state(view).zoom == zoom {
            return;
        }
        self.view_state_mut(view).zoom = zoom;
        self.emit(Notification::Zoom);
    }

    fn markers(&self, view: ViewId, line: usize) -> DiffMask {
        self.active_doc(view)
            .and_then(|doc| doc.markers.get(line).copied())
            .unwrap_or_default()
    }

    fn add_markers(&mut self, view: ViewId, line: usize, mask: DiffMask) {
        if let Some(slot) = self
            .active_doc_mut(view)
            .and_then(|doc| doc.markers.get_mut(line))
        {
            *slot |= mask;
        }
    }

    fn clear_markers(&mut self, view: ViewId, line: usize) {
        if let Some(slot) = self
            .active_doc_mut(view)
            .and_then(|doc| doc.markers.get_mut(line))
        {
            *slot = DiffMask::empty();
        }
    }

    fn padding_before(&self, view: ViewId, line: usize) -> usize {
        self.active_doc(view)
            .and_then(|doc| doc.padding.get(line).copied())
            .unwrap_or(0)
    }

    fn set_padding_before(&mut self, view: ViewId, line: usize, count: usize) {
        if let Some(slot) = self
            .active_doc_mut(view)
            .and_then(|doc| doc.padding.get_mut(line))
        {
            *slot = count;
        }
    }

    fn unfold_all(&mut self, view: ViewId) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.hidden.iter_mut().for_each(|hidden| *hidden = false);
        }
    }

    fn caret_line(&self, view: ViewId) -> usize {
        self.active_doc(view).map(|doc| doc.caret).unwrap_or(0)
    }

    fn set_caret_line(&mut self, view: ViewId, line: usize) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.caret = line.min(doc.line_count().saturating_sub(1));
        }
    }

    fn selection_lines(&self, view: ViewId) -> Option<LineRange> {
        self.active_doc(view)
            .and_then(|doc| doc.selection)
            .filter(|range| !range.is_empty())
    }

    fn clear_selection(&mut self, view: ViewId) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.selection = None;
        }
    }

    fn set_save_point(&mut self, view: ViewId) {
        if let Some(doc) = self.active_doc_mut(view) {
            doc.saved_text = Some(doc.text());
        }
    }
}

impl HostShell for MemoryHost {
    fn current_buffer(&self) -> Option<BufferId> {
        self.current_view
            .and_then(|view| self.view_state(view).active)
    }

    fn current_view(&self) -> ViewId {
        self.current_view.unwrap_or(ViewId::Main)
    }

    fn activate(&mut self, buffer: BufferId) {
        if let Some(view) = self.view_of(buffer) {
            self.activate_in(view, buffer);
        }
    }

    fn focus_view(&mut self, view: ViewId) {
        if !self.is_view_visible(view) {
            return;
        }
        if let Some(buffer) = self.view_state(view).active {
            self.activate_in(view, buffer);
        }
    }

    fn view_of(&self, buffer: BufferId) -> Option<ViewId> {
        [ViewId::Main, ViewId::Sub]
            .into_iter()
            .find(|view| self.view_state(*view).tabs.contains(&buffer))
    }

    fn position_of(&self, buffer: BufferId) -> Option<usize> {
        let view = self.view_of(buffer)?;
        self.view_state(view).tabs.iter().position(|b| *b == buffer)
    }

    fn buffer_in_view(&self, view: ViewId) -> Option<BufferId> {
        self.view_state(view).active
    }

    fn slot_in_view(&self, view: ViewId) -> Option<DocSlot> {
        self.active_doc(view).map(|doc| doc.slot)
    }

    fn document_count(&self, view: ViewId) -> usize {
        self.view_state(view).tabs.len()
    }

    fn is_view_visible(&self, view: ViewId) -> bool {
        !self.view_state(view).tabs.is_empty()
    }

    fn move_to_other_view(&mut self) {
        let Some(buffer) = self.current_buffer() else {
            return;
        };
        let from = self.current_view();
        let to = from.other();

        let state = self.view_state_mut(from);
        let Some(index) = state.tabs.iter().position(|b| *b == buffer) else {
            return;
        };
        state.tabs.remove(index);
        state.active = if state.tabs.is_empty() {
            None
        } else {
            Some(state.tabs[index.saturating_sub(1).min(state.tabs.len() - 1)])
        };

        let slot = self.alloc_slot();
        if let Some(doc) = self.docs.get_mut(&buffer) {
            doc.slot = slot;
        }
        self.view_state_mut(to).tabs.push(buffer);
        self.view_state_mut(to).active = Some(buffer);
        self.current_view = Some(to);
    }

    fn move_tab_backward(&mut self) {
        let Some(buffer) = self.current_buffer() else {
            return;
        };
        let view = self.current_view();
        let tabs = &mut self.view_state_mut(view).tabs;
        if let Some(index) = tabs.iter().position(|b| *b == buffer) {
            if index > 0 {
                tabs.swap(index, index - 1);
            }
        }
    }

    fn activate_adjacent(&mut self, previous: bool) {
        let view = self.current_view();
        let state = self.view_state(view);
        let len = state.tabs.len();
        if len < 2 {
            return;
        }
        let Some(index) = state
            .active
            .and_then(|active| state.tabs.iter().position(|b| *b == active))
        else {
            return;
        };
        let target = if previous {
            (index + len - 1) % len
        } else {
            (index + 1) % len
        };
        let buffer = state.tabs[target];
        self.activate_in(view, buffer);
    }

    fn switch_to_other_view(&mut self) {
        let other = self.current_view().other();
        self.focus_view(other);
    }

    fn new_document(&mut self) -> BufferId {
        let view = self.current_view();
        let name = format!("new {}", self.next_buffer + 1);
        self.open(view, &name, "")
    }

    fn close(&mut self, buffer: BufferId) {
        self.begin_close(buffer);
        self.complete_close(buffer);
    }

    fn discard_storage(&mut self, path: &str) {
        self.discarded.push(path.to_string());
    }

    fn full_path(&self, buffer: BufferId) -> String {
        self.docs
            .get(&buffer)
            .map(|doc| doc.path.clone())
            .unwrap_or_default()
    }

    fn label(&self, buffer: BufferId) -> String {
        self.docs
            .get(&buffer)
            .map(|doc| doc.label.clone())
            .unwrap_or_default()
    }

    fn set_label(&mut self, buffer: BufferId, label: &str) {
        if let Some(doc) = self.docs.get_mut(&buffer) {
            doc.label = label.to_string();
        }
    }

    fn encoding(&self, buffer: BufferId) -> String {
        self.docs
            .get(&buffer)
            .map(|doc| doc.encoding.clone())
            .unwrap_or_default()
    }

    fn is_on_disk(&self, buffer: BufferId) -> bool {
        self.docs.get(&buffer).is_some_and(|doc| doc.on_disk)
    }

    fn open_snapshot(&mut self, source: BufferId, kind: TempKind) -> Option<BufferId> {
        let doc = self.docs.get(&source)?;
        let text = match kind {
            TempKind::None => return None,
            TempKind::SnapshotOfLastSave => doc.saved_text.clone()?,
            TempKind::SnapshotOfVcsRevision(_) => self.vcs_revisions.get(&(source, kind))?.clone(),
        };
        let path = format!(
            "{}{}",
            doc.path,
            kind.label_suffix().replace(" ** ", ".").replace(' ', "_")
        );
        let label = doc.label.clone();
        let encoding = doc.encoding.clone();

        let view = self.current_view();
        let buffer = self.open(view, &path, &text);
        if let Some(snapshot) = self.docs.get_mut(&buffer) {
            snapshot.label = label;
            snapshot.encoding = encoding;
            snapshot.on_disk = true;
            snapshot.saved_text = Some(text);
        }
        Some(buffer)
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn set_compare_mode(&mut self, enabled: bool) {
        self.compare_mode = enabled;
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/memory_host.rs"]
mod tests;
